//! Typed query builder for the content source search API
//!
//! Predicates and orderings render to the bracketed query language the
//! content API expects, e.g. `[[at(document.type,"post")]]` and
//! `[document.first_publication_date desc]`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document type of a document
pub const DOCUMENT_TYPE: &str = "document.type";
/// First publication timestamp of a document
pub const FIRST_PUBLICATION_DATE: &str = "document.first_publication_date";
/// Last publication timestamp of a document
pub const LAST_PUBLICATION_DATE: &str = "document.last_publication_date";

/// Path of the uid field for a custom type
pub fn uid_path(document_type: &str) -> String {
    format!("my.{}.uid", document_type)
}

/// Ordering direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// A single query predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Field equals value
    At { path: String, value: String },
    /// Timestamp field strictly after `date`
    DateAfter { path: String, date: DateTime<Utc> },
    /// Timestamp field strictly before `date`
    DateBefore { path: String, date: DateTime<Utc> },
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::At {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn date_after(path: impl Into<String>, date: DateTime<Utc>) -> Self {
        Predicate::DateAfter {
            path: path.into(),
            date,
        }
    }

    pub fn date_before(path: impl Into<String>, date: DateTime<Utc>) -> Self {
        Predicate::DateBefore {
            path: path.into(),
            date,
        }
    }

    /// Render in the content API's predicate syntax
    pub fn render(&self) -> String {
        match self {
            Predicate::At { path, value } => {
                format!("[at({},\"{}\")]", path, escape_string(value))
            }
            // Dates are sent as epoch milliseconds
            Predicate::DateAfter { path, date } => {
                format!("[date.after({},{})]", path, date.timestamp_millis())
            }
            Predicate::DateBefore { path, date } => {
                format!("[date.before({},{})]", path, date.timestamp_millis())
            }
        }
    }
}

/// Ordering on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    pub field: String,
    pub direction: SortDirection,
}

impl Ordering {
    fn render(&self) -> String {
        match self.direction {
            SortDirection::Asc => self.field.clone(),
            SortDirection::Desc => format!("{} desc", self.field),
        }
    }
}

/// A search query against the content source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub predicates: Vec<Predicate>,
    /// Field selection (`type.field`); empty fetches everything
    #[serde(default)]
    pub fetch: Vec<String>,
    pub page_size: usize,
    /// 1-based page number
    pub page: usize,
    #[serde(default)]
    pub orderings: Vec<Ordering>,
    /// Content version; `None` means the published master version
    #[serde(default)]
    pub version_ref: Option<String>,
}

impl Query {
    /// Content API default page size
    pub const DEFAULT_PAGE_SIZE: usize = 20;

    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self {
            predicates,
            fetch: Vec::new(),
            page_size: Self::DEFAULT_PAGE_SIZE,
            page: 1,
            orderings: Vec::new(),
            version_ref: None,
        }
    }

    pub fn fetch<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.orderings.push(Ordering {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn with_ref(mut self, version_ref: Option<String>) -> Self {
        self.version_ref = version_ref.filter(|r| !r.is_empty());
        self
    }

    /// The `q` parameter: all predicates wrapped in one outer bracket
    pub fn render_predicates(&self) -> String {
        let inner: String = self.predicates.iter().map(Predicate::render).collect();
        format!("[{}]", inner)
    }

    /// The `orderings` parameter, if any orderings are set
    pub fn render_orderings(&self) -> Option<String> {
        if self.orderings.is_empty() {
            return None;
        }
        let fields: Vec<String> = self.orderings.iter().map(Ordering::render).collect();
        Some(format!("[{}]", fields.join(",")))
    }

    /// Query parameters other than `ref` and `access_token`
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", self.render_predicates())];
        if let Some(orderings) = self.render_orderings() {
            params.push(("orderings", orderings));
        }
        params.push(("pageSize", self.page_size.to_string()));
        if self.page > 1 {
            params.push(("page", self.page.to_string()));
        }
        if !self.fetch.is_empty() {
            params.push(("fetch", self.fetch.join(",")));
        }
        params
    }
}

fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

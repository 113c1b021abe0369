//! Post model and projection from raw CMS documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cms::{parse_timestamp, RawDocument};
use crate::error::{BlogError, Result};

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Stable identifier assigned by the content source
    pub uid: String,

    /// First publication date
    pub first_publication_date: Option<DateTime<Utc>>,

    /// Last publication date
    pub last_publication_date: Option<DateTime<Utc>>,

    pub title: String,

    pub subtitle: String,

    pub author: String,

    /// Banner image URL
    pub banner: Option<String>,

    /// Body sections
    #[serde(default)]
    pub content: Vec<Section>,
}

/// A headed section of a post body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub body: Vec<RichTextBlock>,
}

/// A rich-text block (paragraph, heading, list item, image...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub text: String,

    /// Spans and other block attributes, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Post {
    /// Project a raw document into a post, validating every field
    pub fn from_document(doc: &RawDocument) -> Result<Self> {
        let uid = doc
            .uid
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| BlogError::invalid(&doc.id, "missing uid"))?
            .to_string();

        let data = doc
            .data
            .as_object()
            .ok_or_else(|| BlogError::invalid(&uid, "data is not an object"))?;

        let first_publication_date = timestamp(
            &uid,
            "first_publication_date",
            &doc.first_publication_date,
        )?;
        let last_publication_date =
            timestamp(&uid, "last_publication_date", &doc.last_publication_date)?;
        if let (Some(first), Some(last)) = (first_publication_date, last_publication_date) {
            if first > last {
                return Err(BlogError::invalid(
                    &uid,
                    "first publication date is after last publication date",
                ));
            }
        }

        let title = required_text(&uid, data, "title")?;
        let subtitle = optional_text(&uid, data, "subtitle")?.unwrap_or_default();
        let author = required_text(&uid, data, "author")?;
        let banner = banner_url(&uid, data)?;
        let content = sections(&uid, data)?;

        Ok(Self {
            uid,
            first_publication_date,
            last_publication_date,
            title,
            subtitle,
            author,
            banner,
            content,
        })
    }

    /// Link path of the post page
    pub fn path(&self) -> String {
        format!("/post/{}", self.uid)
    }
}

fn timestamp(uid: &str, field: &str, value: &Option<String>) -> Result<Option<DateTime<Utc>>> {
    match value.as_deref() {
        None => Ok(None),
        Some(s) => parse_timestamp(s)
            .map(Some)
            .map_err(|e| BlogError::invalid(uid, format!("bad {} {:?}: {}", field, s, e))),
    }
}

/// Text fields may be plain strings or rich-text block arrays
fn text_value(uid: &str, field: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Array(_) => {
            let blocks = blocks(uid, field, value)?;
            let text: Vec<&str> = blocks.iter().map(|b| b.text.as_str()).collect();
            Ok(Some(text.join(" ")))
        }
        _ => Err(BlogError::invalid(
            uid,
            format!("{} must be text or rich text", field),
        )),
    }
}

fn optional_text(uid: &str, data: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match data.get(field) {
        Some(value) => text_value(uid, field, value),
        None => Ok(None),
    }
}

fn required_text(uid: &str, data: &Map<String, Value>, field: &str) -> Result<String> {
    optional_text(uid, data, field)?
        .ok_or_else(|| BlogError::invalid(uid, format!("missing {}", field)))
}

fn banner_url(uid: &str, data: &Map<String, Value>) -> Result<Option<String>> {
    match data.get("banner") {
        None | Some(Value::Null) => Ok(None),
        // An unset image field comes back as an empty object
        Some(Value::Object(image)) => match image.get("url") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(url)) => Ok(Some(url.clone())),
            Some(_) => Err(BlogError::invalid(uid, "banner.url must be a string")),
        },
        Some(_) => Err(BlogError::invalid(uid, "banner must be an image object")),
    }
}

fn blocks(uid: &str, field: &str, value: &Value) -> Result<Vec<RichTextBlock>> {
    let items = value
        .as_array()
        .ok_or_else(|| BlogError::invalid(uid, format!("{} must be a list of blocks", field)))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<RichTextBlock>(item.clone())
                .map_err(|e| BlogError::invalid(uid, format!("{}[{}]: {}", field, i, e)))
        })
        .collect()
}

fn sections(uid: &str, data: &Map<String, Value>) -> Result<Vec<Section>> {
    let items = match data.get("content") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(BlogError::invalid(uid, "content must be a list")),
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let section = item.as_object().ok_or_else(|| {
                BlogError::invalid(uid, format!("content[{}] is not an object", i))
            })?;
            let heading = match section.get("heading") {
                Some(value) => text_value(uid, "heading", value)?.unwrap_or_default(),
                None => String::new(),
            };
            let body = match section.get("body") {
                None | Some(Value::Null) => Vec::new(),
                Some(value) => blocks(uid, &format!("content[{}].body", i), value)?,
            };
            Ok(Section { heading, body })
        })
        .collect()
}

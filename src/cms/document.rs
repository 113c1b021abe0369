//! Raw documents and pages as returned by the content source

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document exactly as the content source returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub id: String,

    pub uid: Option<String>,

    #[serde(rename = "type", default)]
    pub doc_type: String,

    #[serde(default)]
    pub href: Option<String>,

    #[serde(default)]
    pub first_publication_date: Option<String>,

    #[serde(default)]
    pub last_publication_date: Option<String>,

    /// Custom-type fields, untyped until projection
    #[serde(default)]
    pub data: serde_json::Value,
}

impl RawDocument {
    /// Parsed first publication timestamp, if present and well formed
    pub fn first_published(&self) -> Option<DateTime<Utc>> {
        self.first_publication_date
            .as_deref()
            .and_then(|s| parse_timestamp(s).ok())
    }

    /// Parsed last publication timestamp, if present and well formed
    pub fn last_published(&self) -> Option<DateTime<Utc>> {
        self.last_publication_date
            .as_deref()
            .and_then(|s| parse_timestamp(s).ok())
    }
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    #[serde(default)]
    pub page: usize,

    #[serde(default)]
    pub total_pages: usize,

    #[serde(default)]
    pub results: Vec<RawDocument>,

    /// Opaque URL of the following page
    #[serde(default)]
    pub next_page: Option<String>,
}

/// Parse a content API timestamp
///
/// Accepts RFC 3339 as well as the API's `2021-03-25T19:25:28+0000` form.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"))
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_forms() {
        let expected = Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).unwrap();
        assert_eq!(parse_timestamp("2021-03-25T19:25:28+0000").unwrap(), expected);
        assert_eq!(parse_timestamp("2021-03-25T19:25:28Z").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2021-03-25T21:25:28+02:00").unwrap(),
            expected
        );
        assert!(parse_timestamp("25/03/2021").is_err());
    }

    #[test]
    fn test_deserialize_page() {
        let json = r#"{
            "page": 1,
            "total_pages": 2,
            "next_page": "https://blog.cdn.prismic.io/api/v2/documents/search?page=2",
            "results": [{
                "id": "YF0x",
                "uid": "hello",
                "type": "post",
                "first_publication_date": "2021-03-25T19:25:28+0000",
                "last_publication_date": null,
                "data": {"title": "Hello"}
            }]
        }"#;
        let page: RawPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].uid.as_deref(), Some("hello"));
        assert_eq!(page.results[0].doc_type, "post");
        assert!(page.results[0].first_published().is_some());
        assert!(page.results[0].last_published().is_none());
        assert!(page.next_page.is_some());
    }
}

//! In-memory content source
//!
//! Serves a fixed document set with the same predicate, ordering and paging
//! semantics as the HTTP API. Backs the CLI's offline `--fixture` mode and
//! doubles as the source in tests, where the request log shows exactly which
//! calls were made.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use std::cmp::Ordering as CmpOrdering;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Mutex;

use super::{
    ContentSource, Predicate, Query, RawDocument, RawPage, SortDirection, DOCUMENT_TYPE,
    FIRST_PUBLICATION_DATE, LAST_PUBLICATION_DATE,
};
use crate::error::{BlogError, Result};

const CURSOR_PREFIX: &str = "memory://search?";

/// A request received by a [`MemorySource`]
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRequest {
    Query(Query),
    FetchPage(String),
}

/// Fixture files hold either a bare document array or a page object
#[derive(Deserialize)]
#[serde(untagged)]
enum Fixture {
    Documents(Vec<RawDocument>),
    Page(RawPage),
}

/// Content source over a fixed set of documents
pub struct MemorySource {
    documents: Vec<RawDocument>,
    requests: Mutex<Vec<SourceRequest>>,
    failing: AtomicBool,
}

impl MemorySource {
    pub fn new(documents: Vec<RawDocument>) -> Self {
        Self {
            documents,
            requests: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Load documents from a JSON fixture file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let documents = match serde_json::from_str::<Fixture>(&content)? {
            Fixture::Documents(docs) => docs,
            Fixture::Page(page) => page.results,
        };
        tracing::info!(
            "Loaded {} documents from {:?}",
            documents.len(),
            path.as_ref()
        );
        Ok(Self::new(documents))
    }

    /// Make every subsequent request fail with `FetchFailed`
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<SourceRequest> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|log| log.len()).unwrap_or(0)
    }

    fn record(&self, request: SourceRequest) -> Result<()> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request);
        }
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(BlogError::FetchFailed("content source unavailable".to_string()));
        }
        Ok(())
    }

    fn run(&self, query: &Query) -> RawPage {
        let mut matches: Vec<&RawDocument> = self
            .documents
            .iter()
            .filter(|doc| query.predicates.iter().all(|p| matches_predicate(doc, p)))
            .collect();

        // Stable sort: ties keep insertion order
        matches.sort_by(|a, b| {
            query
                .orderings
                .iter()
                .map(|o| {
                    let ord = compare_field(a, b, &o.field);
                    match o.direction {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    }
                })
                .find(|ord| *ord != CmpOrdering::Equal)
                .unwrap_or(CmpOrdering::Equal)
        });

        let page_size = query.page_size.max(1);
        let total_pages = matches.len().div_ceil(page_size);
        let start = query
            .page
            .saturating_sub(1)
            .saturating_mul(page_size)
            .min(matches.len());
        let end = start.saturating_add(page_size).min(matches.len());

        let next_page = if query.page < total_pages {
            Some(encode_cursor(&query.clone().page(query.page + 1)))
        } else {
            None
        };

        RawPage {
            page: query.page,
            total_pages,
            results: matches[start..end].iter().map(|d| (*d).clone()).collect(),
            next_page,
        }
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn query(&self, query: &Query) -> Result<RawPage> {
        self.record(SourceRequest::Query(query.clone()))?;
        Ok(self.run(query))
    }

    async fn fetch_page(&self, cursor: &str) -> Result<RawPage> {
        self.record(SourceRequest::FetchPage(cursor.to_string()))?;
        let query = decode_cursor(cursor)?;
        Ok(self.run(&query))
    }
}

fn encode_cursor(query: &Query) -> String {
    // Query only holds strings, numbers and timestamps
    let json = serde_json::to_string(query).unwrap_or_default();
    format!(
        "{}query={}",
        CURSOR_PREFIX,
        utf8_percent_encode(&json, NON_ALPHANUMERIC)
    )
}

fn decode_cursor(cursor: &str) -> Result<Query> {
    let foreign = || BlogError::ForeignCursor(cursor.to_string());
    let encoded = cursor
        .strip_prefix(CURSOR_PREFIX)
        .and_then(|rest| rest.strip_prefix("query="))
        .ok_or_else(foreign)?;
    let json = percent_decode_str(encoded)
        .decode_utf8()
        .map_err(|_| foreign())?;
    let query: Query = serde_json::from_str(&json).map_err(|_| foreign())?;
    if query.page == 0 || query.page_size == 0 {
        return Err(foreign());
    }
    Ok(query)
}

fn timestamp_field(doc: &RawDocument, path: &str) -> Option<DateTime<Utc>> {
    match path {
        FIRST_PUBLICATION_DATE => doc.first_published(),
        LAST_PUBLICATION_DATE => doc.last_published(),
        _ => None,
    }
}

/// Resolve a string-valued field path against a document
fn string_field(doc: &RawDocument, path: &str) -> Option<String> {
    match path {
        DOCUMENT_TYPE => return Some(doc.doc_type.clone()),
        "document.id" => return Some(doc.id.clone()),
        _ => {}
    }

    // my.<type>.<field>
    let rest = path.strip_prefix("my.")?;
    let (doc_type, field) = rest.split_once('.')?;
    if doc_type != doc.doc_type {
        return None;
    }
    if field == "uid" {
        return doc.uid.clone();
    }
    doc.data.get(field)?.as_str().map(str::to_string)
}

fn matches_predicate(doc: &RawDocument, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::At { path, value } => string_field(doc, path).as_deref() == Some(value.as_str()),
        Predicate::DateAfter { path, date } => {
            timestamp_field(doc, path).is_some_and(|ts| ts > *date)
        }
        Predicate::DateBefore { path, date } => {
            timestamp_field(doc, path).is_some_and(|ts| ts < *date)
        }
    }
}

fn compare_field(a: &RawDocument, b: &RawDocument, field: &str) -> CmpOrdering {
    match field {
        FIRST_PUBLICATION_DATE | LAST_PUBLICATION_DATE => {
            timestamp_field(a, field).cmp(&timestamp_field(b, field))
        }
        _ => string_field(a, field).cmp(&string_field(b, field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn doc(uid: &str, date: &str) -> RawDocument {
        RawDocument {
            id: format!("id-{}", uid),
            uid: Some(uid.to_string()),
            doc_type: "post".to_string(),
            href: None,
            first_publication_date: Some(date.to_string()),
            last_publication_date: Some(date.to_string()),
            data: json!({"title": uid, "author": "Ana"}),
        }
    }

    fn source() -> MemorySource {
        MemorySource::new(vec![
            doc("c", "2021-03-01T00:00:00+0000"),
            doc("a", "2021-01-01T00:00:00+0000"),
            doc("b", "2021-02-01T00:00:00+0000"),
        ])
    }

    fn uids(page: &RawPage) -> Vec<String> {
        page.results
            .iter()
            .filter_map(|d| d.uid.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_query_orders_and_pages() {
        let source = source();
        let query = Query::new(vec![Predicate::at(DOCUMENT_TYPE, "post")])
            .page_size(2)
            .order_by(FIRST_PUBLICATION_DATE, SortDirection::Asc);

        let first = source.query(&query).await.unwrap();
        assert_eq!(uids(&first), vec!["a", "b"]);
        assert_eq!(first.total_pages, 2);
        let cursor = first.next_page.clone().unwrap();
        assert!(cursor.starts_with("memory://search?"));

        let second = source.fetch_page(&cursor).await.unwrap();
        assert_eq!(uids(&second), vec!["c"]);
        assert_eq!(second.next_page, None);
        assert_eq!(source.request_count(), 2);
    }

    #[tokio::test]
    async fn test_date_predicates() {
        let source = source();
        let anchor = Utc.with_ymd_and_hms(2021, 2, 1, 0, 0, 0).unwrap();

        let later = Query::new(vec![Predicate::date_after(FIRST_PUBLICATION_DATE, anchor)]);
        assert_eq!(uids(&source.query(&later).await.unwrap()), vec!["c"]);

        let earlier = Query::new(vec![Predicate::date_before(FIRST_PUBLICATION_DATE, anchor)]);
        assert_eq!(uids(&source.query(&earlier).await.unwrap()), vec!["a"]);
    }

    #[tokio::test]
    async fn test_get_by_uid() {
        let source = source();
        let found = source.get_by_uid("post", "b", None).await.unwrap();
        assert_eq!(found.and_then(|d| d.uid), Some("b".to_string()));

        let missing = source.get_by_uid("post", "zzz", None).await.unwrap();
        assert!(missing.is_none());

        let wrong_type = source.get_by_uid("page", "b", None).await.unwrap();
        assert!(wrong_type.is_none());
    }

    #[tokio::test]
    async fn test_failing_source() {
        let source = source();
        source.set_failing(true);
        let err = source.query(&Query::new(vec![])).await.unwrap_err();
        assert!(matches!(err, BlogError::FetchFailed(_)));
        assert_eq!(source.request_count(), 1);
    }

    #[tokio::test]
    async fn test_bad_cursor() {
        let err = source().fetch_page("memory://search?query=%7Bnope").await.unwrap_err();
        assert!(matches!(err, BlogError::ForeignCursor(_)));
    }

    fn raw_cursor(json: &str) -> String {
        format!(
            "{}query={}",
            CURSOR_PREFIX,
            utf8_percent_encode(json, NON_ALPHANUMERIC)
        )
    }

    #[tokio::test]
    async fn test_oversized_page_size_cursor() {
        let source = MemorySource::new(vec![doc("a", "2021-01-01T00:00:00+0000")]);
        let cursor = raw_cursor(
            r#"{"predicates":[],"page_size":18446744073709551615,"page":2,"orderings":[]}"#,
        );
        let page = source.fetch_page(&cursor).await.unwrap();
        assert!(page.results.is_empty());
        assert_eq!(page.next_page, None);
    }

    #[tokio::test]
    async fn test_zero_page_cursor_rejected() {
        let source = source();
        for json in [
            r#"{"predicates":[],"page_size":2,"page":0}"#,
            r#"{"predicates":[],"page_size":0,"page":2}"#,
        ] {
            let err = source.fetch_page(&raw_cursor(json)).await.unwrap_err();
            assert!(matches!(err, BlogError::ForeignCursor(_)));
        }
    }

    #[test]
    fn test_from_file_accepts_page_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        let page = json!({
            "results": [{"uid": "x", "type": "post", "data": {}}],
            "next_page": null
        });
        fs::write(&path, page.to_string()).unwrap();

        let source = MemorySource::from_file(&path).unwrap();
        assert_eq!(source.documents.len(), 1);
    }
}

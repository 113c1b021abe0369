//! Previous/next post navigation by first publication date

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cms::{
    ContentSource, Predicate, Query, SortDirection, DOCUMENT_TYPE, FIRST_PUBLICATION_DATE,
};
use crate::content::Post;
use crate::error::Result;

/// The posts published immediately before and after a given post
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdjacentPosts {
    pub previous: Option<Post>,
    pub next: Option<Post>,
}

/// Finds neighbouring posts with single-document queries
///
/// When several posts share a timestamp, which one wins is up to the
/// content source's secondary ordering.
pub struct AdjacentPostResolver<'a> {
    source: &'a dyn ContentSource,
    document_type: &'a str,
    version_ref: Option<&'a str>,
}

impl<'a> AdjacentPostResolver<'a> {
    pub fn new(source: &'a dyn ContentSource, document_type: &'a str) -> Self {
        Self {
            source,
            document_type,
            version_ref: None,
        }
    }

    /// Resolve against a preview content version
    pub fn with_ref(mut self, version_ref: Option<&'a str>) -> Self {
        self.version_ref = version_ref;
        self
    }

    /// Earliest post published strictly after `anchor`
    pub async fn find_next(&self, anchor: DateTime<Utc>) -> Result<Option<Post>> {
        self.find_one(
            Predicate::date_after(FIRST_PUBLICATION_DATE, anchor),
            SortDirection::Asc,
        )
        .await
    }

    /// Latest post published strictly before `anchor`
    pub async fn find_previous(&self, anchor: DateTime<Utc>) -> Result<Option<Post>> {
        self.find_one(
            Predicate::date_before(FIRST_PUBLICATION_DATE, anchor),
            SortDirection::Desc,
        )
        .await
    }

    /// Both neighbours; a failed lookup is logged and treated as absent
    pub async fn resolve(&self, anchor: DateTime<Utc>) -> AdjacentPosts {
        let (previous, next) = tokio::join!(self.find_previous(anchor), self.find_next(anchor));

        let previous = previous.unwrap_or_else(|e| {
            tracing::warn!("Failed to resolve previous post for {}: {}", anchor, e);
            None
        });
        let next = next.unwrap_or_else(|e| {
            tracing::warn!("Failed to resolve next post for {}: {}", anchor, e);
            None
        });

        AdjacentPosts { previous, next }
    }

    async fn find_one(&self, bound: Predicate, direction: SortDirection) -> Result<Option<Post>> {
        let query = Query::new(vec![Predicate::at(DOCUMENT_TYPE, self.document_type), bound])
            .page_size(1)
            .order_by(FIRST_PUBLICATION_DATE, direction)
            .with_ref(self.version_ref.map(str::to_string));

        let page = self.source.query(&query).await?;
        page.results.first().map(Post::from_document).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::{MemorySource, RawDocument, SourceRequest};
    use crate::error::BlogError;
    use chrono::TimeZone;
    use serde_json::json;

    fn doc(uid: &str, date: &str) -> RawDocument {
        RawDocument {
            id: uid.to_uppercase(),
            uid: Some(uid.to_string()),
            doc_type: "post".to_string(),
            href: None,
            first_publication_date: Some(format!("{}T00:00:00+0000", date)),
            last_publication_date: None,
            data: json!({"title": uid, "author": "Ana"}),
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_neighbours_around_gap() {
        let source = MemorySource::new(vec![doc("march", "2021-03-10"), doc("jan", "2021-01-10")]);
        let resolver = AdjacentPostResolver::new(&source, "post");

        let next = resolver.find_next(at(2021, 2, 1)).await.unwrap();
        assert_eq!(next.map(|p| p.uid), Some("march".to_string()));

        let previous = resolver.find_previous(at(2021, 2, 1)).await.unwrap();
        assert_eq!(previous.map(|p| p.uid), Some("jan".to_string()));
    }

    #[tokio::test]
    async fn test_picks_nearest() {
        let source = MemorySource::new(vec![
            doc("d", "2021-04-01"),
            doc("a", "2021-01-01"),
            doc("c", "2021-03-01"),
            doc("b", "2021-02-01"),
        ]);
        let resolver = AdjacentPostResolver::new(&source, "post");
        let adjacent = resolver.resolve(at(2021, 2, 1)).await;
        assert_eq!(adjacent.previous.map(|p| p.uid), Some("a".to_string()));
        assert_eq!(adjacent.next.map(|p| p.uid), Some("c".to_string()));
    }

    #[tokio::test]
    async fn test_edges_are_absent() {
        let source = MemorySource::new(vec![doc("a", "2021-01-01"), doc("b", "2021-02-01")]);
        let resolver = AdjacentPostResolver::new(&source, "post");

        assert!(resolver.find_previous(at(2021, 1, 1)).await.unwrap().is_none());
        assert!(resolver.find_next(at(2021, 2, 1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ignores_other_types() {
        let mut page = doc("about", "2021-01-15");
        page.doc_type = "page".to_string();
        let source = MemorySource::new(vec![doc("a", "2021-01-01"), page]);
        let resolver = AdjacentPostResolver::new(&source, "post");
        assert!(resolver.find_next(at(2021, 1, 1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_shape_and_ref() {
        let source = MemorySource::new(vec![]);
        let resolver = AdjacentPostResolver::new(&source, "post").with_ref(Some("preview-ref"));
        resolver.find_next(at(2021, 1, 1)).await.unwrap();

        match &source.requests()[0] {
            SourceRequest::Query(query) => {
                assert_eq!(query.page_size, 1);
                assert_eq!(query.orderings[0].direction, SortDirection::Asc);
                assert_eq!(query.version_ref.as_deref(), Some("preview-ref"));
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failures_degrade_to_absent() {
        let source = MemorySource::new(vec![doc("a", "2021-01-01"), doc("c", "2021-03-01")]);
        source.set_failing(true);
        let resolver = AdjacentPostResolver::new(&source, "post");

        assert!(matches!(
            resolver.find_next(at(2021, 2, 1)).await,
            Err(BlogError::FetchFailed(_))
        ));
        assert_eq!(resolver.resolve(at(2021, 2, 1)).await, AdjacentPosts::default());
    }
}

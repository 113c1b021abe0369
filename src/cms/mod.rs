//! Content source abstraction
//!
//! The blog never talks to the CMS directly; every operation takes a
//! [`ContentSource`] handle so the HTTP client can be swapped for the
//! in-memory source in offline mode and in tests.

mod document;
mod http;
mod memory;
mod query;

pub use document::{parse_timestamp, RawDocument, RawPage};
pub use http::HttpSource;
pub use memory::{MemorySource, SourceRequest};
pub use query::{
    uid_path, Ordering, Predicate, Query, SortDirection, DOCUMENT_TYPE, FIRST_PUBLICATION_DATE,
    LAST_PUBLICATION_DATE,
};

use async_trait::async_trait;

use crate::error::Result;

/// A headless document store that can be searched and paged
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &str;

    /// Run a search query and return its first requested page
    async fn query(&self, query: &Query) -> Result<RawPage>;

    /// Follow an opaque `next_page` cursor returned by an earlier page
    async fn fetch_page(&self, cursor: &str) -> Result<RawPage>;

    /// Look up a single document of `document_type` by uid
    async fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
        version_ref: Option<&str>,
    ) -> Result<Option<RawDocument>> {
        let query = Query::new(vec![Predicate::at(uid_path(document_type), uid)])
            .page_size(1)
            .with_ref(version_ref.map(str::to_string));
        let page = self.query(&query).await?;
        Ok(page.results.into_iter().next())
    }
}

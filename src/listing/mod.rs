//! Listing pagination
//!
//! A listing starts from a seed page and grows by following the content
//! source's `next_page` cursor. Pages are appended in the order they arrive
//! and are never de-duplicated: if the underlying data shifts between
//! fetches, a post may show up twice.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::cms::{ContentSource, RawPage};
use crate::content::Post;
use crate::error::{BlogError, Result};

/// One page of projected posts, the shape of the "load more" response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPage {
    pub results: Vec<Post>,
    /// Absent iff there are no further pages
    pub next_page: Option<String>,
}

impl PostPage {
    /// Project every document of a raw page; any malformed document fails the page
    pub fn from_raw(raw: RawPage) -> Result<Self> {
        let results = raw
            .results
            .iter()
            .map(Post::from_document)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            results,
            next_page: raw.next_page.filter(|c| !c.is_empty()),
        })
    }
}

/// Accumulated listing results plus the cursor of the next page
#[derive(Debug, Clone, PartialEq)]
pub struct ListingState {
    results: Vec<Post>,
    next_cursor: Option<String>,
}

impl ListingState {
    /// Start a listing from the page rendered at load time
    pub fn initialize(seed: PostPage) -> Self {
        Self {
            results: seed.results,
            next_cursor: seed.next_page,
        }
    }

    pub fn results(&self) -> &[Post] {
        &self.results
    }

    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Fetch the next page and return the extended state
    ///
    /// Makes exactly one request when a cursor is present and none otherwise.
    /// On failure `self` is untouched; there is no retry.
    pub async fn load_next(&self, source: &dyn ContentSource) -> Result<ListingState> {
        let cursor = self.next_cursor.as_deref().ok_or(BlogError::NoMorePages)?;

        let page = PostPage::from_raw(source.fetch_page(cursor).await?)?;
        tracing::debug!(
            "Loaded {} more posts (has next: {})",
            page.results.len(),
            page.next_page.is_some()
        );

        let mut results = Vec::with_capacity(self.results.len() + page.results.len());
        results.extend_from_slice(&self.results);
        results.extend(page.results);

        Ok(ListingState {
            results,
            next_cursor: page.next_page,
        })
    }
}

/// A listing owned by one page session
///
/// Loads are serialized: a trigger that arrives while another load is in
/// flight waits for it and then continues from the updated cursor.
pub struct ListingSession {
    source: Arc<dyn ContentSource>,
    state: Mutex<ListingState>,
}

impl ListingSession {
    pub fn new(source: Arc<dyn ContentSource>, seed: PostPage) -> Self {
        Self {
            source,
            state: Mutex::new(ListingState::initialize(seed)),
        }
    }

    /// Current state
    pub async fn snapshot(&self) -> ListingState {
        self.state.lock().await.clone()
    }

    /// Load one more page, returning the number of posts appended
    pub async fn load_next(&self) -> Result<usize> {
        let mut state = self.state.lock().await;
        let next = state.load_next(self.source.as_ref()).await?;
        let appended = next.len() - state.len();
        *state = next;
        Ok(appended)
    }

    /// Keep loading until the cursor is exhausted
    pub async fn load_all(&self) -> Result<ListingState> {
        let mut state = self.state.lock().await;
        while state.has_more() {
            *state = state.load_next(self.source.as_ref()).await?;
        }
        Ok(state.clone())
    }
}

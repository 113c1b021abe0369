//! View models handed to the rendering layer
//!
//! Plain serializable data: everything a page needs, already fetched,
//! projected and formatted.

use serde::Serialize;

use crate::content::Post;
use crate::listing::PostPage;
use crate::navigation::AdjacentPosts;

/// Link to a neighbouring post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavPost {
    pub uid: String,
    pub title: String,
    pub path: String,
}

impl From<&Post> for NavPost {
    fn from(post: &Post) -> Self {
        Self {
            uid: post.uid.clone(),
            title: post.title.clone(),
            path: post.path(),
        }
    }
}

/// Preview banner data shared by every page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewData {
    pub active: bool,
    /// Where the "exit preview" link points, only while previewing
    pub exit_url: Option<String>,
    pub toolbar: Option<String>,
}

/// The listing page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeView {
    pub title: String,
    pub posts: PostPage,
    pub preview: PreviewData,
}

/// A single post page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    pub post: Post,
    /// Localized first publication date
    pub published: Option<String>,
    /// Localized last publication date with time of day
    pub updated: Option<String>,
    pub reading_minutes: u32,
    pub previous: Option<NavPost>,
    pub next: Option<NavPost>,
    pub comments: Option<String>,
    pub preview: PreviewData,
}

impl PostView {
    pub(crate) fn set_adjacent(&mut self, adjacent: &AdjacentPosts) {
        self.previous = adjacent.previous.as_ref().map(NavPost::from);
        self.next = adjacent.next.as_ref().map(NavPost::from);
    }
}

/// Uids of the posts to pre-render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathsView {
    pub paths: Vec<String>,
}

//! headless-blog: a blog front-end backed by a headless CMS
//!
//! This crate fetches posts from a Prismic-style content API, pages through
//! the post listing with the API's cursors, resolves previous/next posts by
//! publication date, and serves the resulting view models as JSON.

pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;
pub mod listing;
pub mod navigation;
pub mod preview;
pub mod server;
pub mod views;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cms::{ContentSource, Predicate, Query, DOCUMENT_TYPE, FIRST_PUBLICATION_DATE};
use content::estimate_reading_minutes_at;
use error::BlogError;
use helpers::Helpers;
use listing::{ListingSession, PostPage};
use navigation::AdjacentPostResolver;
use preview::PreviewContext;
use views::{HomeView, PathsView, PostView, PreviewData};

/// Fields requested for listing pages
const LISTING_FIELDS: [&str; 5] = ["title", "subtitle", "author", "banner", "content"];

/// The main blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    source: Arc<dyn ContentSource>,
    helpers: Helpers,
}

impl Blog {
    /// Create a blog backed by the configured content API
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config = Self::load_config(&base_dir)?;
        let source = cms::HttpSource::from_config(&config)?;
        tracing::debug!("Using content API at {}", source.name());

        Ok(Self::with_source(config, base_dir, Arc::new(source)))
    }

    /// Create a blog serving documents from a JSON fixture instead of the API
    pub fn offline<P: AsRef<Path>, F: AsRef<Path>>(base_dir: P, fixture: F) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config = Self::load_config(&base_dir)?;
        let source = cms::MemorySource::from_file(fixture)?;

        Ok(Self::with_source(config, base_dir, Arc::new(source)))
    }

    /// Load `_config.yml` from a directory, with environment overrides
    pub fn load_config(base_dir: &Path) -> Result<config::SiteConfig> {
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(config)
    }

    /// Create a blog over an explicit content source
    pub fn with_source(
        config: config::SiteConfig,
        base_dir: PathBuf,
        source: Arc<dyn ContentSource>,
    ) -> Self {
        let helpers = Helpers::new(config.clone());
        Self {
            config,
            base_dir,
            source,
            helpers,
        }
    }

    /// First-page query for the post listing
    pub fn listing_query(&self, preview: &PreviewContext) -> Query {
        let doc_type = &self.config.document_type;
        Query::new(vec![Predicate::at(DOCUMENT_TYPE, doc_type.as_str())])
            .fetch(LISTING_FIELDS.iter().map(|f| format!("{}.{}", doc_type, f)))
            .page_size(self.config.per_page)
            .order_by(FIRST_PUBLICATION_DATE, self.config.order)
            .with_ref(preview.version_ref().map(str::to_string))
    }

    /// Build the listing page
    pub async fn home(&self, preview: &PreviewContext) -> error::Result<HomeView> {
        let raw = self.source.query(&self.listing_query(preview)).await?;
        let posts = PostPage::from_raw(raw)?;
        tracing::info!(
            "Listing seeded with {} posts (more: {})",
            posts.results.len(),
            posts.next_page.is_some()
        );

        Ok(HomeView {
            title: self.config.title.clone(),
            posts,
            preview: self.preview_data(preview),
        })
    }

    /// Follow a listing cursor: the "load more" contract
    pub async fn load_more(&self, cursor: &str) -> error::Result<PostPage> {
        PostPage::from_raw(self.source.fetch_page(cursor).await?)
    }

    /// Start a listing session from a seed page
    pub fn listing(&self, seed: PostPage) -> ListingSession {
        ListingSession::new(self.source.clone(), seed)
    }

    /// Build a single post page
    pub async fn post(&self, uid: &str, preview: &PreviewContext) -> error::Result<PostView> {
        let doc_type = &self.config.document_type;
        let doc = self
            .source
            .get_by_uid(doc_type, uid, preview.version_ref())
            .await?
            .ok_or_else(|| BlogError::NotFound(uid.to_string()))?;
        let post = content::Post::from_document(&doc)?;

        let mut view = PostView {
            published: post.first_publication_date.map(|d| self.helpers.date(&d)),
            updated: post.last_publication_date.map(|d| self.helpers.datetime(&d)),
            reading_minutes: estimate_reading_minutes_at(&post, self.config.words_per_minute),
            previous: None,
            next: None,
            comments: self.helpers.comments(),
            preview: self.preview_data(preview),
            post,
        };

        if let Some(anchor) = view.post.first_publication_date {
            let adjacent = AdjacentPostResolver::new(self.source.as_ref(), doc_type)
                .with_ref(preview.version_ref())
                .resolve(anchor)
                .await;
            view.set_adjacent(&adjacent);
        }

        Ok(view)
    }

    /// Uids of the posts to pre-render at build time
    pub async fn static_paths(&self) -> error::Result<PathsView> {
        let query = Query::new(vec![Predicate::at(
            DOCUMENT_TYPE,
            self.config.document_type.as_str(),
        )])
        .page_size(self.config.paths_per_page);

        let page = self.source.query(&query).await?;
        let paths = page
            .results
            .into_iter()
            .filter_map(|doc| {
                if doc.uid.is_none() {
                    tracing::warn!("Skipping document {} without uid", doc.id);
                }
                doc.uid
            })
            .collect();

        Ok(PathsView { paths })
    }

    fn preview_data(&self, preview: &PreviewContext) -> PreviewData {
        PreviewData {
            active: preview.is_active(),
            exit_url: preview
                .is_active()
                .then(|| self.config.preview.exit_url.clone()),
            toolbar: self.helpers.preview_toolbar(),
        }
    }
}

//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::cms::SortDirection;

/// Environment variable overriding `api_endpoint`
pub const ENV_API_ENDPOINT: &str = "CMS_API_ENDPOINT";
/// Environment variable overriding `access_token`
pub const ENV_ACCESS_TOKEN: &str = "CMS_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,

    // Content source
    pub api_endpoint: String,
    pub access_token: Option<String>,
    pub request_timeout_secs: u64,
    pub document_type: String,

    // Listing
    pub per_page: usize,
    pub order: SortDirection,
    pub paths_per_page: usize,

    // Reading time
    pub words_per_minute: usize,

    // Date / Time format
    pub date_format: String,
    pub datetime_format: String,
    pub locale: String,

    // Preview
    #[serde(default)]
    pub preview: PreviewConfig,

    // Widgets
    #[serde(default)]
    pub comments: CommentsConfig,
    #[serde(default)]
    pub preview_toolbar: PreviewToolbarConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Bloggprosjekt".to_string(),

            api_endpoint: "https://bloggprosjekt.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            request_timeout_secs: 30,
            document_type: "post".to_string(),

            per_page: 2,
            order: SortDirection::Asc,
            paths_per_page: 20,

            words_per_minute: 200,

            date_format: "%d %b %Y".to_string(),
            datetime_format: "%d %b %Y às %-H:%-M".to_string(),
            locale: "pt_BR".to_string(),

            preview: PreviewConfig::default(),
            comments: CommentsConfig::default(),
            preview_toolbar: PreviewToolbarConfig::default(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `CMS_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_API_ENDPOINT).filter(|v| !v.is_empty()) {
            tracing::debug!("Using API endpoint from {}", ENV_API_ENDPOINT);
            self.api_endpoint = endpoint;
        }
        if let Some(token) = lookup(ENV_ACCESS_TOKEN).filter(|v| !v.is_empty()) {
            tracing::debug!("Using access token from {}", ENV_ACCESS_TOKEN);
            self.access_token = Some(token);
        }
    }
}

/// Preview mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Cookie carrying the preview ref
    pub cookie_name: String,
    /// External endpoint that leaves preview mode
    pub exit_url: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            cookie_name: "io.prismic.preview".to_string(),
            exit_url: "/api/exit-preview".to_string(),
        }
    }
}

/// Utterances comment widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    pub script: String,
    /// GitHub repository holding the comment issues; empty disables the widget
    pub repo: String,
    pub issue_term: String,
    pub theme: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            script: "https://utteranc.es/client.js".to_string(),
            repo: String::new(),
            issue_term: "pathname".to_string(),
            theme: "github-dark".to_string(),
        }
    }
}

/// CMS preview toolbar configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewToolbarConfig {
    pub enable: bool,
    pub script: String,
    pub repo: String,
}

impl Default for PreviewToolbarConfig {
    fn default() -> Self {
        Self {
            enable: true,
            script: "https://static.cdn.prismic.io/prismic.js".to_string(),
            repo: "bloggprosjekt".to_string(),
        }
    }
}

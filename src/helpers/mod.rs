//! Helper functions for view models
//!
//! Date formatting in the configured locale and script embeds for the
//! third-party widgets.

mod date;
mod html;

use chrono::{DateTime, Locale, Utc};

pub use date::*;
pub use html::*;

use crate::config::SiteConfig;

/// Collection of helpers bound to a site configuration
#[derive(Clone)]
pub struct Helpers {
    config: SiteConfig,
    locale: Locale,
}

impl Helpers {
    /// Create a new helpers instance
    ///
    /// Unusable date formats are replaced by the defaults.
    pub fn new(mut config: SiteConfig) -> Self {
        let defaults = SiteConfig::default();
        if !is_valid_format(&config.date_format) {
            tracing::warn!(
                "Invalid date_format {:?}, using {:?}",
                config.date_format,
                defaults.date_format
            );
            config.date_format = defaults.date_format;
        }
        if !is_valid_format(&config.datetime_format) {
            tracing::warn!(
                "Invalid datetime_format {:?}, using {:?}",
                config.datetime_format,
                defaults.datetime_format
            );
            config.datetime_format = defaults.datetime_format;
        }

        let locale = parse_locale(&config.locale);
        Self { config, locale }
    }

    /// Format a publication date
    pub fn date(&self, date: &DateTime<Utc>) -> String {
        format_date(date, &self.config.date_format, self.locale)
    }

    /// Format a publication date with time of day
    pub fn datetime(&self, date: &DateTime<Utc>) -> String {
        format_date(date, &self.config.datetime_format, self.locale)
    }

    /// Comment widget embed
    pub fn comments(&self) -> Option<String> {
        comments_script(&self.config.comments)
    }

    /// Preview toolbar embed
    pub fn preview_toolbar(&self) -> Option<String> {
        preview_toolbar_script(&self.config.preview_toolbar)
    }
}

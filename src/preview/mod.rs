//! Preview mode
//!
//! A request is in preview mode when it carries a content-version ref,
//! either as a `ref` query parameter or in the CMS preview cookie. Every
//! query made for that request passes the ref so drafts resolve.

use percent_encoding::percent_decode_str;

/// Request-scoped preview flag and content version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewContext {
    version_ref: Option<String>,
}

impl PreviewContext {
    /// Published content only
    pub fn published() -> Self {
        Self::default()
    }

    /// Preview mode is active iff a non-empty ref is given
    pub fn from_ref(version_ref: Option<String>) -> Self {
        Self {
            version_ref: version_ref
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
        }
    }

    /// Build from an explicit ref, falling back to the preview cookie
    pub fn from_request(
        query_ref: Option<String>,
        cookie_header: Option<&str>,
        cookie_name: &str,
    ) -> Self {
        let explicit = Self::from_ref(query_ref);
        if explicit.is_active() {
            return explicit;
        }
        Self::from_ref(cookie_header.and_then(|h| cookie_value(h, cookie_name)))
    }

    pub fn is_active(&self) -> bool {
        self.version_ref.is_some()
    }

    pub fn version_ref(&self) -> Option<&str> {
        self.version_ref.as_deref()
    }
}

/// Extract and percent-decode one cookie from a `Cookie` header
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| {
            let value = value.trim_matches('"');
            percent_decode_str(value)
                .decode_utf8()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
}

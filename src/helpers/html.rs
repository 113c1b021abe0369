//! HTML helper functions for third-party widget embeds

use crate::config::{CommentsConfig, PreviewToolbarConfig};

/// Generate the utterances comment widget script tag
///
/// Returns `None` when no comment repository is configured.
///
/// # Examples
/// ```ignore
/// comments_script(&config.comments)
/// // -> <script src="https://utteranc.es/client.js" repo="owner/blog" ...></script>
/// ```
pub fn comments_script(config: &CommentsConfig) -> Option<String> {
    if config.repo.is_empty() {
        return None;
    }

    Some(format!(
        r#"<script src="{}" repo="{}" issue-term="{}" theme="{}" crossorigin="anonymous" async></script>"#,
        html_escape(&config.script),
        html_escape(&config.repo),
        html_escape(&config.issue_term),
        html_escape(&config.theme)
    ))
}

/// Generate the CMS preview toolbar script tag
pub fn preview_toolbar_script(config: &PreviewToolbarConfig) -> Option<String> {
    if !config.enable || config.repo.is_empty() {
        return None;
    }

    let src = format!("{}?new=true&repo={}", config.script, config.repo);
    Some(format!(
        r#"<script async defer src="{}"></script>"#,
        html_escape(&src)
    ))
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

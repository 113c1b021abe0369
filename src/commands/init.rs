//! Initialize a new blog directory

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# Blog Configuration

# Site
title: Bloggprosjekt

# Content source
api_endpoint: https://bloggprosjekt.cdn.prismic.io/api/v2
# access_token: set here or via CMS_ACCESS_TOKEN
request_timeout_secs: 30
document_type: post

# Listing
per_page: 2
order: asc
paths_per_page: 20

# Reading time
words_per_minute: 200

# Date / Time format (chrono syntax)
date_format: '%d %b %Y'
datetime_format: '%d %b %Y às %-H:%-M'
locale: pt_BR

# Preview
preview:
  cookie_name: io.prismic.preview
  exit_url: /api/exit-preview

# Widgets
comments:
  script: https://utteranc.es/client.js
  repo: ''
  issue_term: pathname
  theme: github-dark
preview_toolbar:
  enable: true
  script: https://static.cdn.prismic.io/prismic.js
  repo: bloggprosjekt
"#;

/// Initialize a blog directory with a default config and a sample fixture
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("File already exists: {:?}", config_path);
    }
    fs::write(&config_path, CONFIG_TEMPLATE)?;

    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S+0000").to_string();
    let fixture = serde_json::json!([{
        "id": "hello-world",
        "uid": "hello-world",
        "type": "post",
        "first_publication_date": now,
        "last_publication_date": now,
        "data": {
            "title": "Hello World",
            "subtitle": "Your first post",
            "author": "John Doe",
            "banner": {},
            "content": [{
                "heading": "Quick Start",
                "body": [{
                    "type": "paragraph",
                    "text": "Run `headless-blog --fixture posts.json serve` to browse this post offline.",
                    "spans": []
                }]
            }]
        }
    }]);
    fs::write(
        target_dir.join("posts.json"),
        serde_json::to_string_pretty(&fixture)?,
    )?;

    Ok(())
}

//! Show a single post

use anyhow::Result;

use crate::preview::PreviewContext;
use crate::Blog;

/// Print a post summary with its neighbours
pub async fn run(blog: &Blog, uid: &str, preview: &PreviewContext, json: bool) -> Result<()> {
    let view = blog.post(uid, preview).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{}", view.post.title);
    if !view.post.subtitle.is_empty() {
        println!("{}", view.post.subtitle);
    }
    println!(
        "{} | {} | {} min",
        view.published.as_deref().unwrap_or("-"),
        view.post.author,
        view.reading_minutes
    );
    if let Some(updated) = &view.updated {
        println!("* edited {}", updated);
    }
    for section in &view.post.content {
        println!("\n## {}", section.heading);
        for block in &section.body {
            println!("{}", block.text);
        }
    }
    println!();
    if let Some(previous) = &view.previous {
        println!("<- {} ({})", previous.title, previous.path);
    }
    if let Some(next) = &view.next {
        println!("-> {} ({})", next.title, next.path);
    }

    Ok(())
}

//! List posts, following the listing cursor to the end

use anyhow::Result;

use crate::preview::PreviewContext;
use crate::Blog;

/// Print every post of the listing, page by page
pub async fn run(blog: &Blog, preview: &PreviewContext, pages: Option<usize>) -> Result<()> {
    let home = blog.home(preview).await?;
    let session = blog.listing(home.posts);

    let state = match pages {
        None => session.load_all().await?,
        Some(limit) => {
            for _ in 1..limit.max(1) {
                if !session.snapshot().await.has_more() {
                    break;
                }
                session.load_next().await?;
            }
            session.snapshot().await
        }
    };

    if state.is_empty() {
        println!("No posts found.");
        return Ok(());
    }

    println!("Posts ({}):", state.len());
    for post in state.results() {
        let date = post
            .first_publication_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "draft".to_string());
        println!("  {} - {} by {} [{}]", date, post.title, post.author, post.uid);
    }
    if state.has_more() {
        println!("  ... more posts available");
    }

    Ok(())
}

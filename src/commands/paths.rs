//! List the post paths to pre-render

use anyhow::Result;

use crate::Blog;

pub async fn run(blog: &Blog) -> Result<()> {
    let view = blog.static_paths().await?;
    for uid in view.paths {
        println!("/post/{}", uid);
    }
    Ok(())
}

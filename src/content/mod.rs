//! Content module - post model, projection and reading time

mod post;
pub mod reading;

pub use post::{Post, RichTextBlock, Section};
pub use reading::{count_words, estimate_reading_minutes, estimate_reading_minutes_at};

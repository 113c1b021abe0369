//! Reading-time estimation

use super::Post;

/// Assumed reading speed
pub const DEFAULT_WORDS_PER_MINUTE: usize = 200;

/// Count whitespace-separated words across every body block of a post
pub fn count_words(post: &Post) -> usize {
    post.content
        .iter()
        .flat_map(|section| section.body.iter())
        .map(|block| block.text.split_whitespace().count())
        .sum()
}

/// Estimated reading time in whole minutes, rounded up
pub fn estimate_reading_minutes(post: &Post) -> u32 {
    estimate_reading_minutes_at(post, DEFAULT_WORDS_PER_MINUTE)
}

/// Estimated reading time at a given reading speed
pub fn estimate_reading_minutes_at(post: &Post, words_per_minute: usize) -> u32 {
    let minutes = count_words(post).div_ceil(words_per_minute.max(1));
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

//! Reading-time estimate

/// Number of whitespace-separated words in `content`
pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Estimated reading time in minutes: `words / words_per_minute`.
///
/// Empty content reads in `0.0` minutes. `words_per_minute` must be non-zero;
/// the site config rejects zero before a build starts.
pub fn reading_time(content: &str, words_per_minute: u32) -> f64 {
    word_count(content) as f64 / f64::from(words_per_minute.max(1))
}

//! Archive listing grouped by year

use chrono::Datelike;
use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::blog_url_for;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveYear {
    pub year: i32,
    /// Indices into `SiteProjection::posts`, newest first
    pub posts: Vec<usize>,
}

/// Route of the archive page
pub fn archive_permalink(config: &SiteConfig) -> String {
    blog_url_for(config, &config.archive_dir)
}

/// Group the newest-first listed posts by year; years come out descending
pub fn build_archive(posts: &[Post], listed: &[usize]) -> Vec<ArchiveYear> {
    let mut years: Vec<ArchiveYear> = Vec::new();

    for &idx in listed {
        let year = posts[idx].date.year();
        match years.last_mut() {
            Some(group) if group.year == year => group.posts.push(idx),
            _ => years.push(ArchiveYear {
                year,
                posts: vec![idx],
            }),
        }
    }

    years
}

//! Paginated blog index

use serde::Serialize;

use crate::config::SiteConfig;
use crate::helpers::blog_url_for;

/// One page of the blog index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexPage {
    /// 1-based page number
    pub number: usize,
    pub total: usize,
    pub permalink: String,
    /// Indices into `SiteProjection::posts`, newest first
    pub posts: Vec<usize>,
    /// Page with newer posts
    pub prev: Option<String>,
    /// Page with older posts
    pub next: Option<String>,
}

/// Route of index page `number`: the blog root for page 1,
/// `<root>/<pagination_dir>/<n>` after that
pub fn index_permalink(config: &SiteConfig, number: usize) -> String {
    if number <= 1 {
        blog_url_for(config, "")
    } else {
        blog_url_for(config, &format!("{}/{}", config.pagination_dir, number))
    }
}

/// Split the newest-first post list into contiguous pages of `per_page`.
///
/// There is always at least one page, even with no posts, so the blog root
/// exists.
pub fn paginate(config: &SiteConfig, posts: &[usize]) -> Vec<IndexPage> {
    let per_page = config.per_page.max(1);
    let total = posts.len().div_ceil(per_page).max(1);

    (1..=total)
        .map(|number| {
            let start = ((number - 1) * per_page).min(posts.len());
            let end = (start + per_page).min(posts.len());
            IndexPage {
                number,
                total,
                permalink: index_permalink(config, number),
                posts: posts[start..end].to_vec(),
                prev: (number > 1).then(|| index_permalink(config, number - 1)),
                next: (number < total).then(|| index_permalink(config, number + 1)),
            }
        })
        .collect()
}

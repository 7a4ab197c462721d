//! Author resolution and author pages

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::{Author, AuthorEntry, AuthorRegistry, InlineAuthor, Post};
use crate::helpers::blog_url_for;

/// One page per registered author with at least one listed post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorPage {
    pub key: String,
    pub author: Author,
    pub permalink: String,
    /// Indices into `SiteProjection::posts`, newest first
    pub posts: Vec<usize>,
}

/// Route of the page of author `key`
pub fn author_permalink(config: &SiteConfig, key: &str) -> String {
    blog_url_for(config, &format!("{}/{}", config.author_dir, key))
}

/// Author registered under `key` in authors.yml
pub fn registered_author(config: &SiteConfig, key: &str, entry: &AuthorEntry) -> Author {
    Author {
        key: Some(key.to_string()),
        name: if entry.name.is_empty() {
            key.to_string()
        } else {
            entry.name.clone()
        },
        title: entry.title.clone(),
        url: entry.url.clone(),
        image_url: entry.image_url.clone(),
        socials: entry.socials.clone(),
        permalink: Some(author_permalink(config, key)),
    }
}

/// Author declared in front-matter; has no page of its own
pub fn inline_author(author: &InlineAuthor) -> Author {
    Author {
        key: None,
        name: author.name.clone(),
        title: author.title.clone(),
        url: author.url.clone(),
        image_url: author.image_url.clone(),
        socials: IndexMap::new(),
        permalink: None,
    }
}

/// Group listed posts by registered author, in authors.yml order
pub fn build_author_pages(
    registry: &AuthorRegistry,
    posts: &[Post],
    listed: &[usize],
) -> Vec<AuthorPage> {
    let mut pages: IndexMap<String, AuthorPage> = IndexMap::new();

    for &idx in listed {
        for author in &posts[idx].authors {
            let (Some(key), Some(permalink)) = (&author.key, &author.permalink) else {
                continue;
            };
            let page = pages.entry(key.clone()).or_insert_with(|| AuthorPage {
                key: key.clone(),
                author: author.clone(),
                permalink: permalink.clone(),
                posts: Vec::new(),
            });
            if page.posts.last() != Some(&idx) {
                page.posts.push(idx);
            }
        }
    }

    let rank = |key: &str| registry.get_index_of(key).unwrap_or(usize::MAX);
    pages.sort_by(|a, _, b, _| rank(a.as_str()).cmp(&rank(b.as_str())));
    pages.into_values().collect()
}

//! Tag pages

use indexmap::IndexMap;
use serde::Serialize;

use crate::content::{Post, TagRef, TagRegistry};
use crate::config::SiteConfig;
use crate::helpers::blog_url_for;

/// One page per tag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagPage {
    pub label: String,
    pub permalink: String,
    pub description: Option<String>,
    /// Indices into `SiteProjection::posts`, newest first
    pub posts: Vec<usize>,
}

/// Route of the tags overview page
pub fn tags_index_permalink(config: &SiteConfig) -> String {
    blog_url_for(config, &config.tag_dir)
}

/// Resolve a front-matter tag against tags.yml.
///
/// Declared tags take their label and permalink segment from the registry;
/// anything else is an inline tag whose segment is the slugified label.
pub fn resolve_tag(config: &SiteConfig, registry: Option<&TagRegistry>, key: &str) -> TagRef {
    let key = key.trim();
    match registry.and_then(|r| r.get(key)) {
        Some(entry) => {
            let label = entry.label.clone().unwrap_or_else(|| key.to_string());
            let segment = entry
                .permalink
                .clone()
                .unwrap_or_else(|| slug::slugify(&label));
            TagRef {
                permalink: blog_url_for(config, &format!("{}/{}", config.tag_dir, segment)),
                label,
                inline: false,
            }
        }
        None => TagRef {
            label: key.to_string(),
            permalink: blog_url_for(
                config,
                &format!("{}/{}", config.tag_dir, slug::slugify(key)),
            ),
            inline: true,
        },
    }
}

/// One page for every tag permalink carried by at least one listed post.
///
/// Labels that resolve to the same permalink (`Terraform` and `terraform`)
/// share a page, labelled by the newest post carrying it. `listed` is newest
/// first, so each page's post list is too. Pages are ordered by label,
/// ignoring case.
pub fn build_tag_pages(
    posts: &[Post],
    listed: &[usize],
    registry: Option<&TagRegistry>,
) -> Vec<TagPage> {
    let mut pages: IndexMap<&str, TagPage> = IndexMap::new();

    for &idx in listed {
        // A tag repeated on one post still counts once
        let mut seen: IndexMap<&str, &TagRef> = IndexMap::new();
        for tag in &posts[idx].tags {
            seen.entry(tag.permalink.as_str()).or_insert(tag);
        }

        for (permalink, tag) in seen {
            pages
                .entry(permalink)
                .or_insert_with(|| TagPage {
                    label: tag.label.clone(),
                    permalink: permalink.to_string(),
                    description: describe(registry, &tag.label),
                    posts: Vec::new(),
                })
                .posts
                .push(idx);
        }
    }

    let mut pages: Vec<TagPage> = pages.into_values().collect();
    pages.sort_by_cached_key(|page| page.label.to_lowercase());
    pages
}

fn describe(registry: Option<&TagRegistry>, label: &str) -> Option<String> {
    registry?
        .iter()
        .find(|(key, entry)| entry.label.as_deref().unwrap_or(key.as_str()) == label)
        .and_then(|(_, entry)| entry.description.clone())
}

//! Post, author and tag models

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use super::FrontMatter;

/// A post as authored on disk, before projection
#[derive(Debug, Clone)]
pub struct PostSource {
    /// Source file path relative to the blog directory
    pub source: String,

    /// Identity of the file: its path without extension, or the parent
    /// directory for `index.md` files
    pub stem: String,

    /// Parsed front-matter
    pub front_matter: FrontMatter,

    /// Raw markdown body (front-matter stripped)
    pub body: String,

    /// Directory holding co-located assets, for posts stored as `<dir>/index.md`
    pub asset_dir: Option<PathBuf>,

    /// Asset paths relative to `asset_dir`
    pub assets: Vec<PathBuf>,
}

impl PostSource {
    /// Create a source record with just a body
    pub fn new(source: &str, front_matter: FrontMatter, body: &str) -> Self {
        let stem = source
            .trim_end_matches(".md")
            .trim_end_matches(".markdown")
            .trim_end_matches("/index")
            .to_string();
        Self {
            source: source.to_string(),
            stem,
            front_matter,
            body: body.to_string(),
            asset_dir: None,
            assets: Vec::new(),
        }
    }
}

/// A projected blog post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Slug (URL-friendly name, unique)
    pub slug: String,

    /// Post title
    pub title: String,

    /// Publication date
    pub date: DateTime<Utc>,

    /// Resolved authors, in front-matter order
    pub authors: Vec<Author>,

    /// Resolved tags, in front-matter order
    pub tags: Vec<TagRef>,

    /// Raw markdown body with the truncation marker removed
    pub raw: String,

    /// Rendered HTML of the full body
    pub content: String,

    /// Rendered HTML of the part before the truncation marker
    pub summary: Option<String>,

    /// Whether the body declared a truncation marker
    pub has_truncate_marker: bool,

    /// Plain-text description
    pub description: String,

    /// Estimated reading time in minutes
    pub reading_time: f64,

    /// Canonical URL path
    pub permalink: String,

    /// Source file path relative to the blog directory
    pub source: String,

    /// Link to edit the source
    pub edit_url: Option<String>,

    /// Excluded from listings and feeds
    pub unlisted: bool,

    /// Only present in builds with `render_drafts`
    pub draft: bool,

    pub hide_reading_time: bool,

    /// Newer neighbour
    pub prev: Option<NavLink>,

    /// Older neighbour
    pub next: Option<NavLink>,

    /// Directory holding co-located assets
    #[serde(skip)]
    pub asset_dir: Option<PathBuf>,

    /// Asset paths relative to `asset_dir`
    #[serde(skip)]
    pub assets: Vec<PathBuf>,

    /// Custom front-matter fields
    #[serde(skip)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Post {
    /// HTML shown in listings and feeds
    pub fn summary_html(&self) -> &str {
        self.summary.as_deref().unwrap_or(&self.content)
    }
}

/// Link to a neighbouring post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavLink {
    pub title: String,
    pub permalink: String,
}

/// An author attached to a post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    /// Key in authors.yml; `None` for inline authors
    pub key: Option<String>,
    pub name: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub socials: IndexMap<String, String>,
    /// Author page, only for registered authors
    pub permalink: Option<String>,
}

/// A tag attached to a post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagRef {
    pub label: String,
    pub permalink: String,
    /// Whether the tag is missing from tags.yml
    pub inline: bool,
}

/// Entry in authors.yml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorEntry {
    pub name: String,
    pub title: Option<String>,
    pub url: Option<String>,
    #[serde(alias = "imageURL")]
    pub image_url: Option<String>,
    pub socials: IndexMap<String, String>,
}

/// Entry in tags.yml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagEntry {
    pub label: Option<String>,
    /// Permalink segment under the tags route
    pub permalink: Option<String>,
    pub description: Option<String>,
}

/// Registered authors, keyed by author key, in file order
pub type AuthorRegistry = IndexMap<String, AuthorEntry>;

/// Declared tags, keyed by tag key, in file order
pub type TagRegistry = IndexMap<String, TagEntry>;

/// Everything the loader reads for one build
#[derive(Debug, Clone, Default)]
pub struct Content {
    /// Posts in declaration order
    pub posts: Vec<PostSource>,
    pub authors: AuthorRegistry,
    /// `None` when no tags.yml exists
    pub tags: Option<TagRegistry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_source_stem() {
        let src = PostSource::new("2025-04-12/index.md", FrontMatter::default(), "");
        assert_eq!(src.stem, "2025-04-12");
        let src = PostSource::new("2024-05-27-git.md", FrontMatter::default(), "");
        assert_eq!(src.stem, "2024-05-27-git");
    }

    #[test]
    fn test_author_registry_parses_docusaurus_style() {
        let yaml = r#"
chris:
  name: Chris O'Malley
  title: Senior DevOps Engineer
  imageURL: https://avatars.githubusercontent.com/u/31399219?v=4
  socials:
    linkedin: https://www.linkedin.com/in/thecomalley/
    github: https://github.com/thecomalley
"#;
        let registry: AuthorRegistry = serde_yaml::from_str(yaml).unwrap();
        let chris = &registry["chris"];
        assert_eq!(chris.name, "Chris O'Malley");
        assert!(chris.image_url.is_some());
        assert_eq!(
            chris.socials.keys().collect::<Vec<_>>(),
            vec!["linkedin", "github"]
        );
    }
}

//! Content loader - loads posts and registries from the blog directory

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{AuthorRegistry, Content, FrontMatter, PostSource, TagRegistry};
use crate::error::BuildError;
use crate::Folio;

const AUTHORS_FILE: &str = "authors.yml";
const TAGS_FILE: &str = "tags.yml";

/// Loads content from the blog directory
pub struct ContentLoader<'a> {
    folio: &'a Folio,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(folio: &'a Folio) -> Self {
        Self { folio }
    }

    /// Load posts, authors and tags
    pub fn load(&self) -> Result<Content> {
        Ok(Content {
            posts: self.load_posts()?,
            authors: self.load_authors()?,
            tags: self.load_tags()?,
        })
    }

    /// Load all posts from the blog directory, in declaration order
    pub fn load_posts(&self) -> Result<Vec<PostSource>> {
        let blog_dir = &self.folio.blog_dir;
        if !blog_dir.exists() {
            tracing::warn!("Blog directory {:?} does not exist", blog_dir);
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();

        for entry in WalkDir::new(blog_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) || is_ignored(path) {
                continue;
            }

            let post = self.load_post(path)?;
            if post.front_matter.draft && !self.folio.config.render_drafts {
                tracing::debug!("Skipping draft {}", post.source);
                continue;
            }
            posts.push(post);
        }

        Ok(posts)
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path) -> Result<PostSource> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;

        let source = path
            .strip_prefix(&self.folio.blog_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        let (front_matter, body) =
            FrontMatter::parse(&content).map_err(|e| BuildError::InvalidFrontMatter {
                post: source.clone(),
                message: e.to_string(),
            })?;

        let mut post = PostSource::new(&source, front_matter, body);

        // Posts stored as <dir>/index.md own everything else in <dir>
        if is_index_file(path) {
            if let Some(dir) = path.parent().filter(|d| *d != self.folio.blog_dir) {
                post.assets = collect_assets(dir);
                post.asset_dir = Some(dir.to_path_buf());
            }
        }

        tracing::debug!("Loaded post {} ({} assets)", post.source, post.assets.len());
        Ok(post)
    }

    /// Load authors.yml, if present
    pub fn load_authors(&self) -> Result<AuthorRegistry> {
        let path = self.folio.blog_dir.join(AUTHORS_FILE);
        Ok(load_registry(&path)?.unwrap_or_default())
    }

    /// Load tags.yml, if present
    pub fn load_tags(&self) -> Result<Option<TagRegistry>> {
        let path = self.folio.blog_dir.join(TAGS_FILE);
        load_registry(&path)
    }
}

fn load_registry<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let registry = serde_yaml::from_str(&content).map_err(|e| BuildError::Registry {
        file: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(Some(registry))
}

/// Non-markdown files below a post directory
fn collect_assets(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file() && !is_markdown_file(e.path()))
        .filter_map(|e| e.path().strip_prefix(dir).ok().map(Path::to_path_buf))
        .collect()
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

fn is_index_file(path: &Path) -> bool {
    path.file_stem().and_then(|s| s.to_str()) == Some("index")
}

/// Files starting with `_` are partials, not posts
fn is_ignored(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('_'))
        .unwrap_or(false)
}

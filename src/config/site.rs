//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub tagline: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub base_url: String,
    pub route_base_path: String,
    pub trailing_slash: bool,

    // Directory
    pub blog_dir: String,
    pub static_dir: String,
    pub public_dir: String,
    pub tag_dir: String,
    pub archive_dir: String,
    pub author_dir: String,
    pub pagination_dir: String,

    // Writing
    pub per_page: usize,
    pub words_per_minute: u32,
    pub truncate_marker: String,
    pub show_reading_time: bool,
    pub render_drafts: bool,
    pub edit_url: Option<String>,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Validation
    pub on_inline_tags: ReportPolicy,
    pub on_inline_authors: ReportPolicy,
    pub on_untruncated_posts: ReportPolicy,

    // Feed
    #[serde(default)]
    pub feed: FeedConfig,

    // Theme chrome
    #[serde(default)]
    pub navbar: NavbarConfig,
    #[serde(default)]
    pub footer: FooterConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Site".to_string(),
            tagline: String::new(),
            author: String::new(),
            language: "en".to_string(),

            url: "https://example.com".to_string(),
            base_url: "/".to_string(),
            route_base_path: "/".to_string(),
            trailing_slash: false,

            blog_dir: "blog".to_string(),
            static_dir: "static".to_string(),
            public_dir: "build".to_string(),
            tag_dir: "tags".to_string(),
            archive_dir: "archive".to_string(),
            author_dir: "authors".to_string(),
            pagination_dir: "page".to_string(),

            per_page: 10,
            words_per_minute: 200,
            truncate_marker: "<!-- truncate -->".to_string(),
            show_reading_time: true,
            render_drafts: false,
            edit_url: None,
            highlight: HighlightConfig::default(),

            on_inline_tags: ReportPolicy::Warn,
            on_inline_authors: ReportPolicy::Warn,
            on_untruncated_posts: ReportPolicy::Warn,

            feed: FeedConfig::default(),

            navbar: NavbarConfig::default(),
            footer: FooterConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the projector cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.per_page == 0 {
            anyhow::bail!("per_page must be at least 1");
        }
        if self.words_per_minute == 0 {
            anyhow::bail!("words_per_minute must be at least 1");
        }
        if self.truncate_marker.trim().is_empty() {
            anyhow::bail!("truncate_marker must not be empty");
        }
        if self.feed.limit == Some(0) {
            anyhow::bail!("feed.limit must be at least 1 (use null for no limit)");
        }
        Ok(())
    }

    /// Reject a `public_dir` that overlaps the site sources under `base_dir`.
    ///
    /// Every build replaces the output directory wholesale, so it must not
    /// be the site itself, an ancestor of it, or overlap `blog_dir` or
    /// `static_dir`.
    pub fn validate_dirs(&self, base_dir: &Path) -> Result<()> {
        let base = base_dir
            .canonicalize()
            .unwrap_or_else(|_| base_dir.to_path_buf());
        let public = normalize_path(&base.join(&self.public_dir));
        let base = normalize_path(&base);

        if base.starts_with(&public) {
            anyhow::bail!(
                "public_dir {:?} must not be the site directory or contain it",
                self.public_dir
            );
        }
        for (name, dir) in [("blog_dir", &self.blog_dir), ("static_dir", &self.static_dir)] {
            let source = normalize_path(&base.join(dir));
            if public.starts_with(&source) || source.starts_with(&public) {
                anyhow::bail!(
                    "public_dir {:?} overlaps {} {:?}",
                    self.public_dir,
                    name,
                    dir
                );
            }
        }
        Ok(())
    }

    /// Title used by the feeds
    pub fn feed_title(&self) -> &str {
        self.feed.title.as_deref().unwrap_or(&self.title)
    }

    /// Description used by the feeds
    pub fn feed_description(&self) -> String {
        self.feed
            .description
            .clone()
            .unwrap_or_else(|| format!("{} Blog", self.title))
    }
}

/// Resolve `.` and `..` without touching the filesystem
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// How a soft content problem is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPolicy {
    Ignore,
    Log,
    Warn,
    Throw,
}

/// Syndication formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    Rss,
    Atom,
}

impl FeedType {
    /// Output file name relative to the blog root
    pub fn file_name(&self) -> &'static str {
        match self {
            FeedType::Rss => "rss.xml",
            FeedType::Atom => "atom.xml",
        }
    }
}

/// Feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub types: Vec<FeedType>,
    pub limit: Option<usize>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub copyright: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            types: vec![FeedType::Rss, FeedType::Atom],
            limit: Some(20),
            title: None,
            description: None,
            copyright: None,
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Navbar configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavbarConfig {
    pub title: Option<String>,
    pub logo: Option<String>,
    pub items: Vec<NavItem>,
}

/// A single navbar link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavItem {
    pub label: String,
    pub to: String,
    #[serde(default = "default_position")]
    pub position: String,
}

fn default_position() -> String {
    "left".to_string()
}

/// Footer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterConfig {
    pub copyright: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.per_page, 10);
        assert_eq!(config.words_per_minute, 200);
        assert_eq!(config.truncate_marker, "<!-- truncate -->");
        assert_eq!(config.feed.limit, Some(20));
        assert_eq!(config.feed.types, vec![FeedType::Rss, FeedType::Atom]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Chris O'Malley
tagline: Blog about DevOps, Cloud, and anything else I find interesting
url: https://thecomalley.github.io
per_page: 5
on_inline_tags: throw
feed:
  types: [atom]
  limit: null
navbar:
  title: Chris O'Malley
  items:
    - label: Blog
      to: archive
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Chris O'Malley");
        assert_eq!(config.per_page, 5);
        assert_eq!(config.on_inline_tags, ReportPolicy::Throw);
        assert_eq!(config.on_inline_authors, ReportPolicy::Warn);
        assert_eq!(config.feed.types, vec![FeedType::Atom]);
        assert_eq!(config.feed.limit, None);
        assert_eq!(config.navbar.items[0].position, "left");
        // Untouched keys keep their defaults
        assert_eq!(config.words_per_minute, 200);
    }

    #[test]
    fn test_validate_rejects_zero_constants() {
        let mut config = SiteConfig::default();
        config.per_page = 0;
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.words_per_minute = 0;
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.feed.limit = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_public_dir_must_not_overlap_sources() {
        let base = Path::new("/srv/site");
        assert!(SiteConfig::default().validate_dirs(base).is_ok());

        for public_dir in [".", "", "./", "..", "blog", "blog/out", "static", "/", "/srv"] {
            let mut config = SiteConfig::default();
            config.public_dir = public_dir.to_string();
            assert!(
                config.validate_dirs(base).is_err(),
                "{:?} should be rejected",
                public_dir
            );
        }

        // The blog sitting inside the output is just as destructive
        let mut config = SiteConfig::default();
        config.public_dir = "content".to_string();
        config.blog_dir = "content/blog".to_string();
        assert!(config.validate_dirs(base).is_err());

        let mut config = SiteConfig::default();
        config.public_dir = "../site-build".to_string();
        assert!(config.validate_dirs(base).is_ok());
    }

    #[test]
    fn test_feed_title_falls_back_to_site_title() {
        let mut config = SiteConfig::default();
        assert_eq!(config.feed_title(), "My Site");
        config.feed.title = Some("Feed".to_string());
        assert_eq!(config.feed_title(), "Feed");
    }
}

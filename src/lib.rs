//! folio-rs: a static blog generator
//!
//! Markdown posts with YAML front-matter go in; a paginated index, one page
//! per post, tag, author and archive pages, RSS/Atom feeds and a sitemap come
//! out. Every build regenerates the whole site and replaces the output
//! directory in one step.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod projector;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use error::BuildError;

/// The main application: a site directory and its configuration
#[derive(Debug, Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Blog posts directory
    pub blog_dir: PathBuf,
    /// Static files copied verbatim into the output
    pub static_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Folio {
    /// Create a new Folio instance from a directory, reading `_config.yml`
    /// when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let folio = Self::with_config(base_dir, config);
        folio.check_public_dir()?;
        Ok(folio)
    }

    /// Create a Folio instance with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        Self {
            blog_dir: base_dir.join(&config.blog_dir),
            static_dir: base_dir.join(&config.static_dir),
            public_dir: base_dir.join(&config.public_dir),
            config,
            base_dir,
        }
    }

    /// Fail unless the public directory is safe to replace
    pub fn check_public_dir(&self) -> Result<()> {
        self.config.validate_dirs(&self.base_dir)
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str, slug: Option<&str>) -> Result<PathBuf> {
        commands::new::create_post(self, title, slug)
    }
}

//! Generator module - renders a projection into the output tree and commits
//! it to the public directory in one step

use anyhow::{Context as _, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tera::Context;
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{
    blog_file_url_for, date_xml, file_url_for, full_url_for, output_path_for, relative_path_for,
};
use crate::projector::{feed::escape_xml, feed_url, render_feed, SiteProjection};
use crate::templates::{
    ArchiveYearData, ConfigData, PaginationData, PostData, TagData, TemplateRenderer,
};
use crate::Folio;

/// A file of the output tree
#[derive(Debug, Clone, PartialEq)]
pub enum OutputFile {
    /// Generated content
    Content(Vec<u8>),
    /// Copied verbatim from a source file
    Copy(PathBuf),
}

/// Every file a build produces, keyed by path relative to the output
/// directory. Nothing reaches the disk until [`OutputTree::write_to`].
#[derive(Debug, Default)]
pub struct OutputTree {
    files: BTreeMap<PathBuf, OutputFile>,
}

impl OutputTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add generated content. It may replace a copied static file but never
    /// another generated file.
    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Result<()> {
        let path = path.into();
        match self.files.get(&path) {
            Some(OutputFile::Content(_)) => {
                anyhow::bail!("{:?} is generated twice", path);
            }
            Some(OutputFile::Copy(source)) => {
                tracing::debug!("{:?} overrides static file {:?}", path, source);
            }
            None => tracing::debug!("Rendered {:?}", path),
        }
        self.files.insert(path, OutputFile::Content(content.into()));
        Ok(())
    }

    pub fn copy(&mut self, path: impl Into<PathBuf>, source: impl Into<PathBuf>) {
        self.files
            .entry(path.into())
            .or_insert_with(|| OutputFile::Copy(source.into()));
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&OutputFile> {
        self.files.get(path.as_ref())
    }

    /// Generated content at `path` as text
    pub fn text(&self, path: impl AsRef<Path>) -> Option<&str> {
        match self.files.get(path.as_ref())? {
            OutputFile::Content(bytes) => std::str::from_utf8(bytes).ok(),
            OutputFile::Copy(_) => None,
        }
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every file under `root`
    pub fn write_to(&self, root: &Path) -> Result<()> {
        for (rel, file) in &self.files {
            let dest = root.join(rel);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create dir {:?}", parent))?;
            }
            match file {
                OutputFile::Content(bytes) => fs::write(&dest, bytes)
                    .with_context(|| format!("Failed to write {:?}", dest))?,
                OutputFile::Copy(source) => {
                    fs::copy(source, &dest)
                        .with_context(|| format!("Failed to copy {:?} to {:?}", source, dest))?;
                }
            }
        }
        Ok(())
    }
}

/// Static site generator using Tera templates
pub struct Generator<'a> {
    folio: &'a Folio,
    renderer: TemplateRenderer,
}

impl<'a> Generator<'a> {
    /// Create a new generator
    pub fn new(folio: &'a Folio) -> Result<Self> {
        Ok(Self {
            folio,
            renderer: TemplateRenderer::new()?,
        })
    }

    fn config(&self) -> &SiteConfig {
        &self.folio.config
    }

    /// Render and commit the whole site
    pub fn generate(&self, site: &SiteProjection) -> Result<()> {
        let tree = self.render(site)?;
        self.commit(&tree)?;
        tracing::info!(
            "Wrote {} files to {:?}",
            tree.len(),
            self.folio.public_dir
        );
        Ok(())
    }

    /// Render every output file into memory
    pub fn render(&self, site: &SiteProjection) -> Result<OutputTree> {
        let mut tree = OutputTree::new();
        let config_data = ConfigData::new(self.config());

        self.copy_static_files(&mut tree);
        self.copy_post_assets(&mut tree, site);

        self.render_index_pages(&mut tree, site, &config_data)?;
        self.render_post_pages(&mut tree, site, &config_data)?;
        self.render_tag_pages(&mut tree, site, &config_data)?;
        self.render_author_pages(&mut tree, site, &config_data)?;
        self.render_archive_page(&mut tree, site, &config_data)?;

        self.render_feeds(&mut tree, site)?;
        self.render_sitemap(&mut tree, site)?;
        self.render_archive_json(&mut tree, site)?;

        Ok(tree)
    }

    /// Swap the rendered tree into the public directory.
    ///
    /// The tree is written to a staging directory beside the public
    /// directory first; the previous output is only removed once staging
    /// is complete.
    pub fn commit(&self, tree: &OutputTree) -> Result<()> {
        self.folio.check_public_dir()?;
        let public_dir = &self.folio.public_dir;
        let parent = public_dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {:?}", parent))?;

        let staging = tempfile::Builder::new()
            .prefix(".folio-build-")
            .tempdir_in(parent)
            .with_context(|| format!("Failed to create staging dir in {:?}", parent))?;
        tree.write_to(staging.path())?;

        if public_dir.exists() {
            fs::remove_dir_all(public_dir)
                .with_context(|| format!("Failed to remove {:?}", public_dir))?;
        }
        fs::rename(staging.path(), public_dir).with_context(|| {
            format!("Failed to move {:?} to {:?}", staging.path(), public_dir)
        })?;

        Ok(())
    }

    fn create_base_context(&self, config_data: &ConfigData, page_title: &str) -> Context {
        let mut context = Context::new();
        context.insert("config", config_data);
        context.insert("page_title", page_title);
        context
    }

    fn post_data<'p>(&self, posts: impl Iterator<Item = &'p Post>) -> Vec<PostData> {
        posts.map(|p| PostData::new(p, self.config())).collect()
    }

    /// Generate index pages with pagination
    fn render_index_pages(
        &self,
        tree: &mut OutputTree,
        site: &SiteProjection,
        config_data: &ConfigData,
    ) -> Result<()> {
        for page in &site.index_pages {
            let title = if page.number == 1 {
                self.config().title.clone()
            } else {
                format!("{} - Page {}", self.config().title, page.number)
            };

            let mut context = self.create_base_context(config_data, &title);
            context.insert("posts", &self.post_data(site.resolve(&page.posts)));
            context.insert("pagination", &PaginationData::from(page));

            let html = self.renderer.render("index.html", &context)?;
            tree.insert(output_path_for(self.config(), &page.permalink), html)?;
        }
        Ok(())
    }

    /// Generate one page per post, unlisted ones included
    fn render_post_pages(
        &self,
        tree: &mut OutputTree,
        site: &SiteProjection,
        config_data: &ConfigData,
    ) -> Result<()> {
        for post in &site.posts {
            let mut context = self.create_base_context(config_data, &post.title);
            context.insert("post", &PostData::new(post, self.config()));

            let html = self
                .renderer
                .render("post.html", &context)
                .with_context(|| format!("Failed to render {}", post.source))?;
            tree.insert(output_path_for(self.config(), &post.permalink), html)?;
        }
        Ok(())
    }

    /// Generate the tags overview and one page per tag
    fn render_tag_pages(
        &self,
        tree: &mut OutputTree,
        site: &SiteProjection,
        config_data: &ConfigData,
    ) -> Result<()> {
        let tags: Vec<TagData> = site
            .tag_pages
            .iter()
            .map(|t| TagData {
                label: t.label.clone(),
                permalink: t.permalink.clone(),
                count: t.posts.len(),
            })
            .collect();

        let mut context = self.create_base_context(config_data, "Tags");
        context.insert("tags", &tags);
        let html = self.renderer.render("tags.html", &context)?;
        tree.insert(output_path_for(self.config(), &site.tags_permalink), html)?;

        for page in &site.tag_pages {
            let title = format!("{} posts tagged with \"{}\"", page.posts.len(), page.label);
            let mut context = self.create_base_context(config_data, &title);
            context.insert("tag", page);
            context.insert("posts", &self.post_data(site.resolve(&page.posts)));

            let html = self.renderer.render("tag.html", &context)?;
            tree.insert(output_path_for(self.config(), &page.permalink), html)?;
        }
        Ok(())
    }

    fn render_author_pages(
        &self,
        tree: &mut OutputTree,
        site: &SiteProjection,
        config_data: &ConfigData,
    ) -> Result<()> {
        for page in &site.author_pages {
            let mut context = self.create_base_context(config_data, &page.author.name);
            context.insert("author", &page.author);
            context.insert("posts", &self.post_data(site.resolve(&page.posts)));

            let html = self.renderer.render("author.html", &context)?;
            tree.insert(output_path_for(self.config(), &page.permalink), html)?;
        }
        Ok(())
    }

    fn render_archive_page(
        &self,
        tree: &mut OutputTree,
        site: &SiteProjection,
        config_data: &ConfigData,
    ) -> Result<()> {
        let years: Vec<ArchiveYearData> = site
            .archive
            .iter()
            .map(|y| ArchiveYearData {
                year: y.year,
                posts: self.post_data(site.resolve(&y.posts)),
            })
            .collect();

        let mut context = self.create_base_context(config_data, "Archive");
        context.insert("years", &years);
        let html = self.renderer.render("archive.html", &context)?;
        tree.insert(output_path_for(self.config(), &site.archive_permalink), html)?;
        Ok(())
    }

    fn render_feeds(&self, tree: &mut OutputTree, site: &SiteProjection) -> Result<()> {
        let config = self.config();
        for &feed_type in &config.feed.types {
            let xml = render_feed(&site.feed, feed_type, &feed_url(config, feed_type));
            let route = blog_file_url_for(config, feed_type.file_name());
            tree.insert(relative_path_for(config, &route), xml)?;
        }
        Ok(())
    }

    /// sitemap.xml with every listed route
    fn render_sitemap(&self, tree: &mut OutputTree, site: &SiteProjection) -> Result<()> {
        let config = self.config();
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
        xml.push('\n');

        for route in site.routes.routes().iter().filter(|r| r.listed) {
            xml.push_str("  <url>\n");
            xml.push_str(&format!(
                "    <loc>{}</loc>\n",
                escape_xml(&full_url_for(config, &route.permalink))
            ));
            if let Some(post) = site.posts.iter().find(|p| p.permalink == route.permalink) {
                xml.push_str(&format!("    <lastmod>{}</lastmod>\n", date_xml(&post.date)));
            }
            xml.push_str("    <changefreq>weekly</changefreq>\n");
            xml.push_str("    <priority>0.5</priority>\n");
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        tree.insert(
            relative_path_for(config, &file_url_for(config, "sitemap.xml")),
            xml,
        )
    }

    /// archive.json: blog archive data for client-side consumers
    fn render_archive_json(&self, tree: &mut OutputTree, site: &SiteProjection) -> Result<()> {
        let config = self.config();
        let blog_posts: Vec<serde_json::Value> = site
            .listed_posts()
            .map(|post| {
                json!({
                    "id": post.slug,
                    "metadata": {
                        "permalink": post.permalink,
                        "source": format!("@site/{}/{}", config.blog_dir, post.source),
                        "title": post.title,
                        "description": post.description,
                        "date": post.date.to_rfc3339(),
                        "tags": post.tags,
                        "readingTime": post.reading_time,
                        "hasTruncateMarker": post.has_truncate_marker,
                        "authors": post.authors,
                        "unlisted": post.unlisted,
                        "editUrl": post.edit_url,
                        "prevItem": post.prev,
                        "nextItem": post.next,
                    },
                    "content": post.raw,
                })
            })
            .collect();

        let archive = json!({ "archive": { "blogPosts": blog_posts } });
        let route = blog_file_url_for(config, "archive.json");
        tree.insert(
            relative_path_for(config, &route),
            serde_json::to_string_pretty(&archive)?,
        )
    }

    /// Copy the static directory into the output root
    fn copy_static_files(&self, tree: &mut OutputTree) {
        let static_dir = &self.folio.static_dir;
        if !static_dir.exists() {
            return;
        }

        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Ok(relative) = path.strip_prefix(static_dir) {
                tree.copy(relative, path);
            }
        }
    }

    /// Copy co-located post assets next to the post's permalink
    fn copy_post_assets(&self, tree: &mut OutputTree, site: &SiteProjection) {
        for post in &site.posts {
            let Some(asset_dir) = &post.asset_dir else {
                continue;
            };
            let dest = relative_path_for(self.config(), &post.permalink);
            for asset in &post.assets {
                tree.copy(dest.join(asset), asset_dir.join(asset));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MarkdownRenderer;
    use crate::projector::Projector;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: PathBuf, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn sample_site() -> TempDir {
        let dir = TempDir::new().unwrap();
        let blog = dir.path().join("blog");
        write(
            blog.join("authors.yml"),
            "chris:\n  name: Chris O'Malley\n  title: Senior DevOps Engineer\n",
        );
        write(
            blog.join("2025-04-12/index.md"),
            "---\nslug: azure-sandbox-nuke\ntitle: Azure Sandbox Nuke\nauthors: [chris]\ntags: [terraform, azure]\n---\n\nClean up the sandbox.\n\n![diagram](./diagram.png)\n\n<!-- truncate -->\n\nThe rest.\n",
        );
        write(blog.join("2025-04-12/diagram.png"), "png");
        write(
            blog.join("2024-05-27-git-configuration.md"),
            "---\ntitle: Git Configuration\nauthors: chris\ntags: git\n---\n\nSet it once.\n\n<!-- truncate -->\n\nDetails.\n",
        );
        write(dir.path().join("static/img/logo.svg"), "<svg/>");
        dir
    }

    fn build(folio: &Folio) -> (SiteProjection, OutputTree) {
        let content = crate::content::loader::ContentLoader::new(folio)
            .load()
            .unwrap();
        let markdown = MarkdownRenderer::new();
        let site = Projector::new(&folio.config, &markdown)
            .project(&content)
            .unwrap();
        let tree = Generator::new(folio).unwrap().render(&site).unwrap();
        (site, tree)
    }

    #[test]
    fn test_generated_files_never_overwrite_each_other() {
        let mut tree = OutputTree::new();
        tree.copy("index.html", "/site/static/index.html");
        tree.insert("index.html", "home").unwrap();
        assert_eq!(tree.text("index.html"), Some("home"));

        assert!(tree.insert("index.html", "post").is_err());
        assert_eq!(tree.text("index.html"), Some("home"));
    }

    #[test]
    fn test_output_tree_layout() {
        let dir = sample_site();
        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        let (_, tree) = build(&folio);

        for path in [
            "index.html",
            "azure-sandbox-nuke.html",
            "git-configuration.html",
            "tags.html",
            "tags/terraform.html",
            "tags/git.html",
            "authors/chris.html",
            "archive.html",
            "rss.xml",
            "atom.xml",
            "sitemap.xml",
            "archive.json",
            "img/logo.svg",
            "azure-sandbox-nuke/diagram.png",
        ] {
            assert!(tree.get(path).is_some(), "missing {}", path);
        }

        let index = tree.text("index.html").unwrap();
        let newer = index.find("Azure Sandbox Nuke").unwrap();
        let older = index.find("Git Configuration").unwrap();
        assert!(newer < older);
        assert!(index.contains(r#"src="/azure-sandbox-nuke/diagram.png""#));
        assert!(!index.contains("The rest."));

        let post = tree.text("azure-sandbox-nuke.html").unwrap();
        assert!(post.contains("The rest."));
        assert!(post.contains("April 12, 2025"));
        assert!(post.contains("Git Configuration"));
    }

    #[test]
    fn test_trailing_slash_layout() {
        let dir = sample_site();
        let mut config = SiteConfig::default();
        config.trailing_slash = true;
        let folio = Folio::with_config(dir.path(), config);
        let (_, tree) = build(&folio);

        assert!(tree.get("azure-sandbox-nuke/index.html").is_some());
        assert!(tree.get("tags/terraform/index.html").is_some());
        assert!(tree.get("rss.xml").is_some());
    }

    #[test]
    fn test_archive_json_and_sitemap() {
        let dir = sample_site();
        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        let (site, tree) = build(&folio);

        let archive: serde_json::Value =
            serde_json::from_str(tree.text("archive.json").unwrap()).unwrap();
        let posts = archive["archive"]["blogPosts"].as_array().unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0]["id"], "azure-sandbox-nuke");
        assert_eq!(posts[0]["metadata"]["nextItem"]["permalink"], "/git-configuration");
        assert_eq!(posts[1]["metadata"]["prevItem"]["title"], "Azure Sandbox Nuke");

        let sitemap = tree.text("sitemap.xml").unwrap();
        assert_eq!(sitemap.matches("<url>").count(), site.routes.len());
        assert!(sitemap.contains("<loc>https://example.com/azure-sandbox-nuke</loc>"));
    }

    #[test]
    fn test_feed_types_are_configurable() {
        let dir = sample_site();
        let mut config = SiteConfig::default();
        config.feed.types = vec![crate::config::FeedType::Atom];
        let folio = Folio::with_config(dir.path(), config);
        let (_, tree) = build(&folio);

        assert!(tree.get("atom.xml").is_some());
        assert!(tree.get("rss.xml").is_none());
    }

    #[test]
    fn test_commit_replaces_previous_output() {
        let dir = sample_site();
        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        write(folio.public_dir.join("stale.html"), "old");

        let (_, tree) = build(&folio);
        Generator::new(&folio).unwrap().commit(&tree).unwrap();

        assert!(folio.public_dir.join("index.html").exists());
        assert!(folio.public_dir.join("azure-sandbox-nuke/diagram.png").exists());
        assert!(!folio.public_dir.join("stale.html").exists());

        // No staging directories left behind
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".folio-build-"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_public_dir_overlapping_sources_is_refused() {
        let dir = sample_site();
        for public_dir in [".", "blog", "static"] {
            let mut config = SiteConfig::default();
            config.public_dir = public_dir.to_string();
            let folio = Folio::with_config(dir.path(), config);

            assert!(folio.generate().is_err());
            assert!(dir.path().join("blog/2025-04-12/index.md").exists());
            assert!(dir.path().join("static/img/logo.svg").exists());
        }
    }

    #[test]
    fn test_failed_build_leaves_previous_output() {
        let dir = sample_site();
        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        write(folio.public_dir.join("index.html"), "previous");

        write(
            dir.path().join("blog/2025-01-01-clash.md"),
            "---\ntitle: Clash\nslug: git-configuration\n---\n\nBody\n",
        );
        assert!(folio.generate().is_err());
        assert_eq!(
            fs::read_to_string(folio.public_dir.join("index.html")).unwrap(),
            "previous"
        );
    }
}

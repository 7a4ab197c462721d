//! Built-in blog theme using the Tera template engine
//!
//! Every template is embedded in the binary, so a site needs nothing but
//! its content to build.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::{NavItem, SiteConfig};
use crate::content::{parse_date_string, Author, NavLink, Post, TagRef};
use crate::helpers::{blog_url_for, file_url_for, format_date};
use crate::projector::{feed_url, IndexPage};

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all theme templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Content is already HTML; templates escape user text explicitly
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("macros.html", include_str!("theme/macros.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("tag.html", include_str!("theme/tag.html")),
            ("tags.html", include_str!("theme/tags.html")),
            ("archive.html", include_str!("theme/archive.html")),
            ("author.html", include_str!("theme/author.html")),
        ])?;

        tera.register_filter("date_format", date_format_filter);
        tera.register_filter("reading_time", reading_time_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: format an RFC 3339 date with a Moment.js-style pattern
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "LL".to_string(),
    };

    let date = DateTime::parse_from_rfc3339(&s)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_date_string(&s));

    match date {
        Some(date) => Ok(tera::Value::String(format_date(&date, &format))),
        // Not a date we understand; show it as written
        None => Ok(tera::Value::String(s)),
    }
}

/// Tera filter: reading time in minutes to "N min read", rounded up
fn reading_time_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let minutes = tera::try_get_value!("reading_time", "value", f64, value);
    Ok(tera::Value::String(format!(
        "{} min read",
        minutes.max(0.0).ceil() as u64
    )))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub tagline: String,
    pub author: String,
    pub url: String,
    pub language: String,
    pub home_url: String,
    pub tags_url: String,
    pub archive_url: String,
    pub navbar_title: String,
    /// Logo URL; a relative path is resolved under the site base path
    pub navbar_logo: Option<String>,
    pub nav_items: Vec<NavItem>,
    pub footer_copyright: String,
    pub feeds: Vec<FeedLink>,
}

impl ConfigData {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            tagline: config.tagline.clone(),
            author: config.author.clone(),
            url: config.url.clone(),
            language: config.language.clone(),
            home_url: blog_url_for(config, ""),
            tags_url: blog_url_for(config, &config.tag_dir),
            archive_url: blog_url_for(config, &config.archive_dir),
            navbar_title: config
                .navbar
                .title
                .clone()
                .unwrap_or_else(|| config.title.clone()),
            navbar_logo: config.navbar.logo.as_deref().map(|logo| {
                if logo.contains("://") {
                    logo.to_string()
                } else {
                    file_url_for(config, logo)
                }
            }),
            nav_items: config.navbar.items.clone(),
            footer_copyright: config.footer.copyright.clone(),
            feeds: config
                .feed
                .types
                .iter()
                .map(|&feed_type| FeedLink {
                    mime: match feed_type {
                        crate::config::FeedType::Rss => "application/rss+xml",
                        crate::config::FeedType::Atom => "application/atom+xml",
                    },
                    url: feed_url(config, feed_type),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedLink {
    pub mime: &'static str,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub title: String,
    /// RFC 3339
    pub date: String,
    pub permalink: String,
    pub description: String,
    pub summary: String,
    pub content: String,
    pub has_truncate_marker: bool,
    /// `None` when reading time is hidden for this post or the whole site
    pub reading_time: Option<f64>,
    pub authors: Vec<Author>,
    pub tags: Vec<TagRef>,
    pub edit_url: Option<String>,
    pub prev: Option<NavLink>,
    pub next: Option<NavLink>,
}

impl PostData {
    pub fn new(post: &Post, config: &SiteConfig) -> Self {
        Self {
            title: post.title.clone(),
            date: post.date.to_rfc3339(),
            permalink: post.permalink.clone(),
            description: post.description.clone(),
            summary: post.summary_html().to_string(),
            content: post.content.clone(),
            has_truncate_marker: post.has_truncate_marker,
            reading_time: (config.show_reading_time && !post.hide_reading_time)
                .then_some(post.reading_time),
            authors: post.authors.clone(),
            tags: post.tags.clone(),
            edit_url: post.edit_url.clone(),
            prev: post.prev.clone(),
            next: post.next.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    pub current: usize,
    pub total: usize,
    pub prev_link: Option<String>,
    pub next_link: Option<String>,
}

impl From<&IndexPage> for PaginationData {
    fn from(page: &IndexPage) -> Self {
        Self {
            current: page.number,
            total: page.total,
            prev_link: page.prev.clone(),
            next_link: page.next.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TagData {
    pub label: String,
    pub permalink: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveYearData {
    pub year: i32,
    pub posts: Vec<PostData>,
}

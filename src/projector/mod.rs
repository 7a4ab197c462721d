//! Content projector
//!
//! A pure function from the loaded content and the site configuration to
//! every page the site publishes: post pages, the paginated index, tag and
//! author pages, the archive and the feed. Nothing here touches the
//! filesystem; the generator renders and writes the result.

pub mod archive;
pub mod authors;
pub mod feed;
pub mod paginate;
pub mod permalink;
pub mod reading_time;
pub mod tags;

use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::{ReportPolicy, SiteConfig};
use crate::content::{
    Author, AuthorRef, Content, MarkdownRenderer, NavLink, Post, PostSource, TagRef,
};
use crate::error::BuildError;

pub use archive::{archive_permalink, build_archive, ArchiveYear};
pub use authors::{author_permalink, build_author_pages, AuthorPage};
pub use feed::{build_feed, feed_url, render_feed, FeedDocument, FeedEntry};
pub use paginate::{index_permalink, paginate, IndexPage};
pub use permalink::{resolve_permalink, Route, RouteTable};
pub use reading_time::{reading_time, word_count};
pub use tags::{build_tag_pages, tags_index_permalink, TagPage};

lazy_static! {
    /// `2025-04-12-some-title`, `2025/04/12/some-title` or a bare date,
    /// optionally below folders: `notes/2025-04-12-some-title`
    static ref DATE_PREFIX: Regex =
        Regex::new(r"^(?:(.*?)/)?(\d{4})[-/](\d{2})[-/](\d{2})(?:[-/](.*))?$")
            .expect("valid regex");
}

/// Turns post markup into HTML
pub trait MarkupRenderer {
    /// Render `markup`, resolving relative links against `asset_base`
    fn render(&self, markup: &str, asset_base: &str) -> anyhow::Result<String>;

    /// Plain text used when a post has no description
    fn plain_summary(&self, markup: &str) -> String;
}

/// Everything the site publishes, ready to be rendered
#[derive(Debug)]
pub struct SiteProjection {
    /// Every post, newest first
    pub posts: Vec<Post>,
    /// Indices of listed posts into `posts`, newest first
    pub listed: Vec<usize>,
    pub index_pages: Vec<IndexPage>,
    pub tag_pages: Vec<TagPage>,
    pub tags_permalink: String,
    pub author_pages: Vec<AuthorPage>,
    pub archive: Vec<ArchiveYear>,
    pub archive_permalink: String,
    pub feed: FeedDocument,
    pub routes: RouteTable,
}

impl SiteProjection {
    /// Listed posts, newest first
    pub fn listed_posts(&self) -> impl Iterator<Item = &Post> + '_ {
        self.listed.iter().map(move |&idx| &self.posts[idx])
    }

    /// Resolve page-local indices to posts
    pub fn resolve<'a>(&'a self, indices: &'a [usize]) -> impl Iterator<Item = &'a Post> + 'a {
        indices.iter().map(move |&idx| &self.posts[idx])
    }
}

/// Projects loaded content into a [`SiteProjection`]
pub struct Projector<'a, R: MarkupRenderer = MarkdownRenderer> {
    config: &'a SiteConfig,
    renderer: &'a R,
}

impl<'a, R: MarkupRenderer> Projector<'a, R> {
    pub fn new(config: &'a SiteConfig, renderer: &'a R) -> Self {
        Self { config, renderer }
    }

    /// Project the whole collection; the first error aborts the build
    pub fn project(&self, content: &Content) -> Result<SiteProjection, BuildError> {
        let mut posts = content
            .posts
            .iter()
            .map(|source| self.project_post(source, content))
            .collect::<Result<Vec<_>, _>>()?;

        // Stable: equal dates keep declaration order
        posts.sort_by(|a, b| b.date.cmp(&a.date));

        let mut routes = RouteTable::new(self.config);
        for post in &posts {
            routes.register(&post.permalink, post.source.clone(), !post.unlisted)?;
        }

        let listed: Vec<usize> = posts
            .iter()
            .enumerate()
            .filter(|(_, post)| !post.unlisted)
            .map(|(idx, _)| idx)
            .collect();
        link_neighbours(&mut posts, &listed);

        let index_pages = paginate(self.config, &listed);
        for page in &index_pages {
            routes.register(&page.permalink, format!("index page {}", page.number), true)?;
        }

        let tag_pages = build_tag_pages(&posts, &listed, content.tags.as_ref());
        let tags_permalink = tags_index_permalink(self.config);
        routes.register(&tags_permalink, "tags overview", true)?;
        for page in &tag_pages {
            routes.register(&page.permalink, format!("tag `{}`", page.label), true)?;
        }

        let author_pages = build_author_pages(&content.authors, &posts, &listed);
        for page in &author_pages {
            routes.register(&page.permalink, format!("author `{}`", page.key), true)?;
        }

        let archive = build_archive(&posts, &listed);
        let archive_permalink = archive_permalink(self.config);
        routes.register(&archive_permalink, "archive", true)?;

        let feed = build_feed(self.config, &posts, &listed);

        info!(
            "Projected {} posts ({} listed), {} index pages, {} tags, {} authors",
            posts.len(),
            listed.len(),
            index_pages.len(),
            tag_pages.len(),
            author_pages.len()
        );

        Ok(SiteProjection {
            posts,
            listed,
            index_pages,
            tag_pages,
            tags_permalink,
            author_pages,
            archive,
            archive_permalink,
            feed,
            routes,
        })
    }

    fn project_post(&self, source: &PostSource, content: &Content) -> Result<Post, BuildError> {
        let config = self.config;
        let fm = &source.front_matter;
        let id = source.source.as_str();

        let title = fm
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BuildError::MissingField {
                post: id.to_string(),
                field: "title",
            })?
            .to_string();

        let date = resolve_date(source)?;
        let slug = resolve_slug(source, &title)?;
        let permalink = resolve_permalink(config, &slug);
        debug!("{} -> {}", id, permalink);

        let authors = self.resolve_authors(source, content)?;
        let tags = self.resolve_tags(source, content)?;

        let (summary_markup, full_markup) =
            MarkdownRenderer::split_summary(&source.body, &config.truncate_marker);
        if summary_markup.is_none() {
            report(
                config.on_untruncated_posts,
                BuildError::Untruncated {
                    post: id.to_string(),
                },
            )?;
        }

        let render = |markup: &str| {
            self.renderer
                .render(markup, &permalink)
                .map_err(|e| BuildError::Render {
                    post: id.to_string(),
                    message: format!("{:#}", e),
                })
        };
        let rendered = render(full_markup.as_str())?;
        let summary = summary_markup.as_deref().map(render).transpose()?;

        let description = fm
            .description
            .clone()
            .unwrap_or_else(|| self.renderer.plain_summary(&full_markup));

        let edit_url = config
            .edit_url
            .as_deref()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), source.source));

        Ok(Post {
            slug,
            title,
            date,
            authors,
            tags,
            reading_time: reading_time(&full_markup, config.words_per_minute),
            raw: full_markup,
            content: rendered,
            has_truncate_marker: summary.is_some(),
            summary,
            description,
            permalink,
            source: source.source.clone(),
            edit_url,
            unlisted: fm.unlisted,
            draft: fm.draft,
            hide_reading_time: fm.hide_reading_time,
            prev: None,
            next: None,
            asset_dir: source.asset_dir.clone(),
            assets: source.assets.clone(),
            extra: fm.extra.clone(),
        })
    }

    fn resolve_authors(
        &self,
        source: &PostSource,
        content: &Content,
    ) -> Result<Vec<Author>, BuildError> {
        let mut resolved = Vec::with_capacity(source.front_matter.authors.len());

        for author in &source.front_matter.authors {
            match author {
                AuthorRef::Key(key) => {
                    let entry =
                        content
                            .authors
                            .get(key)
                            .ok_or_else(|| BuildError::UnknownAuthor {
                                post: source.source.clone(),
                                author: key.clone(),
                            })?;
                    resolved.push(authors::registered_author(self.config, key, entry));
                }
                AuthorRef::Inline(inline) => {
                    if !content.authors.is_empty() {
                        report(
                            self.config.on_inline_authors,
                            BuildError::InlineAuthor {
                                post: source.source.clone(),
                                author: inline.name.clone(),
                            },
                        )?;
                    }
                    resolved.push(authors::inline_author(inline));
                }
            }
        }

        Ok(resolved)
    }

    fn resolve_tags(&self, source: &PostSource, content: &Content) -> Result<Vec<TagRef>, BuildError> {
        let registry = content.tags.as_ref();
        let mut resolved = Vec::with_capacity(source.front_matter.tags.len());

        for key in &source.front_matter.tags {
            if key.trim().is_empty() {
                continue;
            }
            let tag = tags::resolve_tag(self.config, registry, key);
            if tag.inline && registry.is_some() {
                report(
                    self.config.on_inline_tags,
                    BuildError::InlineTag {
                        post: source.source.clone(),
                        tag: tag.label.clone(),
                    },
                )?;
            }
            resolved.push(tag);
        }

        Ok(resolved)
    }
}

/// Apply a report policy to a soft content problem
fn report(policy: ReportPolicy, problem: BuildError) -> Result<(), BuildError> {
    match policy {
        ReportPolicy::Ignore => Ok(()),
        ReportPolicy::Log => {
            info!("{}", problem);
            Ok(())
        }
        ReportPolicy::Warn => {
            warn!("{}", problem);
            Ok(())
        }
        ReportPolicy::Throw => Err(problem),
    }
}

/// Front-matter date, else the date prefix of the file stem
fn resolve_date(source: &PostSource) -> Result<DateTime<Utc>, BuildError> {
    if let Some(parsed) = source.front_matter.parse_date() {
        return parsed.map_err(|value| BuildError::InvalidDate {
            post: source.source.clone(),
            value,
        });
    }

    let Some(caps) = DATE_PREFIX.captures(&source.stem) else {
        return Err(BuildError::MissingField {
            post: source.source.clone(),
            field: "date",
        });
    };

    let field = |i: usize| caps[i].parse::<u32>().unwrap_or(0);
    NaiveDate::from_ymd_opt(field(2) as i32, field(3), field(4))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| BuildError::InvalidDate {
            post: source.source.clone(),
            value: format!("{}-{}-{}", &caps[2], &caps[3], &caps[4]),
        })
}

/// Front-matter slug verbatim, else the stem minus its date prefix, else the
/// title. Folders holding the file prefix the derived slug.
fn resolve_slug(source: &PostSource, title: &str) -> Result<String, BuildError> {
    if let Some(slug) = &source.front_matter.slug {
        let slug = slug.trim().trim_matches('/');
        if !slug.is_empty() {
            return Ok(slug.to_string());
        }
    }

    let (folder, name) = match DATE_PREFIX.captures(&source.stem) {
        Some(caps) => (
            caps.get(1).map_or("", |m| m.as_str()),
            caps.get(5).map_or("", |m| m.as_str()),
        ),
        None => source
            .stem
            .rsplit_once('/')
            .unwrap_or(("", source.stem.as_str())),
    };

    let name = path_slug(name);
    let name = if name.is_empty() {
        slug::slugify(title)
    } else {
        name
    };

    if name.is_empty() {
        return Err(BuildError::MissingField {
            post: source.source.clone(),
            field: "slug",
        });
    }

    let folder = path_slug(folder);
    if folder.is_empty() {
        Ok(name)
    } else {
        Ok(format!("{}/{}", folder, name))
    }
}

/// Slugify each segment of a `/`-separated path
fn path_slug(path: &str) -> String {
    path.split('/')
        .map(slug::slugify)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Link each listed post to its newer (`prev`) and older (`next`) neighbour
fn link_neighbours(posts: &mut [Post], listed: &[usize]) {
    let link = |post: &Post| NavLink {
        title: post.title.clone(),
        permalink: post.permalink.clone(),
    };

    for (pos, &idx) in listed.iter().enumerate() {
        let prev = pos.checked_sub(1).map(|p| link(&posts[listed[p]]));
        let next = listed.get(pos + 1).map(|&n| link(&posts[n]));
        posts[idx].prev = prev;
        posts[idx].next = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{AuthorEntry, FrontMatter, InlineAuthor, TagEntry, TagRegistry};

    /// Renders markup verbatim so assertions stay independent of markdown
    struct Verbatim;

    impl MarkupRenderer for Verbatim {
        fn render(&self, markup: &str, asset_base: &str) -> anyhow::Result<String> {
            Ok(format!("[{}] {}", asset_base, markup))
        }

        fn plain_summary(&self, markup: &str) -> String {
            markup.lines().next().unwrap_or_default().to_string()
        }
    }

    fn source(path: &str, title: &str, tags: &[&str], body: &str) -> PostSource {
        let fm = FrontMatter {
            title: Some(title.to_string()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        };
        PostSource::new(path, fm, body)
    }

    fn sample_content() -> Content {
        let mut authors = crate::content::AuthorRegistry::new();
        authors.insert(
            "chris".to_string(),
            AuthorEntry {
                name: "Chris O'Malley".to_string(),
                ..Default::default()
            },
        );

        let mut posts = vec![
            source(
                "2024-05-27-git-configuration.md",
                "Git Configuration",
                &["git"],
                "Global settings.\n\n<!-- truncate -->\n\nMore.",
            ),
            source(
                "2024-10-16-ai-pr-descriptions.md",
                "AI PR Descriptions",
                &["azure-devops", "ai"],
                "Summaries.\n\n<!-- truncate -->\n\nMore.",
            ),
            source(
                "2025-04-06/index.md",
                "Terraform AzureRM Python Function",
                &["terraform", "azure"],
                "Functions.\n\n<!-- truncate -->\n\nMore.",
            ),
            source(
                "2025-04-12/index.md",
                "Azure Sandbox Nuke",
                &["terraform", "azure", "terraform"],
                "Nuke it.\n\n<!-- truncate -->\n\nMore.",
            ),
        ];
        for post in &mut posts {
            post.front_matter.authors = vec![AuthorRef::Key("chris".to_string())];
        }
        posts[3].front_matter.slug = Some("azure-sandbox-nuke".to_string());

        Content {
            posts,
            authors,
            tags: None,
        }
    }

    fn project(config: &SiteConfig, content: &Content) -> Result<SiteProjection, BuildError> {
        Projector::new(config, &Verbatim).project(content)
    }

    fn titles<'a>(site: &'a SiteProjection, indices: &'a [usize]) -> Vec<&'a str> {
        site.resolve(indices).map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_index_order_and_neighbours() {
        let config = SiteConfig::default();
        let site = project(&config, &sample_content()).unwrap();

        assert_eq!(site.index_pages.len(), 1);
        assert_eq!(
            titles(&site, &site.index_pages[0].posts),
            vec![
                "Azure Sandbox Nuke",
                "Terraform AzureRM Python Function",
                "AI PR Descriptions",
                "Git Configuration"
            ]
        );

        let b = &site.posts[1];
        assert_eq!(b.prev.as_ref().unwrap().title, "Azure Sandbox Nuke");
        assert_eq!(b.next.as_ref().unwrap().title, "AI PR Descriptions");
        assert!(site.posts[0].prev.is_none());
        assert!(site.posts[3].next.is_none());
    }

    #[test]
    fn test_tag_pages() {
        let config = SiteConfig::default();
        let site = project(&config, &sample_content()).unwrap();

        let terraform = site
            .tag_pages
            .iter()
            .find(|t| t.label == "terraform")
            .unwrap();
        assert_eq!(
            titles(&site, &terraform.posts),
            vec!["Azure Sandbox Nuke", "Terraform AzureRM Python Function"]
        );
        assert_eq!(terraform.permalink, "/tags/terraform");

        // Every tag page holds exactly the listed posts carrying the tag
        for page in &site.tag_pages {
            let expected: Vec<usize> = site
                .listed
                .iter()
                .copied()
                .filter(|&i| site.posts[i].tags.iter().any(|t| t.permalink == page.permalink))
                .collect();
            assert_eq!(page.posts, expected);
        }
        assert!(site.tag_pages.iter().all(|p| !p.posts.is_empty()));
    }

    #[test]
    fn test_slug_and_date_resolution() {
        let config = SiteConfig::default();
        let site = project(&config, &sample_content()).unwrap();

        let slugs: Vec<&str> = site.posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(
            slugs,
            vec![
                "azure-sandbox-nuke",
                "terraform-azurerm-python-function",
                "ai-pr-descriptions",
                "git-configuration"
            ]
        );
        assert_eq!(site.posts[0].permalink, "/azure-sandbox-nuke");
        assert_eq!(site.posts[3].date.to_rfc3339(), "2024-05-27T00:00:00+00:00");
    }

    #[test]
    fn test_summary_and_content() {
        let config = SiteConfig::default();
        let site = project(&config, &sample_content()).unwrap();
        let post = &site.posts[0];

        assert!(post.has_truncate_marker);
        assert_eq!(post.summary.as_deref(), Some("[/azure-sandbox-nuke] Nuke it."));
        assert_eq!(post.content, "[/azure-sandbox-nuke] Nuke it.\n\nMore.");
        assert!(!post.raw.contains("truncate"));
        assert_eq!(post.description, "Nuke it.");
        assert_eq!(post.reading_time, 3.0 / 200.0);
        assert_eq!(site.feed.entries[0].content, post.summary_html());
    }

    #[test]
    fn test_colliding_slugs_fail_the_build() {
        let config = SiteConfig::default();
        let mut content = sample_content();
        content.posts[0].front_matter.slug = Some("azure-sandbox-nuke".to_string());

        let err = project(&config, &content).unwrap_err();
        match err {
            BuildError::DuplicatePermalink {
                permalink,
                first,
                second,
            } => {
                assert_eq!(permalink, "/azure-sandbox-nuke");
                assert_eq!(first, "2025-04-12/index.md");
                assert_eq!(second, "2024-05-27-git-configuration.md");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_post_cannot_shadow_a_listing() {
        let config = SiteConfig::default();
        let mut content = sample_content();
        content.posts[0].front_matter.slug = Some("archive".to_string());
        assert!(matches!(
            project(&config, &content),
            Err(BuildError::DuplicatePermalink { .. })
        ));
    }

    #[test]
    fn test_index_slug_cannot_replace_the_home_page() {
        let config = SiteConfig::default();
        let mut content = sample_content();
        content.posts[0].front_matter.slug = Some("index".to_string());
        let err = project(&config, &content).unwrap_err();
        match err {
            BuildError::DuplicatePermalink { first, second, .. } => {
                assert_eq!(first, content.posts[0].source);
                assert_eq!(second, "index page 1");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_title_and_date() {
        let config = SiteConfig::default();

        let mut content = sample_content();
        content.posts[0].front_matter.title = Some("  ".to_string());
        assert!(matches!(
            project(&config, &content),
            Err(BuildError::MissingField { field: "title", .. })
        ));

        let content = Content {
            posts: vec![source("undated.md", "Undated", &[], "Body")],
            ..Default::default()
        };
        let err = project(&config, &content).unwrap_err();
        assert!(matches!(err, BuildError::MissingField { field: "date", .. }));
        assert_eq!(err.post(), Some("undated.md"));
    }

    #[test]
    fn test_invalid_dates() {
        let config = SiteConfig::default();
        let mut post = source("hello.md", "Hello", &[], "Body");
        post.front_matter.date = Some("next tuesday".to_string());
        let content = Content {
            posts: vec![post],
            ..Default::default()
        };
        assert!(matches!(
            project(&config, &content),
            Err(BuildError::InvalidDate { .. })
        ));

        let content = Content {
            posts: vec![source("2025-13-40-hello.md", "Hello", &[], "Body")],
            ..Default::default()
        };
        assert!(matches!(
            project(&config, &content),
            Err(BuildError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_date_prefix_below_a_folder() {
        let config = SiteConfig::default();
        let mut content = Content {
            posts: vec![
                source("notes/2025-04-12-azure-cleanup.md", "Azure Cleanup", &[], "a"),
                source("notes/2024-05-27/index.md", "Git Setup", &[], "b"),
                source("2023/01/02/new-year.md", "New Year", &[], "c"),
                source("Ops Notes/terraform-tips.md", "Tips", &[], "d"),
            ],
            ..Default::default()
        };
        content.posts[3].front_matter.date = Some("2022-06-01".to_string());
        let site = project(&config, &content).unwrap();

        let resolved: Vec<(&str, String)> = site
            .posts
            .iter()
            .map(|p| (p.slug.as_str(), p.date.format("%Y-%m-%d").to_string()))
            .collect();
        assert_eq!(
            resolved,
            vec![
                ("notes/azure-cleanup", "2025-04-12".to_string()),
                ("notes/git-setup", "2024-05-27".to_string()),
                ("new-year", "2023-01-02".to_string()),
                ("ops-notes/terraform-tips", "2022-06-01".to_string()),
            ]
        );
        assert_eq!(site.posts[0].permalink, "/notes/azure-cleanup");
    }

    #[test]
    fn test_ties_keep_declaration_order() {
        let config = SiteConfig::default();
        let content = Content {
            posts: vec![
                source("2025-01-01-first.md", "First", &[], "a"),
                source("2025-01-01-second.md", "Second", &[], "b"),
            ],
            ..Default::default()
        };
        let site = project(&config, &content).unwrap();
        assert_eq!(site.posts[0].title, "First");
        assert_eq!(site.posts[1].title, "Second");
    }

    #[test]
    fn test_unknown_author_is_fatal() {
        let config = SiteConfig::default();
        let mut content = sample_content();
        content.posts[2].front_matter.authors = vec![AuthorRef::Key("nobody".to_string())];
        match project(&config, &content).unwrap_err() {
            BuildError::UnknownAuthor { post, author } => {
                assert_eq!(post, "2025-04-06/index.md");
                assert_eq!(author, "nobody");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_report_policies() {
        let mut config = SiteConfig::default();
        let mut content = sample_content();
        content.posts[0].body = "No marker here.".to_string();
        content.posts[1].front_matter.authors = vec![AuthorRef::Inline(InlineAuthor {
            name: "Guest".to_string(),
            title: None,
            url: None,
            image_url: None,
        })];
        let mut registry = TagRegistry::new();
        registry.insert("terraform".to_string(), TagEntry::default());
        content.tags = Some(registry);

        // Default policies only warn
        let site = project(&config, &content).unwrap();
        let guest = site.posts.iter().find(|p| p.title == "AI PR Descriptions").unwrap();
        assert_eq!(guest.authors[0].name, "Guest");
        assert!(guest.authors[0].permalink.is_none());

        config.on_untruncated_posts = ReportPolicy::Throw;
        assert!(matches!(
            project(&config, &content),
            Err(BuildError::Untruncated { .. })
        ));

        config.on_untruncated_posts = ReportPolicy::Ignore;
        config.on_inline_authors = ReportPolicy::Throw;
        assert!(matches!(
            project(&config, &content),
            Err(BuildError::InlineAuthor { .. })
        ));

        config.on_inline_authors = ReportPolicy::Log;
        config.on_inline_tags = ReportPolicy::Throw;
        assert!(matches!(
            project(&config, &content),
            Err(BuildError::InlineTag { .. })
        ));
    }

    #[test]
    fn test_unlisted_posts_are_hidden_from_listings() {
        let config = SiteConfig::default();
        let mut content = sample_content();
        content.posts[2].front_matter.unlisted = true;

        let site = project(&config, &content).unwrap();
        assert_eq!(site.posts.len(), 4);
        assert_eq!(site.listed.len(), 3);

        let hidden = site
            .posts
            .iter()
            .find(|p| p.title == "Terraform AzureRM Python Function")
            .unwrap();
        assert!(hidden.prev.is_none() && hidden.next.is_none());
        assert!(site.feed.entries.iter().all(|e| e.title != hidden.title));
        assert!(site
            .tag_pages
            .iter()
            .all(|t| site.resolve(&t.posts).all(|p| !p.unlisted)));

        // Neighbours skip over the unlisted post
        let a = &site.posts[0];
        assert_eq!(a.next.as_ref().unwrap().title, "AI PR Descriptions");

        let route = site
            .routes
            .routes()
            .iter()
            .find(|r| r.permalink == hidden.permalink)
            .unwrap();
        assert!(!route.listed);
    }

    #[test]
    fn test_pagination_and_feed_limit() {
        let mut config = SiteConfig::default();
        config.per_page = 3;
        config.feed.limit = Some(2);
        let site = project(&config, &sample_content()).unwrap();

        assert_eq!(site.index_pages.len(), 2);
        assert_eq!(site.index_pages[1].permalink, "/page/2");
        assert_eq!(site.feed.entries.len(), 2);
        assert_eq!(site.feed.entries[0].link, "https://example.com/azure-sandbox-nuke");
        assert_eq!(site.feed.updated, Some(site.posts[0].date));
    }

    #[test]
    fn test_archive_and_authors() {
        let config = SiteConfig::default();
        let site = project(&config, &sample_content()).unwrap();

        let years: Vec<i32> = site.archive.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![2025, 2024]);
        assert_eq!(
            titles(&site, &site.archive[1].posts),
            vec!["AI PR Descriptions", "Git Configuration"]
        );

        assert_eq!(site.author_pages.len(), 1);
        assert_eq!(site.author_pages[0].permalink, "/authors/chris");
        assert_eq!(site.author_pages[0].posts, site.listed);
    }

    #[test]
    fn test_edit_url() {
        let mut config = SiteConfig::default();
        config.edit_url = Some("https://github.com/thecomalley/blog/tree/main/blog/".to_string());
        let site = project(&config, &sample_content()).unwrap();
        assert_eq!(
            site.posts[0].edit_url.as_deref(),
            Some("https://github.com/thecomalley/blog/tree/main/blog/2025-04-12/index.md")
        );
    }

    #[test]
    fn test_empty_collection() {
        let config = SiteConfig::default();
        let site = project(&config, &Content::default()).unwrap();
        assert_eq!(site.index_pages.len(), 1);
        assert!(site.tag_pages.is_empty());
        assert!(site.feed.entries.is_empty());
        assert!(site.routes.contains("/"));
    }

    #[test]
    fn test_tags_sharing_a_segment_share_a_page() {
        let config = SiteConfig::default();
        let content = Content {
            posts: vec![
                source("2025-01-01-a.md", "A", &["Function App"], "a"),
                source("2025-01-02-b.md", "B", &["function-app"], "b"),
                source("2025-01-03-c.md", "C", &["Terraform", "terraform"], "c"),
            ],
            ..Default::default()
        };
        let site = project(&config, &content).unwrap();

        assert_eq!(site.tag_pages.len(), 2);
        let function_app = &site.tag_pages[0];
        assert_eq!(function_app.permalink, "/tags/function-app");
        // Newest first; the label comes from the first post seen
        assert_eq!(function_app.label, "function-app");
        let titles: Vec<&str> = site
            .resolve(&function_app.posts)
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(titles, vec!["B", "A"]);

        let terraform = &site.tag_pages[1];
        assert_eq!(terraform.permalink, "/tags/terraform");
        assert_eq!(terraform.label, "Terraform");
        assert_eq!(terraform.posts.len(), 1);
    }
}

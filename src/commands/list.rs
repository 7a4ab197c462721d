//! List site content

use anyhow::Result;

use crate::content::loader::ContentLoader;
use crate::content::MarkdownRenderer;
use crate::projector::{Projector, SiteProjection};
use crate::Folio;

/// Project the site without rendering anything
fn project(folio: &Folio) -> Result<SiteProjection> {
    let content = ContentLoader::new(folio).load()?;
    let markdown = MarkdownRenderer::new();
    Ok(Projector::new(&folio.config, &markdown).project(&content)?)
}

/// List site content by type
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let site = project(folio)?;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", site.posts.len());
            for post in &site.posts {
                println!(
                    "  {} - {} [{}] {}{}",
                    post.date.format("%Y-%m-%d"),
                    post.title,
                    post.source,
                    post.permalink,
                    if post.unlisted { " (unlisted)" } else { "" }
                );
            }
        }
        "tag" | "tags" => {
            println!("Tags ({}):", site.tag_pages.len());
            let mut tags: Vec<_> = site.tag_pages.iter().collect();
            tags.sort_by(|a, b| b.posts.len().cmp(&a.posts.len()));
            for tag in tags {
                println!("  {} ({}) {}", tag.label, tag.posts.len(), tag.permalink);
            }
        }
        "author" | "authors" => {
            println!("Authors ({}):", site.author_pages.len());
            for page in &site.author_pages {
                println!(
                    "  {} <{}> ({})",
                    page.author.name,
                    page.key,
                    page.posts.len()
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, author",
                content_type
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    #[test]
    fn test_unknown_type() {
        let dir = TempDir::new().unwrap();
        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        assert!(run(&folio, "post").is_ok());
        assert!(run(&folio, "category").is_err());
    }
}

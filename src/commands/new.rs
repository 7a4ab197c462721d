//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Folio;

/// Create `<blog_dir>/<date>-<slug>/index.md` and return its path
pub fn create_post(folio: &Folio, title: &str, slug: Option<&str>) -> Result<PathBuf> {
    let now = chrono::Local::now();

    let slug = match slug {
        Some(s) => slug::slugify(s),
        None => slug::slugify(title),
    };
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a slug from {:?}; pass --slug", title);
    }

    let target_dir = folio
        .blog_dir
        .join(format!("{}-{}", now.format("%Y-%m-%d"), slug));
    let file_path = target_dir.join("index.md");

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let content = format!(
        "---\ntitle: {}\nslug: {}\ndate: {}\ntags: []\n---\n\nSummary goes here.\n\n{}\n\nThe rest of the post.\n",
        yaml_string(title),
        slug,
        now.format("%Y-%m-%dT%H:%M:%S%:z"),
        folio.config.truncate_marker
    );

    fs::create_dir_all(&target_dir)?;
    fs::write(&file_path, content)?;

    println!("Created: {:?}", file_path);

    Ok(file_path)
}

/// Quote a title so it survives YAML parsing
fn yaml_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

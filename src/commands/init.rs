//! Initialize a new blog site

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"# folio-rs configuration

# Site
title: My Site
tagline: Notes on building things
language: en

# URL
url: https://example.com
base_url: /
route_base_path: /
trailing_slash: false

# Directory
blog_dir: blog
static_dir: static
public_dir: build

# Writing
per_page: 10
words_per_minute: 200
truncate_marker: "<!-- truncate -->"
show_reading_time: true
render_drafts: false
# edit_url: https://github.com/you/site/tree/main/blog

# Validation: ignore | log | warn | throw
on_inline_tags: warn
on_inline_authors: warn
on_untruncated_posts: warn

# Feed
feed:
  types: [rss, atom]
  limit: 20

highlight:
  theme: base16-ocean.dark
  line_number: false

navbar:
  items:
    - label: Archive
      to: /archive
    - label: Tags
      to: /tags

footer:
  copyright: "Copyright © My Site. Built with folio-rs."
"#;

const AUTHORS: &str = r#"me:
  name: Your Name
  title: Writer
  url: https://example.com
  socials:
    github: https://github.com/
"#;

const TAGS: &str = r#"welcome:
  label: Welcome
  permalink: welcome
  description: Getting started
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("{:?} already contains a site", target_dir);
    }

    let blog_dir = target_dir.join("blog");
    fs::create_dir_all(&blog_dir)
        .with_context(|| format!("Failed to create {:?}", blog_dir))?;
    fs::create_dir_all(target_dir.join("static/img"))?;

    fs::write(&config_path, CONFIG)?;
    fs::write(blog_dir.join("authors.yml"), AUTHORS)?;
    fs::write(blog_dir.join("tags.yml"), TAGS)?;

    let today = chrono::Local::now().date_naive();
    let post_dir = blog_dir.join(format!("{}-welcome", today.format("%Y-%m-%d")));
    fs::create_dir_all(&post_dir)?;
    fs::write(
        post_dir.join("index.md"),
        r#"---
title: Welcome
authors: [me]
tags: [welcome]
---

This is your first post. Everything above the truncation marker shows up on
the index page and in the feeds.

<!-- truncate -->

## Writing

Create a new post with `folio-rs new "My New Post"`. Posts live under
`blog/`; a post stored as `blog/<date>-<name>/index.md` can keep its images
next to it and link them relatively.

## Previewing

Run `folio-rs serve` and open http://localhost:3000.

## Publishing

Run `folio-rs generate` and upload the `build/` directory.
"#,
    )?;

    Ok(())
}

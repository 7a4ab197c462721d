//! Generate static files

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::content::loader::ContentLoader;
use crate::content::MarkdownRenderer;
use crate::generator::Generator;
use crate::projector::Projector;
use crate::Folio;

/// Generate the whole site: load, project, render, commit
pub fn run(folio: &Folio) -> Result<()> {
    let start = Instant::now();
    folio.check_public_dir()?;

    let content = ContentLoader::new(folio).load()?;
    tracing::info!(
        "Loaded {} posts, {} authors",
        content.posts.len(),
        content.authors.len()
    );

    let highlight = &folio.config.highlight;
    let markdown = MarkdownRenderer::with_options(&highlight.theme, highlight.line_number);
    let site = Projector::new(&folio.config, &markdown).project(&content)?;

    Generator::new(folio)?.generate(&site)?;

    tracing::info!("Generated in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

/// Paths whose changes trigger a rebuild
pub fn watched_paths(folio: &Folio) -> Vec<PathBuf> {
    [
        folio.blog_dir.clone(),
        folio.static_dir.clone(),
        folio.base_dir.join("_config.yml"),
    ]
    .into_iter()
    .filter(|p| p.exists())
    .collect()
}

/// Block until the watcher stops, calling `on_change` after each debounced
/// batch of relevant file events
pub fn watch_with<F>(paths: &[PathBuf], mut on_change: F) -> Result<()>
where
    F: FnMut(&[PathBuf]),
{
    let (tx, rx) = channel::<DebounceEventResult>();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for path in paths {
        let mode = if path.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        debouncer.watcher().watch(path, mode)?;
        tracing::debug!("Watching: {:?}", path);
    }

    for result in rx {
        match result {
            Ok(events) => {
                let changed: Vec<PathBuf> = events
                    .into_iter()
                    .map(|e| e.path)
                    .filter(|p| is_relevant(p))
                    .collect();
                if changed.is_empty() {
                    continue;
                }
                for path in &changed {
                    tracing::info!("File changed: {}", path.display());
                }
                on_change(&changed);
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}

/// Watch the site and regenerate on every change. A failed rebuild is
/// logged and leaves the previous output in place.
pub fn watch(folio: &Folio) -> Result<()> {
    let base_dir = folio.base_dir.clone();
    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    watch_with(&watched_paths(folio), |_| {
        // Reload so edits to _config.yml take effect
        match Folio::new(&base_dir).and_then(|folio| run(&folio)) {
            Ok(()) => tracing::info!("Regenerated successfully"),
            Err(e) => tracing::error!("Generation failed: {:#}", e),
        }
    })
}

/// Editor swap files and VCS internals never affect the output
fn is_relevant(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}

//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Folio;

/// Remove the public directory and any staging directory a crashed build
/// left beside it
pub fn run(folio: &Folio) -> Result<()> {
    folio.check_public_dir()?;
    if folio.public_dir.exists() {
        fs::remove_dir_all(&folio.public_dir)?;
        tracing::info!("Deleted: {:?}", folio.public_dir);
    }

    if let Some(parent) = folio.public_dir.parent().filter(|p| p.is_dir()) {
        for entry in fs::read_dir(parent)?.filter_map(|e| e.ok()) {
            let is_staging = entry
                .file_name()
                .to_string_lossy()
                .starts_with(".folio-build-");
            if is_staging && entry.path().is_dir() {
                fs::remove_dir_all(entry.path())?;
                tracing::info!("Deleted: {:?}", entry.path());
            }
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
    fn test_clean_removes_output_and_staging() {
        let dir = TempDir::new().unwrap();
        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        fs::create_dir_all(folio.public_dir.join("tags")).unwrap();
        fs::create_dir_all(dir.path().join(".folio-build-abc123")).unwrap();
        fs::create_dir_all(dir.path().join("blog")).unwrap();

        run(&folio).unwrap();

        assert!(!folio.public_dir.exists());
        assert!(!dir.path().join(".folio-build-abc123").exists());
        assert!(dir.path().join("blog").exists());
    }

    #[test]
    fn test_clean_refuses_the_site_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("blog")).unwrap();
        let mut config = SiteConfig::default();
        config.public_dir = ".".to_string();
        let folio = Folio::with_config(dir.path(), config);

        assert!(run(&folio).is_err());
        assert!(dir.path().join("blog").exists());
    }

    #[test]
    fn test_clean_without_output_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        run(&folio).unwrap();
    }
}

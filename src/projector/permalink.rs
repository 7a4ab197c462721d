//! Permalink resolution and the route table

use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::SiteConfig;
use crate::error::BuildError;
use crate::helpers::{blog_url_for, output_path_for};

/// Canonical URL path of a post: `<base_url>/<route_base_path>/<slug>`
pub fn resolve_permalink(config: &SiteConfig, slug: &str) -> String {
    blog_url_for(config, slug)
}

/// A route produced by the projection
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub permalink: String,
    /// What produced the route (a post source path or a listing name)
    pub owner: String,
    /// File the route is written to, relative to the output directory
    pub output: PathBuf,
    /// Listed in the sitemap
    pub listed: bool,
}

/// Every permalink the projection produces, in registration order.
///
/// Routes are keyed by the file they are written to: `/a/b` and `/a/b/`
/// collide, and so do `/index` and `/` when pages are written as
/// `<route>.html`. Registration fails on the second claim to a file.
#[derive(Debug)]
pub struct RouteTable {
    config: SiteConfig,
    routes: Vec<Route>,
    index: HashMap<PathBuf, usize>,
}

impl RouteTable {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            config: config.clone(),
            routes: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Claim `permalink` for `owner`
    pub fn register(
        &mut self,
        permalink: &str,
        owner: impl Into<String>,
        listed: bool,
    ) -> Result<(), BuildError> {
        let owner = owner.into();
        let output = output_path_for(&self.config, permalink);
        if let Some(&existing) = self.index.get(&output) {
            return Err(BuildError::DuplicatePermalink {
                permalink: permalink.to_string(),
                first: self.routes[existing].owner.clone(),
                second: owner,
            });
        }
        self.index.insert(output.clone(), self.routes.len());
        self.routes.push(Route {
            permalink: permalink.to_string(),
            owner,
            output,
            listed,
        });
        Ok(())
    }

    pub fn contains(&self, permalink: &str) -> bool {
        self.index
            .contains_key(&output_path_for(&self.config, permalink))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

//! URL helper functions

use std::path::PathBuf;

use crate::config::SiteConfig;

/// Join path segments into an absolute URL path with single slashes.
///
/// `.` and `..` segments are dropped so that no route can point outside the
/// output directory.
///
/// # Examples
/// ```ignore
/// join_url(&["/blog/", "/tags/", "azure"]) // -> "/blog/tags/azure"
/// ```
pub fn join_url(segments: &[&str]) -> String {
    let parts: Vec<&str> = segments
        .iter()
        .flat_map(|s| s.split('/'))
        .filter(|p| !p.is_empty() && *p != "." && *p != "..")
        .collect();

    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Generate a route under the site base path, honoring `trailing_slash`
///
/// # Examples
/// ```ignore
/// url_for(&config, "archive") // -> "/blog/archive"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    with_trailing_slash(config, join_url(&[&config.base_url, path]))
}

/// Generate a route under the blog root (`base_url` + `route_base_path`)
pub fn blog_url_for(config: &SiteConfig, path: &str) -> String {
    with_trailing_slash(
        config,
        join_url(&[&config.base_url, &config.route_base_path, path]),
    )
}

/// URL of a file under the blog root; files never take a trailing slash
pub fn blog_file_url_for(config: &SiteConfig, path: &str) -> String {
    join_url(&[&config.base_url, &config.route_base_path, path])
}

/// URL of a file under the site base path
pub fn file_url_for(config: &SiteConfig, path: &str) -> String {
    join_url(&[&config.base_url, path])
}

fn with_trailing_slash(config: &SiteConfig, path: String) -> String {
    if config.trailing_slash && path != "/" {
        format!("{}/", path)
    } else {
        path
    }
}

/// Generate a full URL including the domain for a route
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/blog/about") // -> "https://example.com/blog/about"
/// ```
pub fn full_url_for(config: &SiteConfig, route: &str) -> String {
    let base = config.url.trim_end_matches('/');
    if route.starts_with('/') {
        format!("{}{}", base, route)
    } else {
        format!("{}/{}", base, route)
    }
}

/// Route relative to the base path, without surrounding slashes
fn relative_route<'a>(config: &SiteConfig, route: &'a str) -> &'a str {
    let base = join_url(&[&config.base_url]);
    let rel = if base == "/" {
        route
    } else {
        match route.strip_prefix(base.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => route,
        }
    };
    rel.trim_matches('/')
}

/// File path (relative to the output directory) a route is written to
///
/// # Examples
/// ```ignore
/// output_path_for(&config, "/")          // -> "index.html"
/// output_path_for(&config, "/page/2")    // -> "page/2.html"
/// output_path_for(&config, "/page/2/")   // -> "page/2/index.html" (trailing_slash)
/// ```
pub fn output_path_for(config: &SiteConfig, route: &str) -> PathBuf {
    let rel = relative_route(config, route);
    if rel.is_empty() {
        PathBuf::from("index.html")
    } else if config.trailing_slash {
        PathBuf::from(rel).join("index.html")
    } else {
        PathBuf::from(format!("{}.html", rel))
    }
}

/// Path of a route relative to the output directory, without any file name
/// mapping: a post's asset directory, or a file such as `rss.xml`
pub fn relative_path_for(config: &SiteConfig, route: &str) -> PathBuf {
    PathBuf::from(relative_route(config, route))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://example.com/".to_string();
        config.base_url = "/blog/".to_string();
        config
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url(&["/", "/"]), "/");
        assert_eq!(join_url(&["/blog/", "/tags/", "azure"]), "/blog/tags/azure");
        assert_eq!(join_url(&["/", "../../etc/passwd"]), "/etc/passwd");
    }

    #[test]
    fn test_url_for() {
        let mut config = test_config();
        assert_eq!(url_for(&config, "/archive"), "/blog/archive");
        assert_eq!(url_for(&config, ""), "/blog");
        config.trailing_slash = true;
        assert_eq!(url_for(&config, "archive"), "/blog/archive/");
    }

    #[test]
    fn test_blog_url_for() {
        let mut config = test_config();
        config.route_base_path = "posts".to_string();
        assert_eq!(blog_url_for(&config, "hello"), "/blog/posts/hello");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/blog/about"),
            "https://example.com/blog/about"
        );
    }

    #[test]
    fn test_output_path_for() {
        let mut config = test_config();
        assert_eq!(output_path_for(&config, "/blog"), PathBuf::from("index.html"));
        assert_eq!(
            output_path_for(&config, "/blog/page/2"),
            PathBuf::from("page/2.html")
        );
        config.trailing_slash = true;
        assert_eq!(
            output_path_for(&config, "/blog/page/2/"),
            PathBuf::from("page/2/index.html")
        );
        // Routes that merely share a prefix with the base path are kept whole
        assert_eq!(
            output_path_for(&config, "/blogroll"),
            PathBuf::from("blogroll/index.html")
        );
    }

    #[test]
    fn test_relative_path_for() {
        let config = test_config();
        assert_eq!(
            relative_path_for(&config, "/blog/azure-sandbox-nuke"),
            PathBuf::from("azure-sandbox-nuke")
        );
    }

    #[test]
    fn test_file_urls_ignore_trailing_slash() {
        let mut config = test_config();
        config.trailing_slash = true;
        assert_eq!(blog_file_url_for(&config, "rss.xml"), "/blog/rss.xml");
        assert_eq!(file_url_for(&config, "sitemap.xml"), "/blog/sitemap.xml");
        assert_eq!(
            relative_path_for(&config, &blog_file_url_for(&config, "rss.xml")),
            PathBuf::from("rss.xml")
        );
    }
}

//! Syndication feed: one document, rendered as RSS 2.0 or Atom 1.0

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{FeedType, SiteConfig};
use crate::content::Post;
use crate::helpers::{blog_file_url_for, blog_url_for, date_rfc2822, date_xml, full_url_for};

/// Feed-ready projection of the listed posts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedDocument {
    pub title: String,
    pub description: String,
    /// Absolute URL of the blog root
    pub link: String,
    pub language: String,
    pub copyright: Option<String>,
    /// Site author, credited on the feed as a whole
    pub author: Option<String>,
    /// Date of the newest entry; `None` for an empty feed
    pub updated: Option<DateTime<Utc>>,
    /// Entries newest first, same order as the index
    pub entries: Vec<FeedEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntry {
    pub title: String,
    /// Absolute URL
    pub link: String,
    pub published: DateTime<Utc>,
    pub description: String,
    /// Summary HTML when the post is truncated, full HTML otherwise
    pub content: String,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
}

/// Absolute URL of a feed file
pub fn feed_url(config: &SiteConfig, feed_type: FeedType) -> String {
    full_url_for(config, &blog_file_url_for(config, feed_type.file_name()))
}

/// Project the newest `feed.limit` listed posts into a feed document
pub fn build_feed(config: &SiteConfig, posts: &[Post], listed: &[usize]) -> FeedDocument {
    let base_url = config.url.trim_end_matches('/');
    let limit = config.feed.limit.unwrap_or(usize::MAX);

    let entries: Vec<FeedEntry> = listed
        .iter()
        .take(limit)
        .map(|&idx| {
            let post = &posts[idx];
            FeedEntry {
                title: post.title.clone(),
                link: full_url_for(config, &post.permalink),
                published: post.date,
                description: post.description.clone(),
                content: strip_invalid_xml_chars(&convert_relative_urls_to_absolute(
                    post.summary_html(),
                    base_url,
                )),
                authors: post.authors.iter().map(|a| a.name.clone()).collect(),
                categories: post.tags.iter().map(|t| t.label.clone()).collect(),
            }
        })
        .collect();

    FeedDocument {
        title: config.feed_title().to_string(),
        description: config.feed_description(),
        link: full_url_for(config, &blog_url_for(config, "")),
        language: config.language.clone(),
        copyright: config.feed.copyright.clone(),
        author: Some(config.author.trim())
            .filter(|a| !a.is_empty())
            .map(str::to_string),
        updated: entries.first().map(|e| e.published),
        entries,
    }
}

/// Render the feed as RSS 2.0
pub fn render_rss(feed: &FeedDocument, self_url: &str) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom" xmlns:content="http://purl.org/rss/1.0/modules/content/">"#);
    xml.push('\n');
    xml.push_str("  <channel>\n");
    xml.push_str(&format!("    <title>{}</title>\n", escape_xml(&feed.title)));
    xml.push_str(&format!("    <link>{}</link>\n", escape_xml(&feed.link)));
    xml.push_str(&format!(
        "    <atom:link href=\"{}\" rel=\"self\" type=\"application/rss+xml\"/>\n",
        escape_xml(self_url)
    ));
    xml.push_str(&format!(
        "    <description>{}</description>\n",
        escape_xml(&feed.description)
    ));
    xml.push_str(&format!(
        "    <language>{}</language>\n",
        escape_xml(&feed.language)
    ));
    if let Some(copyright) = &feed.copyright {
        xml.push_str(&format!(
            "    <copyright>{}</copyright>\n",
            escape_xml(copyright)
        ));
    }
    if let Some(updated) = &feed.updated {
        xml.push_str(&format!(
            "    <lastBuildDate>{}</lastBuildDate>\n",
            date_rfc2822(updated)
        ));
    }

    for entry in &feed.entries {
        xml.push_str("    <item>\n");
        xml.push_str(&format!("      <title>{}</title>\n", escape_xml(&entry.title)));
        xml.push_str(&format!("      <link>{}</link>\n", escape_xml(&entry.link)));
        xml.push_str(&format!("      <guid>{}</guid>\n", escape_xml(&entry.link)));
        xml.push_str(&format!(
            "      <pubDate>{}</pubDate>\n",
            date_rfc2822(&entry.published)
        ));
        xml.push_str(&format!(
            "      <description>{}</description>\n",
            escape_xml(&entry.description)
        ));
        xml.push_str(&format!(
            "      <content:encoded><![CDATA[{}]]></content:encoded>\n",
            escape_cdata(&entry.content)
        ));
        for category in &entry.categories {
            xml.push_str(&format!(
                "      <category>{}</category>\n",
                escape_xml(category)
            ));
        }
        xml.push_str("    </item>\n");
    }

    xml.push_str("  </channel>\n");
    xml.push_str("</rss>\n");
    xml
}

/// Render the feed as Atom 1.0
pub fn render_atom(feed: &FeedDocument, self_url: &str) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
    xml.push('\n');
    xml.push_str(&format!("  <id>{}</id>\n", escape_xml(&feed.link)));
    xml.push_str(&format!("  <title>{}</title>\n", escape_xml(&feed.title)));
    xml.push_str(&format!(
        "  <subtitle>{}</subtitle>\n",
        escape_xml(&feed.description)
    ));
    xml.push_str(&format!(
        "  <link href=\"{}\" rel=\"self\"/>\n",
        escape_xml(self_url)
    ));
    xml.push_str(&format!("  <link href=\"{}\"/>\n", escape_xml(&feed.link)));
    // Atom requires <updated>; an empty feed falls back to the epoch so the
    // output stays reproducible
    let updated = feed.updated.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    xml.push_str(&format!("  <updated>{}</updated>\n", date_xml(&updated)));
    if let Some(copyright) = &feed.copyright {
        xml.push_str(&format!("  <rights>{}</rights>\n", escape_xml(copyright)));
    }
    if let Some(author) = &feed.author {
        xml.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            escape_xml(author)
        ));
    }

    for entry in &feed.entries {
        xml.push_str("  <entry>\n");
        xml.push_str(&format!("    <title>{}</title>\n", escape_xml(&entry.title)));
        xml.push_str(&format!("    <link href=\"{}\"/>\n", escape_xml(&entry.link)));
        xml.push_str(&format!("    <id>{}</id>\n", escape_xml(&entry.link)));
        xml.push_str(&format!(
            "    <published>{}</published>\n",
            date_xml(&entry.published)
        ));
        xml.push_str(&format!(
            "    <updated>{}</updated>\n",
            date_xml(&entry.published)
        ));
        for author in &entry.authors {
            xml.push_str(&format!(
                "    <author><name>{}</name></author>\n",
                escape_xml(author)
            ));
        }
        xml.push_str(&format!(
            "    <summary>{}</summary>\n",
            escape_xml(&entry.description)
        ));
        xml.push_str(&format!(
            "    <content type=\"html\"><![CDATA[{}]]></content>\n",
            escape_cdata(&entry.content)
        ));
        for category in &entry.categories {
            xml.push_str(&format!(
                "    <category label=\"{}\" term=\"{}\"/>\n",
                escape_xml(category),
                escape_xml(category)
            ));
        }
        xml.push_str("  </entry>\n");
    }

    xml.push_str("</feed>\n");
    xml
}

/// Render the feed in the requested format
pub fn render_feed(feed: &FeedDocument, feed_type: FeedType, self_url: &str) -> String {
    match feed_type {
        FeedType::Rss => render_rss(feed, self_url),
        FeedType::Atom => render_atom(feed, self_url),
    }
}

/// Escape XML special characters
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// `]]>` would end the CDATA section early
fn escape_cdata(s: &str) -> String {
    s.replace("]]>", "]]]]><![CDATA[>")
}

/// Convert root-relative URLs in HTML content to absolute URLs
fn convert_relative_urls_to_absolute(content: &str, base_url: &str) -> String {
    content
        .replace("href=\"/", &format!("href=\"{}/", base_url))
        .replace("src=\"/", &format!("src=\"{}/", base_url))
        .replace("href='/", &format!("href='{}/", base_url))
        .replace("src='/", &format!("src='{}/", base_url))
}

/// Strip invalid XML control characters (except tab, newline, carriage return)
/// XML 1.0 only allows: #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}

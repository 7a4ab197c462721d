//! Markdown rendering with syntax highlighting

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::projector::MarkupRenderer;

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    fn options() -> Options {
        // Front-matter is stripped before we get here, so no YAML metadata blocks
        Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        self.render_with_base(markdown, None)
    }

    /// Render markdown to HTML, resolving relative link and image targets
    /// against `asset_base`
    pub fn render_with_base(&self, markdown: &str, asset_base: Option<&str>) -> Result<String> {
        let parser = Parser::new_ext(markdown, Self::options());

        let mut events: Vec<Event> = Vec::new();
        let mut in_code_block = false;
        let mut code_block_lang: Option<String> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_block_lang = match kind {
                        CodeBlockKind::Fenced(lang) => {
                            // Drop fence attributes like ```bash title="run.sh"
                            let lang = lang.split_whitespace().next().unwrap_or("").to_string();
                            if lang.is_empty() {
                                None
                            } else {
                                Some(lang)
                            }
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let highlighted =
                        self.highlight_code(&code_block_content, code_block_lang.as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                    in_code_block = false;
                    code_block_lang = None;
                }
                Event::Text(text) if in_code_block => {
                    code_block_content.push_str(&text);
                }
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    events.push(Event::Start(Tag::Image {
                        link_type,
                        dest_url: rebase(dest_url, asset_base),
                        title,
                        id,
                    }));
                }
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    events.push(Event::Start(Tag::Link {
                        link_type,
                        dest_url: rebase(dest_url, asset_base),
                        title,
                        id,
                    }));
                }
                _ => {
                    if !in_code_block {
                        events.push(event);
                    }
                }
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");
        let class = html_escape(lang);

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme.and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        match highlighted {
            Some(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, &class),
            Some(highlighted) => format!(
                r#"<div class="highlight language-{}">{}</div>"#,
                class, highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                class,
                html_escape(code)
            ),
        }
    }

    /// Add line numbers to highlighted code; `class` is already escaped
    fn add_line_numbers(&self, code: &str, class: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();
        let line_count = lines.len();

        let mut gutter = String::new();
        let mut code_lines = String::new();

        for (i, line) in lines.iter().enumerate() {
            gutter.push_str(&format!(r#"<span class="line-number">{}</span>"#, i + 1));
            code_lines.push_str(line);
            if i + 1 < line_count {
                gutter.push('\n');
                code_lines.push('\n');
            }
        }

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre>{}</pre></td></tr></table></figure>"#,
            class, gutter, code_lines
        )
    }

    /// Split content at the truncation marker.
    ///
    /// Returns `(summary, full)`: the summary is the markdown before the marker
    /// (only when the marker is present), the full body is the content with
    /// the marker removed. Whitespace inside the marker is not significant,
    /// and a comment marker also matches its MDX form: `<!-- truncate -->`
    /// accepts `<!--truncate-->` and `{/* truncate */}`.
    pub fn split_summary(content: &str, marker: &str) -> (Option<String>, String) {
        let found = match marker_regex(marker) {
            Some(re) => re.find(content).map(|m| (m.start(), m.end())),
            None => content.find(marker).map(|pos| (pos, pos + marker.len())),
        };

        if let Some((start, end)) = found {
            let summary = content[..start].trim().to_string();
            let remaining = content[end..].trim();
            let full = if remaining.is_empty() {
                summary.clone()
            } else {
                format!("{}\n\n{}", summary, remaining)
            };
            (Some(summary), full)
        } else {
            (None, content.to_string())
        }
    }

    /// Plain text of the first paragraph that has any text in it
    pub fn first_paragraph_text(markdown: &str) -> String {
        let mut in_paragraph = false;
        let mut image_depth = 0usize;
        let mut text = String::new();

        for event in Parser::new_ext(markdown, Self::options()) {
            match event {
                Event::Start(Tag::Paragraph) => {
                    in_paragraph = true;
                    text.clear();
                }
                Event::End(TagEnd::Paragraph) => {
                    in_paragraph = false;
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        return trimmed.to_string();
                    }
                }
                // Alt text is not prose
                Event::Start(Tag::Image { .. }) => image_depth += 1,
                Event::End(TagEnd::Image) => image_depth = image_depth.saturating_sub(1),
                Event::Text(t) | Event::Code(t) if in_paragraph && image_depth == 0 => {
                    text.push_str(&t)
                }
                Event::SoftBreak | Event::HardBreak if in_paragraph => text.push(' '),
                _ => {}
            }
        }

        String::new()
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupRenderer for MarkdownRenderer {
    fn render(&self, markup: &str, asset_base: &str) -> Result<String> {
        self.render_with_base(markup, Some(asset_base))
    }

    fn plain_summary(&self, markup: &str) -> String {
        Self::first_paragraph_text(markup)
    }
}

/// Resolve a relative link target against the post's asset base
fn rebase<'a>(dest: CowStr<'a>, base: Option<&str>) -> CowStr<'a> {
    match base {
        Some(base) if is_relative(&dest) => {
            let rel = dest.trim_start_matches("./");
            CowStr::from(format!("{}/{}", base.trim_end_matches('/'), rel))
        }
        _ => dest,
    }
}

fn is_relative(dest: &str) -> bool {
    if dest.is_empty() || dest.starts_with('/') || dest.starts_with('#') {
        return false;
    }
    // Anything with a scheme (https:, mailto:, data:) before the first slash
    match dest.find(':') {
        Some(colon) => dest.find('/').map(|slash| slash < colon).unwrap_or(false),
        None => true,
    }
}

/// Whitespace-tolerant pattern for a truncation marker
fn marker_regex(marker: &str) -> Option<Regex> {
    let words = |s: &str| {
        s.split_whitespace()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"\s+")
    };

    let marker = marker.trim();
    let pattern = match marker
        .strip_prefix("<!--")
        .and_then(|m| m.strip_suffix("-->"))
    {
        Some(inner) if !inner.trim().is_empty() => {
            let inner = words(inner);
            format!(r"<!--\s*{inner}\s*-->|\{{/\*\s*{inner}\s*\*/\}}")
        }
        _ => words(marker),
    };
    if pattern.is_empty() {
        return None;
    }
    Regex::new(&pattern).ok()
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

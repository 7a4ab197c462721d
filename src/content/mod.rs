//! Content module - handles posts, registries, and markdown processing

mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use frontmatter::{parse_date_string, AuthorRef, FrontMatter, InlineAuthor};
pub use markdown::MarkdownRenderer;
pub use post::{
    Author, AuthorEntry, AuthorRegistry, Content, NavLink, Post, PostSource, TagEntry, TagRef,
    TagRegistry,
};

//! Build errors
//!
//! Every failure the loader or projector can report. All of them are fatal:
//! a build that hits one writes nothing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Post {post}: missing required field `{field}`")]
    MissingField { post: String, field: &'static str },

    #[error("Post {post}: invalid front-matter: {message}")]
    InvalidFrontMatter { post: String, message: String },

    #[error("Post {post}: invalid date {value:?}")]
    InvalidDate { post: String, value: String },

    #[error("Duplicate permalink {permalink}: produced by both {first} and {second}")]
    DuplicatePermalink {
        permalink: String,
        first: String,
        second: String,
    },

    #[error("Post {post}: unknown author key `{author}`")]
    UnknownAuthor { post: String, author: String },

    #[error("Post {post}: tag `{tag}` is not declared in tags.yml")]
    InlineTag { post: String, tag: String },

    #[error("Post {post}: inline author `{author}` is not declared in authors.yml")]
    InlineAuthor { post: String, author: String },

    #[error("Post {post}: no truncation marker found")]
    Untruncated { post: String },

    #[error("Post {post}: failed to render: {message}")]
    Render { post: String, message: String },

    #[error("Failed to parse {file}: {message}")]
    Registry { file: String, message: String },
}

impl BuildError {
    /// Identifier of the offending post, when the error belongs to one
    pub fn post(&self) -> Option<&str> {
        match self {
            BuildError::MissingField { post, .. }
            | BuildError::InvalidFrontMatter { post, .. }
            | BuildError::InvalidDate { post, .. }
            | BuildError::UnknownAuthor { post, .. }
            | BuildError::InlineTag { post, .. }
            | BuildError::InlineAuthor { post, .. }
            | BuildError::Untruncated { post }
            | BuildError::Render { post, .. } => Some(post),
            BuildError::DuplicatePermalink { .. } | BuildError::Registry { .. } => None,
        }
    }
}

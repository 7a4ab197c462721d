//! Helper functions shared by the projector, templates and generator

mod date;
mod url;

pub use date::*;
pub use url::*;

//! Environment and tag overlays.
//!
//! Overlays come from optional local files and are layered on top of the
//! template (environment) or the submission (tags).

pub mod env;
pub mod tags;

pub use env::parse_env_file;
pub use tags::{add_default_tags, parse_tag_file};

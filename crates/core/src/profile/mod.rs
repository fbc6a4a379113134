//! Directive-file configuration.
//!
//! A profile is a plain text file of `key: value` lines (`#` starts a
//! comment) that tunes the pipeline for a particular publication. Profiles
//! are merged in load order: later files override scalar settings and extend
//! list settings.
//!
//! ```text
//! # The Economist
//! allow_section: Leaders
//! allow_section: Finance & Economics
//! rubric_class: fly-title
//! label_max_chars: 30
//! feed_title: The Economist
//! ```

pub mod directives;
pub mod loader;
pub mod parser;

pub use directives::{Directive, Profile};
pub use loader::{ProfileLoader, ProfileLoaderBuilder};
pub use parser::ProfileParser;

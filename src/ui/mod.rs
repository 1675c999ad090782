//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Output formatting, workflow commands and step outputs
//!
//! # Design
//!
//! All diagnostics go through this module so that quiet mode and GitHub
//! Actions annotations are handled in one place.

pub mod output;

//! Output formatting utilities for the vocab CLI.
//!
//! - [`words`] - Word output formatting (tables, JSON, confirmations)
//! - [`helpers`] - Common formatting utilities (truncation, tags, markup)

pub mod helpers;
mod words;

pub use words::{format_created_entries, format_entries_json, format_entries_table};

//! Output writers for insights responses.
//!
//! This module handles:
//! - JSON responses (file or stdout)
//! - Text summaries for the terminal

pub mod json;
pub mod text;

// Re-export main functions
pub use json::{response_to_string, write_response};
pub use text::{format_summary, share_percent};

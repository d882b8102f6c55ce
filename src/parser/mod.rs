//! Bracket parser for pulling candidate URLs out of free-form text
//!
//! This module handles:
//! - Tracking top-level `[ ... ]` spans across streamed chunks
//! - Skipping escaped brackets (`\[`, `\]`)
//! - Picking the last URL-looking token of each closed span

mod brackets;
mod url_match;

pub use brackets::BracketParser;
pub use url_match::extract_last_url;

//! # Language services
//!
//! Tokenized-program handling, as distinct from the volume/file system layer. Unlike
//! the source corpus's tree-sitter-driven tokenizers, the only direction implemented
//! here is detokenization: a stateful byte-stream decoder, not a parse-tree walker, so
//! there is no grammar crate and no `Visit`/cursor machinery in this module.

pub mod decb;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("detokenization stopped early: {0}")]
    Truncated(String),
}

/// Render a control byte as the `\xNN` escape used inside quoted strings and remarks
/// when `Settings::escape_control_codes` is set.
pub fn escape_byte(b: u8) -> String {
    format!("\\x{:02X}", b)
}

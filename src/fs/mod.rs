//! # File System Module
//!
//! File system modules handle interactions with directories and files on a mounted
//! image.  This crate supports exactly one file system -- DECB, the Disk Extended Color
//! BASIC file system used on TRS-80 Color Computer floppies -- implemented in `decb`.
//!
//! Errors are reported by value; nothing in this module panics on malformed disk content
//! encountered through the public API.

pub mod decb;

use thiserror::Error;

/// Enumerates file system errors.  The `Display` trait prints the long message.
#[derive(Error, Debug)]
pub enum Error {
    #[error("image is too small for its declared geometry")]
    InvalidImage,
    #[error("file `{0}` not found")]
    FileNotFound(String),
    #[error("file `{0}` already exists")]
    DuplicateName(String),
    #[error("name `{0}` is not a valid DECB filename")]
    NameInvalid(String),
    #[error("insufficient free space: need {needed} granules, have {available}")]
    InsufficientSpace { needed: usize, available: usize },
    #[error("directory is full, no free entry slots remain")]
    DirectoryFull,
    #[error("corrupt FAT at granule {granule}: {detail}")]
    CorruptFat { granule: u8, detail: &'static str },
    #[error("corrupt directory entry {index}: {detail}")]
    CorruptDirectory { index: usize, detail: &'static str },
    #[error(transparent)]
    Image(#[from] crate::img::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

//! ### DECB value types
//!
//! Small tagged types that stand in for the raw bytes used on disk, so call sites
//! pattern-match exhaustively instead of re-deriving the `0xC0..0xC9`/status-byte
//! encodings every time they touch a FAT cell or a directory entry.  Conversion to/from
//! the raw byte happens at exactly the boundary named in each type's doc comment.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt;
use std::str::FromStr;

use super::super::Error;

/// One cell of the 68-byte FAT.  Conversion to/from the raw stored byte happens only in
/// `FatCell::from_byte` and `FatCell::to_byte`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FatCell {
    /// `0xFF`
    Free,
    /// `0x00..=0x43`, payload is the next granule in the chain
    Pointer(u8),
    /// `0xC0..=0xC9`, payload is sectors used in this terminal granule, already
    /// normalized so a stored `0xC0` (low nibble 0) reads as 9, never 0.
    Terminal(u8),
}

impl FatCell {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0xFF => Some(FatCell::Free),
            0x00..=0x43 => Some(FatCell::Pointer(b)),
            0xC0..=0xC9 => {
                let n = b & 0x0F;
                Some(FatCell::Terminal(if n == 0 { 9 } else { n }))
            }
            _ => None,
        }
    }

    /// `n` (sectors used) must be in `1..=9`. A full terminal granule is always
    /// serialized as `0xC9`, never the ambiguous `0xC0` (see SPEC_FULL.md open question).
    pub fn to_byte(self) -> u8 {
        match self {
            FatCell::Free => 0xFF,
            FatCell::Pointer(g) => g,
            FatCell::Terminal(n) => 0xC0 | (n & 0x0F),
        }
    }
}

/// DECB file type, the first of two independent directory-entry axes (the other is
/// `FileMode`). Conversions: `as u8` for the numeric value, `FileType::from_u8` via
/// `FromPrimitive`, `FileType::from_str` for a mnemonic or a bare digit.
#[derive(FromPrimitive, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileType {
    Basic = 0,
    Data = 1,
    Ml = 2,
    Text = 3,
}

impl FromStr for FileType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(num) = u8::from_str(s) {
            return FileType::from_u8(num).ok_or_else(|| Error::NameInvalid(s.to_string()));
        }
        match s.to_uppercase().as_str() {
            "BASIC" => Ok(FileType::Basic),
            "DATA" => Ok(FileType::Data),
            "ML" => Ok(FileType::Ml),
            "TEXT" => Ok(FileType::Text),
            _ => Err(Error::NameInvalid(s.to_string())),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileType::Basic => "BASIC",
            FileType::Data => "DATA",
            FileType::Ml => "ML",
            FileType::Text => "TEXT",
        };
        write!(f, "{}", s)
    }
}

/// DECB "ASCII flag" byte: `0x00` for a binary file, `0xFF` for ASCII text. Independent
/// of `FileType` -- there is no implied coupling between type and mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileMode {
    Binary,
    Ascii,
}

impl FileMode {
    pub fn from_byte(b: u8) -> Self {
        if b == 0 {
            FileMode::Binary
        } else {
            FileMode::Ascii
        }
    }
    pub fn to_byte(self) -> u8 {
        match self {
            FileMode::Binary => 0x00,
            FileMode::Ascii => 0xFF,
        }
    }
}

/// The three-state status encoded in the first byte of a directory entry's filename
/// field. Enumeration folds a `NeverUsed` sighting into an early-exit signal rather than
/// re-testing `entry[0] == 0xFF` at every call site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryStatus {
    /// `0xFF`: by convention every later slot is also never used.
    NeverUsed,
    /// `0x00`: reusable, remaining bytes may be stale.
    Deleted,
    /// any printable ASCII first byte.
    Active,
}

impl EntryStatus {
    pub fn of(first_byte: u8) -> Self {
        match first_byte {
            0xFF => EntryStatus::NeverUsed,
            0x00 => EntryStatus::Deleted,
            _ => EntryStatus::Active,
        }
    }
}

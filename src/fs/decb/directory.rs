//! ### DECB directory
//!
//! Nine 256-byte sectors (sectors 3..11 of the directory track) hold 72 fixed 32-byte
//! entries. `RawEntry` is the on-disk layout; `Directory` is the full 72-entry table and
//! the operations (enumerate, lookup, insert, delete, rename) that work over it.

use log::{debug, trace};

use a2kit_macro::{DiskStruct, DiskStructError};
use a2kit_macro_derive::DiskStruct;

use super::super::Error;
use super::pack;
use super::types::{EntryStatus, FileMode, FileType};

/// Number of 32-byte entries per directory sector.
pub const ENTRIES_PER_SECTOR: usize = 8;
/// Directory sectors, in order, on the directory track.
pub const DIRECTORY_SECTORS: [usize; 9] = [3, 4, 5, 6, 7, 8, 9, 10, 11];
/// Total directory entry slots (9 sectors * 8 entries).
pub const TOTAL_ENTRIES: usize = ENTRIES_PER_SECTOR * DIRECTORY_SECTORS.len();

#[derive(DiskStruct, Clone)]
pub struct RawEntry {
    pub name: [u8; 8],
    pub ext: [u8; 3],
    pub file_type: u8,
    pub ascii_flag: u8,
    pub first_granule: u8,
    pub last_sector_bytes: [u8; 2],
    pub reserved: [u8; 16],
}

impl RawEntry {
    pub fn status(&self) -> EntryStatus {
        EntryStatus::of(self.name[0])
    }

    pub fn name_string(&self) -> String {
        pack::unpack_name(self.name, self.ext)
    }

    pub fn file_type(&self) -> Option<FileType> {
        num_traits::FromPrimitive::from_u8(self.file_type)
    }

    pub fn mode(&self) -> FileMode {
        FileMode::from_byte(self.ascii_flag)
    }

    pub fn last_sector_bytes(&self) -> u16 {
        u16::from_be_bytes(self.last_sector_bytes)
    }

    /// Build a fresh, active entry with reserved bytes zeroed (the "authentic" rule for
    /// entries produced by a file-modifying operation).
    pub fn new_active(
        base: &str,
        ext: &str,
        file_type: FileType,
        mode: FileMode,
        first_granule: u8,
        last_sector_bytes: u16,
    ) -> Self {
        let (name, extb) = pack::pack_name(base, ext);
        Self {
            name,
            ext: extb,
            file_type: file_type as u8,
            ascii_flag: mode.to_byte(),
            first_granule,
            last_sector_bytes: last_sector_bytes.to_be_bytes(),
            reserved: [0; 16],
        }
    }
}

/// The full 72-entry directory, laid out exactly as the nine directory sectors store it.
pub struct Directory {
    entries: Vec<RawEntry>,
}

impl Directory {
    /// Parse the 2304-byte directory-sector payload (nine 256-byte sectors
    /// concatenated in order) into 72 entries.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DiskStructError> {
        if bytes.len() != TOTAL_ENTRIES * entry_len() {
            return Err(DiskStructError::OutOfData);
        }
        let mut entries = Vec::with_capacity(TOTAL_ENTRIES);
        for i in 0..TOTAL_ENTRIES {
            let start = i * 32;
            entries.push(RawEntry::from_bytes(&bytes[start..start + 32])?);
        }
        Ok(Self { entries })
    }

    /// A fresh, all-never-used directory: every field of every entry is `0xFF`, per
    /// the "initialize directory sectors with 0xFF throughout" formatting rule -- not
    /// just the status byte, so the raw on-disk bytes of a freshly formatted image are
    /// byte-exact.
    pub fn new_blank() -> Self {
        let blank = RawEntry {
            name: [0xFF; 8],
            ext: [0xFF; 3],
            file_type: 0xFF,
            ascii_flag: 0xFF,
            first_granule: 0xFF,
            last_sector_bytes: [0xFF; 2],
            reserved: [0xFF; 16],
        };
        Self { entries: vec![blank; TOTAL_ENTRIES] }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(TOTAL_ENTRIES * 32);
        for e in &self.entries {
            out.extend(e.to_bytes());
        }
        out
    }

    /// All active entries, with their slot index, in directory scan order. Stops at the
    /// first `NeverUsed` sighting (authentic early termination); `Deleted` slots are
    /// skipped but scanning continues past them.
    pub fn active_entries(&self) -> Vec<(usize, &RawEntry)> {
        let mut out = Vec::new();
        for (idx, entry) in self.entries.iter().enumerate() {
            match entry.status() {
                EntryStatus::NeverUsed => {
                    trace!("directory scan stopped at slot {} (never used)", idx);
                    break;
                }
                EntryStatus::Deleted => continue,
                EntryStatus::Active => out.push((idx, entry)),
            }
        }
        out
    }

    /// Look up the first active entry matching `base`/`ext` (already uppercased),
    /// case-insensitively per the DECB padding convention.
    pub fn lookup(&self, base: &str, ext: &str) -> Option<(usize, &RawEntry)> {
        let (name, extb) = pack::pack_name(base, ext);
        self.active_entries()
            .into_iter()
            .find(|(_, e)| pack::names_match(e.name, e.ext, name, extb))
    }

    /// Find the first reusable slot (first byte `0x00` or `0xFF`), in scan order.
    fn first_free_slot(&self) -> Option<usize> {
        self.entries.iter().position(|e| matches!(e.status(), EntryStatus::Deleted | EntryStatus::NeverUsed))
    }

    /// Insert a new entry, failing with `DirectoryFull` if no slot is free.
    pub fn insert(&mut self, entry: RawEntry) -> Result<usize, Error> {
        let idx = self.first_free_slot().ok_or(Error::DirectoryFull)?;
        debug!("inserting directory entry `{}` at slot {}", entry.name_string(), idx);
        self.entries[idx] = entry;
        Ok(idx)
    }

    /// Overwrite only the first filename byte with `0x00`; the remaining 31 bytes are
    /// left unchanged, per authentic DECB delete behavior.
    pub fn delete(&mut self, idx: usize) {
        self.entries[idx].name[0] = 0x00;
    }

    /// Rename in place, preserving type/mode/first-granule/last-sector/reserved bytes.
    pub fn rename(&mut self, idx: usize, base: &str, ext: &str) {
        let (name, extb) = pack::pack_name(base, ext);
        self.entries[idx].name = name;
        self.entries[idx].ext = extb;
    }

    pub fn entry(&self, idx: usize) -> &RawEntry {
        &self.entries[idx]
    }

    pub fn entry_mut(&mut self, idx: usize) -> &mut RawEntry {
        &mut self.entries[idx]
    }
}

/// Byte length of one packed `RawEntry` (always 32).
pub fn entry_len() -> usize {
    32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_directory_enumerates_empty() {
        let dir = Directory::new_blank();
        assert!(dir.active_entries().is_empty());
    }

    #[test]
    fn insert_then_lookup() {
        let mut dir = Directory::new_blank();
        let e = RawEntry::new_active("HELLO", "TXT", FileType::Text, FileMode::Ascii, 32, 12);
        let idx = dir.insert(e).unwrap();
        assert_eq!(idx, 0);
        let (found_idx, found) = dir.lookup("HELLO", "TXT").unwrap();
        assert_eq!(found_idx, 0);
        assert_eq!(found.name_string(), "HELLO.TXT");
    }

    #[test]
    fn delete_leaves_residue() {
        let mut dir = Directory::new_blank();
        let e = RawEntry::new_active("HELLO", "TXT", FileType::Text, FileMode::Ascii, 32, 12);
        let idx = dir.insert(e).unwrap();
        let before = dir.entry(idx).clone();
        dir.delete(idx);
        assert_eq!(dir.entry(idx).name[0], 0x00);
        assert_eq!(&dir.entry(idx).ext, &before.ext);
        assert_eq!(dir.entry(idx).first_granule, before.first_granule);
    }

    #[test]
    fn insert_into_full_directory_fails() {
        let mut dir = Directory::new_blank();
        for i in 0..TOTAL_ENTRIES {
            let e = RawEntry::new_active(&format!("F{}", i), "BIN", FileType::Data, FileMode::Binary, 0, 1);
            dir.insert(e).unwrap();
        }
        let overflow = RawEntry::new_active("ONEMORE", "BIN", FileType::Data, FileMode::Binary, 0, 1);
        let err = dir.insert(overflow).unwrap_err();
        assert!(matches!(err, Error::DirectoryFull));
    }

    #[test]
    fn scan_stops_at_never_used() {
        let mut dir = Directory::new_blank();
        dir.entries[0].name[0] = b'A';
        dir.entries[2].name[0] = b'B'; // past a NeverUsed slot, never reached
        assert_eq!(dir.active_entries().len(), 1);
    }
}

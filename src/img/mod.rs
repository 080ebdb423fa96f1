//! # Disk Image Module
//!
//! A disk image here is the DSK/JVC container used by TRS-80 Color Computer emulators:
//! an optional header followed by a flat run of fixed-size sectors.  There is no track
//! bitstream to decode (no flux, no GCR, no address fields) -- the container already
//! stores the 256-byte data payload of every sector, so this module only has to recover
//! geometry and do address arithmetic.
//!
//! `jvc::Image` owns the byte buffer and is the only thing in this module that knows how
//! to read or write a sector.  Everything above it (the FAT, the directory, the volume
//! facade) only ever asks for `(track,sector)` data.

pub mod jvc;

use thiserror::Error;

/// Enumerates disk image errors.  The `Display` trait prints the long message.
#[derive(Error, Debug)]
pub enum Error {
    #[error("image length is not consistent with any valid header/sector split")]
    InvalidImage,
    #[error("sector size code out of range (expected 0..3)")]
    UnsupportedGeometry,
    #[error("track {track} sector {sector} is out of range for this geometry")]
    SectorAccess { track: usize, sector: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Sectors per track on a standard single-sided 35-track CoCo disk.
pub const DEFAULT_SECTORS_PER_TRACK: usize = 18;
/// Standard side count.
pub const DEFAULT_SIDES: usize = 1;
/// Every DECB sector is 256 bytes; the JVC size-code field can in principle claim
/// otherwise, but the volume engine above this module assumes 256 throughout (see
/// `Geometry::sector_size` and `fs::decb`).
pub const DEFAULT_SECTOR_SIZE: usize = 256;
/// Sectors making up one granule.
pub const SECTORS_PER_GRANULE: usize = 9;
/// Bytes in one granule (9 * 256).
pub const GRANULE_BYTES: usize = SECTORS_PER_GRANULE * DEFAULT_SECTOR_SIZE;
/// The track carrying the FAT and directory on 35- and 40-track volumes.
pub const DIRECTORY_TRACK: usize = 17;
/// Granules on a standard 35-track volume (17 tracks * 2 granules before the directory
/// track hole, plus 17 tracks * 2 after it).
pub const GRANULES_PER_DISK: usize = 68;

/// Derived disk geometry.  Defaults match a standard single-sided 35-track CoCo disk;
/// a JVC header, when present, can override any of these fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub sectors_per_track: usize,
    pub sides: usize,
    pub sector_size: usize,
    /// First sector id seen on a track, almost always 1.
    pub first_sector_id: usize,
    /// Opaque attribute byte carried through from the header, not otherwise interpreted.
    pub attribute: u8,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            sectors_per_track: DEFAULT_SECTORS_PER_TRACK,
            sides: DEFAULT_SIDES,
            sector_size: DEFAULT_SECTOR_SIZE,
            first_sector_id: 1,
            attribute: 0,
        }
    }
}

impl Geometry {
    /// `header_length = image_length mod 256`.  This is the defining detection rule;
    /// a JVC image with no header at all simply has `header_length == 0`.
    pub fn detect(image_length: usize) -> usize {
        image_length % DEFAULT_SECTOR_SIZE
    }

    /// Parse the (0..255 byte) JVC header into a `Geometry`.  An empty header yields
    /// the all-default geometry.  Byte 0 is sectors/track, byte 1 is side count, byte 2
    /// is the sector-size code (0..3, size = 128 << code), byte 3 is the first sector id
    /// (0 is normalized to 1), byte 4 is an opaque attribute byte.  Trailing bytes beyond
    /// 5 are ignored here but are preserved verbatim by the caller when the image is saved.
    pub fn parse_header(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        let sectors_per_track = match bytes[0] {
            0 => DEFAULT_SECTORS_PER_TRACK,
            n => n as usize,
        };
        let sides = match bytes.get(1) {
            Some(0) | None => DEFAULT_SIDES,
            Some(n) => *n as usize,
        };
        let size_code = *bytes.get(2).unwrap_or(&0);
        if size_code > 3 {
            return Err(Error::UnsupportedGeometry);
        }
        let sector_size = 128usize << size_code;
        let first_sector_id = match bytes.get(3) {
            None | Some(0) => 1,
            Some(1) => 1,
            // the source accepts arbitrary values here; we fall back to the sane default
            // rather than reject the image outright
            Some(_) => 1,
        };
        let attribute = *bytes.get(4).unwrap_or(&0);
        Ok(Self {
            sectors_per_track,
            sides,
            sector_size,
            first_sector_id,
            attribute,
        })
    }

    /// Serialize the geometry back into a 5-byte JVC header.
    pub fn to_header_bytes(&self) -> [u8; 5] {
        let size_code = match self.sector_size {
            128 => 0,
            256 => 1,
            512 => 2,
            1024 => 3,
            _ => 1,
        };
        [
            self.sectors_per_track as u8,
            self.sides as u8,
            size_code,
            self.first_sector_id as u8,
            self.attribute,
        ]
    }

    /// Byte offset of sector `sector` (1-based within its track, subject to
    /// `first_sector_id`) on `track`, on side `side`.  Sides are interleaved per track:
    /// `effective_track_index = track * sides + side` (see DESIGN.md for why this
    /// convention was chosen over a banked/side-major layout).
    pub fn sector_offset(&self, header_length: usize, track: usize, side: usize, sector: usize) -> usize {
        let effective_track = track * self.sides + side;
        header_length
            + (effective_track * self.sectors_per_track + (sector - self.first_sector_id)) * self.sector_size
    }

    /// Map a logical granule number to its (track, starting sector, sector count).
    /// Granule numbering skips the directory track (`DIRECTORY_TRACK`): granules
    /// 0..33 live on tracks 0..16 (two granules per track), and granules 34..67 live on
    /// tracks 18.. (again two granules per track), so `DIRECTORY_TRACK` is never a granule.
    pub fn granule_to_location(granule: u8) -> (usize, usize, usize) {
        let g = granule as usize;
        let track = if g < 34 { g / 2 } else { g / 2 + 1 };
        let start_sector = 1 + SECTORS_PER_GRANULE * (g % 2);
        (track, start_sector, SECTORS_PER_GRANULE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_header_length() {
        assert_eq!(Geometry::detect(161_280), 0);
        assert_eq!(Geometry::detect(161_280 + 5), 5);
    }

    #[test]
    fn granule_skips_directory_track() {
        assert_eq!(Geometry::granule_to_location(0), (0, 1, 9));
        assert_eq!(Geometry::granule_to_location(1), (0, 10, 9));
        assert_eq!(Geometry::granule_to_location(33), (16, 10, 9));
        assert_eq!(Geometry::granule_to_location(34), (18, 1, 9));
        assert_eq!(Geometry::granule_to_location(67), (34, 10, 9));
    }

    #[test]
    fn parse_header_overrides_defaults() {
        let g = Geometry::parse_header(&[36, 2, 1, 1, 0x80]).unwrap();
        assert_eq!(g.sectors_per_track, 36);
        assert_eq!(g.sides, 2);
        assert_eq!(g.sector_size, 256);
        assert_eq!(g.attribute, 0x80);
    }

    #[test]
    fn parse_header_rejects_bad_size_code() {
        let err = Geometry::parse_header(&[18, 1, 4, 1, 0]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedGeometry));
    }

    #[test]
    fn parse_header_normalizes_zero_first_sector_id() {
        let g = Geometry::parse_header(&[18, 1, 1, 0, 0]).unwrap();
        assert_eq!(g.first_sector_id, 1);
    }

    #[test]
    fn sector_offset_interleaves_sides_per_track() {
        let g = Geometry { sides: 2, ..Geometry::default() };
        let side0 = g.sector_offset(0, 5, 0, 1);
        let side1 = g.sector_offset(0, 5, 1, 1);
        assert_eq!(side1 - side0, g.sectors_per_track * g.sector_size);
    }

    #[test]
    fn default_geometry_matches_spec() {
        let g = Geometry::default();
        assert_eq!(g.sectors_per_track, 18);
        assert_eq!(g.sides, 1);
        assert_eq!(g.sector_size, 256);
        assert_eq!(g.first_sector_id, 1);
    }
}

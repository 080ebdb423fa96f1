//! # `coco-decb`
//!
//! A read/write library for TRS-80 Color Computer DECB (Disk Extended Color BASIC)
//! disk images in the DSK/JVC container format, together with a BASIC detokenizer
//! that turns tokenized Color/Extended/Disk/Super Extended BASIC programs back into
//! readable source text.
//!
//! ## Architecture
//!
//! * `img::jvc::Image` is the sector store: it knows the JVC header and the flat run
//!   of fixed-size sectors, and nothing about file systems.
//! * `fs::decb::Volume` imposes the DECB file system on a mounted `Image`: the FAT
//!   allocator, the directory manager, and the mount/list/extract/insert/delete/
//!   rename/format/save operations that compose them.
//! * `lang::decb` detokenizes a tokenized BASIC byte buffer independently of the
//!   volume layer -- it works equally on an extracted file's bytes or a raw blob.
//!
//! A `Volume` takes ownership of its `Image`; nothing is written back to a file until
//! `Volume::save` is called.
//!
//! This crate intentionally has no CLI, TUI, or HTTP front end -- see SPEC_FULL.md for
//! the boundary. Front ends are expected to drive the `fs::decb::Volume` and
//! `lang::decb::detokenize` surfaces directly.

pub mod fs;
pub mod img;
pub mod lang;

type DYNERR = Box<dyn std::error::Error>;
type STDRESULT = Result<(), DYNERR>;

/// Mount a DECB volume from a file on disk.
pub fn mount(path: &str) -> Result<fs::decb::Volume, DYNERR> {
    Ok(fs::decb::mount_file(path)?)
}

/// Compose a fresh, blank DECB volume of the given geometry. `add_jvc_header` opts
/// into the 5-byte JVC header; the authentic real-CoCo default is no header at all.
pub fn format(tracks: usize, sides: usize, add_jvc_header: bool) -> fs::decb::Volume {
    fs::decb::Volume::format(tracks, sides, add_jvc_header)
}

/// Detokenize a tokenized BASIC byte buffer (a DECB BASIC file's payload, or any raw
/// tokenized blob) into readable source text.
pub fn detokenize(bytes: &[u8]) -> Result<String, DYNERR> {
    Ok(lang::decb::detokenize(bytes)?)
}

/// Save a mounted volume to `path`, making its in-memory changes permanent.
pub fn save(volume: &mut fs::decb::Volume, path: &str) -> STDRESULT {
    volume.save(path)?;
    Ok(())
}

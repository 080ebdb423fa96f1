//! Black-box round-trip scenarios for the DECB volume engine, built entirely from
//! in-memory images -- no binary fixture files ship with this crate. Mirrors the
//! concrete scenarios enumerated in SPEC_FULL.md section 8.

use coco_decb::fs::decb::types::{FileMode, FileType};
use coco_decb::fs::decb::Volume;
use coco_decb::fs::Error;

/// Opt into `log` output for a test. `try_init` rather than `init` because the test
/// binary runs every `#[test]` in the same process and a second call would panic.
/// Run with `RUST_LOG=debug cargo test -- --nocapture` to see it.
fn init_log() {
    let _ = env_logger::try_init();
}

#[test]
fn mount_bare_image_is_empty() {
    let bytes = vec![0xFFu8; 161_280];
    let vol = Volume::mount(&bytes).expect("should mount");
    assert_eq!(vol.list().unwrap().len(), 0);
}

#[test]
fn format_then_list_is_empty_and_fat_is_free() {
    let vol = Volume::format(35, 1, false);
    assert_eq!(vol.list().unwrap().len(), 0);
    assert_eq!(vol.free_granules(), 68);
}

#[test]
fn format_image_length_matches_geometry() {
    let mut vol = Volume::format(35, 1, false);
    assert_eq!(vol.to_bytes().len(), 35 * 1 * 18 * 256);

    let mut vol_h = Volume::format(35, 1, true);
    assert_eq!(vol_h.to_bytes().len(), 35 * 1 * 18 * 256 + 5);
}

#[test]
fn round_trip_insert_and_extract() {
    let mut vol = Volume::format(35, 1, false);
    let payload = b"HELLO WORLD\n";
    vol.insert("HELLO.TXT", payload, FileType::Text, FileMode::Ascii).unwrap();

    let entries = vol.list().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "HELLO.TXT");
    assert_eq!(entries[0].first_granule, 32);
    assert_eq!(entries[0].size, 12);
    assert_eq!(entries[0].chain_length, 1);

    assert_eq!(vol.extract("HELLO.TXT").unwrap(), payload.to_vec());
}

#[test]
fn round_trip_empty_file_extracts_to_empty_vec() {
    let mut vol = Volume::format(35, 1, false);
    vol.insert("EMPTY.BIN", &[], FileType::Data, FileMode::Binary).unwrap();

    let entries = vol.list().unwrap();
    assert_eq!(entries[0].size, 0);
    assert_eq!(entries[0].chain_length, 1);
    assert_eq!(vol.extract("EMPTY.BIN").unwrap(), Vec::<u8>::new());
}

#[test]
fn insert_places_first_file_at_granule_32() {
    let mut vol = Volume::format(35, 1, false);
    vol.insert("A.TXT", b"x", FileType::Text, FileMode::Ascii).unwrap();
    let entries = vol.list().unwrap();
    assert_eq!(entries[0].first_granule, 32);
}

#[test]
fn multi_granule_file_spans_the_directory_track_hole() {
    let mut vol = Volume::format(35, 1, false);
    let payload = vec![0xAAu8; 5000];
    vol.insert("BIG.BIN", &payload, FileType::Ml, FileMode::Binary).unwrap();

    let entries = vol.list().unwrap();
    assert_eq!(entries[0].chain_length, 3);
    assert_eq!(entries[0].size, 5000);
    assert_eq!(vol.extract("BIG.BIN").unwrap(), payload);
}

#[test]
fn delete_leaves_residue_and_frees_granules() {
    let mut vol = Volume::format(35, 1, false);
    vol.insert("GONE.BIN", &vec![0x11u8; 3000], FileType::Data, FileMode::Binary).unwrap();
    let free_before_delete = vol.free_granules();
    vol.delete("GONE.BIN").unwrap();
    assert!(vol.free_granules() > free_before_delete);
    assert_eq!(vol.list().unwrap().len(), 0);
}

#[test]
fn delete_is_not_idempotent() {
    let mut vol = Volume::format(35, 1, false);
    vol.insert("ONE.BIN", b"x", FileType::Data, FileMode::Binary).unwrap();
    vol.delete("ONE.BIN").unwrap();
    let err = vol.delete("ONE.BIN").unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
}

#[test]
fn duplicate_name_is_rejected() {
    let mut vol = Volume::format(35, 1, false);
    vol.insert("DUP.TXT", b"a", FileType::Text, FileMode::Ascii).unwrap();
    let err = vol.insert("dup.txt", b"b", FileType::Text, FileMode::Ascii).unwrap_err();
    assert!(matches!(err, Error::DuplicateName(_)));
}

#[test]
fn insufficient_space_is_rejected_and_rolled_back() {
    init_log();
    let mut vol = Volume::format(35, 1, false);
    let too_big = vec![0u8; 68 * 2304 + 1];
    let err = vol.insert("TOOBIG.BIN", &too_big, FileType::Data, FileMode::Binary).unwrap_err();
    assert!(matches!(err, Error::InsufficientSpace { .. }));
    assert_eq!(vol.free_granules(), 68);
    assert_eq!(vol.list().unwrap().len(), 0);
}

#[test]
fn rename_then_lookup_under_new_name() {
    let mut vol = Volume::format(35, 1, false);
    vol.insert("OLD.TXT", b"x", FileType::Text, FileMode::Ascii).unwrap();
    vol.rename("OLD.TXT", "NEW.TXT").unwrap();
    assert!(vol.extract("OLD.TXT").is_err());
    assert_eq!(vol.extract("NEW.TXT").unwrap(), b"x".to_vec());
}

#[test]
fn rename_to_existing_name_is_rejected() {
    let mut vol = Volume::format(35, 1, false);
    vol.insert("A.TXT", b"a", FileType::Text, FileMode::Ascii).unwrap();
    vol.insert("B.TXT", b"b", FileType::Text, FileMode::Ascii).unwrap();
    let err = vol.rename("A.TXT", "B.TXT").unwrap_err();
    assert!(matches!(err, Error::DuplicateName(_)));
}

#[test]
fn invalid_name_is_rejected() {
    let mut vol = Volume::format(35, 1, false);
    let err = vol.insert("TOO LONG NAME.TXT", b"x", FileType::Text, FileMode::Ascii).unwrap_err();
    assert!(matches!(err, Error::NameInvalid(_)));
}

#[test]
fn corrupt_fat_chain_is_rejected_on_extract() {
    init_log();
    // Build a fresh image, then hand-corrupt the FAT sector to create a two-cycle
    // between granules 5 and 8, with a directory entry pointing at granule 5.
    let mut vol = Volume::format(35, 1, false);
    vol.insert("X.BIN", b"x", FileType::Data, FileMode::Binary).unwrap();
    let mut bytes = vol.to_bytes();

    // Directory track is 17, FAT sector is sector 2 (1-based), 256 bytes/sector,
    // no header on this image.
    let fat_sector_offset = 17 * 18 * 256 + (2 - 1) * 256;
    bytes[fat_sector_offset + 5] = 8;
    bytes[fat_sector_offset + 8] = 5;

    // Point the one directory entry's first_granule at 5 (name/ext are already
    // "X"/"BIN" from the insert above; only the first_granule byte moves).
    let dir_sector_offset = 17 * 18 * 256 + (3 - 1) * 256;
    bytes[dir_sector_offset + 13] = 5; // first_granule

    let corrupt = Volume::mount(&bytes).expect("mounts despite the bad chain");
    let err = corrupt.extract("X.BIN").unwrap_err();
    assert!(matches!(err, Error::CorruptFat { .. }));
}

#[test]
fn fat_trailer_becomes_zero_after_first_write() {
    let mut vol = Volume::format(35, 1, false);
    let fresh = vol.to_bytes();
    let fat_sector_offset = 17 * 18 * 256 + (2 - 1) * 256;
    assert!(fresh[fat_sector_offset + 68..fat_sector_offset + 256].iter().all(|&b| b == 0xFF));

    vol.insert("A.BIN", b"x", FileType::Data, FileMode::Binary).unwrap();
    let after = vol.to_bytes();
    assert!(after[fat_sector_offset + 68..fat_sector_offset + 256].iter().all(|&b| b == 0));
}

#[test]
fn is_dirty_tracks_mutating_operations() {
    let mut vol = Volume::format(35, 1, false);
    assert!(!vol.is_dirty());
    vol.insert("A.BIN", b"x", FileType::Data, FileMode::Binary).unwrap();
    assert!(vol.is_dirty());
}

#[test]
fn listing_multiple_files_reports_each_independently() {
    let mut vol = Volume::format(35, 1, false);
    vol.insert("ONE.TXT", b"111", FileType::Text, FileMode::Ascii).unwrap();
    vol.insert("TWO.TXT", b"22222", FileType::Text, FileMode::Ascii).unwrap();
    let mut entries = vol.list().unwrap();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "ONE.TXT");
    assert_eq!(entries[0].size, 3);
    assert_eq!(entries[1].name, "TWO.TXT");
    assert_eq!(entries[1].size, 5);
}

#[test]
fn save_and_reload_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.dsk");
    let path_str = path.to_str().unwrap();

    let mut vol = Volume::format(35, 1, false);
    vol.insert("KEEP.TXT", b"still here", FileType::Text, FileMode::Ascii).unwrap();
    vol.save(path_str).unwrap();

    let reloaded = coco_decb::fs::decb::mount_file(path_str).unwrap();
    assert_eq!(reloaded.extract("KEEP.TXT").unwrap(), b"still here".to_vec());
}

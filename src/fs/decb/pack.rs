//! ### DECB name packing
//!
//! Functions to validate and pack/unpack the 8.3 filenames stored in directory entries.

use log::debug;
use super::super::Error;

const VALID_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789$#_.-";

fn char_ok(c: char) -> bool {
    VALID_CHARS.contains(c)
}

/// Split `"NAME.EXT"` (or a bare `"NAME"`) into uppercased base/extension strings,
/// validating length (1..=8 for the base, 0..=3 for the extension) and character set.
/// Rejects a filename containing a leading NUL or `0xFF` byte, which would collide with
/// the directory's status-byte convention.
pub fn validate_name(raw: &str) -> Result<(String, String), Error> {
    if raw.starts_with('\u{0}') || raw.as_bytes().first() == Some(&0xFF) {
        return Err(Error::NameInvalid(raw.to_string()));
    }
    let upper = raw.to_uppercase();
    let mut parts = upper.splitn(2, '.');
    let base = parts.next().unwrap_or("");
    let ext = parts.next().unwrap_or("");
    if base.is_empty() || base.len() > 8 || ext.len() > 3 {
        debug!("name `{}` has bad base/extension length", raw);
        return Err(Error::NameInvalid(raw.to_string()));
    }
    if !base.chars().all(char_ok) || !ext.chars().all(char_ok) {
        debug!("name `{}` contains an invalid character", raw);
        return Err(Error::NameInvalid(raw.to_string()));
    }
    Ok((base.to_string(), ext.to_string()))
}

/// Pack a validated (base,ext) pair into the space-padded 8+3 on-disk fields.
pub fn pack_name(base: &str, ext: &str) -> ([u8; 8], [u8; 3]) {
    let mut name = [b' '; 8];
    for (i, b) in base.bytes().take(8).enumerate() {
        name[i] = b;
    }
    let mut extb = [b' '; 3];
    for (i, b) in ext.bytes().take(3).enumerate() {
        extb[i] = b;
    }
    (name, extb)
}

/// Render the on-disk 8+3 fields as `"NAME.EXT"` (no extension -> bare `"NAME"`),
/// trimming trailing spaces.
pub fn unpack_name(name: [u8; 8], ext: [u8; 3]) -> String {
    let base = String::from_utf8_lossy(&name).trim_end().to_string();
    let extension = String::from_utf8_lossy(&ext).trim_end().to_string();
    if extension.is_empty() {
        base
    } else {
        format!("{}.{}", base, extension)
    }
}

/// Case-insensitive comparison of two packed 8+3 names, per the DECB lookup convention.
pub fn names_match(a_name: [u8; 8], a_ext: [u8; 3], b_name: [u8; 8], b_ext: [u8; 3]) -> bool {
    a_name == b_name && a_ext == b_ext
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_and_pack_round_trip() {
        let (base, ext) = validate_name("hello.txt").unwrap();
        assert_eq!(base, "HELLO");
        assert_eq!(ext, "TXT");
        let (n, e) = pack_name(&base, &ext);
        assert_eq!(&n, b"HELLO   ");
        assert_eq!(&e, b"TXT");
        assert_eq!(unpack_name(n, e), "HELLO.TXT");
    }

    #[test]
    fn rejects_overlong_base() {
        assert!(validate_name("TOOLONGNAME.TXT").is_err());
    }

    #[test]
    fn rejects_bad_characters() {
        assert!(validate_name("BAD NAME.TXT").is_err());
        assert!(validate_name("BAD/NAME.TXT").is_err());
    }

    #[test]
    fn rejects_leading_nul_byte_collision() {
        assert!(validate_name("\u{0}NAME.TXT").is_err());
    }

    #[test]
    fn bare_name_without_extension_round_trips() {
        let (base, ext) = validate_name("README").unwrap();
        assert_eq!(ext, "");
        let (n, e) = pack_name(&base, &ext);
        assert_eq!(unpack_name(n, e), "README");
    }
}

//! ### BASIC detokenizer
//!
//! Converts a tokenized Color/Extended/Disk/Super Extended Color BASIC program into
//! readable source text. Driven entirely by a byte-stream state machine -- there is no
//! parse tree here, just a cursor and three mutually exclusive line-body flags.

mod tokens;

use std::collections::HashMap;

use log::{debug, trace, warn};

use super::Error;

const QUOTE: u8 = 0x22;
const COLON: u8 = 0x3A;
const SPACE: u8 = 0x20;
const REM_TOKEN: u8 = 0x82;
const REM_APOSTROPHE: u8 = 0x83;
const FUNCTION_PREFIX: u8 = 0xFF;
const ML_PREAMBLE_MARKER: u8 = 0xFF;
const ML_PREAMBLE_LEN: usize = 5;

/// Bounds detokenizer work so a corrupt or hostile token stream cannot force unbounded
/// output. Mirrors the shape of the per-language `Settings` struct in the source
/// corpus's own detokenizers.
#[derive(Clone, Copy, Debug)]
pub struct Settings {
    pub max_lines: usize,
    pub max_line_length: usize,
    pub escape_control_codes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { max_lines: 5000, max_line_length: 255, escape_control_codes: true }
    }
}

fn keyword_map() -> HashMap<u8, &'static str> {
    HashMap::from(tokens::KEYWORDS)
}

fn function_map() -> HashMap<u8, &'static str> {
    HashMap::from(tokens::FUNCTIONS)
}

/// First candidate line number in `bytes`, skipping an ML preamble (if any) and any
/// leading `0x00` padding, then reading past the 2-byte link pointer. `None` if the
/// buffer is too short to contain one.
fn first_line_number(bytes: &[u8]) -> Option<u16> {
    let mut addr = if bytes.first() == Some(&ML_PREAMBLE_MARKER) { ML_PREAMBLE_LEN } else { 0 };
    while addr < bytes.len() && bytes[addr] == 0 {
        addr += 1;
    }
    let link_end = addr.checked_add(2)?;
    let num_end = link_end.checked_add(2)?;
    if num_end > bytes.len() {
        return None;
    }
    Some(u16::from_be_bytes([bytes[link_end], bytes[link_end + 1]]))
}

/// Heuristic: long enough, some byte has the high bit set, and the first line number
/// field is a plausible BASIC line number (0..63999).
pub fn is_tokenized(bytes: &[u8]) -> bool {
    if bytes.len() <= 5 {
        return false;
    }
    if !bytes.iter().any(|b| b & 0x80 != 0) {
        return false;
    }
    matches!(first_line_number(bytes), Some(n) if n <= 63999)
}

/// Detokenize `bytes` with `Settings::default()`.
pub fn detokenize(bytes: &[u8]) -> Result<String, Error> {
    detokenize_with(bytes, &Settings::default())
}

/// Detokenize `bytes` under the given `settings`. Unknown tokens never fail the whole
/// decode -- they become `<??XX>`/`<??FFXX>` sentinel text. Only a buffer that ends
/// before its expected terminator produces an `Error::Truncated`, carrying whatever text
/// had already been decoded.
pub fn detokenize_with(bytes: &[u8], settings: &Settings) -> Result<String, Error> {
    let keywords = keyword_map();
    let functions = function_map();

    let mut addr = if bytes.first() == Some(&ML_PREAMBLE_MARKER) {
        debug!("skipping 5-byte ML preamble");
        ML_PREAMBLE_LEN
    } else {
        0
    };
    while addr < bytes.len() && bytes[addr] == 0 {
        addr += 1;
    }

    let mut code = String::new();
    let mut line_count = 0;

    loop {
        if line_count >= settings.max_lines {
            warn!("detokenization hit max_lines ({}), stopping", settings.max_lines);
            break;
        }
        if addr + 1 >= bytes.len() {
            warn!("program ended before the terminal zero link");
            return Err(Error::Truncated(code));
        }
        let link = u16::from_be_bytes([bytes[addr], bytes[addr + 1]]);
        addr += 2;
        if link == 0 {
            trace!("terminal zero link at byte {}", addr - 2);
            break;
        }
        if addr + 1 >= bytes.len() {
            warn!("program ended before its line number field");
            return Err(Error::Truncated(code));
        }
        let line_num = u16::from_be_bytes([bytes[addr], bytes[addr + 1]]);
        addr += 2;
        code.push_str(&line_num.to_string());
        code.push(' ');

        let line_start = addr;
        let mut in_string = false;
        let mut in_remark = false;
        loop {
            if addr >= bytes.len() {
                warn!("line {} truncated before its terminator", line_num);
                return Err(Error::Truncated(code));
            }
            if addr - line_start >= settings.max_line_length {
                warn!("line {} exceeded max_line_length, truncating", line_num);
                break;
            }
            let b = bytes[addr];
            if b == 0 {
                addr += 1;
                break;
            }
            if in_string {
                if b == QUOTE {
                    code.push('"');
                    in_string = false;
                } else if b < SPACE && settings.escape_control_codes {
                    code.push_str(&super::escape_byte(b));
                } else {
                    code.push(b as char);
                }
                addr += 1;
                continue;
            }
            if in_remark {
                if b < SPACE && settings.escape_control_codes {
                    code.push_str(&super::escape_byte(b));
                } else {
                    code.push(b as char);
                }
                addr += 1;
                continue;
            }
            match b {
                QUOTE => {
                    code.push('"');
                    in_string = true;
                    addr += 1;
                }
                COLON => {
                    while code.ends_with(' ') {
                        code.pop();
                    }
                    code.push(':');
                    addr += 1;
                }
                SPACE => {
                    if !code.ends_with(' ') {
                        code.push(' ');
                    }
                    addr += 1;
                }
                FUNCTION_PREFIX => {
                    if addr + 1 >= bytes.len() {
                        warn!("line {} truncated mid function token", line_num);
                        return Err(Error::Truncated(code));
                    }
                    let f = bytes[addr + 1];
                    match functions.get(&f).copied() {
                        Some(name) => code.push_str(name),
                        None => {
                            warn!("unrecognized function token 0xFF 0x{:02X}", f);
                            code.push_str(&format!("<??FF{:02X}>", f));
                        }
                    }
                    addr += 2;
                }
                _ if b >= 0x80 => {
                    let preceded_by_space_like = matches!(code.chars().last(), None | Some(' ') | Some('(') | Some(','));
                    match keywords.get(&b).copied() {
                        Some(name) => {
                            if !preceded_by_space_like {
                                code.push(' ');
                            }
                            code.push_str(name);
                            if b == REM_TOKEN || b == REM_APOSTROPHE {
                                in_remark = true;
                            }
                            if name != "(" && name != "'" {
                                code.push(' ');
                            }
                        }
                        None => {
                            warn!("unrecognized keyword token 0x{:02X}", b);
                            if !preceded_by_space_like {
                                code.push(' ');
                            }
                            code.push_str(&format!("<??{:02X}>", b));
                            code.push(' ');
                        }
                    }
                    addr += 1;
                }
                _ => {
                    code.push(b as char);
                    addr += 1;
                }
            }
        }
        while code.ends_with(' ') {
            code.pop();
        }
        code.push('\n');
        line_count += 1;
    }
    Ok(code)
}

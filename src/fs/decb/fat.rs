//! ### FAT & granule allocator
//!
//! The 68-byte File Allocation Table lives in the first 68 bytes of (directory track,
//! sector 2). This module owns chain walking, free-space search, linking, and freeing;
//! it never touches sectors directly -- the volume facade reads/writes the FAT sector.

use std::collections::HashSet;
use log::{debug, trace, warn};

use crate::img::GRANULES_PER_DISK;
use super::super::Error;
use super::types::FatCell;

pub struct Fat {
    cells: [u8; GRANULES_PER_DISK],
}

impl Fat {
    pub fn from_bytes(bytes: &[u8; GRANULES_PER_DISK]) -> Self {
        Self { cells: *bytes }
    }

    /// A fresh, all-free table.
    pub fn new_free() -> Self {
        Self { cells: [0xFF; GRANULES_PER_DISK] }
    }

    pub fn to_bytes(&self) -> [u8; GRANULES_PER_DISK] {
        self.cells
    }

    fn cell(&self, g: u8) -> Result<FatCell, Error> {
        if g as usize >= GRANULES_PER_DISK {
            return Err(Error::CorruptFat { granule: g, detail: "granule index out of range" });
        }
        FatCell::from_byte(self.cells[g as usize])
            .ok_or(Error::CorruptFat { granule: g, detail: "unrecognized FAT cell value" })
    }

    /// Walk the chain starting at `head`, returning `(ordered granule list, sectors used
    /// in the terminal granule)`. Fails on a self-loop, a cycle, a chain longer than
    /// `GRANULES_PER_DISK`, an out-of-range pointer, or a pointer that lands on a free
    /// entry.
    pub fn walk(&self, head: u8) -> Result<(Vec<u8>, u8), Error> {
        let mut chain = Vec::new();
        let mut visited: HashSet<u8> = HashSet::new();
        let mut g = head;
        loop {
            if chain.len() > GRANULES_PER_DISK {
                return Err(Error::CorruptFat { granule: g, detail: "chain exceeds disk granule count" });
            }
            if !visited.insert(g) {
                return Err(Error::CorruptFat { granule: g, detail: "cycle detected while walking chain" });
            }
            chain.push(g);
            match self.cell(g)? {
                FatCell::Free => {
                    return Err(Error::CorruptFat { granule: g, detail: "chain pointer landed on a free granule" });
                }
                FatCell::Pointer(next) => {
                    trace!("granule {} -> {}", g, next);
                    g = next;
                }
                FatCell::Terminal(n) => {
                    debug!("chain terminates at granule {} with {} sectors used", g, n);
                    return Ok((chain, n));
                }
            }
        }
    }

    /// File length in bytes given a chain's length, the terminal granule's sectors-used
    /// count, and the directory entry's `last_sector_bytes` (0 means 256). The one
    /// exception is `chain_len == 1 && terminal_sectors == 1 && last_sector_bytes == 0`,
    /// reserved exclusively for a zero-length file: `insert` never produces that literal
    /// combination for any nonzero length (a genuinely full single sector is always
    /// written as a literal 256, not 0), so it is a safe, distinguishable sentinel for
    /// "no data at all" without touching the FAT terminal-marker convention itself.
    pub fn file_size(chain_len: usize, terminal_sectors: u8, last_sector_bytes: u16) -> usize {
        if chain_len == 1 && terminal_sectors == 1 && last_sector_bytes == 0 {
            return 0;
        }
        let last = if last_sector_bytes == 0 { 256 } else { last_sector_bytes as usize };
        (chain_len - 1) * crate::img::GRANULE_BYTES + (terminal_sectors as usize - 1) * 256 + last
    }

    /// Count of free granules, used by `insert` to short-circuit `InsufficientSpace`
    /// before mutating anything.
    pub fn free_count(&self) -> usize {
        self.cells.iter().filter(|b| **b == 0xFF).count()
    }

    /// Find `count` free granules using the authentic DECB search order: ascending from
    /// granule 32 through 67, then wrapping to 0 through 31. Purely positional, no
    /// attempt to minimize fragmentation.
    pub fn allocate(&self, count: usize) -> Result<Vec<u8>, Error> {
        let mut found = Vec::with_capacity(count);
        for g in (32..GRANULES_PER_DISK).chain(0..32) {
            if self.cells[g] == 0xFF {
                found.push(g as u8);
                if found.len() == count {
                    return Ok(found);
                }
            }
        }
        Err(Error::InsufficientSpace { needed: count, available: found.len() })
    }

    /// Write FAT entries linking `granules` in order, with `last_sectors_used` (1..=9)
    /// encoded into the terminal entry.
    pub fn link(&mut self, granules: &[u8], last_sectors_used: u8) {
        for i in 0..granules.len() {
            let cell = if i + 1 < granules.len() {
                FatCell::Pointer(granules[i + 1])
            } else {
                FatCell::Terminal(last_sectors_used)
            };
            self.cells[granules[i] as usize] = cell.to_byte();
        }
    }

    /// Walk the chain at `head` and mark every visited granule free.
    pub fn free_chain(&mut self, head: u8) -> Result<(), Error> {
        let (chain, _) = self.walk(head)?;
        for g in chain {
            self.cells[g as usize] = FatCell::Free.to_byte();
        }
        Ok(())
    }
}

/// Sanity-check that every active entry's chain is self-consistent and that no two
/// active chains share a granule -- used by the volume facade after mutating operations,
/// mirroring the cross-structure invariants in SPEC_FULL.md section 8.
pub fn chains_are_disjoint(chains: &[Vec<u8>]) -> bool {
    let mut seen: HashSet<u8> = HashSet::new();
    for chain in chains {
        for g in chain {
            if !seen.insert(*g) {
                warn!("granule {} referenced by more than one active chain", g);
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_starts_at_granule_32() {
        let fat = Fat::new_free();
        let g = fat.allocate(1).unwrap();
        assert_eq!(g, vec![32]);
    }

    #[test]
    fn allocate_wraps_after_67() {
        let mut fat = Fat::new_free();
        // fill 32..67 so only 0..31 remain
        for g in 32..68u8 {
            fat.cells[g as usize] = 0x00;
        }
        let found = fat.allocate(1).unwrap();
        assert_eq!(found, vec![0]);
    }

    #[test]
    fn walk_three_granule_chain() {
        let mut fat = Fat::new_free();
        fat.link(&[32, 33, 34], 2);
        let (chain, n) = fat.walk(32).unwrap();
        assert_eq!(chain, vec![32, 33, 34]);
        assert_eq!(n, 2);
        assert_eq!(fat.cells[34], 0xC2);
    }

    #[test]
    fn file_size_zero_sentinel_is_empty() {
        assert_eq!(Fat::file_size(1, 1, 0), 0);
    }

    #[test]
    fn file_size_full_single_sector_is_not_confused_with_empty() {
        assert_eq!(Fat::file_size(1, 1, 256), 256);
    }

    #[test]
    fn terminal_full_granule_is_c9_not_c0() {
        let mut fat = Fat::new_free();
        fat.link(&[32], 9);
        assert_eq!(fat.cells[32], 0xC9);
    }

    #[test]
    fn walk_detects_cycle() {
        let mut fat = Fat::new_free();
        fat.cells[5] = 8;
        fat.cells[8] = 5;
        let err = fat.walk(5).unwrap_err();
        assert!(matches!(err, Error::CorruptFat { .. }));
    }

    #[test]
    fn free_chain_clears_entries() {
        let mut fat = Fat::new_free();
        fat.link(&[32, 33], 5);
        fat.free_chain(32).unwrap();
        assert_eq!(fat.cells[32], 0xFF);
        assert_eq!(fat.cells[33], 0xFF);
    }
}

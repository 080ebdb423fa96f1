//! # DECB (Disk Extended Color BASIC) file system
//!
//! The volume facade composes the geometry/addressing layer (`crate::img`), the FAT
//! allocator (`fat`), and the directory manager (`directory`) into the public surface a
//! caller (CLI, TUI, HTTP front end -- all out of scope here) actually needs: mount,
//! list, extract, insert, delete, rename, format, save.
//!
//! Mutating operations are transactional at the level of a single call: a shadow copy
//! of the FAT and directory is taken before any byte is touched, and restored if the
//! operation fails partway through (see `Volume::checkpoint`/`Volume::rollback`).

pub mod directory;
pub mod fat;
pub mod pack;
pub mod types;

use log::{debug, error, info, warn};

use crate::img::jvc::Image;
use crate::img::{Geometry, DIRECTORY_TRACK};
use directory::{Directory, RawEntry, DIRECTORY_SECTORS};
use fat::Fat;
use types::{FileMode, FileType};

use super::Error;

const FAT_SECTOR: usize = 2;
const FAT_LEN: usize = 68;
const FAT_SECTOR_PAD: usize = 256 - FAT_LEN;

/// One directory listing row, combining the raw entry with its computed size and chain
/// length -- the information `Volume::list` promises per SPEC_FULL.md section 4.5.
#[derive(Clone, Debug)]
pub struct Entry {
    pub name: String,
    pub file_type: Option<FileType>,
    pub mode: FileMode,
    pub first_granule: u8,
    pub size: usize,
    pub chain_length: usize,
}

/// A mounted DECB volume. Any mutating call moves the volume from Mounted to Dirty;
/// `save` moves it back to Mounted (now backed by the just-written file).
pub struct Volume {
    image: Image,
    fat: Fat,
    directory: Directory,
    /// Bytes 68..255 of the FAT sector, preserved verbatim until this crate performs a
    /// file-modifying write, at which point they become all-zero (the authentic
    /// post-write convention; see SPEC_FULL.md section 4.3).
    fat_trailer: [u8; FAT_SECTOR_PAD],
    dirty: bool,
}

impl Volume {
    /// Mount an image already held in memory. Fails with `InvalidImage` if the image is
    /// smaller than one full disk of its declared geometry, or doesn't reach the
    /// directory track at all.
    pub fn mount(image_bytes: &[u8]) -> Result<Self, Error> {
        let image = Image::mount(image_bytes)?;
        if image.tracks() <= DIRECTORY_TRACK {
            return Err(Error::InvalidImage);
        }
        let fat_sector = image.read_sector(DIRECTORY_TRACK, FAT_SECTOR)?;
        let mut fat_bytes = [0u8; FAT_LEN];
        fat_bytes.copy_from_slice(&fat_sector[0..FAT_LEN]);
        let mut fat_trailer = [0u8; FAT_SECTOR_PAD];
        fat_trailer.copy_from_slice(&fat_sector[FAT_LEN..256]);
        let fat = Fat::from_bytes(&fat_bytes);

        let mut dir_bytes = Vec::with_capacity(DIRECTORY_SECTORS.len() * 256);
        for s in DIRECTORY_SECTORS {
            dir_bytes.extend_from_slice(image.read_sector(DIRECTORY_TRACK, s)?);
        }
        let directory = Directory::from_bytes(&dir_bytes)
            .map_err(|_| Error::CorruptDirectory { index: 0, detail: "directory sectors did not parse into 72 32-byte entries" })?;

        info!("mounted DECB volume: {} tracks, header {} bytes", image.tracks(), image.header_len());
        Ok(Self { image, fat, directory, fat_trailer, dirty: false })
    }

    /// Compose a fresh image of `tracks` tracks and `sides` sides. `add_jvc_header`
    /// opts into a 5-byte JVC header (`{18,sides,1,1,0}`); the authentic real-CoCo
    /// default is no header at all.
    pub fn format(tracks: usize, sides: usize, add_jvc_header: bool) -> Self {
        let header_geom = if add_jvc_header {
            Some(Geometry { sectors_per_track: 18, sides, sector_size: 256, first_sector_id: 1, attribute: 0 })
        } else {
            None
        };
        let image = Image::format(tracks, sides, header_geom, 0xFF);
        let fat = Fat::new_free();
        let directory = Directory::new_blank();
        let mut vol = Self { image, fat, directory, fat_trailer: [0xFF; FAT_SECTOR_PAD], dirty: false };
        vol.write_metadata_sectors();
        vol
    }

    /// Write the FAT and directory sectors into the image buffer (in memory only).
    fn write_metadata_sectors(&mut self) {
        let mut fat_sector = [0u8; 256];
        fat_sector[0..FAT_LEN].copy_from_slice(&self.fat.to_bytes());
        fat_sector[FAT_LEN..256].copy_from_slice(&self.fat_trailer);
        self.image.write_sector(DIRECTORY_TRACK, FAT_SECTOR, &fat_sector).expect("directory track always present");

        let dir_bytes = self.directory.to_bytes();
        for (i, s) in DIRECTORY_SECTORS.into_iter().enumerate() {
            let chunk = &dir_bytes[i * 256..(i + 1) * 256];
            self.image.write_sector(DIRECTORY_TRACK, s, chunk).expect("directory track always present");
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn free_granules(&self) -> usize {
        self.fat.free_count()
    }

    /// Snapshot the FAT and directory so a failed mutating operation can be rolled back.
    fn checkpoint(&self) -> ([u8; FAT_LEN], Vec<u8>) {
        (self.fat.to_bytes(), self.directory.to_bytes())
    }

    fn rollback(&mut self, snap: ([u8; FAT_LEN], Vec<u8>)) {
        warn!("rolling back mutating operation after failure");
        self.fat = Fat::from_bytes(&snap.0);
        self.directory = Directory::from_bytes(&snap.1).expect("snapshot was valid when taken");
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.fat_trailer = [0x00; FAT_SECTOR_PAD];
    }

    /// Directory enumeration together with type, mode, head granule, computed size, and
    /// granule chain length. Fails with `CorruptFat` if any active entry's chain cannot
    /// be walked -- the FAT walker never returns a partial chain.
    pub fn list(&self) -> Result<Vec<Entry>, Error> {
        let mut out = Vec::new();
        let mut chains = Vec::new();
        for (idx, raw) in self.directory.active_entries() {
            let (chain, terminal_sectors) = self.fat.walk(raw.first_granule).map_err(|e| {
                error!("directory entry {} ({}) has a corrupt FAT chain", idx, raw.name_string());
                e
            })?;
            let size = Fat::file_size(chain.len(), terminal_sectors, raw.last_sector_bytes());
            out.push(Entry {
                name: raw.name_string(),
                file_type: raw.file_type(),
                mode: raw.mode(),
                first_granule: raw.first_granule,
                size,
                chain_length: chain.len(),
            });
            chains.push(chain);
        }
        fat::chains_are_disjoint(&chains);
        Ok(out)
    }

    fn resolve(&self, name: &str) -> Result<(usize, RawEntry), Error> {
        let (base, ext) = pack::validate_name(name)?;
        let (idx, entry) = self.directory.lookup(&base, &ext).ok_or_else(|| Error::FileNotFound(name.to_string()))?;
        Ok((idx, entry.clone()))
    }

    /// Walk the FAT from the entry's first granule, concatenate sectors in granule
    /// order, and truncate to the computed size.
    pub fn extract(&self, name: &str) -> Result<Vec<u8>, Error> {
        let (_idx, entry) = self.resolve(name)?;
        let (chain, terminal_sectors) = self.fat.walk(entry.first_granule)?;
        let size = Fat::file_size(chain.len(), terminal_sectors, entry.last_sector_bytes());
        let mut data = Vec::with_capacity(chain.len() * crate::img::GRANULE_BYTES);
        for g in &chain {
            let (track, start_sector, count) = Geometry::granule_to_location(*g);
            data.extend(self.image.read_sectors(track, start_sector, count)?);
        }
        data.truncate(size);
        Ok(data)
    }

    /// Compute the granule/sector bookkeeping for a payload of `len` bytes.
    /// Returns `(granules_needed, sectors_used_in_last_granule, last_sector_bytes)`.
    /// `len == 0` gets the reserved `(1, 1, 0)` sentinel `Fat::file_size` recognizes as
    /// "no data at all", rather than the `(1, 9, 0)` any nonzero length would coerce
    /// through the ordinary "0 means 256" reading to 2304 bytes of padding.
    fn layout_for(len: usize) -> (usize, u8, u16) {
        if len == 0 {
            return (1, 1, 0);
        }
        let granule_bytes = crate::img::GRANULE_BYTES;
        let granules_needed = (len + granule_bytes - 1) / granule_bytes;
        let remainder = len - (granules_needed - 1) * granule_bytes; // 1..=2304
        let sectors_used_last = ((remainder + 255) / 256) as u8; // 1..=9
        let last_sector_bytes = (remainder - (sectors_used_last as usize - 1) * 256) as u16; // 1..=256
        (granules_needed, sectors_used_last, last_sector_bytes)
    }

    /// Write `source_bytes` as a new directory entry named `name`. Fails with
    /// `InsufficientSpace`, `DirectoryFull`, `DuplicateName`, or `NameInvalid`; any
    /// partial mutation is rolled back before the error is returned.
    pub fn insert(&mut self, name: &str, source_bytes: &[u8], file_type: FileType, mode: FileMode) -> Result<(), Error> {
        let (base, ext) = pack::validate_name(name)?;
        if self.directory.lookup(&base, &ext).is_some() {
            return Err(Error::DuplicateName(name.to_string()));
        }
        let (granules_needed, sectors_used_last, last_sector_bytes) = Self::layout_for(source_bytes.len());
        if granules_needed > self.fat.free_count() {
            return Err(Error::InsufficientSpace { needed: granules_needed, available: self.fat.free_count() });
        }

        let snapshot = self.checkpoint();
        let result = (|| -> Result<(), Error> {
            let granules = self.fat.allocate(granules_needed)?;
            self.fat.link(&granules, sectors_used_last);
            let pad_byte = if mode == FileMode::Ascii { 0xFF } else { 0x00 };
            let mut payload = source_bytes.to_vec();
            payload.resize(granules_needed * crate::img::GRANULE_BYTES, pad_byte);
            for (i, g) in granules.iter().enumerate() {
                let (track, start_sector, count) = Geometry::granule_to_location(*g);
                let chunk = &payload[i * crate::img::GRANULE_BYTES..(i + 1) * crate::img::GRANULE_BYTES];
                for s in 0..count {
                    self.image.write_sector(track, start_sector + s, &chunk[s * 256..(s + 1) * 256])?;
                }
            }
            let entry = RawEntry::new_active(&base, &ext, file_type, mode, granules[0], last_sector_bytes);
            self.directory.insert(entry)?;
            Ok(())
        })();

        match result {
            Ok(()) => {
                self.mark_dirty();
                self.write_metadata_sectors();
                debug!("inserted `{}` ({} bytes, {} granules)", name, source_bytes.len(), granules_needed);
                Ok(())
            }
            Err(e) => {
                self.rollback(snapshot);
                Err(e)
            }
        }
    }

    /// Free the entry's chain and mark its directory slot deleted.
    pub fn delete(&mut self, name: &str) -> Result<(), Error> {
        let (idx, entry) = self.resolve(name)?;
        let snapshot = self.checkpoint();
        let result = (|| -> Result<(), Error> {
            self.fat.free_chain(entry.first_granule)?;
            self.directory.delete(idx);
            Ok(())
        })();
        match result {
            Ok(()) => {
                self.mark_dirty();
                self.write_metadata_sectors();
                Ok(())
            }
            Err(e) => {
                self.rollback(snapshot);
                Err(e)
            }
        }
    }

    /// Validate `new`, reject a duplicate, and mutate the directory entry in place.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), Error> {
        let (idx, _entry) = self.resolve(old)?;
        let (base, ext) = pack::validate_name(new)?;
        if let Some((other_idx, _)) = self.directory.lookup(&base, &ext) {
            if other_idx != idx {
                return Err(Error::DuplicateName(new.to_string()));
            }
        }
        self.directory.rename(idx, &base, &ext);
        self.mark_dirty();
        self.write_metadata_sectors();
        Ok(())
    }

    /// Write header (if any) then all sectors to `path`.
    pub fn save(&mut self, path: &str) -> Result<(), Error> {
        self.write_metadata_sectors();
        self.image.save(path)?;
        self.dirty = false;
        Ok(())
    }

    pub fn to_bytes(&mut self) -> Vec<u8> {
        self.write_metadata_sectors();
        self.image.to_bytes()
    }
}

/// Mount a volume from a file on disk.
pub fn mount_file(path: &str) -> Result<Volume, Error> {
    let bytes = std::fs::read(path)?;
    Volume::mount(&bytes)
}

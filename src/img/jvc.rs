//! ## JVC/DSK sector store
//!
//! Owns the full image buffer (header + sectors) and offers sector-granular reads and
//! writes.  This is the only object in the crate that indexes raw bytes; the FAT,
//! directory, and volume facade all go through it.

use log::{debug, trace};
use super::{Error, Geometry};

/// A mounted DSK/JVC image: an (optionally empty) header plus a flat run of sectors.
pub struct Image {
    header: Vec<u8>,
    geometry: Geometry,
    /// track-major, sector-minor: `sectors[effective_track][sector_index]`
    sectors: Vec<u8>,
    tracks: usize,
}

impl Image {
    /// Build an `Image` from a raw byte buffer, auto-detecting the header length.
    /// Fails with `InvalidImage` if the sector area does not divide evenly into whole
    /// sectors of the size implied by the header (or the default, if there is none).
    pub fn mount(data: &[u8]) -> Result<Self, Error> {
        let header_len = Geometry::detect(data.len());
        let header = data[0..header_len].to_vec();
        let geometry = Geometry::parse_header(&header)?;
        let sector_area = &data[header_len..];
        if sector_area.len() % geometry.sector_size != 0 {
            return Err(Error::InvalidImage);
        }
        let total_sectors = sector_area.len() / geometry.sector_size;
        if geometry.sectors_per_track == 0 || total_sectors % geometry.sectors_per_track != 0 {
            return Err(Error::InvalidImage);
        }
        let tracks = total_sectors / geometry.sectors_per_track / geometry.sides.max(1);
        debug!(
            "mounted image: header={} tracks={} sectors/track={} sides={} sector_size={}",
            header_len, tracks, geometry.sectors_per_track, geometry.sides, geometry.sector_size
        );
        Ok(Self {
            header,
            geometry,
            sectors: sector_area.to_vec(),
            tracks,
        })
    }

    /// Compose a fresh image of `tracks` tracks and `sides` sides, data sectors filled
    /// with `fill`.  `header` is `Some(geometry)` to prepend a 5-byte JVC header, `None`
    /// for a headerless raw DSK (the authentic real-CoCo default).
    pub fn format(tracks: usize, sides: usize, add_jvc_header: Option<Geometry>, fill: u8) -> Self {
        let geometry = add_jvc_header.unwrap_or_default();
        let total_bytes = tracks * sides * geometry.sectors_per_track * geometry.sector_size;
        Self {
            header: add_jvc_header.map(|g| g.to_header_bytes().to_vec()).unwrap_or_default(),
            geometry,
            sectors: vec![fill; total_bytes],
            tracks,
        }
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn header_len(&self) -> usize {
        self.header.len()
    }

    pub fn tracks(&self) -> usize {
        self.tracks
    }

    pub fn image_len(&self) -> usize {
        self.header.len() + self.sectors.len()
    }

    /// Offset within the sector area (header already stripped). `write_sector`/
    /// `read_sector` only ever address side 0 -- see DESIGN.md on the double-sided
    /// open question: this crate never *writes* a double-sided image, so the volume
    /// facade never needs a side parameter here.
    fn local_offset(&self, track: usize, sector: usize) -> Result<usize, Error> {
        let offset = self.geometry.sector_offset(0, track, 0, sector);
        if offset + self.geometry.sector_size > self.sectors.len() {
            return Err(Error::SectorAccess { track, sector });
        }
        Ok(offset)
    }

    /// Read one 256-byte (or geometry-defined) sector.
    pub fn read_sector(&self, track: usize, sector: usize) -> Result<&[u8], Error> {
        let off = self.local_offset(track, sector)?;
        trace!("read sector track {} sector {} at local offset {}", track, sector, off);
        Ok(&self.sectors[off..off + self.geometry.sector_size])
    }

    /// Overwrite one sector in place.  `data` is truncated or zero-padded to sector size.
    pub fn write_sector(&mut self, track: usize, sector: usize, data: &[u8]) -> Result<(), Error> {
        let off = self.local_offset(track, sector)?;
        trace!("write sector track {} sector {} at local offset {}", track, sector, off);
        let n = data.len().min(self.geometry.sector_size);
        self.sectors[off..off + n].copy_from_slice(&data[..n]);
        for b in &mut self.sectors[off + n..off + self.geometry.sector_size] {
            *b = 0;
        }
        Ok(())
    }

    /// Read `count` consecutive sectors starting at (track,sector), concatenated.
    pub fn read_sectors(&self, track: usize, sector: usize, count: usize) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(count * self.geometry.sector_size);
        for s in sector..sector + count {
            out.extend_from_slice(self.read_sector(track, s)?);
        }
        Ok(out)
    }

    /// Load an image from a file on disk.
    pub fn load(path: &str) -> Result<Self, Error> {
        let data = std::fs::read(path)?;
        Self::mount(&data)
    }

    /// Write header (if any) followed by all sectors to `path`.
    pub fn save(&self, path: &str) -> Result<(), Error> {
        let mut out = self.header.clone();
        out.extend_from_slice(&self.sectors);
        std::fs::write(path, out)?;
        Ok(())
    }

    /// Serialize the whole image (header + sectors) to a byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.image_len());
        out.extend_from_slice(&self.header);
        out.extend_from_slice(&self.sectors);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_bare_35_track_image() {
        let data = vec![0xffu8; 35 * 18 * 256];
        let img = Image::mount(&data).expect("should mount");
        assert_eq!(img.header_len(), 0);
        assert_eq!(img.tracks(), 35);
        assert_eq!(img.geometry().sectors_per_track, 18);
    }

    #[test]
    fn format_then_roundtrip_sector() {
        let mut img = Image::format(35, 1, None, 0xff);
        img.write_sector(17, 2, &[1, 2, 3]).unwrap();
        let sec = img.read_sector(17, 2).unwrap();
        assert_eq!(&sec[0..3], &[1, 2, 3]);
        assert_eq!(sec[3], 0);
    }
}

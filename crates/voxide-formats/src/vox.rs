//! MagicaVoxel `.vox` model reader.
//!
//! The format is a RIFF-style chunk stream: a `VOX ` magic and version,
//! then a `MAIN` chunk whose children carry the model size (`SIZE`), the
//! color palette (`RGBA`) and the voxel list (`XYZI`). Unknown chunks are
//! skipped. Files store z-up coordinates; the model rotates them to the
//! engine's y-up orientation on load.

use std::io::{BufReader, Read};

use glam::IVec3;
use rustc_hash::FxHashMap;
use tracing::debug;
use voxide_voxel::{Chunk, RgbaVoxel};

use crate::io::ByteReader;

/// Highest file version this reader accepts.
const SUPPORTED_VERSION: u32 = 150;

/// Errors raised while parsing a `.vox` file.
#[derive(Debug, thiserror::Error)]
pub enum VoxError {
    /// The stream does not start with the `VOX ` magic.
    #[error("not a vox file")]
    InvalidMagic,
    /// The file version is newer than this reader supports.
    #[error("unsupported vox version {0}")]
    UnsupportedVersion(u32),
    /// The top-level `MAIN` chunk is missing.
    #[error("expected MAIN chunk")]
    MissingMainChunk,
    /// A chunk that must be a leaf announced child chunks, or a chunk's
    /// declared content length is wrong.
    #[error("malformed {0} chunk")]
    MalformedChunk(&'static str),
    /// A model dimension exceeds the format's 256-voxel limit.
    #[error("model dimensions {0}×{1}×{2} exceed the format limit")]
    OversizedModel(u32, u32, u32),
    /// The voxel list length disagrees with the chunk's content size.
    #[error("voxel count mismatches data size")]
    VoxelCountMismatch,
    /// A voxel lies outside the declared model size.
    #[error("voxel position {pos} outside model bounds {size}")]
    VoxelOutOfBounds {
        /// The offending position (engine orientation).
        pos: IVec3,
        /// The model bounds (engine orientation).
        size: IVec3,
    },
    /// The file declared no `XYZI` voxel data.
    #[error("model contains no voxel data")]
    MissingVoxels,
    /// The underlying stream failed or ended early.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A parsed MagicaVoxel model: sparse voxel content over a 256-color palette.
pub struct VoxModel {
    size: IVec3,
    palette: Vec<RgbaVoxel>,
    /// Engine-oriented position → 1-based palette index.
    content: FxHashMap<IVec3, u8>,
}

impl VoxModel {
    /// Parses a model from a byte stream.
    pub fn read<R: Read>(reader: R) -> Result<Self, VoxError> {
        let mut reader = ByteReader::new(BufReader::new(reader));

        if reader.read_tag()? != *b"VOX " {
            return Err(VoxError::InvalidMagic);
        }
        let version = reader.read_u32()?;
        if version > SUPPORTED_VERSION {
            return Err(VoxError::UnsupportedVersion(version));
        }
        if reader.read_tag()? != *b"MAIN" {
            return Err(VoxError::MissingMainChunk);
        }
        let main_content = reader.read_u32()?;
        let mut remaining = i64::from(reader.read_u32()?);
        reader.skip(u64::from(main_content))?;

        let mut file_size = None;
        let mut palette = None;
        let mut voxels = None;
        while remaining > 0 {
            let tag = reader.read_tag()?;
            let content = reader.read_u32()?;
            let children = reader.read_u32()?;
            remaining -= 12 + i64::from(content) + i64::from(children);

            match &tag {
                b"SIZE" => file_size = Some(read_size(&mut reader, content, children)?),
                b"RGBA" => palette = Some(read_palette(&mut reader, content, children)?),
                b"XYZI" => voxels = Some(read_voxels(&mut reader, content, children)?),
                _ => reader.skip(u64::from(content) + u64::from(children))?,
            }
        }

        let file_size = file_size.ok_or(VoxError::MalformedChunk("SIZE"))?;
        let voxels = voxels.ok_or(VoxError::MissingVoxels)?;
        let palette = palette.unwrap_or_else(default_palette);
        Self::assemble(file_size, palette, voxels)
    }

    /// Rotates the raw z-up voxel list into engine orientation and indexes it.
    fn assemble(
        file_size: (u32, u32, u32),
        palette: Vec<RgbaVoxel>,
        voxels: Vec<(u8, u8, u8, u8)>,
    ) -> Result<Self, VoxError> {
        let (fx, fy, fz) = file_size;
        let size = IVec3::new(fx as i32, fz as i32, fy as i32);

        let mut content = FxHashMap::default();
        for (x, y, z, index) in voxels {
            if index == 0 {
                continue;
            }
            let pos = IVec3::new(
                i32::from(x),
                fz as i32 - 1 - i32::from(z),
                i32::from(y),
            );
            if !(pos.cmpge(IVec3::ZERO).all() && pos.cmplt(size).all()) {
                return Err(VoxError::VoxelOutOfBounds { pos, size });
            }
            content.insert(pos, index);
        }

        debug!(voxels = content.len(), %size, "loaded vox model");
        Ok(Self {
            size,
            palette,
            content,
        })
    }

    /// Number of non-empty voxels in the model.
    pub fn voxel_count(&self) -> usize {
        self.content.len()
    }
}

impl Chunk for VoxModel {
    type Voxel = RgbaVoxel;

    fn size(&self) -> IVec3 {
        self.size
    }

    fn at(&self, pos: IVec3) -> Option<&RgbaVoxel> {
        self.content
            .get(&pos)
            .map(|&index| &self.palette[usize::from(index) - 1])
    }

    fn for_each_voxel<F: FnMut(IVec3, &RgbaVoxel)>(&self, mut f: F) {
        for (&pos, &index) in &self.content {
            f(pos, &self.palette[usize::from(index) - 1]);
        }
    }
}

/// Reads a `SIZE` chunk: three u32 dimensions, 256 max each.
fn read_size<R: Read>(
    reader: &mut ByteReader<R>,
    content: u32,
    children: u32,
) -> Result<(u32, u32, u32), VoxError> {
    if content != 12 || children != 0 {
        return Err(VoxError::MalformedChunk("SIZE"));
    }
    let x = reader.read_u32()?;
    let y = reader.read_u32()?;
    let z = reader.read_u32()?;
    if x > 256 || y > 256 || z > 256 {
        return Err(VoxError::OversizedModel(x, y, z));
    }
    Ok((x, y, z))
}

/// Reads an `RGBA` chunk: exactly 256 four-byte colors.
fn read_palette<R: Read>(
    reader: &mut ByteReader<R>,
    content: u32,
    children: u32,
) -> Result<Vec<RgbaVoxel>, VoxError> {
    if content != 256 * 4 || children != 0 {
        return Err(VoxError::MalformedChunk("RGBA"));
    }
    let mut palette = Vec::with_capacity(256);
    for _ in 0..256 {
        let mut rgba = [0u8; 4];
        reader.read_exact(&mut rgba)?;
        palette.push(RgbaVoxel::new(voxide_voxel::Rgba::from_rgba8(
            rgba[0], rgba[1], rgba[2], rgba[3],
        )));
    }
    Ok(palette)
}

/// Reads an `XYZI` chunk: a count then `(x, y, z, colorIndex)` tuples.
fn read_voxels<R: Read>(
    reader: &mut ByteReader<R>,
    content: u32,
    children: u32,
) -> Result<Vec<(u8, u8, u8, u8)>, VoxError> {
    if children != 0 {
        return Err(VoxError::MalformedChunk("XYZI"));
    }
    let count = reader.read_u32()?;
    if content < 4 || u64::from(count) * 4 != u64::from(content) - 4 || count > 256 * 256 * 256 {
        return Err(VoxError::VoxelCountMismatch);
    }
    let mut voxels = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut voxel = [0u8; 4];
        reader.read_exact(&mut voxel)?;
        voxels.push((voxel[0], voxel[1], voxel[2], voxel[3]));
    }
    Ok(voxels)
}

/// The stock palette used when a file carries no `RGBA` chunk.
///
/// Entries expand 15-bit color seeds to 8-bit channels, low bits saturated.
fn default_palette() -> Vec<RgbaVoxel> {
    const SEEDS: [u16; 255] = [
        32767, 25599, 19455, 13311, 7167, 1023, 32543, 25375, 19231, 13087,
        6943, 799, 32351, 25183, 19039, 12895, 6751, 607, 32159, 24991,
        18847, 12703, 6559, 415, 31967, 24799, 18655, 12511, 6367, 223,
        31775, 24607, 18463, 12319, 6175, 31, 32760, 25592, 19448, 13304,
        7160, 1016, 32536, 25368, 19224, 13080, 6936, 792, 32344, 25176,
        19032, 12888, 6744, 600, 32152, 24984, 18840, 12696, 6552, 408,
        31960, 24792, 18648, 12504, 6360, 216, 31768, 24600, 18456, 12312,
        6168, 24, 32754, 25586, 19442, 13298, 7154, 1010, 32530, 25362,
        19218, 13074, 6930, 786, 32338, 25170, 19026, 12882, 6738, 594,
        32146, 24978, 18834, 12690, 6546, 402, 31954, 24786, 18642, 12498,
        6354, 210, 31762, 24594, 18450, 12306, 6162, 18, 32748, 25580,
        19436, 13292, 7148, 1004, 32524, 25356, 19212, 13068, 6924, 780,
        32332, 25164, 19020, 12876, 6732, 588, 32140, 24972, 18828, 12684,
        6540, 396, 31948, 24780, 18636, 12492, 6348, 204, 31756, 24588,
        18444, 12300, 6156, 12, 32742, 25574, 19430, 13286, 7142, 998,
        32518, 25350, 19206, 13062, 6918, 774, 32326, 25158, 19014, 12870,
        6726, 582, 32134, 24966, 18822, 12678, 6534, 390, 31942, 24774,
        18630, 12486, 6342, 198, 31750, 24582, 18438, 12294, 6150, 6,
        32736, 25568, 19424, 13280, 7136, 992, 32512, 25344, 19200, 13056,
        6912, 768, 32320, 25152, 19008, 12864, 6720, 576, 32128, 24960,
        18816, 12672, 6528, 384, 31936, 24768, 18624, 12480, 6336, 192,
        31744, 24576, 18432, 12288, 6144, 28, 26, 22, 20, 16,
        14, 10, 8, 4, 2, 896, 832, 704, 640, 512,
        448, 320, 256, 128, 64, 28672, 26624, 22528, 20480, 16384,
        14336, 10240, 8192, 4096, 2048, 29596, 27482, 23254, 21140, 16912,
        14798, 10570, 8456, 4228, 2114,
    ];

    SEEDS
        .iter()
        .map(|&seed| {
            let blue = (((seed & 0x1f) << 3) | 0x07) as u8;
            let green = ((((seed >> 5) & 0x1f) << 3) | 0x07) as u8;
            let red = ((((seed >> 10) & 0x1f) << 3) | 0x07) as u8;
            RgbaVoxel::opaque(red, green, blue)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn push_chunk(buf: &mut Vec<u8>, tag: &[u8; 4], content: &[u8]) {
        buf.extend_from_slice(tag);
        buf.extend_from_slice(&(content.len() as u32).to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(content);
    }

    /// A 2×3×4 (file axes) model with two voxels of color index 1 and 5.
    fn sample_file() -> Vec<u8> {
        let mut size = Vec::new();
        for dim in [2u32, 3, 4] {
            size.extend_from_slice(&dim.to_le_bytes());
        }

        let mut voxels = Vec::new();
        voxels.extend_from_slice(&2u32.to_le_bytes());
        voxels.extend_from_slice(&[0, 0, 0, 1]);
        voxels.extend_from_slice(&[1, 2, 3, 5]);

        let mut children = Vec::new();
        push_chunk(&mut children, b"SIZE", &size);
        push_chunk(&mut children, b"NOTE", b"ignore me");
        push_chunk(&mut children, b"XYZI", &voxels);

        let mut file = Vec::new();
        file.extend_from_slice(b"VOX ");
        file.extend_from_slice(&150u32.to_le_bytes());
        file.extend_from_slice(b"MAIN");
        file.extend_from_slice(&0u32.to_le_bytes());
        file.extend_from_slice(&(children.len() as u32).to_le_bytes());
        file.extend_from_slice(&children);
        file
    }

    #[test]
    fn test_reads_model_with_default_palette() {
        let model = VoxModel::read(sample_file().as_slice()).expect("parse failed");

        // File 2×3×4 becomes engine 2×4×3 (y-up).
        assert_eq!(model.size(), IVec3::new(2, 4, 3));
        assert_eq!(model.voxel_count(), 2);

        // File (0,0,0) lands at engine (0, fz-1, 0) = (0, 3, 0).
        let first = model.at(IVec3::new(0, 3, 0)).expect("first voxel missing");
        assert_eq!(*first, default_palette()[0]);

        // File (1,2,3) lands at engine (1, 0, 2).
        let second = model.at(IVec3::new(1, 0, 2)).expect("second voxel missing");
        assert_eq!(*second, default_palette()[4]);

        assert_eq!(model.at(IVec3::new(0, 0, 0)), None);
    }

    #[test]
    fn test_for_each_matches_at() {
        let model = VoxModel::read(sample_file().as_slice()).expect("parse failed");
        let mut count = 0;
        model.for_each_voxel(|pos, voxel| {
            assert_eq!(model.at(pos), Some(voxel));
            count += 1;
        });
        assert_eq!(count, model.voxel_count());
    }

    #[test]
    fn test_rejects_bad_magic() {
        let result = VoxModel::read(b"XVO 0000".as_slice());
        assert!(matches!(result, Err(VoxError::InvalidMagic)));
    }

    #[test]
    fn test_rejects_newer_version() {
        let mut file = sample_file();
        file[4..8].copy_from_slice(&151u32.to_le_bytes());
        let result = VoxModel::read(file.as_slice());
        assert!(matches!(result, Err(VoxError::UnsupportedVersion(151))));
    }

    #[test]
    fn test_truncated_file_is_an_io_error() {
        let file = sample_file();
        let result = VoxModel::read(&file[..file.len() - 3]);
        assert!(matches!(result, Err(VoxError::Io(_))));
    }

    #[test]
    fn test_rejects_voxel_count_mismatch() {
        let mut voxels = Vec::new();
        voxels.extend_from_slice(&3u32.to_le_bytes());
        voxels.extend_from_slice(&[0, 0, 0, 1]);

        let mut children = Vec::new();
        push_chunk(&mut children, b"XYZI", &voxels);

        let mut file = Vec::new();
        file.extend_from_slice(b"VOX ");
        file.extend_from_slice(&150u32.to_le_bytes());
        file.extend_from_slice(b"MAIN");
        file.extend_from_slice(&0u32.to_le_bytes());
        file.extend_from_slice(&(children.len() as u32).to_le_bytes());
        file.extend_from_slice(&children);

        let result = VoxModel::read(file.as_slice());
        assert!(matches!(result, Err(VoxError::VoxelCountMismatch)));
    }

    #[test]
    fn test_default_palette_colors_are_opaque() {
        let palette = default_palette();
        assert_eq!(palette.len(), 255);
        for voxel in &palette {
            assert!(voxide_voxel::Voxel::color(voxel).is_opaque());
        }
    }
}

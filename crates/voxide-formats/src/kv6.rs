//! SLAB6 `.kv6` model reader.
//!
//! A KV6 file stores surface voxels column by column: a flat block array
//! (color plus height within the column), a per-x total and a per-(x,y)
//! count describing how the array splits into columns. The model keeps this
//! compact representation instead of expanding to a dense volume; lookups
//! walk the column tables. File coordinates are z-down columns and rotate to
//! the engine's y-up orientation on access.

use std::io::{BufReader, Read};

use glam::IVec3;
use tracing::debug;
use voxide_voxel::{Chunk, RgbaVoxel};

use crate::io::ByteReader;

/// Errors raised while parsing a `.kv6` file.
#[derive(Debug, thiserror::Error)]
pub enum Kv6Error {
    /// The stream does not start with the `Kvxl` magic.
    #[error("not a kv6 file")]
    InvalidMagic,
    /// The column tables do not add up to the block count.
    #[error("column table covers {table} blocks, file has {blocks}")]
    InconsistentColumns {
        /// Total of the per-column counts.
        table: usize,
        /// Number of blocks in the file.
        blocks: usize,
    },
    /// The underlying stream failed or ended early.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One surface voxel: its color and its height within the column.
struct Kv6Block {
    voxel: RgbaVoxel,
    z: i32,
}

/// A parsed KV6 model in its native column-compressed form.
pub struct Kv6Model {
    /// Dimensions in file axes.
    file_size: IVec3,
    /// Surface blocks in column order (x-major, then y, ascending z).
    blocks: Vec<Kv6Block>,
    /// Per-x slab block totals.
    slab_totals: Vec<u32>,
    /// Per-(x, y) column block counts.
    column_counts: Vec<u16>,
}

impl Kv6Model {
    /// Parses a model from a byte stream.
    pub fn read<R: Read>(reader: R) -> Result<Self, Kv6Error> {
        let mut reader = ByteReader::new(BufReader::new(reader));

        if reader.read_tag()? != *b"Kvxl" {
            return Err(Kv6Error::InvalidMagic);
        }
        let size_x = reader.read_u32()? as usize;
        let size_y = reader.read_u32()? as usize;
        let size_z = reader.read_u32()? as usize;
        // Pivot point, unused here.
        reader.skip(3 * 4)?;

        let block_count = reader.read_u32()? as usize;
        let mut blocks = Vec::with_capacity(block_count);
        for _ in 0..block_count {
            let mut color = [0u8; 4];
            reader.read_exact(&mut color)?;
            let z = i32::from(reader.read_u16()?);
            // Visibility and lighting survey bytes, unused here.
            reader.skip(2)?;
            blocks.push(Kv6Block {
                voxel: RgbaVoxel::opaque(color[0], color[1], color[2]),
                z,
            });
        }

        let mut slab_totals = Vec::with_capacity(size_x);
        for _ in 0..size_x {
            slab_totals.push(reader.read_u32()?);
        }
        let mut column_counts = Vec::with_capacity(size_x * size_y);
        for _ in 0..size_x * size_y {
            column_counts.push(reader.read_u16()?);
        }

        let table: usize = column_counts.iter().map(|&count| count as usize).sum();
        if table != blocks.len() {
            return Err(Kv6Error::InconsistentColumns {
                table,
                blocks: blocks.len(),
            });
        }

        debug!(
            blocks = blocks.len(),
            size_x, size_y, size_z, "loaded kv6 model"
        );
        Ok(Self {
            file_size: IVec3::new(size_x as i32, size_y as i32, size_z as i32),
            blocks,
            slab_totals,
            column_counts,
        })
    }

    /// Number of surface voxels in the model.
    pub fn voxel_count(&self) -> usize {
        self.blocks.len()
    }

    /// File coordinates → engine coordinates (y-up).
    fn rotate(&self, pos: IVec3) -> IVec3 {
        IVec3::new(pos.x, self.file_size.z - 1 - pos.z, pos.y)
    }

    /// Engine coordinates → file coordinates.
    fn unrotate(&self, pos: IVec3) -> IVec3 {
        IVec3::new(pos.x, pos.z, self.file_size.z - 1 - pos.y)
    }
}

impl Chunk for Kv6Model {
    type Voxel = RgbaVoxel;

    fn size(&self) -> IVec3 {
        IVec3::new(self.file_size.x, self.file_size.z, self.file_size.y)
    }

    fn at(&self, pos: IVec3) -> Option<&RgbaVoxel> {
        let file = self.unrotate(pos);
        if !(file.cmpge(IVec3::ZERO).all() && file.cmplt(self.file_size).all()) {
            return None;
        }

        // Skip whole x slabs, then earlier columns of this slab.
        let mut index: usize = self.slab_totals[..file.x as usize]
            .iter()
            .map(|&total| total as usize)
            .sum();
        let row = (file.x * self.file_size.y) as usize;
        index += self.column_counts[row..row + file.y as usize]
            .iter()
            .map(|&count| count as usize)
            .sum::<usize>();

        let count = self.column_counts[row + file.y as usize] as usize;
        for block in self.blocks.get(index..index + count)? {
            if block.z == file.z {
                return Some(&block.voxel);
            }
            if block.z > file.z {
                break;
            }
        }
        None
    }

    fn for_each_voxel<F: FnMut(IVec3, &RgbaVoxel)>(&self, mut f: F) {
        let mut index = 0usize;
        for x in 0..self.file_size.x {
            for y in 0..self.file_size.y {
                let column = (x * self.file_size.y + y) as usize;
                for _ in 0..self.column_counts[column] {
                    let block = &self.blocks[index];
                    index += 1;
                    f(self.rotate(IVec3::new(x, y, block.z)), &block.voxel);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Voxel storage: capability traits, the color model, a dense chunk store with
//! a reuse pool, and an RLE-compressed chunk store over a de-duplicated palette.

pub mod color;
pub mod compressed;
pub mod coords;
pub mod dense;
pub mod varint;
pub mod voxel;

pub use color::Rgba;
pub use compressed::CompressedChunk;
pub use coords::{CHUNK_SIZE, CHUNK_VOLUME, delinearize, linearize};
pub use dense::{ChunkPool, DenseChunk};
pub use voxel::{Chunk, RgbaVoxel, Voxel};

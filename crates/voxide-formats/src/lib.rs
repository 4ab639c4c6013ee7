//! Voxel model file loaders.
//!
//! Each loader parses an external model format into a type implementing the
//! [`voxide_voxel::Chunk`] capability contract, ready for meshing.

mod io;
pub mod kv6;
pub mod vox;

pub use kv6::{Kv6Error, Kv6Model};
pub use vox::{VoxError, VoxModel};

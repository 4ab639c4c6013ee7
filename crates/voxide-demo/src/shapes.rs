//! Built-in test shapes for when no model file is given.

use clap::ValueEnum;
use glam::IVec3;
use voxide_voxel::{CHUNK_SIZE, DenseChunk, RgbaVoxel};

/// Generated chunk content.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Shape {
    /// The whole volume filled with one color.
    Solid,
    /// A two-tone sphere centered in the chunk.
    Sphere,
    /// Alternating voxels and gaps, the greedy mesher's worst case.
    Checkerboard,
}

/// Fills `chunk` with the selected shape.
pub fn fill(shape: Shape, chunk: &mut DenseChunk<RgbaVoxel>) {
    let size = CHUNK_SIZE as i32;
    let stone = RgbaVoxel::opaque(158, 158, 158);
    let moss = RgbaVoxel::opaque(96, 142, 82);

    for z in 0..size {
        for y in 0..size {
            for x in 0..size {
                let pos = IVec3::new(x, y, z);
                let voxel = match shape {
                    Shape::Solid => Some(stone),
                    Shape::Sphere => {
                        let center = (size as f32 - 1.0) / 2.0;
                        let offset = pos.as_vec3() - glam::Vec3::splat(center);
                        if offset.length() > center - 2.0 {
                            None
                        } else if y > size / 2 {
                            Some(moss)
                        } else {
                            Some(stone)
                        }
                    }
                    Shape::Checkerboard => {
                        if (x + y + z) % 2 == 0 {
                            Some(stone)
                        } else {
                            None
                        }
                    }
                };
                chunk.set(pos, voxel);
            }
        }
    }
}

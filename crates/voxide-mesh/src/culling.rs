//! Face culling: decides which voxel faces need geometry, per direction.

use glam::IVec3;
use voxide_voxel::{Chunk, Voxel};

use crate::direction::FaceDirection;
use crate::face_set::FaceSet;

/// Computes the visible faces of every voxel, one [`FaceSet`] per direction.
///
/// A face is visible when the voxel itself is not fully transparent and
/// either sits on the volume boundary in that direction or its neighbor is
/// not fully opaque; a partially transparent neighbor does not occlude.
/// With `emit_all` set, every non-transparent voxel contributes a face in
/// all six directions regardless of occlusion.
pub fn cull_faces<C: Chunk>(chunk: &C, emit_all: bool) -> [FaceSet<C::Voxel>; 6] {
    let size = chunk.size();
    let mut faces = std::array::from_fn(|_| FaceSet::new(size));

    chunk.for_each_voxel(|pos, voxel| {
        if voxel.color().is_invisible() {
            return;
        }
        for dir in FaceDirection::ALL {
            if emit_all
                || on_boundary(pos, size, dir)
                || !occludes(chunk.at(pos + dir.neighbor_offset()))
            {
                faces[dir.index()].insert(pos, voxel.clone());
            }
        }
    });

    faces
}

/// Whether `pos` touches the volume boundary in the given direction.
fn on_boundary(pos: IVec3, size: IVec3, dir: FaceDirection) -> bool {
    match dir {
        FaceDirection::NegX => pos.x == 0,
        FaceDirection::PosX => pos.x == size.x - 1,
        FaceDirection::NegY => pos.y == 0,
        FaceDirection::PosY => pos.y == size.y - 1,
        FaceDirection::NegZ => pos.z == 0,
        FaceDirection::PosZ => pos.z == size.z - 1,
    }
}

/// Only fully opaque neighbors hide the face they share.
fn occludes<V: Voxel>(neighbor: Option<&V>) -> bool {
    neighbor.is_some_and(|voxel| voxel.color().is_opaque())
}

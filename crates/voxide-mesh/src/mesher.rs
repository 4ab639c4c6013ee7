//! The mesh build pipeline: cull once, merge all six directions in parallel,
//! concatenate.

use std::time::Instant;

use tracing::debug;
use voxide_voxel::Chunk;

use crate::culling::cull_faces;
use crate::direction::FaceDirection;
use crate::greedy::{emit_unit_quads, merge_faces};
use crate::vertex::MeshVertex;

/// Build flags for [`build_mesh`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MesherOptions {
    /// Emit faces unconditionally instead of culling occluded ones.
    pub disable_culling: bool,
    /// Emit one quad per visible face instead of merging rectangles.
    pub disable_merging: bool,
    /// Hint for the rendering backend to skip buffer-object upload. Carried
    /// through untouched; the meshing logic ignores it.
    pub disable_buffer_upload: bool,
}

impl MesherOptions {
    /// All optimizations enabled.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Builds the renderable quad list for a chunk.
///
/// Culling runs once on the calling thread; the six per-direction merges are
/// independent and run on six forked threads, each writing its own output
/// slot. The call blocks until all six finish, then concatenates the
/// per-direction quad lists in direction order.
pub fn build_mesh<C>(chunk: &C, options: MesherOptions) -> Vec<MeshVertex>
where
    C: Chunk,
    C::Voxel: Send,
{
    let started = Instant::now();
    let culled = cull_faces(chunk, options.disable_culling);
    let cull_time = started.elapsed();

    let merge_started = Instant::now();
    let mut per_direction: [Vec<MeshVertex>; 6] = Default::default();
    std::thread::scope(|scope| {
        for ((faces, dir), slot) in culled
            .into_iter()
            .zip(FaceDirection::ALL)
            .zip(per_direction.iter_mut())
        {
            scope.spawn(move || {
                *slot = if options.disable_merging {
                    emit_unit_quads(faces, dir)
                } else {
                    merge_faces(faces, dir)
                };
            });
        }
    });
    let merge_time = merge_started.elapsed();

    let total: usize = per_direction.iter().map(Vec::len).sum();
    let mut mesh = Vec::with_capacity(total);
    for vertices in per_direction {
        mesh.extend(vertices);
    }

    debug!(
        quads = mesh.len() / 4,
        ?cull_time,
        ?merge_time,
        "built chunk mesh"
    );
    mesh
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

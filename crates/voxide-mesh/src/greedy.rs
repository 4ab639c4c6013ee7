//! Greedy quad merging: collapses same-valued coplanar faces into the fewest
//! rectangles, one direction at a time.

use glam::IVec3;
use voxide_voxel::Voxel;

use crate::direction::FaceDirection;
use crate::face_set::FaceSet;
use crate::vertex::MeshVertex;

/// Merges the visible faces of one direction into rectangles.
///
/// Each iteration picks the next remaining face as a seed, walks backward
/// along both in-plane axes to the rectangle's minimal corner, then grows the
/// rectangle forward: width cell-by-cell along `d1`, height full-row-by-row
/// along `d2`. Consumed cells are removed, so every face ends up in exactly
/// one quad.
pub fn merge_faces<V: Voxel>(mut faces: FaceSet<V>, dir: FaceDirection) -> Vec<MeshVertex> {
    let mut out = Vec::with_capacity(faces.len());
    let (d1, d2) = dir.in_plane_axes();

    while let Some((seed, value)) = faces.pop_seed() {
        // Anchor the rectangle at its minimal corner.
        let mut origin = seed;
        loop {
            let prev = origin - d1;
            if faces.get(prev) == Some(&value) {
                origin = prev;
            } else {
                break;
            }
        }
        loop {
            let prev = origin - d2;
            if faces.get(prev) == Some(&value) {
                origin = prev;
            } else {
                break;
            }
        }
        faces.take(origin);

        let mut width = 1;
        loop {
            let next = origin + d1 * width;
            if faces.get(next) == Some(&value) {
                faces.take(next);
                width += 1;
            } else {
                break;
            }
        }

        // A row one step further only counts if it is complete; partial rows
        // stay behind for a later rectangle.
        let mut height = 1;
        'rows: loop {
            let row = origin + d2 * height;
            for step in 0..width {
                if faces.get(row + d1 * step) != Some(&value) {
                    break 'rows;
                }
            }
            for step in 0..width {
                faces.take(row + d1 * step);
            }
            height += 1;
        }

        push_quad(&mut out, dir, origin, width, height, &value);
    }

    out
}

/// Emits one 1×1 quad per visible face, for the merging-disabled path.
pub fn emit_unit_quads<V: Voxel>(mut faces: FaceSet<V>, dir: FaceDirection) -> Vec<MeshVertex> {
    let mut out = Vec::with_capacity(faces.len() * 4);
    while let Some((pos, value)) = faces.pop_seed() {
        faces.take(pos);
        push_quad(&mut out, dir, pos, 1, 1, &value);
    }
    out
}

/// Appends the four corners of a rectangle anchored at `origin`.
///
/// Winding order: corner, +d1·width, +d1·width+d2·height, +d2·height. A voxel
/// whose color fails quantization contributes no quad; one bad voxel must not
/// abort the rest of the mesh.
fn push_quad<V: Voxel>(
    out: &mut Vec<MeshVertex>,
    dir: FaceDirection,
    origin: IVec3,
    width: i32,
    height: i32,
    voxel: &V,
) {
    let Some(color) = voxel.color().quantize() else {
        return;
    };
    let color = color.to_array();
    let normal = dir.normal().to_array();

    let (d1, d2) = dir.in_plane_axes();
    let base = (origin + dir.face_offset()).as_vec3();
    let du = (d1 * width).as_vec3();
    let dv = (d2 * height).as_vec3();

    for corner in [base, base + du, base + du + dv, base + dv] {
        out.push(MeshVertex {
            color,
            normal,
            position: corner.to_array(),
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use voxide_voxel::{Rgba, RgbaVoxel};

    const SIZE: i32 = 8;

    fn face_set() -> FaceSet<RgbaVoxel> {
        FaceSet::new(IVec3::splat(SIZE))
    }

    /// Splits the vertex list back into quads and returns each quad's area.
    fn quad_areas(vertices: &[MeshVertex]) -> Vec<f32> {
        assert_eq!(vertices.len() % 4, 0, "vertex count must be a quad list");
        vertices
            .chunks_exact(4)
            .map(|quad| {
                let corner = glam::Vec3::from(quad[0].position);
                let du = glam::Vec3::from(quad[1].position) - corner;
                let dv = glam::Vec3::from(quad[3].position) - corner;
                du.length() * dv.length()
            })
            .collect()
    }

    #[test]
    fn test_full_plane_merges_to_one_quad() {
        let mut faces = face_set();
        let stone = RgbaVoxel::opaque(99, 99, 99);
        for z in 0..SIZE {
            for x in 0..SIZE {
                faces.insert(IVec3::new(x, 3, z), stone);
            }
        }

        let mesh = merge_faces(faces, FaceDirection::PosY);
        assert_eq!(mesh.len(), 4, "expected one quad");
        assert_eq!(quad_areas(&mesh), vec![(SIZE * SIZE) as f32]);

        // The +Y face plane sits one unit above the cells.
        for vertex in &mesh {
            assert_eq!(vertex.position[1], 4.0);
            assert_eq!(vertex.normal, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn test_l_shape_covers_exact_area() {
        let mut faces = face_set();
        let stone = RgbaVoxel::opaque(50, 60, 70);
        let mut count = 0;
        for x in 0..5 {
            faces.insert(IVec3::new(x, 0, 0), stone);
            count += 1;
        }
        for z in 1..5 {
            faces.insert(IVec3::new(0, 0, z), stone);
            count += 1;
        }

        let mesh = merge_faces(faces, FaceDirection::PosY);
        let areas = quad_areas(&mesh);
        assert!(areas.len() >= 2, "an L cannot be a single rectangle");
        assert_eq!(areas.iter().sum::<f32>(), count as f32);
    }

    #[test]
    fn test_different_colors_never_merge() {
        let mut faces = face_set();
        for x in 0..4 {
            faces.insert(IVec3::new(x, 0, 0), RgbaVoxel::opaque(200, 0, 0));
        }
        for x in 4..8 {
            faces.insert(IVec3::new(x, 0, 0), RgbaVoxel::opaque(0, 200, 0));
        }

        let mesh = merge_faces(faces, FaceDirection::PosY);
        let areas = quad_areas(&mesh);
        assert_eq!(areas.len(), 2);
        assert_eq!(areas, vec![4.0, 4.0]);
    }

    #[test]
    fn test_coverage_is_insensitive_to_insertion_order() {
        let stone = RgbaVoxel::opaque(10, 20, 30);
        let mut cells = Vec::new();
        for z in 0..SIZE {
            for x in 0..SIZE {
                if (x + z) % 3 != 0 {
                    cells.push(IVec3::new(x, 2, z));
                }
            }
        }

        let mut forward = face_set();
        for &pos in &cells {
            forward.insert(pos, stone);
        }
        let mut backward = face_set();
        for &pos in cells.iter().rev() {
            backward.insert(pos, stone);
        }

        let area_forward: f32 = quad_areas(&merge_faces(forward, FaceDirection::NegY))
            .iter()
            .sum();
        let area_backward: f32 = quad_areas(&merge_faces(backward, FaceDirection::NegY))
            .iter()
            .sum();
        assert_eq!(area_forward, cells.len() as f32);
        assert_eq!(area_backward, cells.len() as f32);
    }

    #[test]
    fn test_unit_quads_skip_the_backward_walk() {
        let mut faces = face_set();
        let stone = RgbaVoxel::opaque(99, 99, 99);
        let mut count = 0;
        for z in 0..SIZE {
            for x in 0..SIZE {
                faces.insert(IVec3::new(x, 3, z), stone);
                count += 1;
            }
        }

        let mesh = emit_unit_quads(faces, FaceDirection::PosY);
        assert_eq!(mesh.len(), count * 4);
        assert!(quad_areas(&mesh).iter().all(|&area| area == 1.0));
    }

    #[test]
    fn test_unconvertible_color_is_skipped() {
        let mut faces = face_set();
        faces.insert(
            IVec3::new(0, 0, 0),
            RgbaVoxel::new(Rgba::new(0.5, 0.5, 0.5, 0.0)),
        );
        faces.insert(IVec3::new(2, 0, 0), RgbaVoxel::opaque(1, 1, 1));

        let mesh = merge_faces(faces, FaceDirection::PosY);
        assert_eq!(mesh.len(), 4, "only the valid face should emit a quad");
    }

    #[test]
    fn test_negative_direction_faces_sit_on_the_near_plane() {
        let mut faces = face_set();
        faces.insert(IVec3::new(2, 5, 2), RgbaVoxel::opaque(77, 77, 77));

        let mesh = merge_faces(faces, FaceDirection::NegY);
        for vertex in &mesh {
            assert_eq!(vertex.position[1], 5.0);
            assert_eq!(vertex.normal, [0.0, -1.0, 0.0]);
        }
    }
}

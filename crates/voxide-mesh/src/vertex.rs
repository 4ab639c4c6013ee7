//! The quad-vertex record consumed by the rendering backend.

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

/// One corner of a mesh quad: color, normal, position, in that order.
///
/// The layout is `repr(C)` and `Pod` so a `&[MeshVertex]` can be uploaded
/// byte-for-byte as an interleaved vertex buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// RGBA color, quantized onto the color model's lattice.
    pub color: [f32; 4],
    /// Outward face normal.
    pub normal: [f32; 3],
    /// Corner position in chunk-local coordinates.
    pub position: [f32; 3],
}

/// Byte size of one vertex in the interleaved buffer.
pub const MESH_VERTEX_SIZE: usize = std::mem::size_of::<MeshVertex>();

const_assert_eq!(MESH_VERTEX_SIZE, 40);

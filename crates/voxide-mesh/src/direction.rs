//! The six axis-aligned directions a voxel face can point.

use glam::{IVec3, Vec3};

/// One of the six cardinal face directions.
///
/// The discriminant is the direction's slot in per-direction arrays and the
/// order in which per-direction quad lists are concatenated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FaceDirection {
    /// −X direction.
    NegX = 0,
    /// +X direction.
    PosX = 1,
    /// −Y direction.
    NegY = 2,
    /// +Y direction.
    PosY = 3,
    /// −Z direction.
    NegZ = 4,
    /// +Z direction.
    PosZ = 5,
}

impl FaceDirection {
    /// All six directions in slot order.
    pub const ALL: [FaceDirection; 6] = [
        Self::NegX,
        Self::PosX,
        Self::NegY,
        Self::PosY,
        Self::NegZ,
        Self::PosZ,
    ];

    /// Unit step toward the neighbor this face looks at.
    pub fn neighbor_offset(self) -> IVec3 {
        match self {
            Self::NegX => IVec3::NEG_X,
            Self::PosX => IVec3::X,
            Self::NegY => IVec3::NEG_Y,
            Self::PosY => IVec3::Y,
            Self::NegZ => IVec3::NEG_Z,
            Self::PosZ => IVec3::Z,
        }
    }

    /// The two in-plane axes `(d1, d2)` a face rectangle grows along.
    ///
    /// `d1` is the width axis, `d2` the height axis; `d1 × d2` points along
    /// the outward normal for positive directions.
    pub fn in_plane_axes(self) -> (IVec3, IVec3) {
        match self {
            Self::NegX | Self::PosX => (IVec3::Z, IVec3::Y),
            Self::NegY | Self::PosY => (IVec3::Z, IVec3::X),
            Self::NegZ | Self::PosZ => (IVec3::X, IVec3::Y),
        }
    }

    /// Integer offset from a cell's minimal corner to the face plane.
    ///
    /// Faces pointing along a positive axis sit on the far side of the cell.
    pub fn face_offset(self) -> IVec3 {
        match self {
            Self::PosX => IVec3::X,
            Self::PosY => IVec3::Y,
            Self::PosZ => IVec3::Z,
            Self::NegX | Self::NegY | Self::NegZ => IVec3::ZERO,
        }
    }

    /// The face's unit normal.
    pub fn normal(self) -> Vec3 {
        self.neighbor_offset().as_vec3()
    }

    /// The direction's slot index (0–5).
    pub fn index(self) -> usize {
        self as usize
    }
}

//! Capability traits for voxels and voxel volumes.

use glam::IVec3;

use crate::color::Rgba;

/// A unit volume element carrying a color with opacity.
///
/// Value equality (`PartialEq`) decides whether two adjacent faces may be
/// merged into one quad; the color's alpha channel decides whether the voxel
/// occludes its neighbors.
pub trait Voxel: Clone + PartialEq {
    /// The voxel's surface color.
    fn color(&self) -> Rgba;
}

/// A cuboid voxel volume addressed by integer coordinates in `[0, size)`.
///
/// Absence (`None` from [`at`](Chunk::at)) means "no content here".
/// Out-of-range lookups are a caller error for the fixed-size stores and
/// return `None` for loader-backed models; callers must not rely on either.
pub trait Chunk {
    /// The voxel value type stored in this volume.
    type Voxel: Voxel;

    /// The volume's dimensions.
    fn size(&self) -> IVec3;

    /// Returns the voxel at `pos`, or `None` for empty cells.
    fn at(&self, pos: IVec3) -> Option<&Self::Voxel>;

    /// Visits every non-empty voxel.
    ///
    /// The provided implementation scans the full volume through
    /// [`at`](Chunk::at); stores with a cheaper enumeration override it.
    fn for_each_voxel<F: FnMut(IVec3, &Self::Voxel)>(&self, mut f: F) {
        let size = self.size();
        for x in 0..size.x {
            for y in 0..size.y {
                for z in 0..size.z {
                    let pos = IVec3::new(x, y, z);
                    if let Some(voxel) = self.at(pos) {
                        f(pos, voxel);
                    }
                }
            }
        }
    }
}

/// A plain colored voxel, the concrete type used by model loaders and tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RgbaVoxel {
    color: Rgba,
}

impl RgbaVoxel {
    /// Creates a voxel with the given color.
    pub fn new(color: Rgba) -> Self {
        Self { color }
    }

    /// Creates a fully opaque voxel from 8-bit color channels.
    pub fn opaque(red: u8, green: u8, blue: u8) -> Self {
        Self {
            color: Rgba::from_rgba8(red, green, blue, 255),
        }
    }
}

impl Voxel for RgbaVoxel {
    fn color(&self) -> Rgba {
        self.color
    }
}

//! Frustum plane extraction from the combined projection×view transform and
//! point/sphere/box visibility queries.

use glam::{Mat4, Vec3, Vec4};

/// Plane slots in the frustum's plane array.
const RIGHT: usize = 0;
const LEFT: usize = 1;
const BOTTOM: usize = 2;
const TOP: usize = 3;
const FAR: usize = 4;
const NEAR: usize = 5;

/// A clipping plane: unit inward normal plus signed distance term.
///
/// Points with positive signed distance lie on the visible side.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Plane {
    /// Unit normal pointing into the frustum.
    pub normal: Vec3,
    /// Signed distance term; `normal · p + d` is the distance of `p`.
    pub d: f32,
}

impl Plane {
    /// Builds a normalized plane from a raw `(a, b, c, d)` row combination.
    fn from_coefficients(coefficients: Vec4) -> Self {
        let normal = coefficients.truncate();
        let length = normal.length();
        let scale = if length > 0.0 { 1.0 / length } else { 0.0 };
        Self {
            normal: normal * scale,
            d: coefficients.w * scale,
        }
    }

    /// Signed distance of `point` from the plane.
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }
}

/// The six-plane view frustum.
///
/// Starts *stale*: planes are all-zero until the first [`update`](Self::update)
/// and must not be queried before then. Rebuild only when the camera's
/// transform actually changed; queries between updates reuse the extracted
/// planes. Updating while another thread queries the same instance is not
/// supported; both belong on the render thread.
#[derive(Clone, Debug, Default)]
pub struct Frustum {
    planes: [Plane; 6],
    current: bool,
}

impl Frustum {
    /// Creates a stale frustum; call [`update`](Self::update) before querying.
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-extracts the six planes from the camera's transforms.
    ///
    /// The clip transform is `projection × view`; each plane comes from the
    /// standard row addition/subtraction identities and is normalized.
    pub fn update(&mut self, projection: Mat4, view: Mat4) {
        let clip = projection * view;
        let row3 = clip.row(3);

        self.planes[LEFT] = Plane::from_coefficients(row3 + clip.row(0));
        self.planes[RIGHT] = Plane::from_coefficients(row3 - clip.row(0));
        self.planes[BOTTOM] = Plane::from_coefficients(row3 + clip.row(1));
        self.planes[TOP] = Plane::from_coefficients(row3 - clip.row(1));
        self.planes[NEAR] = Plane::from_coefficients(row3 + clip.row(2));
        self.planes[FAR] = Plane::from_coefficients(row3 - clip.row(2));
        self.current = true;
    }

    /// Whether a point lies inside the frustum.
    pub fn is_point_within(&self, point: Vec3) -> bool {
        debug_assert!(self.current, "frustum queried before first update");
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(point) > 0.0)
    }

    /// Whether a sphere intersects the frustum.
    pub fn is_sphere_within(&self, center: Vec3, radius: f32) -> bool {
        debug_assert!(self.current, "frustum queried before first update");
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(center) > -radius)
    }

    /// Whether an axis-aligned box at `pos` with the given extents may be
    /// visible.
    ///
    /// Tests the box's bounding sphere, so the answer is conservative: an
    /// object is never reported invisible while any part of it could be on
    /// screen, at the cost of false positives near frustum corners.
    pub fn is_cube_within(&self, pos: Vec3, size: Vec3) -> bool {
        let half = size * 0.5;
        self.is_sphere_within(pos + half, half.length())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

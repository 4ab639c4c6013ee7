//! View-frustum visibility tests used to skip off-screen objects before
//! mesh submission.

pub mod frustum;

pub use frustum::{Frustum, Plane};

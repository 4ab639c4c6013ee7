//! Canonical coordinate layout for the fixed-size chunk stores.

use glam::IVec3;

/// Side length of a chunk store in voxels.
pub const CHUNK_SIZE: usize = 64;

/// Total number of voxel cells in a chunk store (64³).
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// Converts a position to the canonical linear index (z-major, then y, then x).
pub fn linearize(pos: IVec3) -> usize {
    debug_assert!(
        pos.cmpge(IVec3::ZERO).all() && pos.cmplt(IVec3::splat(CHUNK_SIZE as i32)).all(),
        "position {pos} outside chunk bounds"
    );
    ((pos.z as usize * CHUNK_SIZE) + pos.y as usize) * CHUNK_SIZE + pos.x as usize
}

/// Converts a canonical linear index back to a position.
pub fn delinearize(index: usize) -> IVec3 {
    IVec3::new(
        (index % CHUNK_SIZE) as i32,
        ((index / CHUNK_SIZE) % CHUNK_SIZE) as i32,
        ((index / (CHUNK_SIZE * CHUNK_SIZE)) % CHUNK_SIZE) as i32,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

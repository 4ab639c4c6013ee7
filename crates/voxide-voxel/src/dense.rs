//! Dense (uncompressed) chunk storage and its reuse pool.

use std::sync::Mutex;

use glam::IVec3;

use crate::coords::{CHUNK_SIZE, CHUNK_VOLUME, delinearize, linearize};
use crate::voxel::{Chunk, Voxel};

type Storage<V> = Box<[Option<V>]>;

/// A dense 64×64×64 voxel array, the mutable working form of a chunk.
///
/// Instances are checked out of a [`ChunkPool`] and must be handed back with
/// [`ChunkPool::release`] when no longer needed. Release consumes the chunk,
/// so a released chunk cannot be used again.
pub struct DenseChunk<V> {
    voxels: Storage<V>,
}

impl<V: Voxel> DenseChunk<V> {
    fn from_storage(voxels: Storage<V>) -> Self {
        debug_assert_eq!(voxels.len(), CHUNK_VOLUME);
        Self { voxels }
    }

    /// Sets the cell at `pos`; `None` clears it.
    pub fn set(&mut self, pos: IVec3, voxel: Option<V>) {
        self.voxels[linearize(pos)] = voxel;
    }

    /// Fills `len` consecutive cells starting at linear index `start`.
    pub(crate) fn fill_run(&mut self, start: usize, len: usize, voxel: &Option<V>) {
        for slot in &mut self.voxels[start..start + len] {
            *slot = voxel.clone();
        }
    }

    /// The cells in canonical scan order.
    pub(crate) fn slots(&self) -> &[Option<V>] {
        &self.voxels
    }

    fn into_storage(mut self) -> Storage<V> {
        for slot in &mut self.voxels {
            *slot = None;
        }
        self.voxels
    }
}

impl<V: Voxel> Chunk for DenseChunk<V> {
    type Voxel = V;

    fn size(&self) -> IVec3 {
        IVec3::splat(CHUNK_SIZE as i32)
    }

    fn at(&self, pos: IVec3) -> Option<&V> {
        self.voxels[linearize(pos)].as_ref()
    }

    fn for_each_voxel<F: FnMut(IVec3, &V)>(&self, mut f: F) {
        for (index, slot) in self.voxels.iter().enumerate() {
            if let Some(voxel) = slot {
                f(delinearize(index), voxel);
            }
        }
    }
}

/// A thread-safe free-list of dense chunk buffers.
///
/// Acquire and release are the only synchronization points; a checked-out
/// chunk is single-owner until released. Chunks come back from
/// [`acquire`](Self::acquire) fully empty.
pub struct ChunkPool<V> {
    free: Mutex<Vec<Storage<V>>>,
}

impl<V: Voxel> ChunkPool<V> {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self {
            free: Mutex::new(Vec::new()),
        }
    }

    /// Checks out an empty dense chunk, reusing a pooled buffer if available.
    pub fn acquire(&self) -> DenseChunk<V> {
        let storage = self.free.lock().unwrap().pop();
        match storage {
            Some(storage) => DenseChunk::from_storage(storage),
            None => DenseChunk::from_storage(vec![None; CHUNK_VOLUME].into_boxed_slice()),
        }
    }

    /// Returns a chunk's buffer to the pool, clearing it first.
    pub fn release(&self, chunk: DenseChunk<V>) {
        let storage = chunk.into_storage();
        self.free.lock().unwrap().push(storage);
    }

    /// Number of buffers currently sitting in the free list.
    pub fn idle_count(&self) -> usize {
        self.free.lock().unwrap().len()
    }
}

impl<V: Voxel> Default for ChunkPool<V> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

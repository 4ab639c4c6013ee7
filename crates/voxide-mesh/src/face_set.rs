//! Per-direction visible-face index with O(1) removal and deterministic
//! seed order.
//!
//! A `FaceSet` is a dense occupancy grid keyed by flattened coordinate plus
//! an insertion-ordered worklist. The greedy merger consumes it
//! destructively: cells are taken as they are merged into quads, and seeds
//! are handed out in insertion order so the rectangle decomposition does not
//! depend on hash-iteration accidents.

use glam::IVec3;
use voxide_voxel::Voxel;

/// The set of voxel faces visible in one direction, keyed by cell position.
pub struct FaceSet<V> {
    size: IVec3,
    cells: Vec<Option<V>>,
    /// Cell indices in insertion order; entries go stale when taken.
    worklist: Vec<u32>,
    /// First worklist entry that may still be occupied.
    cursor: usize,
    occupied: usize,
}

impl<V: Voxel> FaceSet<V> {
    /// Creates an empty set covering a volume of the given dimensions.
    pub fn new(size: IVec3) -> Self {
        let capacity = (size.x * size.y * size.z) as usize;
        Self {
            size,
            cells: vec![None; capacity],
            worklist: Vec::new(),
            cursor: 0,
            occupied: 0,
        }
    }

    /// Records a visible face at `pos`. The position must be in bounds and
    /// not already present.
    pub fn insert(&mut self, pos: IVec3, voxel: V) {
        let index = self
            .index_of(pos)
            .unwrap_or_else(|| panic!("face position {pos} outside volume {}", self.size));
        debug_assert!(self.cells[index].is_none(), "duplicate face at {pos}");
        self.cells[index] = Some(voxel);
        self.worklist.push(index as u32);
        self.occupied += 1;
    }

    /// Returns the face value at `pos`, or `None` if absent or out of bounds.
    pub fn get(&self, pos: IVec3) -> Option<&V> {
        self.cells[self.index_of(pos)?].as_ref()
    }

    /// Removes and returns the face at `pos`.
    pub fn take(&mut self, pos: IVec3) -> Option<V> {
        let index = self.index_of(pos)?;
        let taken = self.cells[index].take();
        if taken.is_some() {
            self.occupied -= 1;
        }
        taken
    }

    /// Returns the next remaining face in insertion order without removing it.
    ///
    /// The same seed is returned again until it is taken, so callers must
    /// consume at least the seed's eventual merge corner per iteration.
    pub fn pop_seed(&mut self) -> Option<(IVec3, V)> {
        while let Some(&index) = self.worklist.get(self.cursor) {
            if let Some(voxel) = &self.cells[index as usize] {
                return Some((self.position_of(index as usize), voxel.clone()));
            }
            self.cursor += 1;
        }
        None
    }

    /// Number of faces still present.
    pub fn len(&self) -> usize {
        self.occupied
    }

    /// Whether no faces remain.
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    fn index_of(&self, pos: IVec3) -> Option<usize> {
        if pos.cmpge(IVec3::ZERO).all() && pos.cmplt(self.size).all() {
            Some((((pos.z * self.size.y) + pos.y) * self.size.x + pos.x) as usize)
        } else {
            None
        }
    }

    fn position_of(&self, index: usize) -> IVec3 {
        let index = index as i32;
        IVec3::new(
            index % self.size.x,
            (index / self.size.x) % self.size.y,
            index / (self.size.x * self.size.y),
        )
    }
}

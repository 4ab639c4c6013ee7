//! RLE-compressed chunk storage over a de-duplicated color palette.
//!
//! The compressed form is a palette of distinct voxel values (first-seen
//! order, slot 0 covering "empty" for an all-empty volume) plus a byte
//! buffer of `(palette_index, run_length)` varint pairs in canonical scan
//! order. Runs cover all 262,144 cells exactly once.

use glam::IVec3;
use tracing::debug;

use crate::coords::{CHUNK_SIZE, CHUNK_VOLUME, delinearize, linearize};
use crate::dense::{ChunkPool, DenseChunk};
use crate::varint;
use crate::voxel::{Chunk, Voxel};

/// An immutable run-length-encoded chunk.
pub struct CompressedChunk<V> {
    /// Distinct voxel values in first-seen order; `None` entries encode
    /// "empty". Lookup is a linear scan, palettes stay small.
    palette: Vec<Option<V>>,
    /// Varint `(palette_index, run_length)` pairs covering the full volume.
    runs: Vec<u8>,
}

impl<V: Voxel> CompressedChunk<V> {
    /// Compresses a dense chunk.
    ///
    /// Scans the volume in canonical order, accumulating a run while the
    /// palette index repeats and emitting `(index, length)` on each change.
    pub fn compress(dense: &DenseChunk<V>) -> Self {
        let mut palette: Vec<Option<V>> = Vec::new();
        let mut runs = Vec::new();
        let mut run_count = 0usize;

        let mut current = u64::MAX;
        let mut length = 0u64;
        for slot in dense.slots() {
            let index = palette_index(&mut palette, slot);
            if index == current && length > 0 {
                length += 1;
            } else {
                if length > 0 {
                    varint::encode_into(&mut runs, current);
                    varint::encode_into(&mut runs, length);
                    run_count += 1;
                }
                current = index;
                length = 1;
            }
        }
        if length > 0 {
            varint::encode_into(&mut runs, current);
            varint::encode_into(&mut runs, length);
            run_count += 1;
        }

        debug!(
            runs = run_count,
            bytes = runs.len(),
            palette = palette.len(),
            "compressed chunk"
        );
        Self { palette, runs }
    }

    /// Decompresses into a dense chunk checked out of `pool`.
    pub fn uncompress(&self, pool: &ChunkPool<V>) -> DenseChunk<V> {
        let mut dense = pool.acquire();
        self.for_each_run(|start, len, value| {
            dense.fill_run(start, len, value);
            true
        });
        dense
    }

    /// Number of `(index, length)` pairs in the run buffer.
    pub fn run_count(&self) -> usize {
        let mut count = 0;
        self.for_each_run(|_, _, _| {
            count += 1;
            true
        });
        count
    }

    /// Size of the run buffer in bytes.
    pub fn compressed_len(&self) -> usize {
        self.runs.len()
    }

    /// Number of distinct palette entries.
    pub fn palette_len(&self) -> usize {
        self.palette.len()
    }

    /// Replays runs in scan order.
    ///
    /// `f` receives `(start_index, length, value)` per run and returns
    /// `false` to stop early.
    fn for_each_run<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(usize, usize, &'a Option<V>) -> bool,
    {
        let mut data = self.runs.as_slice();
        let mut start = 0usize;
        while !data.is_empty() {
            let (index, used) = varint::decode(data);
            data = &data[used..];
            let (length, used) = varint::decode(data);
            data = &data[used..];

            if !f(start, length as usize, &self.palette[index as usize]) {
                return;
            }
            start += length as usize;
        }
        debug_assert_eq!(start, CHUNK_VOLUME, "run lengths must sum to the volume");
    }
}

impl<V: Voxel> Chunk for CompressedChunk<V> {
    type Voxel = V;

    fn size(&self) -> IVec3 {
        IVec3::splat(CHUNK_SIZE as i32)
    }

    /// Linear in the number of runs; fine for occasional point queries, use
    /// [`Chunk::for_each_voxel`] or decompression for bulk access.
    fn at(&self, pos: IVec3) -> Option<&V> {
        let target = linearize(pos);
        let mut found = None;
        self.for_each_run(|start, length, value| {
            if target < start + length {
                found = value.as_ref();
                return false;
            }
            true
        });
        found
    }

    fn for_each_voxel<F: FnMut(IVec3, &V)>(&self, mut f: F) {
        self.for_each_run(|start, length, value| {
            if let Some(voxel) = value {
                for index in start..start + length {
                    f(delinearize(index), voxel);
                }
            }
            true
        });
    }
}

/// Finds `value` in the palette or appends it, returning its index.
fn palette_index<V: Voxel>(palette: &mut Vec<Option<V>>, value: &Option<V>) -> u64 {
    if let Some(index) = palette.iter().position(|entry| entry == value) {
        return index as u64;
    }
    palette.push(value.clone());
    (palette.len() - 1) as u64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::RgbaVoxel;

    /// Layered pattern: empty, red or green bands depending on height.
    fn banded_chunk(pool: &ChunkPool<RgbaVoxel>) -> DenseChunk<RgbaVoxel> {
        let mut dense = pool.acquire();
        for z in 0..CHUNK_SIZE as i32 {
            for y in 0..CHUNK_SIZE as i32 {
                for x in 0..CHUNK_SIZE as i32 {
                    let voxel = match y % 3 {
                        0 => None,
                        1 => Some(RgbaVoxel::opaque(200, 30, 30)),
                        _ => Some(RgbaVoxel::opaque(30, 200, 30)),
                    };
                    dense.set(IVec3::new(x, y, z), voxel);
                }
            }
        }
        dense
    }

    #[test]
    fn test_empty_chunk_compresses_to_single_run() {
        let pool = ChunkPool::new();
        let dense: DenseChunk<RgbaVoxel> = pool.acquire();
        let compressed = CompressedChunk::compress(&dense);

        // One run: palette index 0, length 262,144.
        assert_eq!(compressed.runs, vec![0x00, 0x80, 0x80, 0x10]);
        assert_eq!(compressed.run_count(), 1);
        assert_eq!(compressed.palette_len(), 1);
        assert_eq!(compressed.at(IVec3::new(10, 10, 10)), None);
    }

    #[test]
    fn test_run_lengths_sum_to_volume() {
        let pool = ChunkPool::new();
        let compressed = CompressedChunk::compress(&banded_chunk(&pool));

        let mut total = 0usize;
        compressed.for_each_run(|_, length, _| {
            total += length;
            true
        });
        assert_eq!(total, CHUNK_VOLUME);
    }

    #[test]
    fn test_at_matches_dense_store() {
        let pool = ChunkPool::new();
        let dense = banded_chunk(&pool);
        let compressed = CompressedChunk::compress(&dense);

        // Sampled cross-representation check; `at` is O(runs) per query.
        for z in (0..CHUNK_SIZE as i32).step_by(7) {
            for y in (0..CHUNK_SIZE as i32).step_by(5) {
                for x in (0..CHUNK_SIZE as i32).step_by(3) {
                    let pos = IVec3::new(x, y, z);
                    assert_eq!(compressed.at(pos), dense.at(pos), "mismatch at {pos}");
                }
            }
        }
        for pos in [IVec3::ZERO, IVec3::splat(63), IVec3::new(63, 0, 63)] {
            assert_eq!(compressed.at(pos), dense.at(pos), "mismatch at {pos}");
        }
    }

    #[test]
    fn test_roundtrip_preserves_every_voxel() {
        let pool = ChunkPool::new();
        let dense = banded_chunk(&pool);
        let compressed = CompressedChunk::compress(&dense);
        let restored = compressed.uncompress(&pool);

        assert_eq!(dense.slots(), restored.slots());
        pool.release(restored);
        pool.release(dense);
    }

    #[test]
    fn test_recompression_is_identical() {
        let pool = ChunkPool::new();
        let dense = banded_chunk(&pool);
        let first = CompressedChunk::compress(&dense);
        let restored = first.uncompress(&pool);
        let second = CompressedChunk::compress(&restored);

        // First-seen palette order survives a roundtrip, so the run buffers
        // match byte for byte.
        assert_eq!(first.runs, second.runs);
        assert_eq!(first.palette, second.palette);
    }

    #[test]
    fn test_for_each_voxel_skips_empty_cells() {
        let pool = ChunkPool::new();
        let mut dense: DenseChunk<RgbaVoxel> = pool.acquire();
        let red = RgbaVoxel::opaque(255, 0, 0);
        dense.set(IVec3::new(0, 1, 0), Some(red));
        dense.set(IVec3::new(63, 62, 61), Some(red));

        let compressed = CompressedChunk::compress(&dense);
        let mut visited = Vec::new();
        compressed.for_each_voxel(|pos, voxel| {
            assert_eq!(*voxel, red);
            visited.push(pos);
        });
        visited.sort_by_key(|pos| linearize(*pos));
        assert_eq!(visited, vec![IVec3::new(0, 1, 0), IVec3::new(63, 62, 61)]);
    }

    #[test]
    fn test_uniform_chunk_is_two_palette_entries_at_most() {
        let pool = ChunkPool::new();
        let mut dense = pool.acquire();
        let gray = RgbaVoxel::opaque(128, 128, 128);
        for z in 0..CHUNK_SIZE as i32 {
            for y in 0..CHUNK_SIZE as i32 {
                for x in 0..CHUNK_SIZE as i32 {
                    dense.set(IVec3::new(x, y, z), Some(gray));
                }
            }
        }
        let compressed = CompressedChunk::compress(&dense);
        assert_eq!(compressed.run_count(), 1);
        assert_eq!(compressed.palette_len(), 1);
        assert_eq!(compressed.at(IVec3::new(32, 32, 32)), Some(&gray));
    }
}

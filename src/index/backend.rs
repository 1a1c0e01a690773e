//! Vector storage backends
//!
//! The capability contract is metric-agnostic: a backend appends vectors
//! at dense integer slots and returns the k nearest slots with a distance
//! that is monotonic in dissimilarity. [`FlatBackend`] is an exact
//! squared-L2 linear scan, mirroring a flat index; an approximate backend
//! (IVF, HNSW) can stand in behind the same trait at larger scale.

use serde::{Deserialize, Serialize};

/// Nearest-neighbor capability over slot-addressed vectors
pub trait VectorBackend: Send + Sync {
    fn dimension(&self) -> usize;

    /// Total slots held, including tombstoned ones
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append one vector at the next slot. The caller has already
    /// validated the dimension.
    fn append(&mut self, vector: &[f32]);

    /// Up to `k` nearest slots as (slot, distance), ascending by distance
    fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)>;
}

/// Exact brute-force backend storing vectors in one contiguous buffer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatBackend {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatBackend {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    fn vector(&self, slot: usize) -> &[f32] {
        let start = slot * self.dimension;
        &self.data[start..start + self.dimension]
    }
}

impl VectorBackend for FlatBackend {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    fn append(&mut self, vector: &[f32]) {
        debug_assert_eq!(vector.len(), self.dimension);
        self.data.extend_from_slice(vector);
    }

    fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = (0..self.len())
            .map(|slot| (slot, squared_l2(query, self.vector(slot))))
            .collect();

        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_backend() {
        let backend = FlatBackend::new(4);
        assert!(backend.is_empty());
        assert!(backend.search(&[0.0; 4], 3).is_empty());
    }

    #[test]
    fn test_append_assigns_dense_slots() {
        let mut backend = FlatBackend::new(2);
        backend.append(&[1.0, 0.0]);
        backend.append(&[0.0, 1.0]);
        assert_eq!(backend.len(), 2);
    }

    #[test]
    fn test_search_orders_by_distance() {
        let mut backend = FlatBackend::new(2);
        backend.append(&[0.0, 0.0]); // slot 0
        backend.append(&[1.0, 1.0]); // slot 1
        backend.append(&[0.1, 0.0]); // slot 2

        let results = backend.search(&[0.0, 0.0], 3);
        let slots: Vec<usize> = results.iter().map(|r| r.0).collect();
        assert_eq!(slots, vec![0, 2, 1]);

        // Exact match has distance zero
        assert_eq!(results[0].1, 0.0);
        assert!(results[1].1 < results[2].1);
    }

    #[test]
    fn test_search_never_exceeds_k() {
        let mut backend = FlatBackend::new(2);
        for i in 0..10 {
            backend.append(&[i as f32, 0.0]);
        }
        assert_eq!(backend.search(&[0.0, 0.0], 3).len(), 3);
        assert_eq!(backend.search(&[0.0, 0.0], 50).len(), 10);
    }
}

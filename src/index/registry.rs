//! Slot-keyed chunk registry backing the vector index
//!
//! The registry is the source of truth for which slots are live. Vectors
//! are never physically removed from the backend; deletion tombstones the
//! registry entry and the slot becomes dead weight until `rebuild`.
//! Embeddings are retained per live slot so a rebuild never needs the
//! external embedding service.

use crate::chunker::Chunk;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A chunk registered in the index, owned by it from then on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub document_id: String,
    /// Unique across documents: "{document_id}_chunk_{chunk_id}"
    pub global_id: String,
    /// Backend slot holding this chunk's embedding
    pub slot: usize,
}

impl IndexedChunk {
    pub fn new(document_id: &str, chunk: Chunk, slot: usize) -> Self {
        Self {
            global_id: format!("{}_chunk_{}", document_id, chunk.chunk_id),
            document_id: document_id.to_string(),
            chunk,
            slot,
        }
    }
}

/// Mutual-inverse slot and id mappings plus retained embeddings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkRegistry {
    chunk_by_slot: HashMap<usize, IndexedChunk>,
    chunk_id_to_slot: HashMap<String, usize>,
    embeddings: HashMap<usize, Vec<f32>>,
    /// One past the highest slot ever allocated; monotonic, never reused
    next_slot: usize,
}

impl ChunkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate `count` fresh slots, returning the first
    pub fn allocate(&mut self, count: usize) -> usize {
        let start = self.next_slot;
        self.next_slot += count;
        start
    }

    pub fn next_slot(&self) -> usize {
        self.next_slot
    }

    /// Register a chunk and its embedding at an allocated slot
    pub fn insert(&mut self, chunk: IndexedChunk, embedding: Vec<f32>) {
        let slot = chunk.slot;
        self.chunk_id_to_slot.insert(chunk.global_id.clone(), slot);
        self.chunk_by_slot.insert(slot, chunk);
        self.embeddings.insert(slot, embedding);
    }

    pub fn get_by_slot(&self, slot: usize) -> Option<&IndexedChunk> {
        self.chunk_by_slot.get(&slot)
    }

    pub fn slot_of(&self, global_id: &str) -> Option<usize> {
        self.chunk_id_to_slot.get(global_id).copied()
    }

    pub fn embedding_of(&self, slot: usize) -> Option<&[f32]> {
        self.embeddings.get(&slot).map(Vec::as_slice)
    }

    /// Number of live (non-tombstoned) chunks
    pub fn live_len(&self) -> usize {
        self.chunk_by_slot.len()
    }

    /// Number of distinct documents with at least one live chunk
    pub fn document_count(&self) -> usize {
        self.chunk_by_slot
            .values()
            .map(|c| c.document_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// All live chunks for one document, ordered by chunk id
    pub fn document_chunks(&self, document_id: &str) -> Vec<IndexedChunk> {
        let mut chunks: Vec<IndexedChunk> = self
            .chunk_by_slot
            .values()
            .filter(|c| c.document_id == document_id)
            .cloned()
            .collect();
        chunks.sort_by_key(|c| c.chunk.chunk_id);
        chunks
    }

    /// Tombstone every entry for a document, returning the freed slots.
    /// The backend vectors stay in place until a rebuild.
    pub fn remove_document(&mut self, document_id: &str) -> Vec<usize> {
        let slots: Vec<usize> = self
            .chunk_by_slot
            .values()
            .filter(|c| c.document_id == document_id)
            .map(|c| c.slot)
            .collect();

        for slot in &slots {
            if let Some(chunk) = self.chunk_by_slot.remove(slot) {
                self.chunk_id_to_slot.remove(&chunk.global_id);
            }
            self.embeddings.remove(slot);
        }

        slots
    }

    /// Live slots in ascending order, for deterministic rebuilds
    pub fn live_slots(&self) -> Vec<usize> {
        let mut slots: Vec<usize> = self.chunk_by_slot.keys().copied().collect();
        slots.sort_unstable();
        slots
    }

    /// Move one entry to a new slot during rebuild compaction
    pub fn remap(&mut self, old_slot: usize, new_slot: usize) {
        if old_slot == new_slot {
            return;
        }
        if let Some(mut chunk) = self.chunk_by_slot.remove(&old_slot) {
            chunk.slot = new_slot;
            self.chunk_id_to_slot.insert(chunk.global_id.clone(), new_slot);
            self.chunk_by_slot.insert(new_slot, chunk);
        }
        if let Some(embedding) = self.embeddings.remove(&old_slot) {
            self.embeddings.insert(new_slot, embedding);
        }
    }

    /// Reset the allocator after compaction
    pub fn set_next_slot(&mut self, next_slot: usize) {
        self.next_slot = next_slot;
    }

    /// Both mappings resolve through each other for every live slot
    pub fn is_consistent(&self) -> bool {
        if self.chunk_by_slot.len() != self.chunk_id_to_slot.len()
            || self.chunk_by_slot.len() != self.embeddings.len()
        {
            return false;
        }
        self.chunk_by_slot.iter().all(|(slot, chunk)| {
            chunk.slot == *slot
                && self.chunk_id_to_slot.get(&chunk.global_id) == Some(slot)
                && self.embeddings.contains_key(slot)
        })
    }
}

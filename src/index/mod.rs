//! Persistent, document-partitioned nearest-neighbor index
//!
//! One readers-writer lock guards the whole mutable state: mutations
//! (`add`, `delete_document`, `rebuild`) hold the write guard while they
//! apply their change to a staged copy of the state, flush it, and only
//! then publish it; reads (`search`, `stats`, `document_chunks`) share the
//! read guard. A failed flush leaves both the in-memory state and the
//! on-disk pair exactly as they were before the call.
//!
//! Two blobs are written together: the raw vector buffer and the chunk
//! registry. A load that finds only one of the pair, or a pair that
//! disagrees with itself, fails loudly instead of silently starting empty.

mod backend;
mod registry;

pub use backend::{FlatBackend, VectorBackend};
pub use registry::{ChunkRegistry, IndexedChunk};

use crate::chunker::Chunk;
use crate::config::IndexConfig;
use crate::error::{LexError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{info, warn};

const VECTORS_FILE: &str = "vectors.bin";
const REGISTRY_FILE: &str = "registry.bin";

/// One search hit with its similarity in (0, 1]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: IndexedChunk,
    /// 1 / (1 + d) where d is the squared L2 distance
    pub similarity: f32,
    pub distance: f32,
}

/// Read-only index statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Raw backend size, tombstoned slots included
    pub total_vectors: usize,
    /// Live chunks in the registry
    pub total_chunks: usize,
    pub total_documents: usize,
    pub dimension: usize,
}

#[derive(Clone)]
struct IndexInner {
    backend: FlatBackend,
    registry: ChunkRegistry,
}

/// Document-scoped vector index with synchronous disk persistence
pub struct DocumentIndex {
    inner: RwLock<IndexInner>,
    dimension: usize,
    oversample_factor: usize,
    vectors_path: PathBuf,
    registry_path: PathBuf,
}

impl DocumentIndex {
    /// Load an existing index from `config.data_dir`, or create a fresh
    /// empty one when neither blob exists yet
    pub fn open(config: &IndexConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir).map_err(|e| LexError::Persistence {
            source: e,
            context: format!("Failed to create data dir: {}", config.data_dir.display()),
        })?;

        let vectors_path = config.data_dir.join(VECTORS_FILE);
        let registry_path = config.data_dir.join(REGISTRY_FILE);

        let inner = match (vectors_path.exists(), registry_path.exists()) {
            (true, true) => Self::load(config, &vectors_path, &registry_path)?,
            (false, false) => {
                info!(
                    dimension = config.dimension,
                    "Creating new vector index at {}",
                    config.data_dir.display()
                );
                IndexInner {
                    backend: FlatBackend::new(config.dimension),
                    registry: ChunkRegistry::new(),
                }
            }
            (vectors, _) => {
                let (present, missing) = if vectors {
                    (&vectors_path, &registry_path)
                } else {
                    (&registry_path, &vectors_path)
                };
                return Err(LexError::Corrupt {
                    path: config.data_dir.clone(),
                    reason: format!(
                        "{} exists but {} is missing; refusing to reconstruct an empty index",
                        present.display(),
                        missing.display()
                    ),
                });
            }
        };

        Ok(Self {
            inner: RwLock::new(inner),
            dimension: config.dimension,
            oversample_factor: config.oversample_factor,
            vectors_path,
            registry_path,
        })
    }

    fn load(config: &IndexConfig, vectors_path: &Path, registry_path: &Path) -> Result<IndexInner> {
        let backend: FlatBackend = read_blob(vectors_path)?;
        let registry: ChunkRegistry = read_blob(registry_path)?;

        if backend.dimension() != config.dimension {
            return Err(LexError::Corrupt {
                path: vectors_path.to_path_buf(),
                reason: format!(
                    "stored dimension {} does not match configured dimension {}",
                    backend.dimension(),
                    config.dimension
                ),
            });
        }
        if registry.next_slot() != backend.len() {
            return Err(LexError::Corrupt {
                path: registry_path.to_path_buf(),
                reason: format!(
                    "registry expects {} slots but vector blob holds {}",
                    registry.next_slot(),
                    backend.len()
                ),
            });
        }
        if !registry.is_consistent() {
            return Err(LexError::Corrupt {
                path: registry_path.to_path_buf(),
                reason: "slot and id mappings are not mutual inverses".to_string(),
            });
        }

        info!(
            vectors = backend.len(),
            chunks = registry.live_len(),
            "Loaded vector index from {}",
            vectors_path.display()
        );
        Ok(IndexInner { backend, registry })
    }

    /// Append a document's chunks and embeddings.
    ///
    /// All-or-nothing: count and dimension are checked before any state
    /// changes, both blobs are flushed before the call returns, and a
    /// failed flush leaves the index untouched. Returns the number of
    /// chunks added.
    pub fn add(
        &self,
        document_id: &str,
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<usize> {
        if chunks.len() != embeddings.len() {
            return Err(LexError::CountMismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }
        for embedding in &embeddings {
            if embedding.len() != self.dimension {
                return Err(LexError::DimensionMismatch {
                    expected: self.dimension,
                    actual: embedding.len(),
                });
            }
        }

        let added = chunks.len();
        let mut inner = self.inner.write().unwrap();

        let mut staged = (*inner).clone();
        let start = staged.registry.allocate(added);
        for (i, (chunk, embedding)) in chunks.into_iter().zip(embeddings).enumerate() {
            let slot = start + i;
            staged.backend.append(&embedding);
            let indexed = IndexedChunk::new(document_id, chunk, slot);
            staged.registry.insert(indexed, embedding);
        }

        self.flush_locked(&staged)?;
        *inner = staged;
        info!(document_id, added, "Indexed document chunks");
        Ok(added)
    }

    /// Nearest chunks for a query embedding, optionally scoped to one
    /// document.
    ///
    /// Document-scoped searches over-fetch globally (×oversample_factor,
    /// capped at index size) and then filter, so fewer than `k` hits may
    /// come back even when the document holds more chunks. An empty index
    /// returns an empty vec, not an error.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        document_id: Option<&str>,
    ) -> Result<Vec<ScoredChunk>> {
        let inner = self.inner.read().unwrap();

        if inner.backend.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(LexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let fetch = if document_id.is_some() {
            (k.saturating_mul(self.oversample_factor)).min(inner.backend.len())
        } else {
            k.min(inner.backend.len())
        };

        let mut results: Vec<ScoredChunk> = inner
            .backend
            .search(query, fetch)
            .into_iter()
            // Tombstoned slots have no registry entry and drop out here
            .filter_map(|(slot, distance)| {
                inner.registry.get_by_slot(slot).map(|chunk| ScoredChunk {
                    chunk: chunk.clone(),
                    similarity: 1.0 / (1.0 + distance),
                    distance,
                })
            })
            .filter(|scored| match document_id {
                Some(id) => scored.chunk.document_id == id,
                None => true,
            })
            .collect();

        // The backend already returns ascending distance, but the contract
        // is descending similarity regardless of backend ordering
        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);
        Ok(results)
    }

    /// Tombstone every chunk of a document, leaving its vectors as dead
    /// weight until [`rebuild`](Self::rebuild). Unknown documents are a
    /// no-op success. Returns the number of chunks removed.
    pub fn delete_document(&self, document_id: &str) -> Result<usize> {
        let mut inner = self.inner.write().unwrap();

        let mut staged = (*inner).clone();
        let slots = staged.registry.remove_document(document_id);
        if slots.is_empty() {
            warn!(document_id, "Delete requested for document with no chunks");
            return Ok(0);
        }

        self.flush_locked(&staged)?;
        *inner = staged;
        info!(document_id, removed = slots.len(), "Tombstoned document chunks");
        Ok(slots.len())
    }

    /// Recompute the backend from retained live embeddings, compacting
    /// tombstoned slots away. Lossless: no external embedding call needed.
    pub fn rebuild(&self) -> Result<()> {
        let mut inner = self.inner.write().unwrap();

        let mut staged = (*inner).clone();
        let live = staged.registry.live_slots();
        let mut backend = FlatBackend::new(self.dimension);

        for (new_slot, old_slot) in live.iter().copied().enumerate() {
            // Every live slot retains its embedding; a hole here would be
            // a registry consistency bug
            let embedding = staged
                .registry
                .embedding_of(old_slot)
                .ok_or_else(|| LexError::Corrupt {
                    path: self.registry_path.clone(),
                    reason: format!("live slot {} has no retained embedding", old_slot),
                })?
                .to_vec();
            backend.append(&embedding);
            staged.registry.remap(old_slot, new_slot);
        }

        let before = staged.backend.len();
        staged.backend = backend;
        staged.registry.set_next_slot(live.len());

        self.flush_locked(&staged)?;
        *inner = staged;
        info!(
            before,
            after = live.len(),
            "Rebuilt vector index from live chunks"
        );
        Ok(())
    }

    /// Statistics derived from the live chunk registry
    pub fn stats(&self) -> IndexStats {
        let inner = self.inner.read().unwrap();
        IndexStats {
            total_vectors: inner.backend.len(),
            total_chunks: inner.registry.live_len(),
            total_documents: inner.registry.document_count(),
            dimension: self.dimension,
        }
    }

    /// All live chunks of a document, ordered by chunk id. An unknown
    /// document yields an empty vec.
    pub fn document_chunks(&self, document_id: &str) -> Vec<IndexedChunk> {
        let inner = self.inner.read().unwrap();
        inner.registry.document_chunks(document_id)
    }

    /// Write both blobs; exposed for explicit shutdown
    pub fn flush(&self) -> Result<()> {
        let inner = self.inner.read().unwrap();
        self.flush_locked(&inner)
    }

    /// Stage both temp files before renaming either, so a failure while
    /// writing never leaves the blob pair out of step on disk
    fn flush_locked(&self, inner: &IndexInner) -> Result<()> {
        let vectors_tmp = stage_blob(&self.vectors_path, &inner.backend)?;
        let registry_tmp = stage_blob(&self.registry_path, &inner.registry);
        let registry_tmp = match registry_tmp {
            Ok(tmp) => tmp,
            Err(e) => {
                let _ = std::fs::remove_file(&vectors_tmp);
                return Err(e);
            }
        };

        commit_blob(&vectors_tmp, &self.vectors_path)?;
        commit_blob(&registry_tmp, &self.registry_path)?;
        Ok(())
    }
}

fn read_blob<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).map_err(|e| LexError::Persistence {
        source: e,
        context: format!("Failed to read index blob: {}", path.display()),
    })?;
    bincode::deserialize(&bytes).map_err(|e| LexError::Corrupt {
        path: path.to_path_buf(),
        reason: format!("undecodable blob: {}", e),
    })
}

/// Encode a blob into a sibling temp file, returning its path
fn stage_blob<T: Serialize>(path: &Path, value: &T) -> Result<PathBuf> {
    let bytes = bincode::serialize(value).map_err(|e| LexError::Codec {
        source: e,
        context: format!("Failed to encode index blob: {}", path.display()),
    })?;

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, &bytes).map_err(|e| LexError::Persistence {
        source: e,
        context: format!("Failed to write index blob: {}", tmp.display()),
    })?;
    Ok(tmp)
}

/// Rename a staged temp file into place, so a crash mid-write never
/// leaves a truncated blob behind
fn commit_blob(tmp: &Path, path: &Path) -> Result<()> {
    std::fs::rename(tmp, path).map_err(|e| LexError::Persistence {
        source: e,
        context: format!("Failed to move index blob into place: {}", path.display()),
    })
}

//! Full ingest-to-query lifecycle against an on-disk index
//!
//! Embeddings come from a deterministic stub provider standing in for the
//! hosted embedding service; the index itself never produces vectors.

use lexindex::config::{Config, IndexConfig};
use lexindex::error::Result;
use lexindex::index::DocumentIndex;
use lexindex::processor::DocumentProcessor;
use lexindex::providers::EmbeddingProvider;
use std::path::Path;
use tempfile::TempDir;

const DIMENSION: usize = 16;

/// Deterministic bag-of-bytes embedder: identical text always maps to the
/// identical vector, so exact-match searches score 1.0
struct StubEmbedder;

impl EmbeddingProvider for StubEmbedder {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut v = vec![0.0f32; DIMENSION];
                for (i, b) in text.bytes().enumerate() {
                    v[(i + b as usize) % DIMENSION] += (b % 17) as f32 / 16.0;
                }
                v
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn index_config(dir: &Path) -> IndexConfig {
    init_tracing();
    IndexConfig {
        dimension: DIMENSION,
        oversample_factor: 10,
        data_dir: dir.to_path_buf(),
    }
}

fn ingest(index: &DocumentIndex, embedder: &StubEmbedder, document_id: &str, text: &str) -> usize {
    let mut config = Config::default();
    config.chunking.max_chunk_chars = 80;
    config.chunking.overlap_chars = 0;
    let processor = DocumentProcessor::new(&config).unwrap();

    let chunks = processor.chunker().chunk(text);
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).unwrap();
    index.add(document_id, chunks, embeddings).unwrap()
}

const LEASE: &str = "The tenant shall pay rent on the first of each month. \
    The landlord must give thirty days notice before entry. \
    The deposit is refunded within two weeks of lease end.";

const MSA: &str = "The vendor warrants the software against defects. \
    Liquidated damages apply to missed delivery dates. \
    Support requests receive answers within one business day.";

#[test]
fn test_query_returns_own_chunk_first() {
    let temp = TempDir::new().unwrap();
    let index = DocumentIndex::open(&index_config(temp.path())).unwrap();
    let embedder = StubEmbedder;

    let added = ingest(&index, &embedder, "lease-1", LEASE);
    assert!(added >= 2);

    // Query with the exact embedding of a stored chunk
    let stored = index.document_chunks("lease-1");
    let target = &stored[1];
    let query = embedder
        .embed_batch(&[target.chunk.text.clone()])
        .unwrap()
        .remove(0);

    let results = index.search(&query, 3, None).unwrap();
    assert_eq!(results[0].chunk.global_id, target.global_id);
    assert_eq!(results[0].similarity, 1.0);
    assert_eq!(results[0].distance, 0.0);
}

#[test]
fn test_document_scoped_search_stays_in_document() {
    let temp = TempDir::new().unwrap();
    let index = DocumentIndex::open(&index_config(temp.path())).unwrap();
    let embedder = StubEmbedder;

    ingest(&index, &embedder, "lease-1", LEASE);
    ingest(&index, &embedder, "msa-1", MSA);

    let query = embedder
        .embed_batch(&["liquidated damages for delivery".to_string()])
        .unwrap()
        .remove(0);

    let results = index.search(&query, 5, Some("lease-1")).unwrap();
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.chunk.document_id == "lease-1"));
    assert!(results.len() <= 5);
}

#[test]
fn test_delete_then_stats_then_rebuild() {
    let temp = TempDir::new().unwrap();
    let index = DocumentIndex::open(&index_config(temp.path())).unwrap();
    let embedder = StubEmbedder;

    let lease_chunks = ingest(&index, &embedder, "lease-1", LEASE);
    let msa_chunks = ingest(&index, &embedder, "msa-1", MSA);

    let before = index.stats();
    assert_eq!(before.total_documents, 2);
    assert_eq!(before.total_chunks, lease_chunks + msa_chunks);
    assert_eq!(before.total_vectors, lease_chunks + msa_chunks);

    let removed = index.delete_document("lease-1").unwrap();
    assert_eq!(removed, lease_chunks);

    // Tombstoned vectors stay in the backend until rebuild
    let after_delete = index.stats();
    assert_eq!(after_delete.total_documents, before.total_documents - 1);
    assert_eq!(after_delete.total_chunks, before.total_chunks - lease_chunks);
    assert_eq!(after_delete.total_vectors, before.total_vectors);

    index.rebuild().unwrap();
    let after_rebuild = index.stats();
    assert_eq!(after_rebuild.total_vectors, msa_chunks);
    assert_eq!(after_rebuild.total_chunks, msa_chunks);

    // Surviving document still answers queries after compaction
    let stored = index.document_chunks("msa-1");
    let query = embedder
        .embed_batch(&[stored[0].chunk.text.clone()])
        .unwrap()
        .remove(0);
    let results = index.search(&query, 1, Some("msa-1")).unwrap();
    assert_eq!(results[0].chunk.global_id, stored[0].global_id);
}

#[test]
fn test_state_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let cfg = index_config(temp.path());
    let embedder = StubEmbedder;

    let added = {
        let index = DocumentIndex::open(&cfg).unwrap();
        ingest(&index, &embedder, "lease-1", LEASE)
    };

    let reopened = DocumentIndex::open(&cfg).unwrap();
    let stats = reopened.stats();
    assert_eq!(stats.total_chunks, added);
    assert_eq!(stats.dimension, DIMENSION);

    let stored = reopened.document_chunks("lease-1");
    assert_eq!(stored.len(), added);

    let query = embedder
        .embed_batch(&[stored[0].chunk.text.clone()])
        .unwrap()
        .remove(0);
    let results = reopened.search(&query, 1, None).unwrap();
    assert_eq!(results[0].similarity, 1.0);
}

#[test]
fn test_mixed_lifecycle_keeps_registry_consistent() {
    let temp = TempDir::new().unwrap();
    let index = DocumentIndex::open(&index_config(temp.path())).unwrap();
    let embedder = StubEmbedder;

    ingest(&index, &embedder, "a", LEASE);
    ingest(&index, &embedder, "b", MSA);
    index.delete_document("a").unwrap();
    ingest(&index, &embedder, "c", LEASE);

    let stats = index.stats();
    assert_eq!(stats.total_documents, 2);
    // Slots are never reused: raw vectors include the tombstoned ones
    assert!(stats.total_vectors > stats.total_chunks);

    // Deleted document is gone from lookups, unrelated ones intact
    assert!(index.document_chunks("a").is_empty());
    assert!(!index.document_chunks("b").is_empty());
    assert!(!index.document_chunks("c").is_empty());
}

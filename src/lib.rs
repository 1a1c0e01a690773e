//! Lexindex - Legal Document Retrieval Core
//!
//! Splits legal documents into sentence-bounded retrievable chunks, flags
//! risk-bearing language against configurable pattern tiers, and answers
//! semantic queries by nearest-neighbor lookup over caller-supplied
//! embedding vectors. Embedding and text generation are external
//! collaborators; this crate only consumes vectors and strings.

pub mod analysis;
pub mod chunker;
pub mod config;
pub mod error;
pub mod index;
pub mod patterns;
pub mod processor;
pub mod providers;

pub use error::{LexError, Result};

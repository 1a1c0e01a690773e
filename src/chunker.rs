//! Sentence-bounded text chunking with configurable overlap
//!
//! Chunks never split a sentence: a single sentence longer than
//! `max_chunk_chars` is emitted as its own oversized chunk rather than
//! truncated mid-sentence. Consecutive chunks share a trailing slice of
//! sentences (one per 100 overlap characters requested) so context at cut
//! points survives retrieval.

use crate::config::ChunkingConfig;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Bounded span of document text, the unit of retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequential id within one chunking pass
    pub chunk_id: usize,
    /// Sentences joined with single spaces, terminal punctuation stripped
    pub text: String,
    pub sentences: Vec<String>,
    /// Byte offset of the first sentence within the normalized text
    pub start_char: usize,
    /// Byte offset one past the last sentence within the normalized text
    pub end_char: usize,
}

/// One sentence with its span in the normalized text
#[derive(Debug, Clone)]
struct Sentence {
    text: String,
    start: usize,
    end: usize,
}

/// Deterministic sentence-bounded chunker
pub struct Chunker {
    max_chunk_chars: usize,
    overlap_chars: usize,
    whitespace: Regex,
    page_marker: Regex,
    ocr_runon: Regex,
    terminal: Regex,
}

impl Chunker {
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            max_chunk_chars: config.max_chunk_chars,
            overlap_chars: config.overlap_chars,
            whitespace: Regex::new(r"\s+").expect("whitespace regex"),
            page_marker: Regex::new(r"--- Page \d+ ---").expect("page marker regex"),
            ocr_runon: Regex::new(r"([a-z])([A-Z])").expect("ocr regex"),
            terminal: Regex::new(r"[.!?]+").expect("terminal punctuation regex"),
        }
    }

    /// Strip page-break markers, normalize whitespace, and split
    /// lowercase-to-uppercase run-ons left behind by OCR.
    ///
    /// Markers go first: removing one mid-line leaves surrounding
    /// whitespace behind, and the collapse pass has to see it.
    pub fn normalize(&self, text: &str) -> String {
        let unpaged = self.page_marker.replace_all(text, " ");
        let collapsed = self.whitespace.replace_all(&unpaged, " ");
        let fixed = self.ocr_runon.replace_all(&collapsed, "$1 $2");
        fixed.trim().to_string()
    }

    /// Split normalized text into overlapping sentence-bounded chunks
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let normalized = self.normalize(text);
        let sentences = self.split_sentences(&normalized);
        if sentences.is_empty() {
            return Vec::new();
        }

        // One carried-over sentence per 100 characters of overlap budget
        let overlap_sentences = self.overlap_chars / 100;

        let mut chunks = Vec::new();
        let mut buffer: Vec<Sentence> = Vec::new();
        let mut buffer_len = 0usize;

        for sentence in sentences {
            let added = if buffer.is_empty() {
                sentence.text.len()
            } else {
                sentence.text.len() + 1
            };

            if !buffer.is_empty() && buffer_len + added > self.max_chunk_chars {
                let carried: Vec<Sentence> = if overlap_sentences > 0 {
                    let keep = buffer.len().saturating_sub(overlap_sentences);
                    buffer[keep..].to_vec()
                } else {
                    Vec::new()
                };

                chunks.push(Self::close(chunks.len(), &buffer));

                buffer = carried;
                buffer_len = joined_len(&buffer);
            }

            buffer_len += if buffer.is_empty() {
                sentence.text.len()
            } else {
                sentence.text.len() + 1
            };
            buffer.push(sentence);
        }

        if !buffer.is_empty() {
            chunks.push(Self::close(chunks.len(), &buffer));
        }

        chunks
    }

    fn close(chunk_id: usize, buffer: &[Sentence]) -> Chunk {
        let sentences: Vec<String> = buffer.iter().map(|s| s.text.clone()).collect();
        Chunk {
            chunk_id,
            text: sentences.join(" "),
            start_char: buffer[0].start,
            end_char: buffer[buffer.len() - 1].end,
            sentences,
        }
    }

    /// Split on terminal punctuation, discarding empty fragments and
    /// recording each sentence's span in the input
    fn split_sentences(&self, text: &str) -> Vec<Sentence> {
        let mut sentences = Vec::new();
        let mut cursor = 0usize;

        for m in self.terminal.find_iter(text) {
            push_trimmed(&mut sentences, text, cursor, m.start());
            cursor = m.end();
        }
        push_trimmed(&mut sentences, text, cursor, text.len());

        sentences
    }
}

fn push_trimmed(sentences: &mut Vec<Sentence>, text: &str, start: usize, end: usize) {
    let raw = &text[start..end];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = raw.len() - raw.trim_start().len();
    sentences.push(Sentence {
        text: trimmed.to_string(),
        start: start + lead,
        end: start + lead + trimmed.len(),
    });
}

fn joined_len(buffer: &[Sentence]) -> usize {
    if buffer.is_empty() {
        return 0;
    }
    buffer.iter().map(|s| s.text.len()).sum::<usize>() + buffer.len() - 1
}

//! End-to-end analysis pipeline tests over a realistic contract fixture

use lexindex::analysis::{ClauseCategory, RiskLevel};
use lexindex::config::Config;
use lexindex::processor::DocumentProcessor;

const SERVICE_AGREEMENT: &str = "\
SERVICE AGREEMENT

1. The client shall pay all fees and invoices within thirty days of the \
billing date, and late amounts accrue interest monthly.

2. Either party may pursue termination of this agreement upon material \
breach by the other party with thirty days written notice.

3. The provider agrees to indemnification of the client against third \
party claims arising from the services delivered hereunder.

4. All copyright and other intellectual property in the deliverables \
remains the proprietary material of the provider until paid in full.

5. Liquidated damages of five hundred dollars per day apply to any \
delivery delayed beyond the agreed schedule without prior approval.

6. This agreement is subject to automatic renewal for successive one \
year terms unless either party gives notice of non-renewal.";

fn processor() -> DocumentProcessor {
    DocumentProcessor::new(&Config::default()).unwrap()
}

#[test]
fn test_contract_segments_into_labeled_clauses() {
    let analysis = processor().process(SERVICE_AGREEMENT);

    // The heading is noise; six numbered sections survive
    assert_eq!(analysis.clauses.len(), 6);

    assert_eq!(analysis.clauses[0].category, ClauseCategory::Payment);
    assert_eq!(analysis.clauses[1].category, ClauseCategory::Termination);
    assert_eq!(analysis.clauses[2].category, ClauseCategory::Liability);
    assert_eq!(
        analysis.clauses[3].category,
        ClauseCategory::IntellectualProperty
    );

    for (i, clause) in analysis.clauses.iter().enumerate() {
        assert_eq!(clause.position, i);
        assert_eq!(clause.clause_id, format!("clause_{}", i + 1));
    }
}

#[test]
fn test_contract_with_three_high_patterns_scores_high() {
    // indemnification + liquidated damages + automatic renewal, no
    // critical-tier language
    let analysis = processor().process(SERVICE_AGREEMENT);
    assert_eq!(analysis.risk_level, RiskLevel::High);
}

#[test]
fn test_critical_language_escalates_document() {
    let amended = format!(
        "{}\n\n7. The guarantor accepts unlimited liability for all \
         obligations arising under this agreement without exception.",
        SERVICE_AGREEMENT
    );
    let analysis = processor().process(&amended);
    assert_eq!(analysis.risk_level, RiskLevel::Critical);
}

#[test]
fn test_clause_level_risk_is_first_match() {
    let analysis = processor().process(SERVICE_AGREEMENT);

    // The liquidated damages clause is High on its own
    let damages = &analysis.clauses[4];
    assert_eq!(damages.risk_level, RiskLevel::High);

    // The payment clause carries no risk-tier language at all
    let payment = &analysis.clauses[0];
    assert_eq!(payment.risk_level, RiskLevel::Low);
}

#[test]
fn test_chunks_respect_length_bound() {
    let mut config = Config::default();
    config.chunking.max_chunk_chars = 120;
    config.chunking.overlap_chars = 0;

    let processor = DocumentProcessor::new(&config).unwrap();
    let analysis = processor.process(SERVICE_AGREEMENT);

    assert!(analysis.chunks.len() > 1);
    for chunk in &analysis.chunks {
        assert!(
            chunk.text.len() <= 120 || chunk.sentences.len() == 1,
            "chunk {} has {} chars across {} sentences",
            chunk.chunk_id,
            chunk.text.len(),
            chunk.sentences.len()
        );
    }
}

#[test]
fn test_chunk_sentences_cover_whole_document() {
    let mut config = Config::default();
    config.chunking.max_chunk_chars = 150;
    config.chunking.overlap_chars = 0;

    let processor = DocumentProcessor::new(&config).unwrap();
    let analysis = processor.process(SERVICE_AGREEMENT);

    let all: Vec<&str> = analysis
        .chunks
        .iter()
        .flat_map(|c| c.sentences.iter().map(String::as_str))
        .collect();

    // Without overlap, the sentence sequence is partitioned, not
    // duplicated: a bound large enough for one chunk gives the reference
    let mut wide = Config::default();
    wide.chunking.max_chunk_chars = 100_000;
    wide.chunking.overlap_chars = 0;
    let reference_chunks = DocumentProcessor::new(&wide)
        .unwrap()
        .chunker()
        .chunk(SERVICE_AGREEMENT);
    assert_eq!(reference_chunks.len(), 1);
    let reference: Vec<&str> = reference_chunks[0]
        .sentences
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(all, reference);

    assert!(all.iter().any(|s| s.contains("Liquidated damages")));
    assert!(all.iter().any(|s| s.contains("automatic renewal")));
}

//! Polem Pipeline - Label alignment and NER lemmatization
//!
//! Rebuilds token-ordered tag sequences from an unordered label collection,
//! pairs every named-entity span with its tag slice and derives a normalized
//! "Polem" label for it through a `MorphologicalEngine`.

pub mod aligner;
pub mod classifier;
pub mod engine;
pub mod normalize;
pub mod orchestrator;
pub mod sequence;

pub use aligner::{build_aligned_tag_strings, check_tag_counts, AlignedTags};
pub use classifier::{decode_labels, partition_by_service, select_by_field, select_by_service};
pub use engine::DictionaryEngine;
pub use normalize::{derive_label, normalize_ner_label};
pub use orchestrator::{
    align_document, AlignedSpan, BatchReport, DocumentFailure, LemmatizationPipeline,
};
pub use sequence::build_tag_value_sequence;

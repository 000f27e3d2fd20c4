//! Batch orchestration
//!
//! Walks the documents of a `{ "docs": [ { "labels": [...] } ] }` batch,
//! derives Polem labels for every named entity and appends them to the
//! document's labels. Each document is isolated: a failure leaves that
//! document untouched and is recorded in the `BatchReport`.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use polem_core::{keys, Label, MorphologicalEngine, PipelineConfig, PolemError, Result};

use crate::aligner::{build_aligned_tag_strings, check_tag_counts, AlignedTags};
use crate::classifier::{decode_labels, select_by_service};
use crate::normalize::normalize_ner_label;
use crate::sequence::build_tag_value_sequence;

// ============================================================================
// Results
// ============================================================================

/// Named-entity label paired with its aligned tag strings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSpan {
    pub label: Label,
    pub tags: AlignedTags,
}

/// Document that could not be enriched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    /// Position in the `docs` array
    pub index: usize,
    /// Value of the document's `id` attribute, if any
    pub document_id: Option<String>,
    pub error: String,
}

/// Outcome of processing a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub documents_total: usize,
    /// Documents whose pipeline ran to completion
    pub documents_processed: usize,
    /// Documents without a usable labels array
    pub documents_skipped: usize,
    pub labels_added: usize,
    pub failures: Vec<DocumentFailure>,
}

impl BatchReport {
    /// True when no document failed
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

// ============================================================================
// Alignment
// ============================================================================

/// Align every named-entity label of a document with its tag strings
///
/// Both tag sequences are built and checked first, so a document with broken
/// tags fails even when it has no named entities.
pub fn align_document(labels: &[Label], config: &PipelineConfig) -> Result<Vec<AlignedSpan>> {
    let ner_labels = select_by_service(labels, &config.ner_service);

    let pos_tags = build_tag_value_sequence(&config.pos_field, labels)?;
    let lemma_tags = build_tag_value_sequence(&config.lemma_field, labels)?;
    check_tag_counts(&pos_tags, &lemma_tags)?;

    ner_labels
        .into_iter()
        .map(|label| {
            let tags = build_aligned_tag_strings(label, &pos_tags, &lemma_tags)?;
            Ok(AlignedSpan {
                label: label.clone(),
                tags,
            })
        })
        .collect()
}

// ============================================================================
// Pipeline
// ============================================================================

/// Lemmatization pipeline owning one engine instance
pub struct LemmatizationPipeline<E> {
    config: PipelineConfig,
    engine: E,
}

impl<E: MorphologicalEngine> LemmatizationPipeline<E> {
    /// Create a pipeline with the default label discriminators
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, PipelineConfig::default())
    }

    /// Create with custom config
    pub fn with_config(engine: E, config: PipelineConfig) -> Self {
        Self { config, engine }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Derive Polem labels for one document's labels
    ///
    /// Any failure aborts the whole document; no partial result is returned.
    pub fn lemmatize_document(&mut self, labels: &[Label]) -> Result<Vec<Label>> {
        let spans = align_document(labels, &self.config)?;

        let mut derived = Vec::with_capacity(spans.len());
        for span in &spans {
            derived.push(normalize_ner_label(&span.label, &span.tags, &mut self.engine)?);
        }
        Ok(derived)
    }

    /// Enrich every document of `batch` in place
    ///
    /// Fails only when the batch itself is malformed; per-document errors
    /// are collected in the report.
    pub fn process_document_batch(&mut self, batch: &mut Value) -> Result<BatchReport> {
        let docs = batch_documents_mut(batch)?;

        let mut report = BatchReport {
            documents_total: docs.len(),
            ..Default::default()
        };

        for (index, doc) in docs.iter_mut().enumerate() {
            let document_id = document_id(doc);

            let Some(labels) = document_labels_mut(doc) else {
                debug!(document = index, "skipping document without labels");
                report.documents_skipped += 1;
                continue;
            };

            let decoded = decode_labels(labels);
            let outcome = self
                .lemmatize_document(&decoded)
                .and_then(|derived| encode_labels(&derived));

            match outcome {
                Ok(derived) => {
                    debug!(document = index, added = derived.len(), "document lemmatized");
                    report.labels_added += derived.len();
                    report.documents_processed += 1;
                    labels.extend(derived);
                }
                Err(err) => {
                    if err.is_document_recoverable() {
                        warn!(document = index, id = ?document_id, error = %err, "document skipped");
                    } else {
                        error!(document = index, id = ?document_id, error = %err, "document failed");
                    }
                    report.failures.push(DocumentFailure {
                        index,
                        document_id,
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            engine = self.engine.name(),
            total = report.documents_total,
            processed = report.documents_processed,
            skipped = report.documents_skipped,
            failed = report.failures.len(),
            labels_added = report.labels_added,
            "batch processed"
        );

        Ok(report)
    }
}

/// Validated `docs` array of a batch
fn batch_documents_mut(batch: &mut Value) -> Result<&mut Vec<Value>> {
    let docs = batch
        .as_object_mut()
        .ok_or_else(|| PolemError::InvalidInput("input JSON is not an object".to_string()))?
        .get_mut(keys::DOCS)
        .ok_or_else(|| {
            PolemError::InvalidInput(format!("input JSON doesn't contain \"{}\" key", keys::DOCS))
        })?
        .as_array_mut()
        .ok_or_else(|| {
            PolemError::InvalidInput(format!("\"{}\" item is not an array", keys::DOCS))
        })?;

    if docs.is_empty() {
        return Err(PolemError::InvalidInput(format!(
            "\"{}\" item is empty",
            keys::DOCS
        )));
    }
    Ok(docs)
}

/// Non-empty labels array of a document
fn document_labels_mut(doc: &mut Value) -> Option<&mut Vec<Value>> {
    doc.get_mut(keys::LABELS)
        .and_then(Value::as_array_mut)
        .filter(|labels| !labels.is_empty())
}

fn document_id(doc: &Value) -> Option<String> {
    match doc.get(keys::DOCUMENT_ID)? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn encode_labels(labels: &[Label]) -> Result<Vec<Value>> {
    labels
        .iter()
        .map(|label| label.to_value().map_err(|e| PolemError::Other(e.into())))
        .collect()
}

//! Polem Core - Label model, errors, and shared traits
//!
//! This crate defines the core abstractions used throughout Polem:
//! - The positional label model (`Label`, `LabelValue`)
//! - JSON key names of the batch format
//! - Error types for input, alignment and normalization failures
//! - The `MorphologicalEngine` trait implemented by lemmatizers
//! - Configuration management

pub mod config;

pub use config::{AppConfig, ConfigError, EngineConfig, LoggingConfig, PipelineConfig, ServerConfig};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// ============================================================================
// Key Names
// ============================================================================

/// JSON keys of the batch format
pub mod keys {
    pub const DOCS: &str = "docs";
    pub const LABELS: &str = "labels";
    pub const SERVICE: &str = "serviceName";
    pub const FIELD: &str = "fieldName";
    pub const NAME: &str = "name";
    pub const VALUE: &str = "value";
    pub const START_TOKEN: &str = "startToken";
    pub const END_TOKEN: &str = "endToken";
    pub const DOCUMENT_ID: &str = "id";
}

/// Provenance marker stamped onto derived labels
pub mod provenance {
    pub const SERVICE: &str = "Polem";
    pub const FIELD: &str = "polem";
    pub const NAME: &str = "polem";
}

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Polem operations
#[derive(Error, Debug)]
pub enum PolemError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Alignment error: {0}")]
    Alignment(#[from] AlignmentError),

    #[error("Normalization error: {0}")]
    Normalization(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PolemError {
    /// Whether the error only invalidates the document being processed
    pub fn is_document_recoverable(&self) -> bool {
        matches!(self, Self::Alignment(_) | Self::Normalization(_))
    }
}

pub type Result<T> = std::result::Result<T, PolemError>;

/// Failures while rebuilding token-ordered tag sequences or aligning spans
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("tag span width invalid: {field} label at token {start_token} ends at {end_token}")]
    InvalidSpanWidth {
        field: String,
        start_token: usize,
        end_token: usize,
    },

    #[error("{field} label has no valid startToken/endToken")]
    MissingTokenBounds { field: String },

    #[error("{field} label at token {position} has no tag value")]
    MissingTagValue { field: String, position: usize },

    #[error("missing tag labels for {field}: no label at token {first_missing} ({found} of {expected} slots covered)")]
    MissingTags {
        field: String,
        first_missing: usize,
        found: usize,
        expected: usize,
    },

    #[error("mismatched tag counts: {pos_count} POS tags vs {lemma_count} lemma tags")]
    MismatchedTagCounts { pos_count: usize, lemma_count: usize },

    #[error("span [{start_token}, {end_token}] exceeds tag sequence of length {available}")]
    SpanOutOfRange {
        start_token: usize,
        end_token: usize,
        available: usize,
    },

    #[error("span start {start_token} is after span end {end_token}")]
    InvertedSpan { start_token: usize, end_token: usize },
}

// ============================================================================
// Label Model
// ============================================================================

/// Value carried by a label
///
/// POS tags and entity texts are plain strings, lemma candidates arrive as
/// a sequence whose first element is the chosen lemma.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LabelValue {
    Text(String),
    Candidates(Vec<String>),
    Other(Value),
}

impl LabelValue {
    /// Collapse the value to its text form
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Candidates(candidates) => candidates.first().map(String::as_str),
            Self::Other(_) => None,
        }
    }
}

impl From<Value> for LabelValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Array(items) if items.iter().all(Value::is_string) => Self::Candidates(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(text) => Some(text),
                        _ => None,
                    })
                    .collect(),
            ),
            other => Self::Other(other),
        }
    }
}

impl From<String> for LabelValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for LabelValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// One positional annotation attached to a document
///
/// Decoding never rejects an object: a known key whose JSON type does not
/// fit its field stays in `extra` and the field is left empty. Everything
/// else (name, score, character offsets, ...) is kept in `extra` and
/// written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Label {
    /// Producing component ("tagger", "NER", "Polem")
    #[serde(rename = "serviceName", skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    /// Annotation kind ("posTag", "lemmas", "namedEntityML")
    #[serde(rename = "fieldName", skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// First token covered by the label
    #[serde(rename = "startToken", skip_serializing_if = "Option::is_none")]
    pub start_token: Option<usize>,

    /// Token bound; exclusive for tag labels, inclusive for entity spans
    #[serde(rename = "endToken", skip_serializing_if = "Option::is_none")]
    pub end_token: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<LabelValue>,

    /// Passthrough attributes
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Map::<String, Value>::deserialize(deserializer).map(Self::from_map)
    }
}

impl Label {
    /// Create a label for a service and field
    pub fn new(service: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            service: Some(service.into()),
            field: Some(field.into()),
            ..Default::default()
        }
    }

    /// Set token bounds
    pub fn with_tokens(mut self, start_token: usize, end_token: usize) -> Self {
        self.start_token = Some(start_token);
        self.end_token = Some(end_token);
        self
    }

    /// Set the value
    pub fn with_value(mut self, value: impl Into<LabelValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set a passthrough attribute
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Decode a label from the attributes of a JSON object
    pub fn from_map(mut attributes: Map<String, Value>) -> Self {
        let service = take_typed(&mut attributes, keys::SERVICE, text_attribute);
        let field = take_typed(&mut attributes, keys::FIELD, text_attribute);
        let start_token = take_typed(&mut attributes, keys::START_TOKEN, token_index);
        let end_token = take_typed(&mut attributes, keys::END_TOKEN, token_index);
        let value = attributes.remove(keys::VALUE).map(LabelValue::from);

        Self {
            service,
            field,
            start_token,
            end_token,
            value,
            extra: attributes,
        }
    }

    /// Decode a label from a raw JSON value; fails only for non-objects
    pub fn from_value(value: &Value) -> std::result::Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Encode the label back to JSON
    pub fn to_value(&self) -> std::result::Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn has_service(&self, service: &str) -> bool {
        self.service.as_deref() == Some(service)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.field.as_deref() == Some(field)
    }

    /// Display name, when it is a string
    pub fn name(&self) -> Option<&str> {
        self.extra.get(keys::NAME).and_then(Value::as_str)
    }

    /// Text form of the value
    pub fn text(&self) -> Option<&str> {
        self.value.as_ref().and_then(LabelValue::as_text)
    }

    /// Both token bounds, if present
    pub fn token_bounds(&self) -> Option<(usize, usize)> {
        Some((self.start_token?, self.end_token?))
    }
}

/// Move `key` out of `attributes` when `parse` accepts its value
fn take_typed<T>(
    attributes: &mut Map<String, Value>,
    key: &str,
    parse: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    let parsed = attributes.get(key).and_then(parse)?;
    attributes.remove(key);
    Some(parsed)
}

fn text_attribute(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn token_index(value: &Value) -> Option<usize> {
    value.as_u64().and_then(|index| usize::try_from(index).ok())
}

// ============================================================================
// Traits
// ============================================================================

/// Morphological engine turning an inflected phrase into its base form
///
/// Engines are stateful and expensive to build: construct one per batch and
/// hand it to the pipeline. `normalize` takes `&mut self`, so an instance is
/// never used from two places at once.
pub trait MorphologicalEngine: Send {
    /// Normalize `text` given its space-separated lemma and POS tag strings
    fn normalize(&mut self, text: &str, lemma_tags: &str, pos_tags: &str) -> Result<String>;

    /// Engine name for logging
    fn name(&self) -> &str;
}

impl<E: MorphologicalEngine + ?Sized> MorphologicalEngine for Box<E> {
    fn normalize(&mut self, text: &str, lemma_tags: &str, pos_tags: &str) -> Result<String> {
        (**self).normalize(text, lemma_tags, pos_tags)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// ============================================================================
// Tests
// ============================================================================

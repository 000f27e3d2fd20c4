//! Dictionary-backed morphological engine
//!
//! Exact phrase overrides come from a TOML dictionary:
//!
//! ```toml
//! [entries]
//! "Alejach Jerozolimskich" = "Aleje Jerozolimskie"
//! ```
//!
//! Phrases without an entry fall back to the joined lemma candidates, with
//! the capitalization of each surface token carried over.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use polem_core::{MorphologicalEngine, PolemError, Result};

/// Dictionary file layout
#[derive(Debug, Default, Deserialize)]
struct DictionaryFile {
    #[serde(default)]
    entries: HashMap<String, String>,
}

/// Phrase dictionary with a lemma-join fallback
#[derive(Debug, Clone, Default)]
pub struct DictionaryEngine {
    /// Lookup index (lowercase surface phrase -> normalized phrase)
    lookup: HashMap<String, String>,
}

impl DictionaryEngine {
    /// Create an engine without overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from a TOML dictionary file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PolemError::ConfigError(format!(
                "Failed to read dictionary {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            PolemError::ConfigError(message) => {
                PolemError::ConfigError(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    /// Parse overrides from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: DictionaryFile = toml::from_str(content)
            .map_err(|e| PolemError::ConfigError(format!("Invalid dictionary: {e}")))?;

        Ok(file
            .entries
            .into_iter()
            .fold(Self::new(), |engine, (surface, normalized)| {
                engine.with_entry(surface, normalized)
            }))
    }

    /// Add a phrase override
    pub fn with_entry(mut self, surface: impl AsRef<str>, normalized: impl Into<String>) -> Self {
        self.lookup
            .insert(lookup_key(surface.as_ref()), normalized.into());
        self
    }

    /// Number of phrase overrides
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}

impl MorphologicalEngine for DictionaryEngine {
    fn normalize(&mut self, text: &str, lemma_tags: &str, _pos_tags: &str) -> Result<String> {
        if let Some(normalized) = self.lookup.get(&lookup_key(text)) {
            return Ok(normalized.clone());
        }

        if lemma_tags.trim().is_empty() {
            return Err(PolemError::Normalization(format!(
                "no lemma candidates for \"{text}\""
            )));
        }

        Ok(restore_case(text, lemma_tags))
    }

    fn name(&self) -> &str {
        "dictionary"
    }
}

fn lookup_key(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Join lemmas, upper-casing those whose surface token starts upper-case
fn restore_case(surface: &str, lemmas: &str) -> String {
    let surface_tokens: Vec<&str> = surface.split_whitespace().collect();
    let lemma_tokens: Vec<&str> = lemmas.split_whitespace().collect();

    if surface_tokens.len() != lemma_tokens.len() {
        return lemma_tokens.join(" ");
    }

    surface_tokens
        .iter()
        .zip(lemma_tokens)
        .map(|(surface, lemma)| {
            if surface.chars().next().is_some_and(char::is_uppercase) {
                capitalize(lemma)
            } else {
                lemma.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

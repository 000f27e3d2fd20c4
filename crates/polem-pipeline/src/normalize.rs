//! Normalization of named-entity labels through a morphological engine

use serde_json::Value;

use polem_core::{keys, provenance, Label, LabelValue, MorphologicalEngine, PolemError, Result};

use crate::aligner::AlignedTags;

/// Copy `source` as a derived Polem label carrying `normalized`
pub fn derive_label(source: &Label, normalized: String) -> Label {
    let mut derived = source.clone();
    derived.value = Some(LabelValue::Text(normalized));
    derived.field = Some(provenance::FIELD.to_string());
    derived.service = Some(provenance::SERVICE.to_string());
    // mistyped originals would otherwise shadow the typed fields on output
    derived.extra.remove(keys::FIELD);
    derived.extra.remove(keys::SERVICE);
    derived
        .extra
        .insert(keys::NAME.to_string(), Value::from(provenance::NAME));
    derived
}

/// Lemmatize the text of `ner_label` and return the derived label
pub fn normalize_ner_label<E>(ner_label: &Label, tags: &AlignedTags, engine: &mut E) -> Result<Label>
where
    E: MorphologicalEngine + ?Sized,
{
    let text = ner_label.text().ok_or_else(|| {
        PolemError::Normalization(format!(
            "named entity at token {} has no text value",
            ner_label
                .start_token
                .map_or_else(|| "?".to_string(), |t| t.to_string())
        ))
    })?;

    let normalized = engine
        .normalize(text, &tags.lemma_tags, &tags.pos_tags)
        .map_err(|err| match err {
            PolemError::Normalization(message) => PolemError::Normalization(message),
            other => PolemError::Normalization(format!("{} failed: {other}", engine.name())),
        })?;

    Ok(derive_label(ner_label, normalized))
}

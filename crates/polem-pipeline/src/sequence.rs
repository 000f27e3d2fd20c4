//! Token-ordered tag sequence reconstruction
//!
//! Tag labels arrive in no particular order. Every token slot from 0 up to
//! the highest `startToken` must be covered by exactly one label of width 1.

use std::collections::BTreeMap;

use tracing::warn;

use polem_core::{AlignmentError, Label};

/// Rebuild the per-token tag values of `field` ordered by token position
///
/// Sequence values take the first candidate for lemma labels. A later label
/// at an already seen position replaces the earlier one.
pub fn build_tag_value_sequence(
    field: &str,
    labels: &[Label],
) -> Result<Vec<String>, AlignmentError> {
    let mut tags: BTreeMap<usize, String> = BTreeMap::new();
    let mut max_pos = 0;

    for label in labels.iter().filter(|l| l.has_field(field)) {
        let (start_token, end_token) =
            label
                .token_bounds()
                .ok_or_else(|| AlignmentError::MissingTokenBounds {
                    field: field.to_string(),
                })?;

        if end_token.checked_sub(start_token) != Some(1) {
            return Err(AlignmentError::InvalidSpanWidth {
                field: field.to_string(),
                start_token,
                end_token,
            });
        }

        let text = label.text().ok_or_else(|| AlignmentError::MissingTagValue {
            field: field.to_string(),
            position: start_token,
        })?;

        if let Some(previous) = tags.insert(start_token, text.to_string()) {
            warn!(
                field,
                position = start_token,
                previous = %previous,
                current = %text,
                "duplicate tag label, keeping the later one"
            );
        }
        max_pos = max_pos.max(start_token);
    }

    let expected = max_pos + 1;
    if tags.len() < expected {
        let first_missing = (0..expected)
            .find(|pos| !tags.contains_key(pos))
            .unwrap_or(expected);
        return Err(AlignmentError::MissingTags {
            field: field.to_string(),
            first_missing,
            found: tags.len(),
            expected,
        });
    }

    Ok(tags.into_values().collect())
}

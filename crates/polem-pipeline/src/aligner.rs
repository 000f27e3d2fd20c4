//! Span alignment of named-entity labels against tag sequences
//!
//! Named-entity labels carry an inclusive `endToken`: an entity covering a
//! single token has `startToken == endToken`. Tag labels, by contrast, use
//! an exclusive bound (see `sequence`).

use serde::Serialize;

use polem_core::{AlignmentError, Label};

/// Lower-cased, space-joined tag strings covering one entity span
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignedTags {
    pub pos_tags: String,
    pub lemma_tags: String,
}

/// Both tag sequences must describe the same tokens
pub fn check_tag_counts(pos_tags: &[String], lemma_tags: &[String]) -> Result<(), AlignmentError> {
    if pos_tags.len() != lemma_tags.len() {
        return Err(AlignmentError::MismatchedTagCounts {
            pos_count: pos_tags.len(),
            lemma_count: lemma_tags.len(),
        });
    }
    Ok(())
}

/// Slice the tag sequences by the span of `ner_label`
///
/// Callers are expected to run `check_tag_counts` first.
pub fn build_aligned_tag_strings(
    ner_label: &Label,
    pos_tags: &[String],
    lemma_tags: &[String],
) -> Result<AlignedTags, AlignmentError> {
    let (start_token, end_token) =
        ner_label
            .token_bounds()
            .ok_or_else(|| AlignmentError::MissingTokenBounds {
                field: ner_label
                    .field
                    .clone()
                    .unwrap_or_else(|| "named entity".to_string()),
            })?;

    if start_token > end_token {
        return Err(AlignmentError::InvertedSpan {
            start_token,
            end_token,
        });
    }

    let available = pos_tags.len().min(lemma_tags.len());
    if available <= end_token {
        return Err(AlignmentError::SpanOutOfRange {
            start_token,
            end_token,
            available,
        });
    }

    Ok(AlignedTags {
        pos_tags: join_lowercase(&pos_tags[start_token..=end_token]),
        lemma_tags: join_lowercase(&lemma_tags[start_token..=end_token]),
    })
}

fn join_lowercase(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| tag.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn ner(start: usize, end: usize) -> Label {
        Label::new("NER", "namedEntityML")
            .with_tokens(start, end)
            .with_value("Alejach Jerozolimskich")
    }

    #[test]
    fn test_joins_and_lowercases() {
        let aligned =
            build_aligned_tag_strings(&ner(0, 1), &strings(&["A", "B"]), &strings(&["C", "D"]))
                .unwrap();

        assert_eq!(aligned.pos_tags, "a b");
        assert_eq!(aligned.lemma_tags, "c d");
    }

    #[test]
    fn test_inner_span() {
        let pos = strings(&["prep:loc", "subst:pl:loc:f", "adj:pl:loc:f:pos", "interp"]);
        let lemma = strings(&["w", "Aleja", "Jerozolimski", "."]);

        let aligned = build_aligned_tag_strings(&ner(1, 2), &pos, &lemma).unwrap();

        assert_eq!(aligned.pos_tags, "subst:pl:loc:f adj:pl:loc:f:pos");
        assert_eq!(aligned.lemma_tags, "aleja jerozolimski");
    }

    #[test]
    fn test_single_token_span() {
        let aligned = build_aligned_tag_strings(
            &ner(0, 0),
            &strings(&["SUBST:SG:NOM:F"]),
            &strings(&["Polska"]),
        )
        .unwrap();

        assert_eq!(aligned.pos_tags, "subst:sg:nom:f");
        assert_eq!(aligned.lemma_tags, "polska");
    }

    #[test]
    fn test_span_beyond_sequence() {
        let err = build_aligned_tag_strings(&ner(1, 2), &strings(&["a", "b"]), &strings(&["c", "d"]))
            .unwrap_err();

        assert_eq!(
            err,
            AlignmentError::SpanOutOfRange {
                start_token: 1,
                end_token: 2,
                available: 2,
            }
        );
    }

    #[test]
    fn test_short_lemma_sequence_does_not_panic() {
        let err = build_aligned_tag_strings(&ner(0, 1), &strings(&["a", "b"]), &strings(&["c"]))
            .unwrap_err();
        assert!(matches!(err, AlignmentError::SpanOutOfRange { available: 1, .. }));
    }

    #[test]
    fn test_inverted_span() {
        let err = build_aligned_tag_strings(&ner(2, 1), &strings(&["a"; 3]), &strings(&["b"; 3]))
            .unwrap_err();
        assert!(matches!(err, AlignmentError::InvertedSpan { .. }));
    }

    #[test]
    fn test_missing_bounds() {
        let label = Label::new("NER", "namedEntityML").with_value("Polska");
        let err = build_aligned_tag_strings(&label, &strings(&["a"]), &strings(&["b"])).unwrap_err();
        assert_eq!(
            err,
            AlignmentError::MissingTokenBounds {
                field: "namedEntityML".to_string()
            }
        );
    }

    #[test]
    fn test_check_tag_counts() {
        assert!(check_tag_counts(&strings(&["a"]), &strings(&["b"])).is_ok());
        assert_eq!(
            check_tag_counts(&strings(&["a", "b"]), &strings(&["c"])),
            Err(AlignmentError::MismatchedTagCounts {
                pos_count: 2,
                lemma_count: 1,
            })
        );
    }
}

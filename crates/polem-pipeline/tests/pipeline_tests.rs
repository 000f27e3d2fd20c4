//! Batch-level pipeline tests

use polem_core::{MorphologicalEngine, PolemError, Result};
use polem_pipeline::{DictionaryEngine, LemmatizationPipeline};
use serde_json::{json, Value};

/// Engine answering with a fixed phrase and counting calls
struct StubEngine {
    answer: &'static str,
    calls: usize,
}

impl MorphologicalEngine for StubEngine {
    fn normalize(&mut self, _text: &str, _lemma_tags: &str, _pos_tags: &str) -> Result<String> {
        self.calls += 1;
        Ok(self.answer.to_string())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

fn stub(answer: &'static str) -> StubEngine {
    StubEngine { answer, calls: 0 }
}

fn street_document() -> Value {
    json!({
        "id": "doc-1",
        "labels": [
            {"serviceName": "tagger", "fieldName": "posTag", "startToken": 2, "endToken": 3, "value": "adj:pl:loc:f:pos"},
            {"serviceName": "tagger", "fieldName": "posTag", "startToken": 0, "endToken": 1, "value": "prep:loc:nwok"},
            {"serviceName": "tagger", "fieldName": "posTag", "startToken": 1, "endToken": 2, "value": "subst:pl:loc:f"},
            {"serviceName": "tagger", "fieldName": "lemmas", "startToken": 0, "endToken": 1, "value": ["w"]},
            {"serviceName": "tagger", "fieldName": "lemmas", "startToken": 1, "endToken": 2, "value": ["Aleja"]},
            {"serviceName": "tagger", "fieldName": "lemmas", "startToken": 2, "endToken": 3, "value": ["Jerozolimski"]},
            {
                "serviceName": "NER",
                "fieldName": "namedEntityML",
                "name": "sys.Street",
                "score": 0.93,
                "start": 2,
                "end": 24,
                "startToken": 1,
                "endToken": 2,
                "value": "Alejach Jerozolimskich"
            }
        ]
    })
}

fn document_without_pos_tags() -> Value {
    json!({
        "id": "doc-2",
        "labels": [
            {"serviceName": "tagger", "fieldName": "lemmas", "startToken": 0, "endToken": 1, "value": ["Polska"]},
            {"serviceName": "NER", "fieldName": "namedEntityML", "name": "sys.Country", "startToken": 0, "endToken": 0, "value": "Polska"}
        ]
    })
}

#[test]
fn test_end_to_end_street_name() {
    let mut batch = json!({"docs": [street_document()]});
    let mut pipeline = LemmatizationPipeline::new(stub("aleje jerozolimskie"));

    let report = pipeline.process_document_batch(&mut batch).unwrap();

    assert!(report.is_clean());
    assert_eq!(report.documents_processed, 1);
    assert_eq!(report.labels_added, 1);
    assert_eq!(pipeline.engine().calls, 1);

    let labels = batch["docs"][0]["labels"].as_array().unwrap();
    assert_eq!(labels.len(), 8);

    let derived = &labels[7];
    assert_eq!(derived["value"], "aleje jerozolimskie");
    assert_eq!(derived["serviceName"], "Polem");
    assert_eq!(derived["fieldName"], "polem");
    assert_eq!(derived["name"], "polem");
    assert_eq!(derived["startToken"], 1);
    assert_eq!(derived["endToken"], 2);
    assert_eq!(derived["score"], 0.93);
    assert_eq!(derived["start"], 2);
    assert_eq!(derived["end"], 24);
}

#[test]
fn test_source_labels_are_untouched() {
    let original = street_document();
    let mut batch = json!({"docs": [original.clone()]});
    let mut pipeline = LemmatizationPipeline::new(stub("aleje jerozolimskie"));

    pipeline.process_document_batch(&mut batch).unwrap();

    let labels = batch["docs"][0]["labels"].as_array().unwrap();
    let original_labels = original["labels"].as_array().unwrap();
    assert_eq!(&labels[..original_labels.len()], original_labels.as_slice());
    assert_eq!(batch["docs"][0]["id"], "doc-1");
}

#[test]
fn test_bad_document_does_not_abort_batch() {
    let bad = document_without_pos_tags();
    let mut batch = json!({"docs": [street_document(), bad.clone()]});
    let mut pipeline = LemmatizationPipeline::new(stub("aleje jerozolimskie"));

    let report = pipeline.process_document_batch(&mut batch).unwrap();

    assert_eq!(report.documents_total, 2);
    assert_eq!(report.documents_processed, 1);
    assert_eq!(report.labels_added, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert_eq!(report.failures[0].document_id.as_deref(), Some("doc-2"));

    assert_eq!(batch["docs"][0]["labels"].as_array().unwrap().len(), 8);
    assert_eq!(batch["docs"][1], bad);
}

#[test]
fn test_bad_document_first_still_processes_rest() {
    let mut batch = json!({"docs": [document_without_pos_tags(), street_document()]});
    let mut pipeline = LemmatizationPipeline::new(stub("aleje jerozolimskie"));

    let report = pipeline.process_document_batch(&mut batch).unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 0);
    assert_eq!(batch["docs"][1]["labels"].as_array().unwrap().len(), 8);
}

#[test]
fn test_failing_entity_discards_whole_document() {
    let mut doc = street_document();
    // second entity reaching past the last token
    doc["labels"].as_array_mut().unwrap().push(json!({
        "serviceName": "NER",
        "fieldName": "namedEntityML",
        "startToken": 2,
        "endToken": 3,
        "value": "Jerozolimskich ."
    }));
    let before = doc.clone();
    let mut batch = json!({"docs": [doc]});
    let mut pipeline = LemmatizationPipeline::new(stub("aleje jerozolimskie"));

    let report = pipeline.process_document_batch(&mut batch).unwrap();

    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.contains("exceeds tag sequence"));
    assert_eq!(report.labels_added, 0);
    assert_eq!(pipeline.engine().calls, 0);
    assert_eq!(batch["docs"][0], before);
}

#[test]
fn test_empty_docs_is_input_error() {
    let mut batch = json!({"docs": []});
    let mut pipeline = LemmatizationPipeline::new(stub("unused"));

    let err = pipeline.process_document_batch(&mut batch).unwrap_err();

    assert!(matches!(err, PolemError::InvalidInput(_)));
    assert!(!err.is_document_recoverable());
    assert_eq!(pipeline.engine().calls, 0);
}

#[test]
fn test_missing_docs_key_is_input_error() {
    let mut batch = json!({"documents": [street_document()]});
    let mut pipeline = LemmatizationPipeline::new(stub("unused"));

    let err = pipeline.process_document_batch(&mut batch).unwrap_err();
    assert!(err.to_string().contains("\"docs\""));
}

#[test]
fn test_engine_reused_across_documents() {
    let mut batch = json!({"docs": [street_document(), street_document(), street_document()]});
    let mut pipeline = LemmatizationPipeline::new(stub("aleje jerozolimskie"));

    let report = pipeline.process_document_batch(&mut batch).unwrap();

    assert_eq!(report.documents_processed, 3);
    assert_eq!(pipeline.engine().calls, 3);
}

#[test]
fn test_dictionary_engine_batch() {
    let engine = DictionaryEngine::new().with_entry("Alejach Jerozolimskich", "Aleje Jerozolimskie");
    let mut batch = json!({"docs": [street_document()]});
    let mut pipeline = LemmatizationPipeline::new(engine);

    pipeline.process_document_batch(&mut batch).unwrap();

    assert_eq!(batch["docs"][0]["labels"][7]["value"], "Aleje Jerozolimskie");
}

#[test]
fn test_boxed_engine() {
    let engine: Box<dyn MorphologicalEngine> = Box::new(DictionaryEngine::new());
    let mut batch = json!({"docs": [street_document()]});
    let mut pipeline = LemmatizationPipeline::new(engine);

    pipeline.process_document_batch(&mut batch).unwrap();

    assert_eq!(batch["docs"][0]["labels"][7]["value"], "Aleja Jerozolimski");
}

#[test]
fn test_entity_with_numeric_name_is_lemmatized() {
    let mut doc = street_document();
    doc["labels"][6]["name"] = json!(42);
    let mut batch = json!({"docs": [doc]});
    let mut pipeline = LemmatizationPipeline::new(stub("aleje jerozolimskie"));

    let report = pipeline.process_document_batch(&mut batch).unwrap();

    assert!(report.is_clean());
    assert_eq!(report.labels_added, 1);
    let derived = &batch["docs"][0]["labels"][7];
    assert_eq!(derived["name"], "polem");
    assert_eq!(derived["value"], "aleje jerozolimskie");
}

#[test]
fn test_tag_label_with_fractional_bounds_fails_document() {
    let mut doc = street_document();
    doc["labels"].as_array_mut().unwrap().push(json!({
        "serviceName": "tagger",
        "fieldName": "posTag",
        "startToken": 1.0,
        "endToken": 9,
        "value": "interp"
    }));
    let before = doc.clone();
    let mut batch = json!({"docs": [doc]});
    let mut pipeline = LemmatizationPipeline::new(stub("aleje jerozolimskie"));

    let report = pipeline.process_document_batch(&mut batch).unwrap();

    assert_eq!(report.documents_processed, 0);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.contains("startToken"));
    assert_eq!(batch["docs"][0], before);
}

#[test]
fn test_gapped_tags_fail_document_without_entities() {
    let doc = json!({
        "labels": [
            {"serviceName": "tagger", "fieldName": "posTag", "startToken": 0, "endToken": 1, "value": "subst"},
            {"serviceName": "tagger", "fieldName": "posTag", "startToken": 2, "endToken": 3, "value": "adj"}
        ]
    });
    let mut batch = json!({"docs": [doc]});
    let mut pipeline = LemmatizationPipeline::new(stub("unused"));

    let report = pipeline.process_document_batch(&mut batch).unwrap();

    assert_eq!(report.documents_processed, 0);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.contains("missing tag labels"));
    assert_eq!(pipeline.engine().calls, 0);
}

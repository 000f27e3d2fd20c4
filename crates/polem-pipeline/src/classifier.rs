//! Label classification by service and field discriminators

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use polem_core::Label;

/// Decode raw label entries, skipping anything that is not a label object
///
/// Every object decodes; attributes of the wrong JSON type are left for the
/// sequence builder and aligner to reject.
pub fn decode_labels(values: &[Value]) -> Vec<Label> {
    values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| match value {
            Value::Object(attributes) => Some(Label::from_map(attributes.clone())),
            _ => {
                debug!(index, "skipping non-object label entry");
                None
            }
        })
        .collect()
}

/// Labels produced by `service`, in their original order
pub fn select_by_service<'a>(labels: &'a [Label], service: &str) -> Vec<&'a Label> {
    labels.iter().filter(|l| l.has_service(service)).collect()
}

/// Labels of annotation kind `field`, in their original order
pub fn select_by_field<'a>(labels: &'a [Label], field: &str) -> Vec<&'a Label> {
    labels.iter().filter(|l| l.has_field(field)).collect()
}

/// Group labels by service; labels without a service are left out
pub fn partition_by_service(labels: &[Label]) -> BTreeMap<String, Vec<&Label>> {
    let mut groups: BTreeMap<String, Vec<&Label>> = BTreeMap::new();
    for label in labels {
        if let Some(service) = &label.service {
            groups.entry(service.clone()).or_default().push(label);
        }
    }
    groups
}

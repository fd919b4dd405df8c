//! Spec and label drift detection

use std::collections::BTreeMap;

/// Bring an existing object's spec and labels in line with the desired ones.
///
/// The spec is replaced wholesale when it differs. Desired labels are upserted;
/// labels the caller does not manage are left untouched. Returns the merged
/// labels and whether anything changed.
pub fn sync_spec_and_labels<S>(
    existing_spec: &mut S,
    desired_spec: S,
    existing_labels: Option<BTreeMap<String, String>>,
    desired_labels: &BTreeMap<String, String>,
) -> (BTreeMap<String, String>, bool)
where
    S: PartialEq,
{
    let mut updated = false;

    if *existing_spec != desired_spec {
        *existing_spec = desired_spec;
        updated = true;
    }

    let mut labels = existing_labels.unwrap_or_default();
    for (key, value) in desired_labels {
        if labels.get(key) != Some(value) {
            labels.insert(key.clone(), value.clone());
            updated = true;
        }
    }

    (labels, updated)
}

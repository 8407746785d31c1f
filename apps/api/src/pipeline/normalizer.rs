//! Response normalizer — turns whatever JSON the model produced into a
//! schema-complete `NormalizedCandidateInfo`. Total: never fails.

use serde_json::{Map, Value};
use tracing::debug;

use crate::pipeline::models::{ExtractedField, NormalizedCandidateInfo};

/// Normalizes a raw model reply.
///
/// Each wrapped field is decoded into an `ExtractedField`; an absent key, a
/// non-object value, or an object that does not decode (e.g. a string
/// confidence) is replaced by the empty default. `skills` defaults to an
/// empty list rather than null. `years_of_experience` and `education` are
/// copied through without coercion.
pub fn normalize(raw: &Value) -> NormalizedCandidateInfo {
    let empty = Map::new();
    let object = raw.as_object().unwrap_or(&empty);

    NormalizedCandidateInfo {
        full_name: wrapped_field(object, "full_name").unwrap_or_else(ExtractedField::empty),
        email: wrapped_field(object, "email").unwrap_or_else(ExtractedField::empty),
        phone: wrapped_field(object, "phone").unwrap_or_else(ExtractedField::empty),
        current_company: wrapped_field(object, "current_company")
            .unwrap_or_else(ExtractedField::empty),
        designation: wrapped_field(object, "designation").unwrap_or_else(ExtractedField::empty),
        skills: wrapped_field(object, "skills").unwrap_or_else(ExtractedField::empty_list),
        years_of_experience: object.get("years_of_experience").cloned().unwrap_or(Value::Null),
        education: object.get("education").cloned().unwrap_or(Value::Null),
    }
}

fn wrapped_field(object: &Map<String, Value>, key: &str) -> Option<ExtractedField> {
    let value = object.get(key)?;
    if !value.is_object() {
        debug!("Field '{key}' is not an object; using default");
        return None;
    }
    serde_json::from_value(value.clone())
        .map_err(|e| debug!("Field '{key}' did not decode ({e}); using default"))
        .ok()
}

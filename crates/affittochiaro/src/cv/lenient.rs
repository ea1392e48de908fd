//! Tolerant decoding for CV payloads.
//!
//! Tenant data arrives from forms, imports, and older clients that do not always agree on
//! shapes. Optional fields that are missing, null, or of the wrong type decode as absent, and
//! malformed entries inside collections are dropped, so a CV can always be scored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode an optional field, treating null or wrong-shaped values as `None`.
pub(crate) fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decode(value))
}

/// Decode a boolean flag, defaulting to `false` for anything that is not a boolean.
pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional::<D, bool>(deserializer)?.unwrap_or(false))
}

/// Decode a nested record, falling back to its default when the shape is wrong.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(optional::<D, T>(deserializer)?.unwrap_or_default())
}

/// Decode a list, keeping only the entries that have the expected shape.
pub(crate) fn collection<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            tracing::debug!(kind = value_kind(&other), "expected a list, ignoring value");
            return Ok(Vec::new());
        }
    };

    Ok(items.into_iter().filter_map(decode).collect())
}

fn decode<T: DeserializeOwned>(value: Value) -> Option<T> {
    if value.is_null() {
        return None;
    }

    let kind = value_kind(&value);
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            tracing::debug!(kind, error = %err, "discarding malformed value");
            None
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// True when the text holds something other than whitespace.
pub(crate) fn is_filled(value: Option<&str>) -> bool {
    value.map(|text| !text.trim().is_empty()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::super::domain::{CvRentalEntry, TenantCv, TenantProfile};
    use super::*;
    use serde_json::json;

    #[test]
    fn wrong_shaped_optional_fields_decode_as_absent() {
        let profile: TenantProfile = serde_json::from_value(json!({
            "tenant_id": "t-1",
            "personal": {
                "first_name": "Giulia",
                "phone": 3471234567u64,
                "date_of_birth": "not a date"
            },
            "employment": {
                "annual_income": "a lot",
                "income_visible": "yes"
            },
            "presentation_video": { "duration_seconds": 30 }
        }))
        .expect("profile decodes");

        assert_eq!(profile.personal.first_name.as_deref(), Some("Giulia"));
        assert_eq!(profile.personal.phone, None);
        assert_eq!(profile.personal.date_of_birth, None);
        assert_eq!(profile.employment.annual_income, None);
        assert!(!profile.employment.income_visible);
        assert!(profile.presentation_video.is_none());
    }

    #[test]
    fn nested_record_with_wrong_shape_falls_back_to_default() {
        let profile: TenantProfile = serde_json::from_value(json!({
            "tenant_id": "t-2",
            "personal": "Giulia Rossi",
            "employment": null
        }))
        .expect("profile decodes");

        assert_eq!(profile, TenantProfile::empty(profile.tenant_id.clone()));
    }

    #[test]
    fn malformed_collection_entries_are_dropped() {
        let cv: TenantCv = serde_json::from_value(json!({
            "profile": { "tenant_id": "t-3" },
            "rental_history": [
                {
                    "id": "rent-1",
                    "address": "Via Roma 12",
                    "city": "Torino",
                    "start_date": "2021-03-01",
                    "monthly_rent": 720
                },
                { "address": "missing everything else" },
                42
            ],
            "references": "none",
            "documents": null
        }))
        .expect("cv decodes");

        assert_eq!(cv.rental_history.len(), 1);
        let entry: &CvRentalEntry = &cv.rental_history[0];
        assert_eq!(entry.city, "Torino");
        assert!(!entry.is_current);
        assert!(cv.references.is_empty());
        assert!(cv.documents.is_empty());
        assert!(cv.preferences.is_none());
    }

    #[test]
    fn missing_tenant_id_is_still_an_error() {
        let result = TenantCv::from_json_str(r#"{ "profile": {} }"#);
        assert!(result.is_err());
    }

    #[test]
    fn blank_text_is_not_filled() {
        assert!(is_filled(Some("Marco")));
        assert!(!is_filled(Some("   ")));
        assert!(!is_filled(None));
    }
}

//! Response envelope and identifier normalization.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Every API response is wrapped in this envelope.
///
/// `success: false` is a failure whatever the HTTP status says, and
/// `success: true` without `data` is a protocol violation for any call that
/// expects a payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    /// Outcome reported by the server.
    pub success: bool,
    /// Payload of a successful call.
    #[serde(default)]
    pub data: Option<Value>,
    /// Human-readable status or error message.
    #[serde(default)]
    pub message: Option<String>,
    /// Server-side validation details. Kept raw because the shape is only
    /// trusted by callers that map field errors (the contact form).
    #[serde(default)]
    pub errors: Option<Value>,
}

/// One server-side validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    /// Wire name of the rejected field.
    #[serde(alias = "param", alias = "path")]
    pub field: String,
    /// Why it was rejected.
    #[serde(alias = "msg")]
    pub message: String,
}

impl ApiEnvelope {
    /// Field errors reported by the server, keyed by field. Entries that do
    /// not look like `{field, message}` are skipped.
    pub fn field_errors(&self) -> BTreeMap<String, String> {
        let mut mapped = BTreeMap::new();
        let Some(Value::Array(items)) = &self.errors else {
            return mapped;
        };
        for item in items {
            match serde_json::from_value::<FieldError>(item.clone()) {
                Ok(error) => {
                    mapped.entry(error.field).or_insert(error.message);
                },
                Err(err) => tracing::debug!("ignoring malformed field error {item}: {err}"),
            }
        }
        mapped
    }
}

/// Make `_id` the canonical identifier of one record.
///
/// The API returns `id` or `_id` depending on the endpoint. When only `id` is
/// present it is moved to `_id`; nested `replies` are normalized too.
pub fn normalize_record_id(record: &mut Map<String, Value>) {
    if !record.contains_key("_id") {
        if let Some(id) = record.remove("id") {
            record.insert("_id".to_string(), id);
        }
    }
    if let Some(Value::Array(replies)) = record.get_mut("replies") {
        for reply in replies.iter_mut() {
            if let Value::Object(reply) = reply {
                normalize_record_id(reply);
            }
        }
    }
}

/// Normalize every record of a `data` payload: each object field is treated
/// as a record, each array field as a list of records.
pub fn normalize_payload_ids(data: &mut Value) {
    let Value::Object(fields) = data else {
        return;
    };
    for value in fields.values_mut() {
        match value {
            Value::Object(record) => normalize_record_id(record),
            Value::Array(records) => {
                for record in records.iter_mut() {
                    if let Value::Object(record) = record {
                        normalize_record_id(record);
                    }
                }
            },
            _ => {},
        }
    }
}

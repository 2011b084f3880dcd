use serde_json::json;

use crate::messages::{Locale, Message};
use crate::store::StoreError;
use crate::validation::ValidationError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Localized error reply for a store failure; `fallback` replaces the generic
/// write-failure text where the caller knows better (e.g. a delete).
pub fn store_err(
    id: &str,
    locale: Locale,
    e: &StoreError,
    fallback: Option<Message>,
) -> serde_json::Value {
    let message = match (e, fallback) {
        (StoreError::Storage(crate::db::StorageError::Write(_)), Some(m)) => m,
        _ => e.message(),
    };
    let mut details = json!({ "detail": e.to_string() });
    if let StoreError::Validation(v) = e {
        details["field"] = json!(v.field().key());
        if let ValidationError::OutOfRange { value, .. } = v {
            details["value"] = json!(value);
        }
    }
    err(id, e.code(), message.text(locale), Some(details))
}

pub fn no_workspace(id: &str, locale: Locale) -> serde_json::Value {
    err(id, "no_workspace", Message::NoWorkspace.text(locale), None)
}

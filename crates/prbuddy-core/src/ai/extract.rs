// SPDX-License-Identifier: Apache-2.0

//! Validation and extraction of the generated pull request draft.
//!
//! The reply is checked in stages: envelope, inner content, schema, fields.
//! Each stage has its own failure kind so callers can tell a service-side
//! failure from a model that ignored the output contract. Nothing is
//! salvaged: prose around the JSON or markdown fences fail the schema stage.

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::types::{GenerateContentResponse, GeneratedPr};
use crate::error::{ExtractionError, ExtractionErrorKind};

/// Outcome of [`extract`].
pub type GenerationResult = Result<GeneratedPr, ExtractionError>;

/// Extracts `{title, description}` from a raw `generateContent` reply.
///
/// # Errors
///
/// Returns an [`ExtractionError`] naming the first stage that failed, with the
/// payload that failed it.
#[instrument(skip(raw), fields(raw_len = raw.len()))]
pub fn extract(raw: &str) -> GenerationResult {
    let envelope: GenerateContentResponse = serde_json::from_str(raw)
        .map_err(|_| ExtractionError::new(ExtractionErrorKind::EnvelopeMalformed, raw))?;

    if let Some(error) = envelope.error {
        return Err(ExtractionError::new(
            ExtractionErrorKind::ServiceError {
                code: error.code,
                message: error.summary(),
            },
            raw,
        ));
    }

    let Some(text) = envelope.candidates.first().and_then(|c| c.text()) else {
        let reason = envelope
            .candidates
            .first()
            .and_then(|c| c.finish_reason.clone())
            .or_else(|| envelope.prompt_feedback.and_then(|f| f.block_reason));
        return Err(ExtractionError::new(
            ExtractionErrorKind::ContentMissing { reason },
            raw,
        ));
    };

    let schema_error = || ExtractionError::new(ExtractionErrorKind::SchemaMalformed, text);
    let object = match serde_json::from_str::<Value>(text).map_err(|_| schema_error())? {
        Value::Object(object) => object,
        _ => return Err(schema_error()),
    };

    let title = required_string(&object, "title", text)?;
    let description = required_string(&object, "description", text)?;
    debug!(title_len = title.len(), description_len = description.len(), "Extracted draft");

    Ok(GeneratedPr { title, description })
}

fn required_string(
    object: &Map<String, Value>,
    field: &'static str,
    text: &str,
) -> Result<String, ExtractionError> {
    match object.get(field) {
        Some(Value::String(value)) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Some(Value::String(_) | Value::Null) | None => Err(ExtractionError::new(
            ExtractionErrorKind::FieldMissing { field },
            text,
        )),
        Some(_) => Err(ExtractionError::new(
            ExtractionErrorKind::FieldType { field },
            text,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Wraps generated text in a minimal success envelope.
    fn envelope(text: &str) -> String {
        serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }], "role": "model" },
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    #[test]
    fn extracts_title_and_description_exactly() {
        let inner = serde_json::json!({
            "title": "fix(auth): patch token refresh",
            "description": "### 🐛 Bug Fixes\n* Refresh tokens before expiry"
        })
        .to_string();
        let draft = extract(&envelope(&inner)).unwrap();

        assert_eq!(draft.title, "fix(auth): patch token refresh");
        assert_eq!(
            draft.description,
            "### 🐛 Bug Fixes\n* Refresh tokens before expiry"
        );
    }

    #[test]
    fn trims_edge_whitespace_only() {
        let inner = r#"{"title":"  feat: add x \n","description":"\n### ✨ New Functionality\n\n* a  b\n"}"#;
        let draft = extract(&envelope(inner)).unwrap();

        assert_eq!(draft.title, "feat: add x");
        assert_eq!(draft.description, "### ✨ New Functionality\n\n* a  b");
    }

    #[test]
    fn prose_wrapped_json_is_schema_malformed() {
        let inner = "Sure! Here is the PR:\n```json\n{\"title\":\"t\",\"description\":\"d\"}\n```";
        let err = extract(&envelope(inner)).unwrap_err();

        assert_eq!(err.kind, ExtractionErrorKind::SchemaMalformed);
        assert_eq!(err.raw_payload, inner);
    }

    #[test]
    fn non_object_json_is_schema_malformed() {
        let err = extract(&envelope(r#"["title","description"]"#)).unwrap_err();
        assert_eq!(err.kind, ExtractionErrorKind::SchemaMalformed);
    }

    #[test]
    fn error_descriptor_is_service_error() {
        let raw = r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = extract(raw).unwrap_err();

        assert!(err.is_service_error());
        assert_eq!(
            err.kind,
            ExtractionErrorKind::ServiceError {
                code: Some(429),
                message: "Resource has been exhausted (RESOURCE_EXHAUSTED)".to_string(),
            }
        );
        assert_eq!(err.raw_payload, raw);
    }

    #[test]
    fn non_json_envelope_is_malformed() {
        let err = extract("<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(err.kind, ExtractionErrorKind::EnvelopeMalformed);
        assert_eq!(err.raw_payload, "<html>Bad Gateway</html>");
    }

    #[test]
    fn missing_candidates_is_content_missing() {
        let err = extract(r#"{"candidates":[]}"#).unwrap_err();
        assert_eq!(err.kind, ExtractionErrorKind::ContentMissing { reason: None });
    }

    #[test]
    fn blocked_prompt_reports_reason() {
        let err = extract(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap_err();
        assert_eq!(
            err.kind,
            ExtractionErrorKind::ContentMissing {
                reason: Some("SAFETY".to_string())
            }
        );
    }

    #[test]
    fn candidate_without_parts_reports_finish_reason() {
        let raw = r#"{"candidates":[{"content":{"parts":[]},"finishReason":"MAX_TOKENS"}]}"#;
        let err = extract(raw).unwrap_err();
        assert_eq!(
            err.kind,
            ExtractionErrorKind::ContentMissing {
                reason: Some("MAX_TOKENS".to_string())
            }
        );
    }

    #[test]
    fn absent_field_is_field_missing() {
        let err = extract(&envelope(r#"{"title":"feat: x"}"#)).unwrap_err();
        assert_eq!(
            err.kind,
            ExtractionErrorKind::FieldMissing {
                field: "description"
            }
        );
    }

    #[test]
    fn blank_field_is_field_missing() {
        let err = extract(&envelope(r#"{"title":"   ","description":"d"}"#)).unwrap_err();
        assert_eq!(err.kind, ExtractionErrorKind::FieldMissing { field: "title" });
    }

    #[test]
    fn non_string_field_is_field_type() {
        let err = extract(&envelope(r#"{"title":"t","description":["a","b"]}"#)).unwrap_err();
        assert_eq!(
            err.kind,
            ExtractionErrorKind::FieldType {
                field: "description"
            }
        );
    }
}

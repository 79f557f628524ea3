//! Response body decoding.
//!
//! The backend wraps some responses in `{success, data, message, timestamp}`
//! and returns bare models for others. Both are accepted.

use financeflow_domain::{ApiEnvelope, ApiError, ErrorDetail};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Turn a status and raw body into the payload or a classified error.
///
/// Empty bodies (including `204 No Content`) decode as `Value::Null`.
///
/// # Errors
/// - Non-2xx status: classified by [`ApiError::from_response`].
/// - Unparseable body: `ApiError::Decode`.
/// - Envelope with `success: false` on a 2xx: `ApiError::Client`.
pub fn decode_body(status: u16, body: &str) -> Result<Value, ApiError> {
    if !(200..300).contains(&status) {
        return Err(ApiError::from_response(status, body));
    }

    if status == 204 || body.trim().is_empty() {
        return Ok(Value::Null);
    }

    let value: Value = serde_json::from_str(body).map_err(|err| ApiError::Decode {
        message: format!("invalid JSON body: {err}"),
        body: body.to_string(),
    })?;

    if !ApiEnvelope::<Value>::is_envelope(&value) {
        return Ok(value);
    }

    let envelope: ApiEnvelope<Value> =
        serde_json::from_value(value).map_err(|err| ApiError::Decode {
            message: format!("invalid response envelope: {err}"),
            body: body.to_string(),
        })?;

    if envelope.success {
        Ok(envelope.data.unwrap_or(Value::Null))
    } else {
        let fallback = envelope.message.as_deref().unwrap_or("Request failed");
        Err(ApiError::Client { status, detail: ErrorDetail::parse(body, fallback) })
    }
}

/// Deserialize a decoded payload into the caller's type.
///
/// # Errors
/// `ApiError::Decode` when the payload does not match `T`.
pub fn decode_as<T: DeserializeOwned>(payload: Value) -> Result<T, ApiError> {
    serde_json::from_value::<T>(payload.clone()).map_err(|err| ApiError::Decode {
        message: format!("unexpected response shape: {err}"),
        body: payload.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unwraps_successful_envelope() {
        let body = r#"{"success":true,"data":{"id":"p1"},"timestamp":"2024-01-01T00:00:00Z"}"#;
        assert_eq!(decode_body(200, body).unwrap(), json!({ "id": "p1" }));
    }

    #[test]
    fn bare_model_passes_through() {
        assert_eq!(decode_body(200, r#"[{"id":"p1"}]"#).unwrap(), json!([{ "id": "p1" }]));
    }

    #[test]
    fn empty_and_no_content_decode_as_null() {
        assert_eq!(decode_body(204, "").unwrap(), Value::Null);
        assert_eq!(decode_body(200, "  ").unwrap(), Value::Null);
        let unit: () = decode_as(Value::Null).unwrap();
        assert_eq!(unit, ());
        let missing: Option<String> = decode_as(Value::Null).unwrap();
        assert_eq!(missing, None);
    }

    /// Validates envelope failures on a 2xx status.
    ///
    /// Assertions:
    /// - Classified as `Client` with the original status.
    /// - Server-provided code and message are kept.
    #[test]
    fn failed_envelope_on_success_status_is_client_error() {
        let body = r#"{"success":false,"error":{"code":"LIMIT","message":"Too many portfolios"},"timestamp":"t"}"#;
        let err = decode_body(200, body).unwrap_err();

        assert_eq!(err.status(), Some(200));
        let detail = err.detail().unwrap();
        assert_eq!(detail.code.as_deref(), Some("LIMIT"));
        assert_eq!(detail.message, "Too many portfolios");
    }

    #[test]
    fn error_status_is_classified() {
        assert!(decode_body(401, "").unwrap_err().is_auth());
        assert!(decode_body(503, "").unwrap_err().is_retryable());
        assert_eq!(decode_body(404, "").unwrap_err().status(), Some(404));
    }

    #[test]
    fn invalid_json_is_decode_error() {
        let err = decode_body(200, "<html>").unwrap_err();
        assert!(matches!(err, ApiError::Decode { body, .. } if body == "<html>"));
    }
}

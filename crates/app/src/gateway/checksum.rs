//! PhonePe request signing.
//!
//! `X-VERIFY` is `hex(sha256(body + endpoint + salt_key)) + "###" + salt_index`.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};

use crate::gateway::GatewayError;

const SEPARATOR: &str = "###";

/// Compute the `X-VERIFY` header for `body` sent to `endpoint`.
///
/// Status requests have no body and sign the path alone; callbacks sign the
/// body with an empty endpoint.
#[must_use]
pub fn sign(body: &str, endpoint: &str, salt_key: &str, salt_index: u32) -> String {
    let mut hasher = Sha256::new();

    hasher.update(body.as_bytes());
    hasher.update(endpoint.as_bytes());
    hasher.update(salt_key.as_bytes());

    format!("{:x}{SEPARATOR}{salt_index}", hasher.finalize())
}

/// Check an `X-VERIFY` header against `body` and `endpoint`.
#[must_use]
pub fn verify(header: &str, body: &str, endpoint: &str, salt_key: &str, salt_index: u32) -> bool {
    let expected = sign(body, endpoint, salt_key, salt_index);

    header.trim().eq_ignore_ascii_case(&expected)
}

/// Serialise `payload` to JSON and base64 encode it.
///
/// # Errors
///
/// Returns [`GatewayError::Encode`] if serialisation fails.
pub fn encode_payload<T: Serialize>(payload: &T) -> Result<String, GatewayError> {
    let json = serde_json::to_vec(payload)?;

    Ok(BASE64.encode(json))
}

/// Base64 decode and parse a JSON payload.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidPayload`] if either step fails.
pub fn decode_payload<T: DeserializeOwned>(encoded: &str) -> Result<T, GatewayError> {
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| GatewayError::InvalidPayload(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| GatewayError::InvalidPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn sign_hashes_body_endpoint_and_salt() {
        // sha256("abc")
        assert_eq!(
            sign("a", "b", "c", 1),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad###1"
        );
    }

    #[test]
    fn verify_accepts_matching_header_only() {
        let header = sign("payload", "/pg/v1/pay", "salt", 2);

        assert!(verify(&header, "payload", "/pg/v1/pay", "salt", 2));
        assert!(!verify(&header, "payload", "/pg/v1/pay", "salt", 1));
        assert!(!verify(&header, "tampered", "/pg/v1/pay", "salt", 2));
        assert!(!verify("", "payload", "/pg/v1/pay", "salt", 2));
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Envelope {
        state: String,
    }

    #[test]
    fn payloads_survive_encoding() -> TestResult {
        let encoded = encode_payload(&Envelope {
            state: "COMPLETED".to_string(),
        })?;

        let decoded: Envelope = decode_payload(&encoded)?;

        assert_eq!(decoded.state, "COMPLETED");

        Ok(())
    }

    #[test]
    fn garbage_payload_is_invalid() {
        let result = decode_payload::<Envelope>("not base64!");

        assert!(
            matches!(result, Err(GatewayError::InvalidPayload(_))),
            "expected InvalidPayload, got {result:?}"
        );
    }
}

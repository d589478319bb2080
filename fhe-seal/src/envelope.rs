//! Envelope codec standing in for the homomorphic layer.
//!
//! SECURITY NOTE (prototype): `Base64Fhe` is NOT encryption. It wraps the
//! plaintext in a prefixed base64 envelope so the rest of the system can be
//! built against the real interface. In production, an actual homomorphic
//! scheme implements [`Envelope`] and nothing outside this crate changes.

use base64::Engine;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Marker every sealed value starts with.
pub const ENVELOPE_PREFIX: &str = "FHE-";

#[derive(Debug, Error)]
pub enum SealError {
    #[error("missing envelope prefix")]
    MissingPrefix,

    #[error("invalid base64: {0}")]
    Base64(String),

    #[error("invalid payload: {0}")]
    Payload(String),
}

/// The boundary the prescription workflow encrypts through.
///
/// `seal` turns plaintext bytes into an opaque string; `open` reverses it.
/// The JSON helpers cover the common case of sealing a serde value.
pub trait Envelope {
    fn seal(&self, plaintext: &[u8]) -> String;

    fn open(&self, sealed: &str) -> Result<Vec<u8>, SealError>;

    fn seal_json<T: Serialize>(&self, value: &T) -> Result<String, SealError> {
        let bytes = serde_json::to_vec(value).map_err(|e| SealError::Payload(e.to_string()))?;
        Ok(self.seal(&bytes))
    }

    fn open_json<T: DeserializeOwned>(&self, sealed: &str) -> Result<T, SealError> {
        let bytes = self.open(sealed)?;
        serde_json::from_slice(&bytes).map_err(|e| SealError::Payload(e.to_string()))
    }
}

/// The placeholder scheme: `FHE-` + standard base64 of the plaintext.
#[derive(Clone, Copy, Debug, Default)]
pub struct Base64Fhe;

impl Envelope for Base64Fhe {
    fn seal(&self, plaintext: &[u8]) -> String {
        let b64 = base64::engine::general_purpose::STANDARD;
        format!("{ENVELOPE_PREFIX}{}", b64.encode(plaintext))
    }

    fn open(&self, sealed: &str) -> Result<Vec<u8>, SealError> {
        let encoded = sealed
            .strip_prefix(ENVELOPE_PREFIX)
            .ok_or(SealError::MissingPrefix)?;

        let b64 = base64::engine::general_purpose::STANDARD;
        b64.decode(encoded).map_err(|e| SealError::Base64(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::PrescriptionPayload;

    fn sample_payload() -> PrescriptionPayload {
        PrescriptionPayload {
            patient: "Jane Doe".to_string(),
            medication: "Amoxicillin 500mg".to_string(),
            dosage: "3x daily".to_string(),
            instructions: "Take with food".to_string(),
        }
    }

    #[test]
    fn seal_open_round_trip() {
        let envelope = Base64Fhe;
        let sealed = envelope.seal_json(&sample_payload()).unwrap();

        assert!(sealed.starts_with(ENVELOPE_PREFIX));

        let opened: PrescriptionPayload = envelope.open_json(&sealed).unwrap();
        assert_eq!(opened, sample_payload());
    }

    #[test]
    fn open_rejects_missing_prefix() {
        let envelope = Base64Fhe;
        let sealed = envelope.seal(b"hello");
        let stripped = sealed.strip_prefix(ENVELOPE_PREFIX).unwrap();

        assert!(matches!(envelope.open(stripped), Err(SealError::MissingPrefix)));
    }

    #[test]
    fn open_rejects_bad_base64() {
        let envelope = Base64Fhe;

        assert!(matches!(
            envelope.open("FHE-not*valid*base64"),
            Err(SealError::Base64(_))
        ));
    }

    #[test]
    fn open_json_rejects_non_payload_bytes() {
        let envelope = Base64Fhe;
        let sealed = envelope.seal(b"not json at all");

        let opened: Result<PrescriptionPayload, _> = envelope.open_json(&sealed);
        assert!(matches!(opened, Err(SealError::Payload(_))));
    }
}

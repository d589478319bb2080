//! Plaintext carried inside a sealed envelope.

use serde::{Deserialize, Serialize};

/// The confidential portion of a prescription.
///
/// Plaintext fields never leave the client; only the sealed form is written
/// to the store. `instructions` exists solely inside the envelope and has no
/// plaintext counterpart in the stored record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionPayload {
    pub patient: String,
    pub medication: String,
    pub dosage: String,
    #[serde(default)]
    pub instructions: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instructions_default_to_empty() {
        let payload: PrescriptionPayload = serde_json::from_str(
            r#"{"patient":"Jane Doe","medication":"Amoxicillin","dosage":"500mg"}"#,
        )
        .unwrap();

        assert_eq!(payload.instructions, "");
        assert_eq!(payload.patient, "Jane Doe");
    }
}

use std::fmt;

use fhe_seal::payload::PrescriptionPayload;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle of a prescription record.
///
/// `Dispensed` and `Rejected` are terminal. Unknown or absent status on the
/// wire decodes as `Pending`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Verified,
    Dispensed,
    Rejected,
}

impl Status {
    /// Whether a record in this status may be rewritten with `next`.
    pub fn can_become(self, next: Status) -> bool {
        matches!(
            (self, next),
            (Status::Pending, Status::Verified)
                | (Status::Pending, Status::Rejected)
                | (Status::Verified, Status::Dispensed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Verified => "verified",
            Status::Dispensed => "dispensed",
            Status::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("address must start with 0x")]
    MissingPrefix,

    #[error("address is not valid hex")]
    BadHex,

    #[error("address must encode 20 bytes, got {0}")]
    BadLength(usize),
}

/// Account address, normalised to lowercase so comparison is
/// case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct Address(String);

impl Address {
    /// Lenient constructor used when decoding records: accepts any string.
    pub fn new(raw: impl Into<String>) -> Self {
        let mut s: String = raw.into();
        s.make_ascii_lowercase();
        Self(s)
    }

    /// Strict form used at the wallet boundary: `0x` followed by 20 hex
    /// bytes.
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let digits = raw.strip_prefix("0x").ok_or(AddressError::MissingPrefix)?;
        let bytes = hex::decode(digits).map_err(|_| AddressError::BadHex)?;

        if bytes.len() != 20 {
            return Err(AddressError::BadLength(bytes.len()));
        }

        Ok(Self::new(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Address {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Exact JSON shape persisted under `prescription_<id>`.
///
/// `status` and `version` default when absent so records written by older
/// clients keep decoding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Sealed envelope produced by the FHE layer.
    pub data: String,
    /// Creation time, epoch seconds.
    pub timestamp: i64,
    pub patient: String,
    pub doctor: Address,
    pub medication: String,
    pub dosage: String,
    #[serde(default)]
    pub status: Status,
    /// Bumped on every rewrite.
    #[serde(default)]
    pub version: u64,
}

/// A stored record joined with the id it lives under.
#[derive(Clone, Debug, PartialEq)]
pub struct Prescription {
    pub id: String,
    pub sealed: String,
    pub timestamp: i64,
    pub patient: String,
    pub doctor: Address,
    pub medication: String,
    pub dosage: String,
    pub status: Status,
    pub version: u64,
}

impl Prescription {
    pub fn from_stored(id: impl Into<String>, record: StoredRecord) -> Self {
        Self {
            id: id.into(),
            sealed: record.data,
            timestamp: record.timestamp,
            patient: record.patient,
            doctor: record.doctor,
            medication: record.medication,
            dosage: record.dosage,
            status: record.status,
            version: record.version,
        }
    }
}

/// Doctor-entered fields for a new prescription.
#[derive(Clone, Debug, Default)]
pub struct Draft {
    pub patient: String,
    pub medication: String,
    pub dosage: String,
    pub instructions: String,
}

impl Draft {
    /// First required field that is empty, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.patient.trim().is_empty() {
            Some("patient")
        } else if self.medication.trim().is_empty() {
            Some("medication")
        } else if self.dosage.trim().is_empty() {
            Some("dosage")
        } else {
            None
        }
    }

    pub fn payload(&self) -> PrescriptionPayload {
        PrescriptionPayload {
            patient: self.patient.clone(),
            medication: self.medication.clone(),
            dosage: self.dosage.clone(),
            instructions: self.instructions.clone(),
        }
    }
}

const ID_SUFFIX_LEN: usize = 7;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Record ids are `<epoch millis>-<7-char base36 suffix>`.
pub fn new_record_id(rng: &mut impl RngCore, now_millis: i64) -> String {
    let mut suffix = String::with_capacity(ID_SUFFIX_LEN);
    for _ in 0..ID_SUFFIX_LEN {
        let i = (rng.next_u32() as usize) % ID_ALPHABET.len();
        suffix.push(ID_ALPHABET[i] as char);
    }

    format!("{now_millis}-{suffix}")
}

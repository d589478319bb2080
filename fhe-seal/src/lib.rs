//! "FHE" sealing layer for the e-prescription client.
//!
//! This crate contains:
//! - The `Envelope` boundary the surrounding workflow encrypts through.
//! - The placeholder base64 scheme the demo ships with.
//! - The plaintext payload type carried inside an envelope.

pub mod envelope;
pub mod payload;

//! Typed reads and writes over the contract's key-value surface.
//!
//! Key scheme: the index of all ids lives under `prescription_keys`; each
//! record lives under `prescription_<id>` as UTF-8 JSON.

use crate::contract::ContractAccessor;
use crate::errors::ClientError;
use crate::models::StoredRecord;
use tracing::warn;

pub const INDEX_KEY: &str = "prescription_keys";

pub fn record_key(id: &str) -> String {
    format!("prescription_{id}")
}

/// Read the id index. Absent or unparsable indexes read as empty.
pub async fn read_index<C: ContractAccessor>(contract: &C) -> Result<Vec<String>, ClientError> {
    let bytes = contract.get_data(INDEX_KEY).await?;
    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_slice(&bytes) {
        Ok(ids) => Ok(ids),
        Err(err) => {
            warn!(%err, "prescription index is unparsable, treating as empty");
            Ok(Vec::new())
        }
    }
}

pub async fn write_index<C: ContractAccessor>(
    contract: &C,
    ids: &[String],
) -> Result<(), ClientError> {
    let bytes = serde_json::to_vec(ids).map_err(|_| ClientError::Internal)?;
    contract.set_data(INDEX_KEY, bytes).await?;
    Ok(())
}

/// Append `id` to the index unless it is already present.
pub async fn append_to_index<C: ContractAccessor>(
    contract: &C,
    id: &str,
) -> Result<(), ClientError> {
    let mut ids = read_index(contract).await?;
    if !ids.iter().any(|existing| existing == id) {
        ids.push(id.to_string());
        write_index(contract, &ids).await?;
    }

    Ok(())
}

/// Read one record. `Ok(None)` means the key is empty; malformed JSON is a
/// `Corrupt` error so callers decide whether to skip or abort.
pub async fn read_record<C: ContractAccessor>(
    contract: &C,
    id: &str,
) -> Result<Option<StoredRecord>, ClientError> {
    let bytes = contract.get_data(&record_key(id)).await?;
    if bytes.is_empty() {
        return Ok(None);
    }

    match serde_json::from_slice(&bytes) {
        Ok(record) => Ok(Some(record)),
        Err(err) => Err(ClientError::Corrupt {
            id: id.to_string(),
            reason: err.to_string(),
        }),
    }
}

pub async fn write_record<C: ContractAccessor>(
    contract: &C,
    id: &str,
    record: &StoredRecord,
) -> Result<(), ClientError> {
    let bytes = serde_json::to_vec(record).map_err(|_| ClientError::Internal)?;
    contract.set_data(&record_key(id), bytes).await?;
    Ok(())
}

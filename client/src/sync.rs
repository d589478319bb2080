//! Rebuilds the prescription list from the key-value store.

use std::cmp::Reverse;

use crate::contract::{ContractAccessor, ContractError};
use crate::errors::ClientError;
use crate::models::Prescription;
use crate::store;
use tracing::warn;

/// Load every discoverable prescription, newest first.
///
/// A missing or malformed index yields an empty list. A record that fails to
/// read or parse is skipped, so one bad entry cannot hide the rest. The sort
/// is stable: records with equal timestamps keep their index order.
pub async fn load_all<C: ContractAccessor>(contract: &C) -> Result<Vec<Prescription>, ClientError> {
    if !contract.is_available().await? {
        return Err(ContractError::Unavailable.into());
    }

    let ids = store::read_index(contract).await?;

    let mut list = Vec::with_capacity(ids.len());
    for id in ids {
        match store::read_record(contract, &id).await {
            Ok(Some(record)) => list.push(Prescription::from_stored(id, record)),
            Ok(None) => warn!(%id, "prescription record missing, skipping"),
            Err(err) => warn!(%id, %err, "prescription record unreadable, skipping"),
        }
    }

    list.sort_by_key(|p| Reverse(p.timestamp));
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::MemoryContract;
    use crate::models::{Address, Status, StoredRecord};
    use crate::store::record_key;

    fn record_at(timestamp: i64) -> StoredRecord {
        StoredRecord {
            data: "FHE-aGVsbG8=".to_string(),
            timestamp,
            patient: "Jane Doe".to_string(),
            doctor: Address::new("0xabc0000000000000000000000000000000000001"),
            medication: "Amoxicillin 500mg".to_string(),
            dosage: "3x daily".to_string(),
            status: Status::Pending,
            version: 1,
        }
    }

    async fn seed(contract: &MemoryContract, id: &str, record: &StoredRecord) {
        store::write_record(contract, id, record).await.unwrap();
        store::append_to_index(contract, id).await.unwrap();
    }

    #[tokio::test]
    async fn empty_store_loads_empty_list() {
        let contract = MemoryContract::new();
        assert!(load_all(&contract).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unparsable_index_loads_empty_list() {
        let contract = MemoryContract::new();
        contract.insert_raw(store::INDEX_KEY, b"][".to_vec());

        assert!(load_all(&contract).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sorts_newest_first() {
        let contract = MemoryContract::new();
        seed(&contract, "1-aaaaaaa", &record_at(100)).await;
        seed(&contract, "2-bbbbbbb", &record_at(300)).await;
        seed(&contract, "3-ccccccc", &record_at(200)).await;

        let ids: Vec<String> = load_all(&contract)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();

        assert_eq!(ids, vec!["2-bbbbbbb", "3-ccccccc", "1-aaaaaaa"]);
    }

    #[tokio::test]
    async fn equal_timestamps_keep_index_order() {
        let contract = MemoryContract::new();
        seed(&contract, "1-aaaaaaa", &record_at(100)).await;
        seed(&contract, "2-bbbbbbb", &record_at(100)).await;

        let ids: Vec<String> = load_all(&contract)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();

        assert_eq!(ids, vec!["1-aaaaaaa", "2-bbbbbbb"]);
    }

    #[tokio::test]
    async fn one_corrupt_record_does_not_hide_the_rest() {
        let contract = MemoryContract::new();
        seed(&contract, "1-aaaaaaa", &record_at(100)).await;
        seed(&contract, "3-ccccccc", &record_at(300)).await;

        contract.insert_raw(&record_key("2-bbbbbbb"), b"{broken".to_vec());
        store::append_to_index(&contract, "2-bbbbbbb").await.unwrap();

        let list = load_all(&contract).await.unwrap();
        let ids: Vec<&str> = list.iter().map(|p| p.id.as_str()).collect();

        assert_eq!(ids, vec!["3-ccccccc", "1-aaaaaaa"]);
    }

    #[tokio::test]
    async fn indexed_but_missing_record_is_skipped() {
        let contract = MemoryContract::new();
        seed(&contract, "1-aaaaaaa", &record_at(100)).await;
        store::append_to_index(&contract, "9-zzzzzzz").await.unwrap();

        let list = load_all(&contract).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "1-aaaaaaa");
    }

    #[tokio::test]
    async fn unavailable_contract_is_an_error() {
        let contract = MemoryContract::new();
        contract.set_available(false);

        assert!(matches!(
            load_all(&contract).await,
            Err(ClientError::Contract(ContractError::Unavailable))
        ));
    }
}

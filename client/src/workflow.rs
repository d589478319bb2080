//! Status transitions over prescription records.
//!
//! Every mutation is read-full-record, mutate, write-full-record against a
//! store that offers no compare-and-swap; last write wins. The status
//! preconditions checked here are the authoritative transition guard, and
//! `version` is bumped on every write so a superseded copy is observable.

use std::time::Duration;

use chrono::Utc;
use fhe_seal::envelope::{Base64Fhe, Envelope};
use tracing::info;

use crate::contract::ContractAccessor;
use crate::errors::ClientError;
use crate::models::{Address, Draft, Prescription, Status, StoredRecord, new_record_id};
use crate::store;
use crate::sync;

pub struct Workflow<C, E = Base64Fhe> {
    contract: C,
    envelope: E,
    /// Simulated FHE compute time. User feedback only; zero in tests.
    delay: Duration,
}

impl<C: ContractAccessor> Workflow<C> {
    pub fn new(contract: C) -> Self {
        Self::with_envelope(contract, Base64Fhe)
    }
}

impl<C: ContractAccessor, E: Envelope> Workflow<C, E> {
    pub fn with_envelope(contract: C, envelope: E) -> Self {
        Self {
            contract,
            envelope,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn contract(&self) -> &C {
        &self.contract
    }

    pub async fn load_all(&self) -> Result<Vec<Prescription>, ClientError> {
        sync::load_all(&self.contract).await
    }

    async fn simulate_fhe(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    /// Create a pending prescription and make it discoverable.
    pub async fn submit(&self, doctor: &Address, draft: &Draft) -> Result<Prescription, ClientError> {
        if let Some(field) = draft.missing_field() {
            return Err(ClientError::MissingField(field));
        }

        self.simulate_fhe().await;

        let sealed = self
            .envelope
            .seal_json(&draft.payload())
            .map_err(|_| ClientError::Internal)?;

        let now = Utc::now();
        let mut rng = rand::rngs::OsRng;
        let id = new_record_id(&mut rng, now.timestamp_millis());

        let record = StoredRecord {
            data: sealed,
            timestamp: now.timestamp(),
            patient: draft.patient.clone(),
            doctor: doctor.clone(),
            medication: draft.medication.clone(),
            dosage: draft.dosage.clone(),
            status: Status::Pending,
            version: 1,
        };

        store::write_record(&self.contract, &id, &record).await?;
        store::append_to_index(&self.contract, &id).await?;

        info!(%id, doctor = %record.doctor, "prescription submitted");
        Ok(Prescription::from_stored(id, record))
    }

    /// pending -> verified, by the prescribing doctor.
    pub async fn verify(&self, caller: &Address, id: &str) -> Result<Prescription, ClientError> {
        self.transition(caller, id, Status::Verified, "verify", true).await
    }

    /// pending -> rejected, by the prescribing doctor.
    pub async fn reject(&self, caller: &Address, id: &str) -> Result<Prescription, ClientError> {
        self.transition(caller, id, Status::Rejected, "reject", true).await
    }

    /// verified -> dispensed. Any connected account may dispense.
    pub async fn dispense(&self, caller: &Address, id: &str) -> Result<Prescription, ClientError> {
        self.transition(caller, id, Status::Dispensed, "dispense", false).await
    }

    async fn transition(
        &self,
        caller: &Address,
        id: &str,
        next: Status,
        action: &'static str,
        doctor_only: bool,
    ) -> Result<Prescription, ClientError> {
        self.simulate_fhe().await;

        let Some(mut record) = store::read_record(&self.contract, id).await? else {
            return Err(ClientError::NotFound(id.to_string()));
        };

        if doctor_only && record.doctor != *caller {
            return Err(ClientError::NotPermitted { action });
        }

        if !record.status.can_become(next) {
            return Err(ClientError::InvalidTransition {
                from: record.status,
                to: next,
            });
        }

        record.status = next;
        record.version += 1;
        store::write_record(&self.contract, id, &record).await?;

        info!(%id, %caller, status = %next, "prescription status updated");
        Ok(Prescription::from_stored(id.to_string(), record))
    }
}

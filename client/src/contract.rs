//! Contract accessor boundary.
//!
//! The chain-side contract is a generic key-value store; everything the
//! client knows about it is the three calls below. Signing, mining and
//! storage all happen on the other side of this trait.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("contract unavailable")]
    Unavailable,

    #[error("transaction rejected: {0}")]
    Rejected(String),
}

pub trait ContractAccessor {
    async fn is_available(&self) -> Result<bool, ContractError>;

    /// Missing keys read back as empty bytes.
    async fn get_data(&self, key: &str) -> Result<Vec<u8>, ContractError>;

    async fn set_data(&self, key: &str, value: Vec<u8>) -> Result<(), ContractError>;
}

/// In-memory stand-in for the deployed contract, used by the demo binary
/// and tests. Writes are visible to later reads from any clone, matching
/// the real store's read-after-write consistency per caller.
#[derive(Clone)]
pub struct MemoryContract {
    inner: Arc<Mutex<MemoryInner>>,
}

struct MemoryInner {
    data: HashMap<String, Vec<u8>>,
    available: bool,
    fail_next_set: Option<ContractError>,
}

impl MemoryContract {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryInner {
                data: HashMap::new(),
                available: true,
                fail_next_set: None,
            })),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.inner.lock().unwrap().available = available;
    }

    /// Make the next `set_data` fail with `err`, once.
    pub fn fail_next_set(&self, err: ContractError) {
        self.inner.lock().unwrap().fail_next_set = Some(err);
    }

    /// Seed a key directly, bypassing availability and failure injection.
    pub fn insert_raw(&self, key: &str, value: Vec<u8>) {
        self.inner.lock().unwrap().data.insert(key.to_string(), value);
    }
}

impl Default for MemoryContract {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractAccessor for MemoryContract {
    async fn is_available(&self) -> Result<bool, ContractError> {
        Ok(self.inner.lock().unwrap().available)
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>, ContractError> {
        let inner = self.inner.lock().unwrap();
        if !inner.available {
            return Err(ContractError::Unavailable);
        }

        Ok(inner.data.get(key).cloned().unwrap_or_default())
    }

    async fn set_data(&self, key: &str, value: Vec<u8>) -> Result<(), ContractError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.available {
            return Err(ContractError::Unavailable);
        }

        if let Some(err) = inner.fail_next_set.take() {
            return Err(err);
        }

        inner.data.insert(key.to_string(), value);
        Ok(())
    }
}

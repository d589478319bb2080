//! Wallet provider boundary and the connected session.
//!
//! The provider hands out the account list and notifies on changes; the
//! session tracks which account is active. Transaction signing itself
//! happens behind the contract accessor.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::models::Address;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("wallet request rejected: {0}")]
    Rejected(String),
}

pub trait WalletProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Observe the provider's account list as it changes.
    fn subscribe(&self) -> watch::Receiver<Vec<Address>>;
}

/// A connected session. The first account the provider reports is active;
/// an empty list means connected-but-no-account.
pub struct Session {
    events: watch::Receiver<Vec<Address>>,
    active: Option<Address>,
}

impl Session {
    pub async fn connect<W: WalletProvider>(provider: &W) -> Result<Self, WalletError> {
        let accounts = provider.request_accounts().await?;
        let events = provider.subscribe();

        Ok(Self {
            events,
            active: accounts.into_iter().next(),
        })
    }

    pub fn account(&self) -> Option<&Address> {
        self.active.as_ref()
    }

    /// Wait for the provider to change accounts and adopt the new first one.
    /// Returns `None` if the new list is empty or the provider went away.
    pub async fn account_changed(&mut self) -> Option<Address> {
        if self.events.changed().await.is_err() {
            self.active = None;
            return None;
        }

        let accounts = self.events.borrow_and_update().clone();
        self.active = accounts.into_iter().next();
        self.active.clone()
    }

    pub fn disconnect(&mut self) {
        self.active = None;
    }
}

/// Test/demo provider with a switchable account list and a lock flag
/// standing in for the wallet UI refusing a request.
#[derive(Clone)]
pub struct MemoryWallet {
    accounts: Arc<watch::Sender<Vec<Address>>>,
    locked: Arc<AtomicBool>,
}

impl MemoryWallet {
    pub fn new(accounts: Vec<Address>) -> Self {
        let (tx, _rx) = watch::channel(accounts);
        Self {
            accounts: Arc::new(tx),
            locked: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_locked(&self, locked: bool) {
        self.locked.store(locked, Ordering::SeqCst);
    }

    /// Simulate the user switching accounts in the wallet UI.
    pub fn switch_to(&self, accounts: Vec<Address>) {
        let _ = self.accounts.send(accounts);
    }
}

impl WalletProvider for MemoryWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        if self.locked.load(Ordering::SeqCst) {
            return Err(WalletError::Rejected("wallet is locked".to_string()));
        }

        Ok(self.accounts.borrow().clone())
    }

    fn subscribe(&self) -> watch::Receiver<Vec<Address>> {
        self.accounts.subscribe()
    }
}

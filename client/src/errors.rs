use crate::contract::ContractError;
use crate::models::{AddressError, Status};
use crate::wallet::WalletError;
use thiserror::Error;

/// Top-level error surfaced to the caller of any engine operation.
///
/// Data corruption during a full sync is NOT represented here: the sync
/// engine skips and logs it. `Corrupt` appears only when a single targeted
/// record cannot be decoded.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("wallet not connected")]
    WalletNotConnected,

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("prescription not found: {0}")]
    NotFound(String),

    #[error("prescription {id} is corrupt: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("only the prescribing doctor may {action} this prescription")]
    NotPermitted { action: &'static str },

    #[error("cannot move a {from} prescription to {to}")]
    InvalidTransition { from: Status, to: Status },

    #[error("internal error")]
    Internal,
}

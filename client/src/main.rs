mod contract;
mod errors;
mod models;
mod state;
mod store;
mod sync;
mod wallet;
mod workflow;

use std::future::Future;
use std::time::Duration;

use crate::contract::{ContractAccessor, ContractError, MemoryContract};
use crate::errors::ClientError;
use crate::models::{Address, Draft};
use crate::state::{AppState, BannerKind, Filter};
use crate::wallet::{MemoryWallet, Session};
use crate::workflow::Workflow;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Walk the whole prescription lifecycle against the in-memory doubles:
/// connect, submit, verify, switch accounts, dispense, and the error paths
/// in between.
#[tokio::main]
async fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let delay_ms: u64 = std::env::var("FHE_DELAY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let doctor = Address::parse("0x6fd8ce1cbcc2078cb7d68d57405dc82f7c42e3c9")?;
    let pharmacist = Address::parse("0x91b4a9f7e5ac2f0a9d6a59ab6d8f8a3b8c2d1e0f")?;

    let contract = MemoryContract::new();
    let workflow = Workflow::new(contract.clone()).with_delay(Duration::from_millis(delay_ms));
    let app = AppState::new();

    // A leftover record from an older deployment that no longer parses. The
    // sync engine must skip it, not choke on it.
    contract.insert_raw(&store::record_key("1699999999999-legacy0"), b"{corrupt".to_vec());
    store::append_to_index(&contract, "1699999999999-legacy0").await?;

    // First connection attempt fails while the wallet is locked.
    let wallet = MemoryWallet::new(vec![doctor.clone()]);
    wallet.set_locked(true);
    if let Err(err) = Session::connect(&wallet).await {
        error!(%err, "failed to connect wallet");
    }
    wallet.set_locked(false);

    let mut session = Session::connect(&wallet).await?;
    app.set_account(session.account().cloned());
    let caller = session.account().cloned().ok_or(ClientError::WalletNotConnected)?;
    info!(account = caller.as_str(), "wallet connected");

    let first = run_step(
        &app,
        "Encrypting prescription data...",
        "Prescription encrypted and submitted",
        workflow.submit(
            &caller,
            &Draft {
                patient: "Jane Doe".to_string(),
                medication: "Amoxicillin 500mg".to_string(),
                dosage: "3x daily for 7 days".to_string(),
                instructions: "Take with food".to_string(),
            },
        ),
    )
    .await?;

    let second = run_step(
        &app,
        "Encrypting prescription data...",
        "Prescription encrypted and submitted",
        workflow.submit(
            &caller,
            &Draft {
                patient: "John Smith".to_string(),
                medication: "Ibuprofen 400mg".to_string(),
                dosage: "2x daily as needed".to_string(),
                instructions: String::new(),
            },
        ),
    )
    .await?;

    refresh(&app, &workflow).await?;

    run_step(
        &app,
        "Verifying encrypted prescription...",
        "Verification completed",
        workflow.verify(&caller, &first.id),
    )
    .await?;
    refresh(&app, &workflow).await?;

    // Store outage: the refresh fails, the cached list stays usable.
    workflow.contract().set_available(false);
    if let Err(err) = refresh(&app, &workflow).await {
        app.set_banner(BannerKind::Error, err.to_string());
        error!(%err, cached = app.counts().total, "refresh failed, keeping cached list");
    }
    workflow.contract().set_available(true);

    // The user switches to the pharmacy account in the wallet UI.
    wallet.switch_to(vec![pharmacist.clone()]);
    let caller = session
        .account_changed()
        .await
        .ok_or(ClientError::WalletNotConnected)?;
    app.set_account(Some(caller.clone()));
    info!(account = %caller, "active account changed");

    // Pharmacists cannot verify; only the prescribing doctor can.
    let _ = run_step(
        &app,
        "Verifying encrypted prescription...",
        "Verification completed",
        workflow.verify(&caller, &second.id),
    )
    .await;
    if let Some(banner) = app.banner() {
        info!(kind = ?banner.kind, message = %banner.message, "banner shown");
    }

    // The wallet user declines the first dispense transaction.
    workflow
        .contract()
        .fail_next_set(ContractError::Rejected("user rejected transaction".to_string()));
    let _ = run_step(
        &app,
        "Processing encrypted prescription...",
        "Medication dispensed",
        workflow.dispense(&caller, &first.id),
    )
    .await;

    run_step(
        &app,
        "Processing encrypted prescription...",
        "Medication dispensed",
        workflow.dispense(&caller, &first.id),
    )
    .await?;

    refresh(&app, &workflow).await?;
    app.clear_banner();

    let counts = app.counts();
    info!(
        total = counts.total,
        pending = counts.pending,
        verified = counts.verified,
        dispensed = counts.dispensed,
        rejected = counts.rejected,
        "final prescription counts"
    );

    for p in app.prescriptions() {
        let issued = chrono::DateTime::from_timestamp(p.timestamp, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        info!(id = %p.id, status = %p.status, %issued, sealed = %p.sealed, version = p.version, "record");
    }

    let janes = app.filtered(&Filter {
        search: "jane".to_string(),
        status: None,
    });
    info!(matches = janes.len(), search = "jane", "filtered query");

    session.disconnect();
    app.set_account(None);
    info!(account = ?app.account(), "wallet disconnected");

    Ok(())
}

async fn refresh<C: ContractAccessor>(
    app: &AppState,
    workflow: &Workflow<C>,
) -> Result<(), ClientError> {
    let list = workflow.load_all().await?;
    app.set_prescriptions(list);
    Ok(())
}

/// Bracket one workflow operation with the transaction banner, mirroring
/// what a front-end shows the user.
async fn run_step<T>(
    app: &AppState,
    pending: &str,
    success: &str,
    op: impl Future<Output = Result<T, ClientError>>,
) -> Result<T, ClientError> {
    app.set_banner(BannerKind::Pending, pending);
    info!("{pending}");

    match op.await {
        Ok(value) => {
            app.set_banner(BannerKind::Success, success);
            info!("{success}");
            Ok(value)
        }
        Err(err) => {
            app.set_banner(BannerKind::Error, err.to_string());
            error!(%err, "operation failed");
            Err(err)
        }
    }
}

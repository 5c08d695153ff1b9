// ── Controller ──
//
// The one handle front ends hold. Wraps the store client, converts wire
// records into domain sessions, and owns the warning channel that
// detached deletes report into.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use parkpro_api::{StoreClient, TlsMode, TransportConfig};

use crate::config::{StoreConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{ParkingSession, ParkingSlot, SessionId, Timestamp};
use crate::registration::NewSession;

const WARNING_CHANNEL_SIZE: usize = 32;

/// Message shown when a session was removed locally but the store refused.
pub const SYNC_FAILED_MESSAGE: &str = "Transaction removed locally, but server sync failed";

/// A background store write that failed after the UI already moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncWarning {
    pub session_id: SessionId,
    /// Operator-facing summary.
    pub message: String,
    /// Underlying error text.
    pub detail: String,
}

// ── Controller ───────────────────────────────────────────────────

/// Entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: StoreConfig,
    client: StoreClient,
    warning_tx: broadcast::Sender<SyncWarning>,
}

impl Controller {
    /// Build the HTTP client for `config`. No request is made.
    pub fn new(config: StoreConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = StoreClient::new(config.base_url.as_str(), &transport)?;
        let (warning_tx, _) = broadcast::channel(WARNING_CHANNEL_SIZE);

        debug!(base_url = %client.base_url(), "controller ready");
        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                client,
                warning_tx,
            }),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Subscribe to background sync failures.
    pub fn warnings(&self) -> broadcast::Receiver<SyncWarning> {
        self.inner.warning_tx.subscribe()
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Every session the store knows about.
    pub async fn list_sessions(&self) -> Result<Vec<ParkingSession>, CoreError> {
        let records = self.inner.client.list_transactions().await?;
        debug!(count = records.len(), "fetched sessions");
        Ok(records.into_iter().map(ParkingSession::from).collect())
    }

    /// The store's history view.
    pub async fn list_history(&self) -> Result<Vec<ParkingSession>, CoreError> {
        let records = self.inner.client.list_history().await?;
        debug!(count = records.len(), "fetched history");
        Ok(records.into_iter().map(ParkingSession::from).collect())
    }

    /// Slots held by open sessions. Codes that aren't on the grid are
    /// dropped.
    pub async fn occupied_slots(&self) -> Result<BTreeSet<ParkingSlot>, CoreError> {
        let raw = self.inner.client.occupied_slots().await?;
        let mut slots = BTreeSet::new();
        for code in raw {
            match code.parse::<ParkingSlot>() {
                Ok(slot) => {
                    slots.insert(slot);
                }
                Err(e) => warn!(error = %e, "ignoring occupied slot"),
            }
        }
        Ok(slots)
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Open a new session.
    pub async fn create_session(&self, new: &NewSession) -> Result<ParkingSession, CoreError> {
        let created = self
            .inner
            .client
            .create_transaction(&new.to_record())
            .await?;
        Ok(ParkingSession::from(created))
    }

    /// Close `session` at `exit`, sending every other field unchanged.
    pub async fn time_out(
        &self,
        session: &ParkingSession,
        exit: &Timestamp,
    ) -> Result<ParkingSession, CoreError> {
        let id = require_id(session)?;
        let body = session.with_exit_time(exit);
        let updated = self
            .inner
            .client
            .update_transaction(id.as_record_id(), &body)
            .await?;
        info!(%id, exit = exit.raw(), "session timed out");
        Ok(ParkingSession::from(updated))
    }

    /// Delete a session and wait for the store's answer.
    pub async fn delete_session(&self, id: &SessionId) -> Result<(), CoreError> {
        self.inner
            .client
            .delete_transaction(id.as_record_id())
            .await?;
        info!(%id, "session deleted");
        Ok(())
    }

    /// Delete a session in the background.
    ///
    /// A failure is logged and published on [`warnings`](Self::warnings);
    /// it never reaches the caller. The handle can be awaited by callers
    /// that must not exit before the request settles.
    pub fn delete_detached(&self, id: SessionId) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.delete_session(&id).await {
                warn!(%id, error = %e, "{SYNC_FAILED_MESSAGE}");
                // No subscribers is fine; the log line above still records it.
                let _ = this.inner.warning_tx.send(SyncWarning {
                    session_id: id,
                    message: SYNC_FAILED_MESSAGE.to_owned(),
                    detail: e.to_string(),
                });
            }
        })
    }
}

fn require_id(session: &ParkingSession) -> Result<&SessionId, CoreError> {
    session.id.as_ref().ok_or_else(|| CoreError::NotFound {
        identifier: format!("session for plate {} has no id", session.plate_number),
    })
}

fn build_transport(config: &StoreConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
    }
}

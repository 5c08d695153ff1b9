//! Data bridge: runs store requests off the UI loop and feeds the results
//! back in as [`Action`]s.
//!
//! Requests are fire-and-forget tasks. Nothing is cancelled when a screen
//! goes away; fetches carry the screen's [`Generation`] and the screen
//! drops any answer that is no longer current. Once the app has quit the
//! channel is closed and late answers vanish with the failed send.

use std::future::Future;

use chrono::NaiveDateTime;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use parkpro_core::{Controller, Generation, NewSession, ParkingSession, Timestamp};

use crate::action::Action;

/// Operator's wall clock.
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

fn spawn_send<F>(tx: &UnboundedSender<Action>, request: F)
where
    F: Future<Output = Action> + Send + 'static,
{
    let tx = tx.clone();
    tokio::spawn(async move {
        let action = request.await;
        if tx.send(action).is_err() {
            debug!("response arrived after shutdown; dropped");
        }
    });
}

// ── Fetches ─────────────────────────────────────────────────────────

pub fn load_slots(controller: &Controller, generation: Generation, tx: &UnboundedSender<Action>) {
    let controller = controller.clone();
    spawn_send(tx, async move {
        Action::SlotsLoaded {
            generation,
            result: controller.occupied_slots().await,
        }
    });
}

pub fn load_sessions(
    controller: &Controller,
    generation: Generation,
    tx: &UnboundedSender<Action>,
) {
    let controller = controller.clone();
    spawn_send(tx, async move {
        Action::SessionsLoaded {
            generation,
            result: controller.list_sessions().await,
        }
    });
}

pub fn load_history(
    controller: &Controller,
    generation: Generation,
    tx: &UnboundedSender<Action>,
) {
    let controller = controller.clone();
    spawn_send(tx, async move {
        Action::HistoryLoaded {
            generation,
            result: controller.list_history().await,
        }
    });
}

// ── Writes ──────────────────────────────────────────────────────────

pub fn register(controller: &Controller, new_session: NewSession, tx: &UnboundedSender<Action>) {
    let controller = controller.clone();
    spawn_send(tx, async move {
        Action::Registered(controller.create_session(&new_session).await)
    });
}

pub fn time_out(
    controller: &Controller,
    session: ParkingSession,
    exit: Timestamp,
    tx: &UnboundedSender<Action>,
) {
    let controller = controller.clone();
    spawn_send(tx, async move {
        Action::TimedOut(controller.time_out(&session, &exit).await)
    });
}

// ── Sync warnings ───────────────────────────────────────────────────

/// Forward background delete failures to the app until cancelled.
pub async fn forward_sync_warnings(
    controller: Controller,
    action_tx: UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut warnings = controller.warnings();

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            received = warnings.recv() => match received {
                Ok(warning) => {
                    if action_tx.send(Action::SyncFailed(warning)).is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "sync warnings dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    debug!("sync warning bridge shut down");
}

//! Event loop that owns the [`DashboardController`].
//!
//! Input-change events are queued on a bounded channel and handled one at a
//! time, so a recomputation always finishes before the next starts. Each
//! submitter receives its own output; the most recent output is also
//! published on a watch channel.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::controller::{DashboardController, DashboardOutput};
use crate::DashboardState;

const EVENT_BUFFER: usize = 32;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("dashboard session has shut down")]
    Closed,
}

#[derive(Debug)]
enum DashboardEvent {
    InputsChanged {
        id: Uuid,
        state: DashboardState,
        reply: oneshot::Sender<DashboardOutput>,
    },
}

/// Cloneable handle to a running session task.
#[derive(Debug, Clone)]
pub struct DashboardSession {
    events: mpsc::Sender<DashboardEvent>,
    latest: watch::Receiver<DashboardOutput>,
}

impl DashboardSession {
    /// Start the session task. It stops once every handle has been dropped.
    pub fn spawn(controller: DashboardController) -> (Self, JoinHandle<()>) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let (latest_tx, latest_rx) = watch::channel(DashboardOutput::idle());
        let handle = tokio::spawn(run(controller, events_rx, latest_tx));

        (
            Self {
                events: events_tx,
                latest: latest_rx,
            },
            handle,
        )
    }

    /// Queue a full input snapshot and wait for its recomputation.
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] if the session task is gone.
    pub async fn submit(&self, state: DashboardState) -> Result<DashboardOutput, SessionError> {
        let id = Uuid::new_v4();
        let (reply, response) = oneshot::channel();
        self.events
            .send(DashboardEvent::InputsChanged { id, state, reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)
    }

    /// The output of the most recently completed recomputation.
    pub fn latest(&self) -> DashboardOutput {
        self.latest.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardOutput> {
        self.latest.clone()
    }
}

async fn run(
    mut controller: DashboardController,
    mut events: mpsc::Receiver<DashboardEvent>,
    latest: watch::Sender<DashboardOutput>,
) {
    while let Some(event) = events.recv().await {
        match event {
            DashboardEvent::InputsChanged { id, state, reply } => {
                let span = tracing::debug_span!("inputs_changed", %id, symbol = %state.symbol);
                let output = controller.on_input_change(state).instrument(span).await;

                latest.send_replace(output.clone());
                if reply.send(output).is_err() {
                    tracing::debug!(%id, "submitter dropped before reply");
                }
            }
        }
    }
    tracing::debug!("dashboard session stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::SyntheticProvider;
    use crate::client::MarketDataClient;
    use crate::renderer::ChartRenderer;
    use crate::DateRange;
    use std::sync::Arc;

    fn session() -> (DashboardSession, JoinHandle<()>) {
        DashboardSession::spawn(DashboardController::new(
            MarketDataClient::new(Arc::new(SyntheticProvider::default())),
            ChartRenderer::default(),
        ))
    }

    #[tokio::test]
    async fn latest_starts_idle_and_tracks_submissions() {
        let (session, _handle) = session();
        assert_eq!(session.latest(), DashboardOutput::idle());

        let output = session
            .submit(DashboardState::new("AAPL", DateRange::default()))
            .await
            .expect("session running");
        assert_eq!(session.latest(), output);
        assert_eq!(output.table.len(), 8);
    }

    #[tokio::test]
    async fn aborted_session_reports_closed() {
        let (session, handle) = session();
        handle.abort();
        let _ = handle.await;

        let err = session
            .submit(DashboardState::default())
            .await
            .expect_err("session is gone");
        assert_eq!(err, SessionError::Closed);
    }
}

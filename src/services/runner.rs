//! Runs a [`GameController`] inside one tokio task.
//!
//! The task is the only owner of the controller; everyone else talks to it
//! through a cloneable [`ControllerHandle`].

use std::time::Duration;

use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info};

use crate::{services::controller::GameController, state::GameState};

const COMMAND_QUEUE: usize = 16;

/// The controller task is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("controller task stopped")]
pub struct ControllerStopped;

enum Command {
    CurrentState(oneshot::Sender<GameState>),
    HighScore(oneshot::Sender<u32>),
    ResetHighScore(oneshot::Sender<u32>),
    Shutdown,
}

/// Cloneable access to a running controller.
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<GameState>,
}

impl ControllerHandle {
    /// Active state, as seen by the controller task.
    pub async fn current_state(&self) -> Result<GameState, ControllerStopped> {
        self.request(Command::CurrentState).await
    }

    /// Current record.
    pub async fn high_score(&self) -> Result<u32, ControllerStopped> {
        self.request(Command::HighScore).await
    }

    /// Clear the record.
    pub async fn reset_high_score(&self) -> Result<u32, ControllerStopped> {
        self.request(Command::ResetHighScore).await
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<GameState> {
        self.state.clone()
    }

    /// Ask the task to stop after the current tick.
    pub async fn shutdown(&self) -> Result<(), ControllerStopped> {
        self.commands
            .send(Command::Shutdown)
            .await
            .map_err(|_| ControllerStopped)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ControllerStopped> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .await
            .map_err(|_| ControllerStopped)?;
        rx.await.map_err(|_| ControllerStopped)
    }
}

/// Move `controller` into a task ticking every `tick_interval`.
///
/// The controller should already be set up. The join handle yields it back
/// once the task stops.
pub fn spawn_controller(
    mut controller: GameController,
    tick_interval: Duration,
) -> (ControllerHandle, JoinHandle<GameController>) {
    let (command_tx, mut command_rx) = mpsc::channel(COMMAND_QUEUE);
    let (state_tx, state_rx) = watch::channel(controller.current_state());

    let task = tokio::spawn(async move {
        let mut ticker = interval(tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let tick_ms = u64::try_from(tick_interval.as_millis()).unwrap_or(u64::MAX);
        info!(tick_ms, "controller task started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    controller.tick();
                    let state = controller.current_state();
                    state_tx.send_if_modified(|current| {
                        if *current == state {
                            return false;
                        }
                        *current = state;
                        true
                    });
                }
                command = command_rx.recv() => match command {
                    Some(Command::CurrentState(reply)) => {
                        let _ = reply.send(controller.current_state());
                    }
                    Some(Command::HighScore(reply)) => {
                        let _ = reply.send(controller.high_score());
                    }
                    Some(Command::ResetHighScore(reply)) => {
                        let _ = reply.send(controller.reset_high_score());
                    }
                    Some(Command::Shutdown) | None => {
                        debug!("controller task received shutdown");
                        break;
                    }
                },
            }
        }

        info!(state = %controller.current_state(), "controller task stopped");
        controller
    });

    (
        ControllerHandle {
            commands: command_tx,
            state: state_rx,
        },
        task,
    )
}

use std::fmt;

use thiserror::Error;

use crate::input::ButtonId;

/// States the game can be in; exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    /// Waiting for a player; the attract loop runs on the display and lights.
    Idle,
    /// Ready/Set/Go sequence before the first round.
    Countdown,
    /// The device plays the sequence back.
    PlaybackSequence,
    /// The player reproduces the sequence.
    AwaitPlayerInput,
    /// A round was reproduced correctly.
    RoundWon,
    /// A wrong button or a timeout ended the game.
    RoundLost,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameState::Idle => "idle",
            GameState::Countdown => "countdown",
            GameState::PlaybackSequence => "playback_sequence",
            GameState::AwaitPlayerInput => "await_player_input",
            GameState::RoundWon => "round_won",
            GameState::RoundLost => "round_lost",
        };
        f.write_str(name)
    }
}

/// Events that can be applied to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Any button released while idle.
    StartRequested,
    /// Countdown script finished.
    CountdownFinished,
    /// The whole sequence was played back.
    PlaybackFinished,
    /// The sequence reached its maximum length; the game is won outright.
    SequenceExhausted,
    /// The last color of the sequence was reproduced.
    RoundCompleted,
    /// The player released a button that does not match the sequence.
    WrongButton(ButtonId),
    /// No release within the input timeout.
    InputTimedOut,
    /// Win or lose feedback finished.
    AcknowledgeElapsed,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The state the machine was in when the invalid event was received.
    pub from: GameState,
    /// The event that cannot be applied from this state.
    pub event: GameEvent,
}

/// An applied transition; the controller runs the exit and enter hooks for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State that was left.
    pub from: GameState,
    /// State that was entered.
    pub to: GameState,
    /// Event that caused the move.
    pub event: GameEvent,
    /// Version number after the transition.
    pub version: usize,
}

/// Snapshot of the current state machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Current state.
    pub state: GameState,
    /// Version number of the state machine (increments on each transition).
    pub version: usize,
}

/// State machine implementing the round flow.
#[derive(Debug, Clone)]
pub struct GameStateMachine {
    state: GameState,
    version: usize,
}

impl Default for GameStateMachine {
    fn default() -> Self {
        Self {
            state: GameState::Idle,
            version: 0,
        }
    }
}

impl GameStateMachine {
    /// Create a new state machine initialised in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current state.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Create a snapshot of the current state machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            version: self.version,
        }
    }

    /// Validate and apply `event`. A rejected event leaves the state untouched.
    pub fn apply(&mut self, event: GameEvent) -> Result<Transition, InvalidTransition> {
        let next = compute_transition(self.state, event)?;
        let transition = Transition {
            from: self.state,
            to: next,
            event,
            version: self.version + 1,
        };

        self.state = next;
        self.version = transition.version;
        Ok(transition)
    }
}

/// Compute the next state for `event` if the transition is valid.
pub fn compute_transition(
    state: GameState,
    event: GameEvent,
) -> Result<GameState, InvalidTransition> {
    let next = match (state, event) {
        (GameState::Idle, GameEvent::StartRequested) => GameState::Countdown,
        (GameState::Countdown, GameEvent::CountdownFinished) => GameState::PlaybackSequence,
        (GameState::PlaybackSequence, GameEvent::PlaybackFinished) => GameState::AwaitPlayerInput,
        (GameState::PlaybackSequence, GameEvent::SequenceExhausted) => GameState::Idle,
        (GameState::AwaitPlayerInput, GameEvent::RoundCompleted) => GameState::RoundWon,
        (GameState::AwaitPlayerInput, GameEvent::WrongButton(_)) => GameState::RoundLost,
        (GameState::AwaitPlayerInput, GameEvent::InputTimedOut) => GameState::RoundLost,
        (GameState::RoundWon, GameEvent::AcknowledgeElapsed) => GameState::PlaybackSequence,
        (GameState::RoundLost, GameEvent::AcknowledgeElapsed) => GameState::Idle,
        (from, event) => return Err(InvalidTransition { from, event }),
    };

    Ok(next)
}

//! Round flow: states and transitions, turn judgement, timers and feedback scripts.

pub mod attract;
pub mod script;
pub mod state_machine;
pub mod timeout;
pub mod turn;

pub use self::attract::AttractLoop;
pub use self::script::{PlaybackTimings, Script, ScriptPlayer};
pub use self::state_machine::{
    GameEvent, GameState, GameStateMachine, InvalidTransition, Snapshot, Transition,
};
pub use self::timeout::TimeoutSupervisor;
pub use self::turn::{TurnOutcome, judge};

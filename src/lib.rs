//! Library crate for the Simon memory game controller, exposing the game
//! components for the simulator binary and for board-specific firmware.

pub mod clock;
pub mod config;
pub mod dao;
pub mod error;
pub mod feedback;
pub mod input;
pub mod sequence;
pub mod services;
pub mod sim;
pub mod state;

pub use crate::services::controller::GameController;
pub use crate::state::GameState;

//! Host-side stand-ins for the board, used by the `simon-sim` binary.

mod board;
mod log_feedback;

pub use self::board::SimulatedBoard;
pub use self::log_feedback::LogFeedback;

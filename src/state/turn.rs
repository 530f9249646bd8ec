//! Judgement of one player release against the sequence.

use crate::{input::ButtonId, sequence::SequenceEngine};

/// Result of a release while the player is reproducing the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Correct color, more to come; the cursor moved on.
    Advance,
    /// Correct color at the last index.
    RoundComplete,
    /// Wrong color; the cursor is left where it was.
    Mistake {
        /// Color the sequence asked for.
        expected: Option<ButtonId>,
    },
}

/// Check `candidate` against the color under the cursor and move the cursor on a match.
pub fn judge(engine: &mut SequenceEngine, candidate: ButtonId) -> TurnOutcome {
    let index = engine.cursor();
    if !engine.verify(index, candidate) {
        return TurnOutcome::Mistake {
            expected: engine.colors().get(index).copied(),
        };
    }

    engine.advance_cursor();
    if engine.cursor() == engine.len() {
        TurnOutcome::RoundComplete
    } else {
        TurnOutcome::Advance
    }
}

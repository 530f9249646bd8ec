//! Growing color sequence the player has to reproduce.

use rand::{
    Rng, SeedableRng,
    distr::{Distribution, StandardUniform},
    rngs::StdRng,
};
use thiserror::Error;

use crate::input::ButtonId;

/// Longest sequence a game can reach before it counts as a total victory.
pub const DEFAULT_MAX_SEQUENCE_LENGTH: usize = 100;

impl Distribution<ButtonId> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ButtonId {
        ButtonId::ALL[rng.random_range(0..ButtonId::ALL.len())]
    }
}

/// Refusal to grow a sequence that already reached its maximum length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("sequence already holds the maximum of {max} colors")]
pub struct SequenceFull {
    /// Configured maximum length.
    pub max: usize,
}

/// Sequence generator and verifier, including the replay cursor.
#[derive(Debug)]
pub struct SequenceEngine {
    colors: Vec<ButtonId>,
    max_len: usize,
    cursor: usize,
    rng: StdRng,
}

impl SequenceEngine {
    /// Create an empty sequence bounded at `max_len`, seeded from `seed` or OS entropy.
    pub fn new(max_len: usize, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            colors: Vec::with_capacity(max_len),
            max_len,
            cursor: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Append one uniformly random color and rewind the cursor.
    pub fn extend(&mut self) -> Result<ButtonId, SequenceFull> {
        if self.is_full() {
            return Err(SequenceFull { max: self.max_len });
        }

        let color: ButtonId = self.rng.random();
        self.colors.push(color);
        self.cursor = 0;
        Ok(color)
    }

    /// Whether `candidate` matches the color at `index`.
    ///
    /// Callers must keep `index < len()`; an out-of-range index trips a debug
    /// assertion and otherwise counts as a mismatch.
    pub fn verify(&self, index: usize, candidate: ButtonId) -> bool {
        debug_assert!(
            index < self.colors.len(),
            "verify index {index} out of bounds for sequence of {}",
            self.colors.len()
        );
        self.colors.get(index).is_some_and(|color| *color == candidate)
    }

    /// Clear the sequence and the cursor.
    pub fn reset(&mut self) {
        self.colors.clear();
        self.cursor = 0;
    }

    /// Colors generated so far.
    pub fn colors(&self) -> &[ButtonId] {
        &self.colors
    }

    /// Number of colors in the sequence.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether no color has been generated yet.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Whether the sequence reached its maximum length.
    pub fn is_full(&self) -> bool {
        self.colors.len() >= self.max_len
    }

    /// Configured maximum length.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Index of the next color the player must reproduce.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor to the next color, never past the end.
    pub(crate) fn advance_cursor(&mut self) {
        self.cursor = (self.cursor + 1).min(self.colors.len());
    }

    /// Rewind the cursor to the first color.
    pub(crate) fn rewind_cursor(&mut self) {
        self.cursor = 0;
    }

    #[cfg(test)]
    pub(crate) fn with_colors(colors: &[ButtonId], max_len: usize) -> Self {
        let mut engine = Self::new(max_len, Some(0));
        engine.colors.extend_from_slice(colors);
        engine
    }
}

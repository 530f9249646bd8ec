//! Idle animation: alternating screens and a periodic rainbow.

use crate::feedback::{Feedback, Screen};

/// Timers of the idle attract loop.
#[derive(Debug, Clone)]
pub struct AttractLoop {
    screen_period_ms: u64,
    rainbow_period_ms: u64,
    next_screen_ms: u64,
    next_rainbow_ms: u64,
    show_score_next: bool,
}

impl AttractLoop {
    /// Build a loop with the given periods; call [`restart`](Self::restart) before polling.
    pub fn new(screen_period_ms: u64, rainbow_period_ms: u64) -> Self {
        Self {
            screen_period_ms,
            rainbow_period_ms,
            next_screen_ms: 0,
            next_rainbow_ms: rainbow_period_ms,
            show_score_next: false,
        }
    }

    /// Start over with the invitation screen due immediately.
    pub fn restart(&mut self, now_ms: u64) {
        self.next_screen_ms = now_ms;
        self.next_rainbow_ms = now_ms + self.rainbow_period_ms;
        self.show_score_next = false;
    }

    /// Feedback due at `now_ms`.
    pub fn poll(&mut self, now_ms: u64, high_score: u32) -> Vec<Feedback> {
        let mut due = Vec::new();

        if now_ms >= self.next_screen_ms {
            let screen = if self.show_score_next {
                Screen::HighScore(high_score)
            } else {
                Screen::PressToStart
            };
            due.push(Feedback::Screen(screen));
            self.show_score_next = !self.show_score_next;
            self.next_screen_ms = now_ms + self.screen_period_ms;
        }

        if now_ms >= self.next_rainbow_ms {
            due.push(Feedback::Rainbow { cycles: 1 });
            due.push(Feedback::ClearLights);
            self.next_rainbow_ms = now_ms + self.rainbow_period_ms;
        }

        due
    }
}

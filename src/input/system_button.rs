//! Reset button next to the game buttons.
//!
//! A short press asks for a device restart; holding it past the long-press
//! threshold asks for a high score reset instead.

use crate::error::PeripheralError;

/// Raw access to the reset button pin.
pub trait ResetPin: Send {
    /// Configure the pin.
    fn init(&mut self) -> Result<(), PeripheralError> {
        Ok(())
    }

    /// Whether the button is held; `None` when the read failed.
    fn is_pressed(&mut self) -> Option<bool>;
}

/// Request raised by the reset button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemCommand {
    /// Released before the long-press threshold.
    Restart,
    /// Held for the long-press threshold; raised once per hold.
    ResetHighScore,
}

/// Debounced short/long press detector.
pub struct SystemButton {
    pin: Box<dyn ResetPin>,
    debounce_ms: u64,
    long_press_ms: u64,
    raw: bool,
    raw_since_ms: u64,
    held_since_ms: Option<u64>,
    long_press_fired: bool,
}

impl SystemButton {
    /// Build a detector reading from `pin`.
    pub fn new(pin: Box<dyn ResetPin>, debounce_ms: u64, long_press_ms: u64) -> Self {
        Self {
            pin,
            debounce_ms,
            long_press_ms,
            raw: false,
            raw_since_ms: 0,
            held_since_ms: None,
            long_press_fired: false,
        }
    }

    /// Configure the pin.
    pub fn init(&mut self) -> Result<(), PeripheralError> {
        self.pin.init()
    }

    /// Sample the pin and report a command when one completes.
    pub fn poll(&mut self, now_ms: u64) -> Option<SystemCommand> {
        let raw = self.pin.is_pressed().unwrap_or(false);
        self.update(raw, now_ms)
    }

    fn update(&mut self, raw: bool, now_ms: u64) -> Option<SystemCommand> {
        if raw != self.raw {
            self.raw = raw;
            self.raw_since_ms = now_ms;
        }
        if now_ms.saturating_sub(self.raw_since_ms) < self.debounce_ms {
            return None;
        }

        match (raw, self.held_since_ms) {
            (true, None) => {
                self.held_since_ms = Some(now_ms);
                self.long_press_fired = false;
                None
            }
            (true, Some(since)) => {
                if !self.long_press_fired && now_ms.saturating_sub(since) >= self.long_press_ms {
                    self.long_press_fired = true;
                    return Some(SystemCommand::ResetHighScore);
                }
                None
            }
            (false, Some(_)) => {
                self.held_since_ms = None;
                if self.long_press_fired {
                    None
                } else {
                    Some(SystemCommand::Restart)
                }
            }
            (false, None) => None,
        }
    }
}

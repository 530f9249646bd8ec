//! Debounced button input for the four colored buttons.
//!
//! Raw hardware is read through an [`InputSource`]; two strategies exist because
//! the target boards differ:
//!
//! - [`digital::DigitalInput`] samples one pin per button with per-button timers.
//! - [`analog::AnalogInput`] classifies a single resistor-ladder pin into four bands.
//!
//! [`DebouncedInput`] wraps either strategy and adds the pause switch used while
//! the controller plays feedback scripts.

pub mod analog;
pub mod button;
pub mod digital;
pub mod system_button;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::PeripheralError;

pub use self::button::{AnalogRange, Button, InputMapping};

/// Logical identity of a game button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonId {
    /// Red button.
    Red,
    /// Green button.
    Green,
    /// Blue button.
    Blue,
    /// Yellow button.
    Yellow,
}

impl ButtonId {
    /// Every button, in declaration order.
    pub const ALL: [ButtonId; 4] = [
        ButtonId::Red,
        ButtonId::Green,
        ButtonId::Blue,
        ButtonId::Yellow,
    ];

    /// Lowercase name used in logs and config files.
    pub fn name(self) -> &'static str {
        match self {
            ButtonId::Red => "red",
            ButtonId::Green => "green",
            ButtonId::Blue => "blue",
            ButtonId::Yellow => "yellow",
        }
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Debounced edge produced by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// A button became the pressed button.
    Pressed(ButtonId),
    /// The pressed button was let go.
    Released(ButtonId),
}

impl ButtonEvent {
    /// Button the edge belongs to.
    pub fn button(self) -> ButtonId {
        match self {
            ButtonEvent::Pressed(id) | ButtonEvent::Released(id) => id,
        }
    }
}

/// Rejected priority list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("button priority must list every color exactly once, got {0:?}")]
pub struct InvalidPriority(pub Vec<ButtonId>);

/// Order used to pick a winner when several buttons qualify in the same sample.
///
/// The first entry wins. The default, blue > yellow > green > red, matches the
/// layout of the resistor ladder on the reference boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonPriority([ButtonId; 4]);

impl ButtonPriority {
    /// Validate that `order` is a permutation of the four buttons.
    pub fn new(order: &[ButtonId]) -> Result<Self, InvalidPriority> {
        let invalid = || InvalidPriority(order.to_vec());
        let array: [ButtonId; 4] = order.try_into().map_err(|_| invalid())?;
        if ButtonId::ALL.iter().any(|id| !array.contains(id)) {
            return Err(invalid());
        }
        Ok(Self(array))
    }

    /// Buttons from highest to lowest priority.
    pub fn order(&self) -> &[ButtonId; 4] {
        &self.0
    }

    /// Rank of `id`; lower wins.
    pub fn rank(&self, id: ButtonId) -> usize {
        self.0
            .iter()
            .position(|candidate| *candidate == id)
            .unwrap_or(usize::MAX)
    }

    /// Highest priority button among `candidates`.
    pub fn pick(&self, candidates: impl IntoIterator<Item = ButtonId>) -> Option<ButtonId> {
        candidates.into_iter().min_by_key(|id| self.rank(*id))
    }
}

impl Default for ButtonPriority {
    fn default() -> Self {
        Self([
            ButtonId::Blue,
            ButtonId::Yellow,
            ButtonId::Green,
            ButtonId::Red,
        ])
    }
}

/// A read strategy turning raw samples into debounced edges.
pub trait InputSource: Send {
    /// Configure the underlying pins.
    fn init(&mut self) -> Result<(), PeripheralError> {
        Ok(())
    }

    /// Sample the hardware once and return at most one accepted edge.
    fn poll(&mut self, now_ms: u64) -> Option<ButtonEvent>;

    /// Read-only view of the four buttons.
    fn buttons(&self) -> &[Button];

    /// Forget pressed and tapped state without emitting events.
    fn clear(&mut self);

    /// Require every button to be seen released before it can press again.
    fn latch(&mut self);
}

/// Input front-end owned by the controller.
pub struct DebouncedInput {
    source: Box<dyn InputSource>,
    paused: bool,
}

impl DebouncedInput {
    /// Wrap a read strategy.
    pub fn new(source: Box<dyn InputSource>) -> Self {
        Self {
            source,
            paused: false,
        }
    }

    /// Initialise the underlying pins.
    pub fn init(&mut self) -> Result<(), PeripheralError> {
        self.source.init()
    }

    /// Sample the buttons unless paused.
    pub fn poll(&mut self, now_ms: u64) -> Option<ButtonEvent> {
        if self.paused {
            return None;
        }

        let event = self.source.poll(now_ms)?;
        debug!(event = ?event, now_ms, "button edge accepted");
        Some(event)
    }

    /// Button currently held, if any.
    pub fn pressed(&self) -> Option<ButtonId> {
        self.source
            .buttons()
            .iter()
            .find(|button| button.is_pressed())
            .map(Button::id)
    }

    /// Button that completed the last press/release cycle, if any.
    pub fn tapped(&self) -> Option<ButtonId> {
        self.source
            .buttons()
            .iter()
            .find(|button| button.is_tapped())
            .map(Button::id)
    }

    /// Read-only view of the buttons.
    pub fn buttons(&self) -> &[Button] {
        self.source.buttons()
    }

    /// Stop sampling and drop the current pressed/tapped state.
    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.source.clear();
    }

    /// Resume sampling; buttons held during the pause stay ignored until released.
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        self.source.latch();
    }

    /// Whether sampling is suspended.
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

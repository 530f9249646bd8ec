//! One digital pin per button, each with its own debounce timer.

use serde::{Deserialize, Serialize};

use crate::error::PeripheralError;

use super::{
    Button, ButtonEvent, ButtonId, ButtonPriority, InputMapping, InputSource,
    button::{accept_press, accept_release},
};

/// Raw access to the button pins.
pub trait DigitalPins: Send {
    /// Configure pin modes and pulls.
    fn init(&mut self) -> Result<(), PeripheralError> {
        Ok(())
    }

    /// Whether the button on `pin` is electrically active; `None` when the read failed.
    fn sample(&mut self, pin: u8) -> Option<bool>;
}

/// Pin number assigned to each button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinMap {
    /// Red button pin.
    pub red: u8,
    /// Green button pin.
    pub green: u8,
    /// Blue button pin.
    pub blue: u8,
    /// Yellow button pin.
    pub yellow: u8,
}

impl PinMap {
    /// Pin wired to `id`.
    pub fn pin(&self, id: ButtonId) -> u8 {
        match id {
            ButtonId::Red => self.red,
            ButtonId::Green => self.green,
            ButtonId::Blue => self.blue,
            ButtonId::Yellow => self.yellow,
        }
    }
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            red: 2,
            green: 3,
            blue: 4,
            yellow: 5,
        }
    }
}

/// Digital-pin read strategy.
pub struct DigitalInput<P> {
    pins: P,
    buttons: [Button; 4],
    priority: ButtonPriority,
    debounce_ms: u64,
}

impl<P: DigitalPins> DigitalInput<P> {
    /// Build the strategy from a pin driver and wiring.
    pub fn new(pins: P, map: PinMap, priority: ButtonPriority, debounce_ms: u64) -> Self {
        let buttons = ButtonId::ALL.map(|id| Button::new(id, InputMapping::Pin(map.pin(id))));
        Self {
            pins,
            buttons,
            priority,
            debounce_ms,
        }
    }

    fn sample_all(&mut self, now_ms: u64) {
        for button in self.buttons.iter_mut() {
            let InputMapping::Pin(pin) = button.mapping() else {
                continue;
            };
            let raw = self.pins.sample(pin).unwrap_or(false);
            button.observe(raw, now_ms);
            button.release_latch(now_ms, self.debounce_ms);
        }
    }
}

impl<P: DigitalPins> InputSource for DigitalInput<P> {
    fn init(&mut self) -> Result<(), PeripheralError> {
        self.pins.init()
    }

    fn poll(&mut self, now_ms: u64) -> Option<ButtonEvent> {
        self.sample_all(now_ms);

        if let Some(held) = self.buttons.iter().find(|button| button.is_pressed()) {
            // Only the pressed button can produce the next edge.
            if held.last_raw() || !held.raw_stable_for(now_ms, self.debounce_ms) {
                return None;
            }
            let id = held.id();
            accept_release(&mut self.buttons, id, now_ms);
            return Some(ButtonEvent::Released(id));
        }

        let debounce_ms = self.debounce_ms;
        let winner = self.priority.pick(
            self.buttons
                .iter()
                .filter(|button| {
                    button.last_raw()
                        && !button.is_latched()
                        && button.raw_stable_for(now_ms, debounce_ms)
                })
                .map(Button::id),
        )?;

        accept_press(&mut self.buttons, winner, now_ms);
        Some(ButtonEvent::Pressed(winner))
    }

    fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    fn clear(&mut self) {
        self.buttons.iter_mut().for_each(Button::clear);
    }

    fn latch(&mut self) {
        self.buttons.iter_mut().for_each(Button::latch);
    }
}

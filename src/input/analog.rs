//! All four buttons on one resistor-ladder analog pin.
//!
//! Each button pulls the pin into its own [`AnalogRange`]. A reading is only
//! trusted after it classified the same way for `min_readings` consecutive
//! samples spanning at least the debounce window, and no transition is accepted
//! within the debounce window of the previous one.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::PeripheralError;

use super::{
    AnalogRange, Button, ButtonEvent, ButtonId, ButtonPriority, InputMapping, InputSource,
    button::{accept_press, accept_release},
};

/// Raw access to the shared analog pin.
pub trait AnalogPin: Send {
    /// Configure the ADC channel.
    fn init(&mut self) -> Result<(), PeripheralError> {
        Ok(())
    }

    /// Current raw value; `None` when the conversion failed.
    fn read(&mut self) -> Option<u16>;
}

/// Raw value band assigned to each button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeMap {
    /// Red button band.
    pub red: AnalogRange,
    /// Green button band.
    pub green: AnalogRange,
    /// Blue button band.
    pub blue: AnalogRange,
    /// Yellow button band.
    pub yellow: AnalogRange,
}

impl RangeMap {
    /// Band wired to `id`.
    pub fn range(&self, id: ButtonId) -> AnalogRange {
        match id {
            ButtonId::Red => self.red,
            ButtonId::Green => self.green,
            ButtonId::Blue => self.blue,
            ButtonId::Yellow => self.yellow,
        }
    }

    /// Pairs of buttons whose bands overlap.
    pub fn overlaps(&self) -> Vec<(ButtonId, ButtonId)> {
        let mut pairs = Vec::new();
        for (index, first) in ButtonId::ALL.iter().enumerate() {
            for second in &ButtonId::ALL[index + 1..] {
                if self.range(*first).overlaps(&self.range(*second)) {
                    pairs.push((*first, *second));
                }
            }
        }
        pairs
    }

    fn floor(&self) -> u16 {
        ButtonId::ALL
            .iter()
            .map(|id| self.range(*id).min)
            .min()
            .unwrap_or(0)
    }
}

impl Default for RangeMap {
    /// Calibration of the Arduino Nano ESP32 board.
    fn default() -> Self {
        Self {
            yellow: AnalogRange {
                min: 2000,
                max: 2250,
            },
            blue: AnalogRange {
                min: 2330,
                max: 2530,
            },
            green: AnalogRange {
                min: 2730,
                max: 2930,
            },
            red: AnalogRange {
                min: 3000,
                max: 3500,
            },
        }
    }
}

/// Classification of one analog sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LadderReading {
    /// Below every band (or unreadable): nothing held.
    Released,
    /// Inside the band of a button.
    Button(ButtonId),
    /// Between or above the bands; ignored.
    Unknown,
}

/// Analog-ladder read strategy.
pub struct AnalogInput<A> {
    pin: A,
    buttons: [Button; 4],
    priority: ButtonPriority,
    debounce_ms: u64,
    min_readings: u32,
    floor: u16,
    candidate: Option<LadderReading>,
    stable_count: u32,
    candidate_since_ms: u64,
    last_transition_ms: Option<u64>,
    latched: bool,
}

impl<A: AnalogPin> AnalogInput<A> {
    /// Build the strategy from a pin driver and calibration.
    pub fn new(
        pin: A,
        ranges: RangeMap,
        priority: ButtonPriority,
        debounce_ms: u64,
        min_readings: u32,
    ) -> Self {
        for (first, second) in ranges.overlaps() {
            warn!(
                %first, %second,
                "analog ranges overlap; priority order decides between them"
            );
        }

        let buttons =
            ButtonId::ALL.map(|id| Button::new(id, InputMapping::Range(ranges.range(id))));
        Self {
            pin,
            buttons,
            priority,
            debounce_ms,
            min_readings: min_readings.max(1),
            floor: ranges.floor(),
            candidate: None,
            stable_count: 0,
            candidate_since_ms: 0,
            last_transition_ms: None,
            latched: false,
        }
    }

    /// Classify a raw value against the configured bands.
    pub fn classify(&self, value: Option<u16>) -> LadderReading {
        let Some(value) = value else {
            return LadderReading::Released;
        };
        if value < self.floor {
            return LadderReading::Released;
        }

        let matching = self.buttons.iter().filter_map(|button| match button.mapping() {
            InputMapping::Range(range) if range.contains(value) => Some(button.id()),
            _ => None,
        });
        self.priority
            .pick(matching)
            .map(LadderReading::Button)
            .unwrap_or(LadderReading::Unknown)
    }

    fn in_global_debounce(&self, now_ms: u64) -> bool {
        self.last_transition_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < self.debounce_ms)
    }

    fn track(&mut self, reading: LadderReading, now_ms: u64) {
        if self.candidate == Some(reading) {
            self.stable_count = self.stable_count.saturating_add(1);
        } else {
            self.candidate = Some(reading);
            self.stable_count = 1;
            self.candidate_since_ms = now_ms;
        }
    }

    fn candidate_is_stable(&self, now_ms: u64) -> bool {
        self.stable_count >= self.min_readings
            && now_ms.saturating_sub(self.candidate_since_ms) >= self.debounce_ms
    }

    fn pressed(&self) -> Option<ButtonId> {
        self.buttons
            .iter()
            .find(|button| button.is_pressed())
            .map(Button::id)
    }
}

impl<A: AnalogPin> InputSource for AnalogInput<A> {
    fn init(&mut self) -> Result<(), PeripheralError> {
        self.pin.init()
    }

    fn poll(&mut self, now_ms: u64) -> Option<ButtonEvent> {
        if self.in_global_debounce(now_ms) {
            return None;
        }

        let raw = self.pin.read();
        let reading = self.classify(raw);
        for button in self.buttons.iter_mut() {
            let active = reading == LadderReading::Button(button.id());
            button.observe(active, now_ms);
        }

        if reading == LadderReading::Unknown {
            self.candidate = None;
            self.stable_count = 0;
            return None;
        }

        self.track(reading, now_ms);
        if !self.candidate_is_stable(now_ms) {
            return None;
        }
        if reading == LadderReading::Released {
            self.latched = false;
        }

        match (reading, self.pressed()) {
            (LadderReading::Released, Some(held)) => {
                accept_release(&mut self.buttons, held, now_ms);
                self.last_transition_ms = Some(now_ms);
                Some(ButtonEvent::Released(held))
            }
            (LadderReading::Button(id), None) if !self.latched => {
                accept_press(&mut self.buttons, id, now_ms);
                self.last_transition_ms = Some(now_ms);
                Some(ButtonEvent::Pressed(id))
            }
            _ => None,
        }
    }

    fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    fn clear(&mut self) {
        self.buttons.iter_mut().for_each(Button::clear);
        self.candidate = None;
        self.stable_count = 0;
    }

    fn latch(&mut self) {
        self.latched = true;
    }
}

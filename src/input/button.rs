//! Per-button debounce bookkeeping shared by both read strategies.

use serde::{Deserialize, Serialize};

use super::ButtonId;

/// Inclusive band of raw analog values that identifies one button on a resistor ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalogRange {
    /// Lowest raw value still attributed to the button.
    pub min: u16,
    /// Highest raw value still attributed to the button.
    pub max: u16,
}

impl AnalogRange {
    /// Build a range, returning `None` when `min > max`.
    pub const fn new(min: u16, max: u16) -> Option<Self> {
        if min > max {
            return None;
        }
        Some(Self { min, max })
    }

    /// Whether `value` falls inside the band.
    pub fn contains(&self, value: u16) -> bool {
        self.min <= value && value <= self.max
    }

    /// Whether two bands share at least one value.
    pub fn overlaps(&self, other: &AnalogRange) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

/// How a button is wired to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMapping {
    /// Dedicated digital pin.
    Pin(u8),
    /// Band on the shared analog pin.
    Range(AnalogRange),
}

/// Debounced state of one physical button.
#[derive(Debug, Clone)]
pub struct Button {
    id: ButtonId,
    mapping: InputMapping,
    pressed: bool,
    tapped: bool,
    latched: bool,
    raw_active: bool,
    raw_since_ms: u64,
    last_transition_ms: Option<u64>,
}

impl Button {
    /// Create a released button.
    pub fn new(id: ButtonId, mapping: InputMapping) -> Self {
        Self {
            id,
            mapping,
            pressed: false,
            tapped: false,
            latched: false,
            raw_active: false,
            raw_since_ms: 0,
            last_transition_ms: None,
        }
    }

    /// Logical color of the button.
    pub fn id(&self) -> ButtonId {
        self.id
    }

    /// Wiring of the button.
    pub fn mapping(&self) -> InputMapping {
        self.mapping
    }

    /// Whether the button is currently held (debounced).
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Whether the button was the last one to complete a press/release cycle.
    pub fn is_tapped(&self) -> bool {
        self.tapped
    }

    /// Whether the button must be seen released before it may press again.
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Last raw level observed for this button.
    pub fn last_raw(&self) -> bool {
        self.raw_active
    }

    /// Timestamp of the last accepted press or release.
    pub fn last_transition_ms(&self) -> Option<u64> {
        self.last_transition_ms
    }

    /// Record a raw sample, restarting the stability timer when the level changes.
    pub(crate) fn observe(&mut self, raw_active: bool, now_ms: u64) {
        if raw_active != self.raw_active {
            self.raw_active = raw_active;
            self.raw_since_ms = now_ms;
        }
    }

    /// Whether the raw level has held for at least `window_ms`.
    pub(crate) fn raw_stable_for(&self, now_ms: u64, window_ms: u64) -> bool {
        now_ms.saturating_sub(self.raw_since_ms) >= window_ms
    }

    pub(crate) fn set_pressed(&mut self, value: bool, now_ms: u64) {
        if self.pressed == value {
            return;
        }
        self.pressed = value;
        self.last_transition_ms = Some(now_ms);
        if value {
            self.tapped = false;
        }
    }

    pub(crate) fn set_tapped(&mut self, value: bool) {
        self.tapped = value;
    }

    pub(crate) fn latch(&mut self) {
        self.latched = true;
    }

    /// Drop the latch once the button has been stably released for `window_ms`.
    pub(crate) fn release_latch(&mut self, now_ms: u64, window_ms: u64) {
        if self.latched && !self.raw_active && self.raw_stable_for(now_ms, window_ms) {
            self.latched = false;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.pressed = false;
        self.tapped = false;
    }
}

/// Mark `id` pressed and drop any previous tap.
pub(crate) fn accept_press(buttons: &mut [Button], id: ButtonId, now_ms: u64) {
    for button in buttons.iter_mut() {
        if button.id == id {
            button.set_pressed(true, now_ms);
        } else {
            button.set_tapped(false);
        }
    }
}

/// Mark `id` released and tapped.
pub(crate) fn accept_release(buttons: &mut [Button], id: ButtonId, now_ms: u64) {
    for button in buttons.iter_mut().filter(|button| button.id == id) {
        button.set_pressed(false, now_ms);
        button.set_tapped(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressing_clears_tap() {
        let mut button = Button::new(ButtonId::Red, InputMapping::Pin(1));
        button.set_pressed(true, 10);
        button.set_pressed(false, 20);
        button.set_tapped(true);
        assert!(button.is_tapped());

        button.set_pressed(true, 30);
        assert!(button.is_pressed());
        assert!(!button.is_tapped());
        assert_eq!(button.last_transition_ms(), Some(30));
    }

    #[test]
    fn raw_change_restarts_stability_window() {
        let mut button = Button::new(ButtonId::Blue, InputMapping::Pin(2));
        button.observe(true, 100);
        assert!(!button.raw_stable_for(120, 50));
        button.observe(true, 140);
        assert!(button.raw_stable_for(150, 50));
        button.observe(false, 151);
        assert!(!button.raw_stable_for(160, 50));
    }

    #[test]
    fn latch_survives_a_short_low_blip() {
        let mut button = Button::new(ButtonId::Green, InputMapping::Pin(3));
        button.observe(true, 0);
        button.latch();

        button.observe(false, 200);
        button.release_latch(205, 50);
        assert!(button.is_latched());
        button.observe(true, 205);
        button.release_latch(300, 50);
        assert!(button.is_latched());

        button.observe(false, 400);
        button.release_latch(449, 50);
        assert!(button.is_latched());
        button.release_latch(450, 50);
        assert!(!button.is_latched());
    }

    #[test]
    fn range_overlap_is_inclusive() {
        let low = AnalogRange::new(100, 200).unwrap();
        let touching = AnalogRange::new(200, 300).unwrap();
        let apart = AnalogRange::new(201, 300).unwrap();
        assert!(low.overlaps(&touching));
        assert!(!low.overlaps(&apart));
        assert!(AnalogRange::new(5, 4).is_none());
    }
}

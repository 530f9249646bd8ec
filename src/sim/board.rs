use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    config::{GameConfig, InputWiring},
    input::{
        ButtonId, InputSource,
        analog::{AnalogInput, AnalogPin, RangeMap},
        digital::{DigitalInput, DigitalPins, PinMap},
        system_button::ResetPin,
    },
};

#[derive(Debug, Default)]
struct Levels {
    held: Option<ButtonId>,
    reset: bool,
}

/// Software stand-in for the button wiring.
///
/// Clones share the same pin levels, so one clone can be handed to the input
/// layer while another is driven from the command line.
#[derive(Debug, Clone)]
pub struct SimulatedBoard {
    levels: Arc<Mutex<Levels>>,
    wiring: InputWiring,
}

impl SimulatedBoard {
    /// Board wired as described by `wiring`.
    pub fn new(wiring: InputWiring) -> Self {
        Self {
            levels: Arc::default(),
            wiring,
        }
    }

    /// Hold `id` down, letting go of any other button.
    pub fn press(&self, id: ButtonId) {
        self.levels().held = Some(id);
    }

    /// Let go of every game button.
    pub fn release(&self) {
        self.levels().held = None;
    }

    /// Drive the reset button.
    pub fn set_reset(&self, pressed: bool) {
        self.levels().reset = pressed;
    }

    /// Build the read strategy matching the configured wiring.
    pub fn input_source(&self, config: &GameConfig) -> Box<dyn InputSource> {
        match config.input {
            InputWiring::Digital { pins } => Box::new(DigitalInput::new(
                self.clone(),
                pins,
                config.priority,
                config.debounce_ms,
            )),
            InputWiring::Analog { ranges } => Box::new(AnalogInput::new(
                self.clone(),
                ranges,
                config.priority,
                config.debounce_ms,
                config.min_stable_readings,
            )),
        }
    }

    fn levels(&self) -> MutexGuard<'_, Levels> {
        self.levels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn pins(&self) -> PinMap {
        match self.wiring {
            InputWiring::Digital { pins } => pins,
            InputWiring::Analog { .. } => PinMap::default(),
        }
    }

    fn ranges(&self) -> RangeMap {
        match self.wiring {
            InputWiring::Analog { ranges } => ranges,
            InputWiring::Digital { .. } => RangeMap::default(),
        }
    }
}

impl DigitalPins for SimulatedBoard {
    fn sample(&mut self, pin: u8) -> Option<bool> {
        let pins = self.pins();
        let held = self.levels().held;
        Some(held.is_some_and(|id| pins.pin(id) == pin))
    }
}

impl AnalogPin for SimulatedBoard {
    fn read(&mut self) -> Option<u16> {
        let value = match self.levels().held {
            Some(id) => {
                let range = self.ranges().range(id);
                range.min + (range.max - range.min) / 2
            }
            None => 0,
        };
        Some(value)
    }
}

impl ResetPin for SimulatedBoard {
    fn is_pressed(&mut self) -> Option<bool> {
        Some(self.levels().reset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analog_level_sits_inside_the_band() {
        let mut board = SimulatedBoard::new(InputWiring::default());
        assert_eq!(board.read(), Some(0));
        board.press(ButtonId::Green);
        let value = board.read().unwrap();
        assert!(RangeMap::default().green.contains(value));
    }

    #[test]
    fn digital_level_follows_the_pin_map() {
        let pins = PinMap::default();
        let mut board = SimulatedBoard::new(InputWiring::Digital { pins });
        let driver = board.clone();
        driver.press(ButtonId::Yellow);
        assert_eq!(board.sample(pins.yellow), Some(true));
        assert_eq!(board.sample(pins.red), Some(false));
        driver.release();
        assert_eq!(board.sample(pins.yellow), Some(false));
    }
}

//! Game configuration loading: timings, input wiring and persistence location.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::{Validate, ValidationError};

use crate::{
    error::ConfigError,
    input::{ButtonId, ButtonPriority, analog::RangeMap, digital::PinMap},
    sequence::DEFAULT_MAX_SEQUENCE_LENGTH,
    state::{PlaybackTimings, timeout::DEFAULT_INPUT_TIMEOUT_MS},
};

/// Default location on disk where the game looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/simon.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SIMON_CONFIG_PATH";
const DEFAULT_SCORE_PATH: &str = "data/scores.json";

/// How the four buttons are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InputWiring {
    /// One digital pin per button.
    Digital {
        /// Pin assignment.
        #[serde(default)]
        pins: PinMap,
    },
    /// All buttons on one resistor ladder.
    Analog {
        /// Value band per button.
        #[serde(default)]
        ranges: RangeMap,
    },
}

impl Default for InputWiring {
    fn default() -> Self {
        InputWiring::Analog {
            ranges: RangeMap::default(),
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration of one game device.
pub struct GameConfig {
    /// Debounce window for every button, in milliseconds.
    pub debounce_ms: u64,
    /// Consecutive identical samples the analog ladder needs.
    pub min_stable_readings: u32,
    /// Player inactivity limit.
    pub input_timeout_ms: u64,
    /// Sequence length that counts as a total victory.
    pub max_sequence_length: usize,
    /// Hold time of the reset button that clears the record.
    pub long_press_ms: u64,
    /// Period of the control loop.
    pub tick_interval_ms: u64,
    /// Button wiring.
    pub input: InputWiring,
    /// Tie-break order for simultaneous presses.
    pub priority: ButtonPriority,
    /// Playback pacing.
    pub playback: PlaybackTimings,
    /// Idle screen alternation period.
    pub attract_screen_ms: u64,
    /// Idle rainbow period.
    pub attract_rainbow_ms: u64,
    /// Fixed RNG seed; OS entropy when absent.
    pub seed: Option<u64>,
    /// File the record is persisted to.
    pub score_path: PathBuf,
}

impl GameConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match Self::from_path(&path) {
            Ok(config) => {
                info!(
                    path = %path.display(),
                    max_sequence_length = config.max_sequence_length,
                    "loaded game config"
                );
                config
            }
            Err(ConfigError::Read { source, .. }) if source.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to load config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Read and validate the configuration at `path`.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        raw.try_into()
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            min_stable_readings: 5,
            input_timeout_ms: DEFAULT_INPUT_TIMEOUT_MS,
            max_sequence_length: DEFAULT_MAX_SEQUENCE_LENGTH,
            long_press_ms: 7_000,
            tick_interval_ms: 5,
            input: InputWiring::default(),
            priority: ButtonPriority::default(),
            playback: PlaybackTimings::default(),
            attract_screen_ms: 5_000,
            attract_rainbow_ms: 15_000,
            seed: None,
            score_path: PathBuf::from(DEFAULT_SCORE_PATH),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[validate(range(min = 1, max = 1_000))]
    debounce_ms: u64,
    #[validate(range(min = 1, max = 100))]
    min_stable_readings: u32,
    #[validate(range(min = 500, max = 60_000))]
    input_timeout_ms: u64,
    #[validate(range(min = 1, max = 1_000))]
    max_sequence_length: usize,
    #[validate(range(min = 1_000, max = 60_000))]
    long_press_ms: u64,
    #[validate(range(min = 1, max = 100))]
    tick_interval_ms: u64,
    #[validate(custom(function = validate_wiring))]
    input: InputWiring,
    #[validate(length(equal = 4))]
    priority: Vec<ButtonId>,
    playback: PlaybackTimings,
    #[validate(range(min = 100))]
    attract_screen_ms: u64,
    #[validate(range(min = 100))]
    attract_rainbow_ms: u64,
    seed: Option<u64>,
    score_path: PathBuf,
}

impl Default for RawConfig {
    fn default() -> Self {
        let defaults = GameConfig::default();
        Self {
            debounce_ms: defaults.debounce_ms,
            min_stable_readings: defaults.min_stable_readings,
            input_timeout_ms: defaults.input_timeout_ms,
            max_sequence_length: defaults.max_sequence_length,
            long_press_ms: defaults.long_press_ms,
            tick_interval_ms: defaults.tick_interval_ms,
            input: defaults.input,
            priority: defaults.priority.order().to_vec(),
            playback: defaults.playback,
            attract_screen_ms: defaults.attract_screen_ms,
            attract_rainbow_ms: defaults.attract_rainbow_ms,
            seed: defaults.seed,
            score_path: defaults.score_path,
        }
    }
}

impl TryFrom<RawConfig> for GameConfig {
    type Error = ConfigError;

    fn try_from(value: RawConfig) -> Result<Self, Self::Error> {
        value.validate()?;
        let priority = ButtonPriority::new(&value.priority)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;

        Ok(Self {
            debounce_ms: value.debounce_ms,
            min_stable_readings: value.min_stable_readings,
            input_timeout_ms: value.input_timeout_ms,
            max_sequence_length: value.max_sequence_length,
            long_press_ms: value.long_press_ms,
            tick_interval_ms: value.tick_interval_ms,
            input: value.input,
            priority,
            playback: value.playback,
            attract_screen_ms: value.attract_screen_ms,
            attract_rainbow_ms: value.attract_rainbow_ms,
            seed: value.seed,
            score_path: value.score_path,
        })
    }
}

/// Every analog band must have `min <= max`.
fn validate_wiring(wiring: &InputWiring) -> Result<(), ValidationError> {
    let InputWiring::Analog { ranges } = wiring else {
        return Ok(());
    };

    for id in ButtonId::ALL {
        let range = ranges.range(id);
        if range.min > range.max {
            let mut err = ValidationError::new("analog_range_order");
            err.message = Some(
                format!("{id} range has min {} above max {}", range.min, range.max).into(),
            );
            return Err(err);
        }
    }
    Ok(())
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<GameConfig, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("test.json"),
            source,
        })?;
        raw.try_into()
    }

    #[test]
    fn empty_object_gives_defaults() {
        let config = parse("{}").unwrap();
        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.input_timeout_ms, 5_000);
        assert_eq!(config.max_sequence_length, 100);
        assert_eq!(config.priority, ButtonPriority::default());
        assert_eq!(config.input, InputWiring::default());
    }

    #[test]
    fn digital_wiring_with_custom_pins() {
        let config = parse(
            r#"{
                "input": {
                    "mode": "digital",
                    "pins": {"red": 10, "green": 11, "blue": 12, "yellow": 13}
                },
                "priority": ["red", "green", "blue", "yellow"],
                "seed": 7
            }"#,
        )
        .unwrap();
        match config.input {
            InputWiring::Digital { pins } => assert_eq!(pins.pin(ButtonId::Blue), 12),
            other => panic!("expected digital wiring, got {other:?}"),
        }
        assert_eq!(config.priority.rank(ButtonId::Red), 0);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn out_of_range_value_is_rejected() {
        let err = parse(r#"{"debounce_ms": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn duplicate_priority_is_rejected() {
        let err = parse(r#"{"priority": ["red", "red", "blue", "yellow"]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn inverted_analog_range_is_rejected() {
        let err = parse(
            r#"{"input": {"mode": "analog", "ranges": {
                "red": {"min": 3500, "max": 3000},
                "green": {"min": 2730, "max": 2930},
                "blue": {"min": 2330, "max": 2530},
                "yellow": {"min": 2000, "max": 2250}
            }}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        let err = parse(r#"{"debounce": 10}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}

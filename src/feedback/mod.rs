//! Interfaces to the lights, buzzer, display and board the game drives.
//!
//! The controller never talks to these collaborators directly: it produces
//! [`Feedback`] commands and [`Peripherals::dispatch`] routes them. Frequencies,
//! pixel layout and text layout all belong to the collaborators.

#[cfg(test)]
pub(crate) mod recording;

use tracing::{info, warn};

use crate::{
    error::{PeripheralError, SetupError},
    input::ButtonId,
};

/// Direction of an LED wipe animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WipeDirection {
    /// First pixel to last.
    FromStart,
    /// Center outwards.
    FromCenter,
    /// Both edges inwards.
    FromEdges,
}

/// Semantic tone; the audio collaborator owns the frequency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Note {
    /// Tone associated with a button color.
    Button(ButtonId),
    /// Final high tone of the countdown.
    Go,
}

/// Named melodies played by the audio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Melody {
    /// Power-on arpeggio.
    Startup,
    /// Single countdown beep.
    Countdown,
    /// Short ascending run.
    Success,
    /// Round completed.
    RoundWin,
    /// Wrong button or timeout.
    Error,
    /// New record celebration tune.
    NewHighScore,
}

/// Countdown message shown before the first round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// First message.
    Ready,
    /// Second message.
    Set,
    /// Last message.
    Go,
}

/// Semantic screen content; the display collaborator decides the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Title shown at power-on.
    Welcome,
    /// Invitation to press a button.
    PressToStart,
    /// Current record.
    HighScore(u32),
    /// Countdown message.
    Countdown(CountdownStep),
    /// Sequence for the given round is being played.
    Round(u32),
    /// Player has to reproduce the sequence.
    YourTurn,
    /// Round completed.
    RoundWon {
        /// Round that was completed.
        round: u32,
    },
    /// Game over.
    RoundLost {
        /// Final sequence length.
        score: u32,
    },
    /// A new record was set.
    NewHighScore(u32),
    /// The maximum sequence length was reached.
    TotalVictory,
    /// The record was cleared.
    HighScoreReset,
}

/// One command for a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// Light the quadrant of a color.
    ShowColor(ButtonId),
    /// Light the whole ring in one color.
    FillAll(ButtonId),
    /// Turn every LED off.
    ClearLights,
    /// Rainbow sweep over the ring.
    Rainbow {
        /// Number of full color-wheel loops.
        cycles: u8,
    },
    /// Animated fill of a color quadrant.
    Wipe(ButtonId, WipeDirection),
    /// Play a tone, until stopped when `duration_ms` is `None`.
    Note {
        /// Tone to play.
        note: Note,
        /// Length of the tone.
        duration_ms: Option<u32>,
    },
    /// Silence the buzzer.
    StopSound,
    /// Play a named melody.
    Melody(Melody),
    /// Replace the display content.
    Screen(Screen),
}

/// LED ring collaborator.
pub trait RenderFeedback: Send {
    /// Prepare the strip.
    fn init(&mut self) -> Result<(), PeripheralError> {
        Ok(())
    }
    /// Light the quadrant of `color`.
    fn show_color(&mut self, color: ButtonId);
    /// Light the whole ring.
    fn fill_all(&mut self, color: ButtonId);
    /// Turn every LED off.
    fn clear(&mut self);
    /// Rainbow sweep.
    fn rainbow(&mut self, cycles: u8);
    /// Animated fill of the quadrant of `color`.
    fn wipe(&mut self, color: ButtonId, direction: WipeDirection);
}

/// Buzzer collaborator.
pub trait AudioFeedback: Send {
    /// Prepare the buzzer pin.
    fn init(&mut self) -> Result<(), PeripheralError> {
        Ok(())
    }
    /// Start a tone.
    fn play_note(&mut self, note: Note, duration_ms: Option<u32>);
    /// Silence the buzzer.
    fn stop(&mut self);
    /// Play a named melody.
    fn play_melody(&mut self, melody: Melody);
}

/// Text display collaborator.
pub trait Display: Send {
    /// Bring up the panel.
    fn init(&mut self) -> Result<(), PeripheralError> {
        Ok(())
    }
    /// Replace the content.
    fn show(&mut self, screen: Screen);
}

/// Board-level controls.
pub trait SystemControl: Send {
    /// Reboot the device.
    fn restart(&mut self);
}

/// The set of output collaborators driven by the controller.
pub struct Peripherals {
    lights: Box<dyn RenderFeedback>,
    audio: Box<dyn AudioFeedback>,
    display: Option<Box<dyn Display>>,
    system: Option<Box<dyn SystemControl>>,
}

impl Peripherals {
    /// Lights and audio are mandatory; display and system control are optional.
    pub fn new(lights: Box<dyn RenderFeedback>, audio: Box<dyn AudioFeedback>) -> Self {
        Self {
            lights,
            audio,
            display: None,
            system: None,
        }
    }

    /// Attach a display.
    pub fn with_display(mut self, display: Box<dyn Display>) -> Self {
        self.display = Some(display);
        self
    }

    /// Attach board-level controls.
    pub fn with_system(mut self, system: Box<dyn SystemControl>) -> Self {
        self.system = Some(system);
        self
    }

    /// Initialise every collaborator.
    ///
    /// A display that fails to start is dropped and the game continues without
    /// it; lights or audio failing aborts setup.
    pub fn init(&mut self) -> Result<(), SetupError> {
        self.lights.init().map_err(SetupError::MandatoryPeripheral)?;
        self.audio.init().map_err(SetupError::MandatoryPeripheral)?;

        if let Some(display) = self.display.as_mut() {
            if let Err(err) = display.init() {
                warn!(error = %err, "display init failed; continuing without display");
                self.display = None;
            }
        }
        Ok(())
    }

    /// Whether a working display is attached.
    pub fn has_display(&self) -> bool {
        self.display.is_some()
    }

    /// Route one command to its collaborator.
    pub fn dispatch(&mut self, feedback: Feedback) {
        match feedback {
            Feedback::ShowColor(color) => self.lights.show_color(color),
            Feedback::FillAll(color) => self.lights.fill_all(color),
            Feedback::ClearLights => self.lights.clear(),
            Feedback::Rainbow { cycles } => self.lights.rainbow(cycles),
            Feedback::Wipe(color, direction) => self.lights.wipe(color, direction),
            Feedback::Note { note, duration_ms } => self.audio.play_note(note, duration_ms),
            Feedback::StopSound => self.audio.stop(),
            Feedback::Melody(melody) => self.audio.play_melody(melody),
            Feedback::Screen(screen) => {
                if let Some(display) = self.display.as_mut() {
                    display.show(screen);
                }
            }
        }
    }

    /// Reboot the board, when the host supports it.
    pub fn restart(&mut self) {
        match self.system.as_mut() {
            Some(system) => {
                info!("restarting device");
                system.restart();
            }
            None => warn!("restart requested but no system control is attached"),
        }
    }
}

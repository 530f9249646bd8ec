//! Timed feedback sequences advanced by the control loop.
//!
//! Every piece of feedback that took a blocking delay on the device is a
//! [`Script`]: a queue of steps, each dispatching a batch of [`Feedback`] and
//! then holding for a number of milliseconds. A script may name the
//! [`GameEvent`] to fire once its last hold elapsed.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    feedback::{CountdownStep, Feedback, Melody, Note, Screen, WipeDirection},
    input::ButtonId,
};

use super::state_machine::GameEvent;

const COUNTDOWN_STEP_MS: u64 = 1_000;
const GO_TONE_MS: u32 = 500;
const WIN_PAUSE_MS: u64 = 500;
const WIN_HOLD_MS: u64 = 1_000;
const LOSE_FLASH_MS: u64 = 1_500;
const LOSE_PAUSE_MS: u64 = 2_000;
const CELEBRATION_STEPS: usize = 30;
const CELEBRATION_STEP_MS: u64 = 150;
const CELEBRATION_BLINK_MS: u64 = 30;
const CELEBRATION_TAIL_MS: u64 = 1_000;
const TOTAL_VICTORY_MS: u64 = 3_000;
const RESET_FLASHES: usize = 3;
const RESET_FLASH_MS: u64 = 200;

/// Pacing of the sequence playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackTimings {
    /// Pause before the first color.
    pub lead_in_ms: u64,
    /// Tone length of each color.
    pub note_ms: u32,
    /// How long each color stays lit.
    pub show_ms: u64,
    /// Dark gap between two colors.
    pub gap_ms: u64,
}

impl Default for PlaybackTimings {
    fn default() -> Self {
        Self {
            lead_in_ms: 500,
            note_ms: 500,
            show_ms: 700,
            gap_ms: 100,
        }
    }
}

/// One batch of feedback followed by a hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Commands dispatched when the step starts.
    pub feedback: Vec<Feedback>,
    /// Time to wait before the next step.
    pub hold_ms: u64,
}

impl Step {
    fn new(feedback: impl Into<Vec<Feedback>>, hold_ms: u64) -> Self {
        Self {
            feedback: feedback.into(),
            hold_ms,
        }
    }
}

/// A named queue of timed steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    name: &'static str,
    steps: VecDeque<Step>,
    then: Option<GameEvent>,
}

impl Script {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: VecDeque::new(),
            then: None,
        }
    }

    fn step(mut self, feedback: impl Into<Vec<Feedback>>, hold_ms: u64) -> Self {
        self.steps.push_back(Step::new(feedback, hold_ms));
        self
    }

    fn then(mut self, event: GameEvent) -> Self {
        self.then = Some(event);
        self
    }

    /// Name used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Event fired when the script ends.
    pub fn next_event(&self) -> Option<GameEvent> {
        self.then
    }

    /// Remaining steps.
    pub fn steps(&self) -> &VecDeque<Step> {
        &self.steps
    }

    /// Sum of every hold.
    pub fn duration_ms(&self) -> u64 {
        self.steps.iter().map(|step| step.hold_ms).sum()
    }

    /// Power-on animation.
    pub fn intro() -> Self {
        let wipes = [
            (ButtonId::Red, WipeDirection::FromStart),
            (ButtonId::Green, WipeDirection::FromCenter),
            (ButtonId::Blue, WipeDirection::FromEdges),
            (ButtonId::Yellow, WipeDirection::FromStart),
        ];

        let mut script = Self::new("intro")
            .step(
                [Feedback::Screen(Screen::Welcome), Feedback::Melody(Melody::Startup)],
                1_000,
            )
            .step([Feedback::Rainbow { cycles: 1 }], 500);
        for (color, direction) in wipes {
            script = script.step([Feedback::Wipe(color, direction)], 300);
        }
        script.step([Feedback::ClearLights], 0)
    }

    /// Ready/Set/Go before the first round.
    pub fn countdown() -> Self {
        let beep = Feedback::Melody(Melody::Countdown);
        Self::new("countdown")
            .step(
                [
                    Feedback::ClearLights,
                    Feedback::Screen(Screen::Countdown(CountdownStep::Ready)),
                    beep,
                ],
                COUNTDOWN_STEP_MS,
            )
            .step(
                [Feedback::Screen(Screen::Countdown(CountdownStep::Set)), beep],
                COUNTDOWN_STEP_MS,
            )
            .step([beep], COUNTDOWN_STEP_MS)
            .step(
                [
                    Feedback::Screen(Screen::Countdown(CountdownStep::Go)),
                    Feedback::Note {
                        note: Note::Go,
                        duration_ms: Some(GO_TONE_MS),
                    },
                ],
                COUNTDOWN_STEP_MS,
            )
            .then(GameEvent::CountdownFinished)
    }

    /// Play `colors` back as timed color and tone pulses.
    pub fn playback(colors: &[ButtonId], timings: &PlaybackTimings) -> Self {
        let round = u32::try_from(colors.len()).unwrap_or(u32::MAX);
        let mut script = Self::new("playback").step(
            [Feedback::ClearLights, Feedback::Screen(Screen::Round(round))],
            timings.lead_in_ms,
        );
        for color in colors {
            script = script
                .step(
                    [
                        Feedback::ShowColor(*color),
                        Feedback::Note {
                            note: Note::Button(*color),
                            duration_ms: Some(timings.note_ms),
                        },
                    ],
                    timings.show_ms,
                )
                .step([Feedback::ClearLights, Feedback::StopSound], timings.gap_ms);
        }
        script.then(GameEvent::PlaybackFinished)
    }

    /// Round completed.
    pub fn round_won(round: u32) -> Self {
        Self::new("round_won")
            .step(
                [Feedback::ClearLights, Feedback::Screen(Screen::RoundWon { round })],
                WIN_PAUSE_MS,
            )
            .step(
                [Feedback::Melody(Melody::RoundWin), Feedback::Rainbow { cycles: 1 }],
                WIN_HOLD_MS,
            )
            .step([Feedback::ClearLights], 0)
            .then(GameEvent::AcknowledgeElapsed)
    }

    /// Game over, with the record celebration when `new_record` is set.
    pub fn round_lost(score: u32, new_record: bool) -> Self {
        let mut script = Self::new("round_lost")
            .step(
                [
                    Feedback::Screen(Screen::RoundLost { score }),
                    Feedback::Melody(Melody::Error),
                    Feedback::FillAll(ButtonId::Red),
                ],
                LOSE_FLASH_MS,
            )
            .step([Feedback::ClearLights], LOSE_PAUSE_MS);

        if new_record {
            script = script.step(
                [
                    Feedback::Screen(Screen::NewHighScore(score)),
                    Feedback::Melody(Melody::NewHighScore),
                ],
                0,
            );
            for index in 0..CELEBRATION_STEPS {
                let flash = match index % 6 {
                    0 | 1 => Feedback::Rainbow { cycles: 1 },
                    2 => Feedback::FillAll(ButtonId::Red),
                    3 => Feedback::FillAll(ButtonId::Blue),
                    4 => Feedback::FillAll(ButtonId::Green),
                    _ => Feedback::FillAll(ButtonId::Yellow),
                };
                script = script.step([flash], CELEBRATION_STEP_MS);
                if index % 2 == 1 {
                    script = script.step([Feedback::ClearLights], CELEBRATION_BLINK_MS);
                }
            }
            script = script.step([Feedback::ClearLights], CELEBRATION_TAIL_MS);
        }

        script.then(GameEvent::AcknowledgeElapsed)
    }

    /// Maximum sequence length reached.
    pub fn total_victory() -> Self {
        Self::new("total_victory")
            .step(
                [
                    Feedback::ClearLights,
                    Feedback::Screen(Screen::TotalVictory),
                    Feedback::Melody(Melody::Success),
                    Feedback::Rainbow { cycles: 3 },
                ],
                TOTAL_VICTORY_MS,
            )
            .step([Feedback::ClearLights], 0)
            .then(GameEvent::SequenceExhausted)
    }

    /// Red flashes confirming the record was cleared.
    pub fn high_score_reset() -> Self {
        let mut script = Self::new("high_score_reset")
            .step([Feedback::Screen(Screen::HighScoreReset)], 0);
        for _ in 0..RESET_FLASHES {
            script = script
                .step([Feedback::FillAll(ButtonId::Red)], RESET_FLASH_MS)
                .step([Feedback::ClearLights], RESET_FLASH_MS);
        }
        script
    }
}

/// Returned when a script's last hold elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finished {
    /// Name of the script.
    pub name: &'static str,
    /// Event to fire, if any.
    pub then: Option<GameEvent>,
}

#[derive(Debug)]
struct Running {
    script: Script,
    deadline_ms: u64,
}

/// Runs at most one script at a time.
#[derive(Debug, Default)]
pub struct ScriptPlayer {
    running: Option<Running>,
}

impl ScriptPlayer {
    /// Queue `script`; its first step is dispatched on the next [`advance`](Self::advance).
    ///
    /// A script already running is replaced.
    pub fn start(&mut self, script: Script, now_ms: u64) {
        debug!(script = script.name(), duration_ms = script.duration_ms(), "script started");
        self.running = Some(Running {
            script,
            deadline_ms: now_ms,
        });
    }

    /// Whether a script is in progress.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Name of the running script.
    pub fn current(&self) -> Option<&'static str> {
        self.running.as_ref().map(|running| running.script.name())
    }

    /// Dispatch every step whose start time has come and report the end of the script.
    pub fn advance(&mut self, now_ms: u64, sink: &mut dyn FnMut(Feedback)) -> Option<Finished> {
        let running = self.running.as_mut()?;

        while running.deadline_ms <= now_ms {
            match running.script.steps.pop_front() {
                Some(step) => {
                    step.feedback.into_iter().for_each(&mut *sink);
                    running.deadline_ms += step.hold_ms;
                }
                None => {
                    let finished = Finished {
                        name: running.script.name,
                        then: running.script.then,
                    };
                    self.running = None;
                    debug!(script = finished.name, "script finished");
                    return Some(finished);
                }
            }
        }
        None
    }
}

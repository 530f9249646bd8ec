use tracing::{debug, info};

use crate::{
    feedback::{
        AudioFeedback, Display, Melody, Note, RenderFeedback, Screen, SystemControl, WipeDirection,
    },
    input::ButtonId,
};

/// Writes every light, sound and screen command to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFeedback;

impl RenderFeedback for LogFeedback {
    fn show_color(&mut self, color: ButtonId) {
        info!(target: "simon::lights", %color, "quadrant on");
    }

    fn fill_all(&mut self, color: ButtonId) {
        info!(target: "simon::lights", %color, "ring filled");
    }

    fn clear(&mut self) {
        debug!(target: "simon::lights", "lights off");
    }

    fn rainbow(&mut self, cycles: u8) {
        info!(target: "simon::lights", cycles, "rainbow");
    }

    fn wipe(&mut self, color: ButtonId, direction: WipeDirection) {
        info!(target: "simon::lights", %color, ?direction, "wipe");
    }
}

impl AudioFeedback for LogFeedback {
    fn play_note(&mut self, note: Note, duration_ms: Option<u32>) {
        info!(target: "simon::audio", ?note, ?duration_ms, "tone");
    }

    fn stop(&mut self) {
        debug!(target: "simon::audio", "silence");
    }

    fn play_melody(&mut self, melody: Melody) {
        info!(target: "simon::audio", ?melody, "melody");
    }
}

impl Display for LogFeedback {
    fn show(&mut self, screen: Screen) {
        info!(target: "simon::display", "{}", describe(screen));
    }
}

impl SystemControl for LogFeedback {
    fn restart(&mut self) {
        info!("restart requested; resetting the game in place");
    }
}

fn describe(screen: Screen) -> String {
    use crate::feedback::CountdownStep;

    match screen {
        Screen::Welcome => "SIMON".into(),
        Screen::PressToStart => "Press a button to start".into(),
        Screen::HighScore(score) => format!("High score: {score}"),
        Screen::Countdown(CountdownStep::Ready) => "Ready".into(),
        Screen::Countdown(CountdownStep::Set) => "Set".into(),
        Screen::Countdown(CountdownStep::Go) => "Go!".into(),
        Screen::Round(round) => format!("Round {round}"),
        Screen::YourTurn => "Your turn".into(),
        Screen::RoundWon { round } => format!("Round {round} cleared"),
        Screen::RoundLost { score } => format!("Game over, score {score}"),
        Screen::NewHighScore(score) => format!("New high score: {score}!"),
        Screen::TotalVictory => "You beat the whole sequence!".into(),
        Screen::HighScoreReset => "High score cleared".into(),
    }
}

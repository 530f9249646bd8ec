//! Collaborator double that records every command it receives.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use crate::input::ButtonId;

use super::{
    AudioFeedback, Display, Feedback, Melody, Note, RenderFeedback, Screen, SystemControl,
    WipeDirection,
};

#[derive(Clone, Default)]
pub(crate) struct Recorder {
    log: Arc<Mutex<Vec<Feedback>>>,
    restarts: Arc<AtomicUsize>,
}

impl Recorder {
    fn push(&self, feedback: Feedback) {
        self.log.lock().unwrap().push(feedback);
    }

    /// Drain everything recorded so far.
    pub(crate) fn take(&self) -> Vec<Feedback> {
        std::mem::take(&mut *self.log.lock().unwrap())
    }

    pub(crate) fn screens(&self) -> Vec<Screen> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter_map(|feedback| match feedback {
                Feedback::Screen(screen) => Some(*screen),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn contains(&self, feedback: Feedback) -> bool {
        self.log.lock().unwrap().contains(&feedback)
    }

    pub(crate) fn restarts(&self) -> usize {
        self.restarts.load(Ordering::SeqCst)
    }
}

impl RenderFeedback for Recorder {
    fn show_color(&mut self, color: ButtonId) {
        self.push(Feedback::ShowColor(color));
    }

    fn fill_all(&mut self, color: ButtonId) {
        self.push(Feedback::FillAll(color));
    }

    fn clear(&mut self) {
        self.push(Feedback::ClearLights);
    }

    fn rainbow(&mut self, cycles: u8) {
        self.push(Feedback::Rainbow { cycles });
    }

    fn wipe(&mut self, color: ButtonId, direction: WipeDirection) {
        self.push(Feedback::Wipe(color, direction));
    }
}

impl AudioFeedback for Recorder {
    fn play_note(&mut self, note: Note, duration_ms: Option<u32>) {
        self.push(Feedback::Note { note, duration_ms });
    }

    fn stop(&mut self) {
        self.push(Feedback::StopSound);
    }

    fn play_melody(&mut self, melody: Melody) {
        self.push(Feedback::Melody(melody));
    }
}

impl Display for Recorder {
    fn show(&mut self, screen: Screen) {
        self.push(Feedback::Screen(screen));
    }
}

impl SystemControl for Recorder {
    fn restart(&mut self) {
        self.restarts.fetch_add(1, Ordering::SeqCst);
    }
}

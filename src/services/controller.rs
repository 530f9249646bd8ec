//! The game controller: owns every component and drives them from one `tick`.
//!
//! Each tick runs, in order:
//!
//! 1. the reset button,
//! 2. at most one debounced button edge, judged against the current state,
//! 3. the running feedback script, firing its event once it ends,
//! 4. the per-state timers (idle attract loop, input timeout).
//!
//! Nothing in a tick blocks; long feedback is expressed as [`Script`]s and the
//! input layer stays paused while one runs.

use tracing::{debug, info, warn};

use crate::{
    clock::Clock,
    config::GameConfig,
    dao::storage::PersistentStore,
    error::SetupError,
    feedback::{Feedback, Note, Peripherals, Screen},
    input::{
        ButtonEvent, ButtonId, DebouncedInput, InputSource,
        system_button::{SystemButton, SystemCommand},
    },
    sequence::SequenceEngine,
    services::high_score::HighScoreKeeper,
    state::{
        AttractLoop, GameEvent, GameState, GameStateMachine, Script, ScriptPlayer, Snapshot,
        TimeoutSupervisor, Transition, TurnOutcome, judge,
    },
};

/// Single owner of the game.
pub struct GameController {
    config: GameConfig,
    clock: Box<dyn Clock>,
    input: DebouncedInput,
    system_button: Option<SystemButton>,
    sequence: SequenceEngine,
    machine: GameStateMachine,
    timeout: TimeoutSupervisor,
    scripts: ScriptPlayer,
    attract: AttractLoop,
    scores: HighScoreKeeper,
    peripherals: Peripherals,
    ready: bool,
}

impl GameController {
    /// Assemble a controller; nothing touches the hardware until [`setup`](Self::setup).
    pub fn new(
        config: GameConfig,
        clock: Box<dyn Clock>,
        input: Box<dyn InputSource>,
        peripherals: Peripherals,
        store: Box<dyn PersistentStore>,
    ) -> Self {
        Self {
            sequence: SequenceEngine::new(config.max_sequence_length, config.seed),
            timeout: TimeoutSupervisor::new(config.input_timeout_ms),
            attract: AttractLoop::new(config.attract_screen_ms, config.attract_rainbow_ms),
            config,
            clock,
            input: DebouncedInput::new(input),
            system_button: None,
            machine: GameStateMachine::new(),
            scripts: ScriptPlayer::default(),
            scores: HighScoreKeeper::new(store),
            peripherals,
            ready: false,
        }
    }

    /// Attach the reset button.
    pub fn with_system_button(mut self, button: SystemButton) -> Self {
        self.system_button = Some(button);
        self
    }

    /// Bring up the peripherals, load the record and start the intro.
    ///
    /// Calling it again after a success does nothing. Lights, audio and the
    /// game buttons are required; the display, the reset button and the store
    /// may fail, in which case the game runs without them.
    pub fn setup(&mut self) -> Result<(), SetupError> {
        if self.ready {
            debug!("setup already done");
            return Ok(());
        }

        self.peripherals.init()?;
        self.input.init().map_err(SetupError::MandatoryPeripheral)?;
        if let Some(button) = self.system_button.as_mut() {
            if let Err(err) = button.init() {
                warn!(error = %err, "reset button unavailable; continuing without it");
                self.system_button = None;
            }
        }

        let high_score = self.scores.load();
        let now = self.clock.now_ms();
        self.enter(GameState::Idle, now);
        self.start_script(Script::intro(), now);
        self.ready = true;

        info!(
            high_score,
            display = self.peripherals.has_display(),
            degraded = self.scores.is_degraded(),
            "game controller ready"
        );
        Ok(())
    }

    /// Run one iteration of the control loop.
    pub fn tick(&mut self) {
        if !self.ready {
            return;
        }
        let now = self.clock.now_ms();

        self.poll_system_button(now);
        if let Some(event) = self.input.poll(now) {
            self.on_button(event, now);
        }
        self.advance_script(now);
        self.run_state_timers(now);
    }

    /// Active state.
    pub fn current_state(&self) -> GameState {
        self.machine.state()
    }

    /// State and transition counter.
    pub fn snapshot(&self) -> Snapshot {
        self.machine.snapshot()
    }

    /// Clear the persisted record and return the new value (always 0).
    ///
    /// The confirmation flashes only play when the game is idle and quiet.
    pub fn reset_high_score(&mut self) -> u32 {
        let value = self.scores.reset();
        if self.ready && self.current_state() == GameState::Idle && !self.scripts.is_running() {
            let now = self.clock.now_ms();
            self.start_script(Script::high_score_reset(), now);
        }
        value
    }

    /// Current record.
    pub fn high_score(&self) -> u32 {
        self.scores.value()
    }

    /// Colors of the current game.
    pub fn sequence(&self) -> &[ButtonId] {
        self.sequence.colors()
    }

    /// Index of the next color the player must reproduce.
    pub fn cursor(&self) -> usize {
        self.sequence.cursor()
    }

    /// Whether the score store failed since startup.
    pub fn is_persistence_degraded(&self) -> bool {
        self.scores.is_degraded()
    }

    /// Name of the feedback script in progress.
    pub fn running_script(&self) -> Option<&'static str> {
        self.scripts.current()
    }

    /// Configuration the controller was built with.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    fn poll_system_button(&mut self, now: u64) {
        let Some(command) = self.system_button.as_mut().and_then(|button| button.poll(now)) else {
            return;
        };

        match command {
            SystemCommand::Restart => self.restart(now),
            SystemCommand::ResetHighScore if self.current_state() == GameState::Idle => {
                self.reset_high_score();
            }
            SystemCommand::ResetHighScore => {
                info!(state = %self.current_state(), "high score reset ignored outside idle");
            }
        }
    }

    fn restart(&mut self, now: u64) {
        self.peripherals.restart();

        // Only reached on hosts where the restart hook returns.
        self.machine = GameStateMachine::new();
        self.timeout.disarm();
        self.scripts = ScriptPlayer::default();
        self.input.resume();
        self.peripherals.dispatch(Feedback::StopSound);
        self.peripherals.dispatch(Feedback::ClearLights);
        self.scores.load();
        self.enter(GameState::Idle, now);
        self.start_script(Script::intro(), now);
    }

    fn on_button(&mut self, event: ButtonEvent, now: u64) {
        match event {
            ButtonEvent::Pressed(id) => {
                self.peripherals.dispatch(Feedback::ShowColor(id));
                self.peripherals.dispatch(Feedback::Note {
                    note: Note::Button(id),
                    duration_ms: None,
                });
            }
            ButtonEvent::Released(id) => {
                self.peripherals.dispatch(Feedback::StopSound);
                self.peripherals.dispatch(Feedback::ClearLights);
                self.on_release(id, now);
            }
        }
    }

    fn on_release(&mut self, id: ButtonId, now: u64) {
        match self.current_state() {
            GameState::Idle => self.fire(GameEvent::StartRequested, now),
            GameState::AwaitPlayerInput => match judge(&mut self.sequence, id) {
                TurnOutcome::Advance => {
                    debug!(button = %id, cursor = self.sequence.cursor(), "correct color");
                    self.timeout.arm(now);
                }
                TurnOutcome::RoundComplete => self.fire(GameEvent::RoundCompleted, now),
                TurnOutcome::Mistake { expected } => {
                    info!(pressed = %id, expected = ?expected, "wrong color");
                    self.fire(GameEvent::WrongButton(id), now);
                }
            },
            state => debug!(button = %id, %state, "release ignored"),
        }
    }

    fn advance_script(&mut self, now: u64) {
        loop {
            let peripherals = &mut self.peripherals;
            let Some(finished) = self
                .scripts
                .advance(now, &mut |feedback| peripherals.dispatch(feedback))
            else {
                break;
            };

            self.input.resume();
            if let Some(event) = finished.then {
                self.fire(event, now);
            }
        }
    }

    fn run_state_timers(&mut self, now: u64) {
        match self.current_state() {
            GameState::Idle if !self.scripts.is_running() => {
                for feedback in self.attract.poll(now, self.scores.value()) {
                    self.peripherals.dispatch(feedback);
                }
            }
            GameState::AwaitPlayerInput => {
                if self.timeout.poll(now) {
                    info!(limit_ms = self.timeout.limit_ms(), "player input timed out");
                    self.fire(GameEvent::InputTimedOut, now);
                }
            }
            _ => {}
        }
    }

    fn fire(&mut self, event: GameEvent, now: u64) {
        match self.machine.apply(event) {
            Ok(transition) => {
                info!(
                    from = %transition.from,
                    to = %transition.to,
                    event = ?transition.event,
                    version = transition.version,
                    "state transition"
                );
                self.exit(transition);
                self.enter(transition.to, now);
            }
            Err(err) => warn!(error = %err, "game event rejected"),
        }
    }

    fn exit(&mut self, transition: Transition) {
        if transition.from == GameState::AwaitPlayerInput {
            self.timeout.disarm();
        }
    }

    fn enter(&mut self, state: GameState, now: u64) {
        match state {
            GameState::Idle => {
                self.sequence.reset();
                self.attract.restart(now);
            }
            GameState::Countdown => self.start_script(Script::countdown(), now),
            GameState::PlaybackSequence => match self.sequence.extend() {
                Ok(color) => {
                    debug!(color = %color, len = self.sequence.len(), "sequence extended");
                    let script = Script::playback(self.sequence.colors(), &self.config.playback);
                    self.start_script(script, now);
                }
                Err(full) => {
                    info!(max = full.max, "maximum sequence reproduced; total victory");
                    self.scores.force_max(saturating_u32(full.max));
                    self.start_script(Script::total_victory(), now);
                }
            },
            GameState::AwaitPlayerInput => {
                self.sequence.rewind_cursor();
                self.peripherals.dispatch(Feedback::ClearLights);
                self.peripherals.dispatch(Feedback::Screen(Screen::YourTurn));
                self.timeout.arm(now);
            }
            GameState::RoundWon => {
                let round = saturating_u32(self.sequence.len());
                self.start_script(Script::round_won(round), now);
            }
            GameState::RoundLost => {
                let score = saturating_u32(self.sequence.len());
                let new_record = self.scores.record(score);
                info!(score, new_record, "game over");
                self.start_script(Script::round_lost(score, new_record), now);
            }
        }
    }

    fn start_script(&mut self, script: Script, now: u64) {
        self.input.pause();
        self.scripts.start(script, now);
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{
            Arc, Mutex,
            atomic::{AtomicBool, Ordering},
        },
    };

    use super::*;
    use crate::{
        clock::ManualClock,
        config::InputWiring,
        dao::{memory::MemoryStore, storage::HIGH_SCORE_KEY},
        error::PeripheralError,
        feedback::{AudioFeedback, Melody, recording::Recorder},
        input::{
            Button, InputMapping,
            button::{accept_press, accept_release},
            digital::PinMap,
            system_button::ResetPin,
        },
        sim::SimulatedBoard,
    };

    const STEP_MS: u64 = 10;

    struct QueuedInput {
        queue: Arc<Mutex<VecDeque<ButtonEvent>>>,
        buttons: [Button; 4],
    }

    impl InputSource for QueuedInput {
        fn poll(&mut self, now_ms: u64) -> Option<ButtonEvent> {
            let event = self.queue.lock().unwrap().pop_front()?;
            match event {
                ButtonEvent::Pressed(id) => accept_press(&mut self.buttons, id, now_ms),
                ButtonEvent::Released(id) => accept_release(&mut self.buttons, id, now_ms),
            }
            Some(event)
        }

        fn buttons(&self) -> &[Button] {
            &self.buttons
        }

        fn clear(&mut self) {
            self.buttons.iter_mut().for_each(Button::clear);
        }

        fn latch(&mut self) {}
    }

    struct SharedResetPin(Arc<AtomicBool>);

    impl ResetPin for SharedResetPin {
        fn is_pressed(&mut self) -> Option<bool> {
            Some(self.0.load(Ordering::SeqCst))
        }
    }

    struct Rig {
        controller: GameController,
        clock: ManualClock,
        queue: Arc<Mutex<VecDeque<ButtonEvent>>>,
        recorder: Recorder,
        store: MemoryStore,
        reset_pin: Arc<AtomicBool>,
    }

    impl Rig {
        fn new(config: GameConfig, store: MemoryStore) -> Self {
            let clock = ManualClock::starting_at(0);
            let queue = Arc::new(Mutex::new(VecDeque::new()));
            let recorder = Recorder::default();
            let reset_pin = Arc::new(AtomicBool::new(false));

            let input = QueuedInput {
                queue: queue.clone(),
                buttons: ButtonId::ALL.map(|id| Button::new(id, InputMapping::Pin(0))),
            };
            let peripherals =
                Peripherals::new(Box::new(recorder.clone()), Box::new(recorder.clone()))
                    .with_display(Box::new(recorder.clone()))
                    .with_system(Box::new(recorder.clone()));
            let controller = GameController::new(
                config,
                Box::new(clock.clone()),
                Box::new(input),
                peripherals,
                Box::new(store.clone()),
            )
            .with_system_button(SystemButton::new(
                Box::new(SharedResetPin(reset_pin.clone())),
                50,
                7_000,
            ));

            Self {
                controller,
                clock,
                queue,
                recorder,
                store,
                reset_pin,
            }
        }

        fn started(config: GameConfig, store: MemoryStore) -> Self {
            let mut rig = Self::new(config, store);
            rig.controller.setup().unwrap();
            rig.settle();
            rig
        }

        fn step(&mut self) {
            self.clock.advance(STEP_MS);
            self.controller.tick();
        }

        fn settle(&mut self) {
            for _ in 0..10_000 {
                if self.controller.running_script().is_none() {
                    return;
                }
                self.step();
            }
            panic!("script never finished");
        }

        fn run_until(&mut self, state: GameState) {
            for _ in 0..10_000 {
                if self.controller.current_state() == state {
                    return;
                }
                self.step();
            }
            panic!("never reached {state:?}");
        }

        fn tap(&mut self, id: ButtonId) {
            self.queue.lock().unwrap().push_back(ButtonEvent::Pressed(id));
            self.step();
            self.queue.lock().unwrap().push_back(ButtonEvent::Released(id));
            self.step();
        }

        fn other_than(id: ButtonId) -> ButtonId {
            match id {
                ButtonId::Red => ButtonId::Green,
                _ => ButtonId::Red,
            }
        }
    }

    fn seeded() -> GameConfig {
        GameConfig {
            seed: Some(11),
            ..GameConfig::default()
        }
    }

    #[test]
    fn setup_is_idempotent() {
        let mut rig = Rig::new(seeded(), MemoryStore::new());
        rig.controller.setup().unwrap();
        rig.controller.setup().unwrap();
        rig.settle();

        let welcomes = rig
            .recorder
            .screens()
            .into_iter()
            .filter(|screen| *screen == Screen::Welcome)
            .count();
        assert_eq!(welcomes, 1);
        assert_eq!(rig.controller.current_state(), GameState::Idle);
    }

    struct MuteBuzzer;

    impl AudioFeedback for MuteBuzzer {
        fn init(&mut self) -> Result<(), PeripheralError> {
            Err(PeripheralError::new("buzzer", "not wired"))
        }
        fn play_note(&mut self, _note: Note, _duration_ms: Option<u32>) {}
        fn stop(&mut self) {}
        fn play_melody(&mut self, _melody: Melody) {}
    }

    #[test]
    fn setup_fails_without_audio() {
        let recorder = Recorder::default();
        let input = QueuedInput {
            queue: Arc::default(),
            buttons: ButtonId::ALL.map(|id| Button::new(id, InputMapping::Pin(0))),
        };
        let mut controller = GameController::new(
            seeded(),
            Box::new(ManualClock::default()),
            Box::new(input),
            Peripherals::new(Box::new(recorder.clone()), Box::new(MuteBuzzer)),
            Box::new(MemoryStore::new()),
        );

        assert!(controller.setup().is_err());
        controller.tick();
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn press_alone_does_not_start() {
        let mut rig = Rig::started(seeded(), MemoryStore::new());
        rig.queue
            .lock()
            .unwrap()
            .push_back(ButtonEvent::Pressed(ButtonId::Blue));
        rig.step();
        assert_eq!(rig.controller.current_state(), GameState::Idle);

        rig.queue
            .lock()
            .unwrap()
            .push_back(ButtonEvent::Released(ButtonId::Blue));
        rig.step();
        assert_eq!(rig.controller.current_state(), GameState::Countdown);
    }

    #[test]
    fn correct_round_grows_the_sequence() {
        let mut rig = Rig::started(seeded(), MemoryStore::new());
        rig.tap(ButtonId::Yellow);
        rig.run_until(GameState::AwaitPlayerInput);
        assert_eq!(rig.controller.sequence().len(), 1);

        let first = rig.controller.sequence()[0];
        rig.tap(first);
        assert_eq!(rig.controller.current_state(), GameState::RoundWon);

        rig.run_until(GameState::AwaitPlayerInput);
        assert_eq!(rig.controller.sequence().len(), 2);
        assert_eq!(rig.controller.sequence()[0], first);
        assert_eq!(rig.controller.cursor(), 0);
    }

    #[test]
    fn wrong_color_loses_and_records() {
        let mut rig = Rig::started(seeded(), MemoryStore::new());
        rig.tap(ButtonId::Red);
        rig.run_until(GameState::AwaitPlayerInput);

        let wrong = Rig::other_than(rig.controller.sequence()[0]);
        rig.tap(wrong);
        assert_eq!(rig.controller.current_state(), GameState::RoundLost);

        rig.run_until(GameState::Idle);
        assert!(rig.controller.sequence().is_empty());
        assert_eq!(rig.controller.high_score(), 1);
        assert_eq!(rig.store.saves(), vec![(HIGH_SCORE_KEY.to_owned(), 1)]);
        assert!(rig.recorder.screens().contains(&Screen::NewHighScore(1)));
    }

    #[test]
    fn lower_score_is_not_saved() {
        let store = MemoryStore::with_value(HIGH_SCORE_KEY, 3);
        let mut rig = Rig::started(seeded(), store);
        rig.tap(ButtonId::Green);
        rig.run_until(GameState::AwaitPlayerInput);
        let wrong = Rig::other_than(rig.controller.sequence()[0]);
        rig.tap(wrong);
        rig.run_until(GameState::Idle);

        assert_eq!(rig.controller.high_score(), 3);
        assert!(rig.store.saves().is_empty());
        assert!(!rig.recorder.contains(Feedback::Melody(Melody::NewHighScore)));
    }

    #[test]
    fn timeout_fires_after_the_limit() {
        let mut rig = Rig::started(seeded(), MemoryStore::new());
        rig.tap(ButtonId::Blue);
        rig.run_until(GameState::AwaitPlayerInput);
        let armed_at = rig.clock.now_ms();

        rig.clock.set(armed_at + 5_000);
        rig.controller.tick();
        assert_eq!(rig.controller.current_state(), GameState::AwaitPlayerInput);

        rig.clock.set(armed_at + 5_001);
        rig.controller.tick();
        assert_eq!(rig.controller.current_state(), GameState::RoundLost);
        assert_eq!(rig.controller.snapshot().version, 4);
    }

    #[test]
    fn correct_release_rearms_the_timeout() {
        let mut rig = Rig::started(seeded(), MemoryStore::new());
        rig.tap(ButtonId::Blue);
        rig.run_until(GameState::AwaitPlayerInput);
        let first = rig.controller.sequence()[0];
        rig.tap(first);
        rig.run_until(GameState::AwaitPlayerInput);

        let start = rig.clock.now_ms();
        rig.clock.set(start + 4_000);
        let first = rig.controller.sequence()[0];
        rig.tap(first);
        let released_at = rig.clock.now_ms();

        rig.clock.set(released_at + 5_000);
        rig.controller.tick();
        assert_eq!(rig.controller.current_state(), GameState::AwaitPlayerInput);
        rig.clock.set(released_at + 5_001);
        rig.controller.tick();
        assert_eq!(rig.controller.current_state(), GameState::RoundLost);
    }

    #[test]
    fn reaching_the_maximum_is_a_total_victory() {
        let config = GameConfig {
            max_sequence_length: 1,
            ..seeded()
        };
        let mut rig = Rig::started(config, MemoryStore::new());
        rig.tap(ButtonId::Red);
        rig.run_until(GameState::AwaitPlayerInput);
        let only = rig.controller.sequence()[0];
        rig.tap(only);
        assert_eq!(rig.controller.current_state(), GameState::RoundWon);
        rig.run_until(GameState::PlaybackSequence);
        assert_eq!(rig.controller.running_script(), Some("total_victory"));
        rig.run_until(GameState::Idle);

        assert!(rig.recorder.screens().contains(&Screen::TotalVictory));
        assert_eq!(rig.controller.high_score(), 1);
        assert_eq!(rig.store.saves(), vec![(HIGH_SCORE_KEY.to_owned(), 1)]);
        assert!(rig.controller.sequence().is_empty());
    }

    #[test]
    fn reset_high_score_twice() {
        let store = MemoryStore::with_value(HIGH_SCORE_KEY, 25);
        let mut rig = Rig::started(seeded(), store);
        assert_eq!(rig.controller.high_score(), 25);

        assert_eq!(rig.controller.reset_high_score(), 0);
        assert_eq!(rig.controller.reset_high_score(), 0);
        assert_eq!(rig.store.value(HIGH_SCORE_KEY), Some(0));
        assert_eq!(rig.controller.running_script(), Some("high_score_reset"));
    }

    #[test]
    fn unavailable_store_degrades() {
        let store = MemoryStore::with_value(HIGH_SCORE_KEY, 9);
        store.fail_open(true);
        let rig = Rig::started(seeded(), store);
        assert!(rig.controller.is_persistence_degraded());
        assert_eq!(rig.controller.high_score(), 0);
        assert_eq!(rig.controller.current_state(), GameState::Idle);
    }

    #[test]
    fn long_reset_press_clears_record_in_idle() {
        let store = MemoryStore::with_value(HIGH_SCORE_KEY, 6);
        let mut rig = Rig::started(seeded(), store);

        rig.reset_pin.store(true, Ordering::SeqCst);
        for _ in 0..800 {
            rig.step();
        }
        assert_eq!(rig.controller.high_score(), 0);
        assert!(rig.recorder.screens().contains(&Screen::HighScoreReset));

        rig.reset_pin.store(false, Ordering::SeqCst);
        for _ in 0..20 {
            rig.step();
        }
        assert_eq!(rig.recorder.restarts(), 0);
    }

    #[test]
    fn long_reset_press_is_ignored_mid_game() {
        let store = MemoryStore::with_value(HIGH_SCORE_KEY, 6);
        let mut rig = Rig::started(seeded(), store);
        rig.tap(ButtonId::Red);
        rig.run_until(GameState::AwaitPlayerInput);

        rig.reset_pin.store(true, Ordering::SeqCst);
        for _ in 0..800 {
            rig.step();
        }
        assert_ne!(rig.controller.current_state(), GameState::AwaitPlayerInput);
        assert_eq!(rig.controller.high_score(), 6);
        assert!(!rig.recorder.screens().contains(&Screen::HighScoreReset));
    }

    #[test]
    fn short_reset_press_restarts() {
        let mut rig = Rig::started(seeded(), MemoryStore::new());
        rig.tap(ButtonId::Red);
        rig.run_until(GameState::AwaitPlayerInput);
        rig.recorder.take();

        rig.reset_pin.store(true, Ordering::SeqCst);
        for _ in 0..10 {
            rig.step();
        }
        rig.reset_pin.store(false, Ordering::SeqCst);
        for _ in 0..10 {
            rig.step();
        }

        assert_eq!(rig.recorder.restarts(), 1);
        assert_eq!(rig.controller.current_state(), GameState::Idle);
        assert!(rig.controller.sequence().is_empty());
        assert!(rig.recorder.screens().contains(&Screen::Welcome));
    }

    #[test]
    fn idle_attract_shows_high_score() {
        let store = MemoryStore::with_value(HIGH_SCORE_KEY, 14);
        let mut rig = Rig::started(seeded(), store);
        for _ in 0..600 {
            rig.step();
        }
        let screens = rig.recorder.screens();
        assert!(screens.contains(&Screen::PressToStart));
        assert!(screens.contains(&Screen::HighScore(14)));
    }

    /// Controller reading a digital board through the real debounce path.
    struct BoardRig {
        controller: GameController,
        clock: ManualClock,
        board: SimulatedBoard,
    }

    impl BoardRig {
        fn started() -> Self {
            let config = GameConfig {
                input: InputWiring::Digital {
                    pins: PinMap::default(),
                },
                ..seeded()
            };
            let board = SimulatedBoard::new(config.input);
            let clock = ManualClock::starting_at(0);
            let recorder = Recorder::default();
            let mut controller = GameController::new(
                config.clone(),
                Box::new(clock.clone()),
                board.input_source(&config),
                Peripherals::new(Box::new(recorder.clone()), Box::new(recorder)),
                Box::new(MemoryStore::new()),
            );
            controller.setup().unwrap();

            let mut rig = Self {
                controller,
                clock,
                board,
            };
            while rig.controller.running_script().is_some() {
                rig.steps(1);
            }
            rig
        }

        fn steps(&mut self, count: usize) {
            for _ in 0..count {
                self.clock.advance(STEP_MS);
                self.controller.tick();
            }
        }

        fn tap(&mut self, id: ButtonId) {
            self.board.press(id);
            self.steps(10);
            self.board.release();
            self.steps(10);
        }

        fn run_until(&mut self, state: GameState) {
            for _ in 0..10_000 {
                if self.controller.current_state() == state {
                    return;
                }
                self.steps(1);
            }
            panic!("never reached {state:?}");
        }
    }

    #[test]
    fn button_held_through_playback_is_not_judged() {
        let mut rig = BoardRig::started();
        rig.tap(ButtonId::Yellow);
        assert_eq!(rig.controller.current_state(), GameState::Countdown);

        rig.board.press(ButtonId::Red);
        rig.run_until(GameState::AwaitPlayerInput);
        rig.steps(30);

        // Bounce while held, then a real release.
        rig.board.release();
        rig.steps(1);
        rig.board.press(ButtonId::Red);
        rig.steps(30);
        rig.board.release();
        rig.steps(10);

        assert_eq!(rig.controller.current_state(), GameState::AwaitPlayerInput);
        assert_eq!(rig.controller.cursor(), 0);

        let first = rig.controller.sequence()[0];
        rig.tap(first);
        assert_eq!(rig.controller.current_state(), GameState::RoundWon);
    }

    #[test]
    fn taps_during_countdown_and_playback_are_ignored() {
        let mut rig = BoardRig::started();
        rig.tap(ButtonId::Blue);
        assert_eq!(rig.controller.current_state(), GameState::Countdown);

        let mut taps = 0;
        while rig.controller.current_state() != GameState::AwaitPlayerInput {
            rig.tap(ButtonId::Green);
            taps += 1;
            assert!(taps < 1_000, "never reached the player's turn");
        }
        rig.steps(20);

        assert!(taps > 10);
        assert_eq!(rig.controller.current_state(), GameState::AwaitPlayerInput);
        assert_eq!(rig.controller.cursor(), 0);
        assert_eq!(rig.controller.sequence().len(), 1);
    }
}

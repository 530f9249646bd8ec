//! Simon simulator binary: runs the game controller against a simulated board
//! driven from stdin, with all feedback written to the log.

use std::time::Duration;

use anyhow::Context;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::sleep,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use simon_game::{
    GameController,
    clock::SystemClock,
    config::GameConfig,
    dao::storage::PersistentStore,
    feedback::Peripherals,
    input::{ButtonId, system_button::SystemButton},
    services::runner::{ControllerHandle, spawn_controller},
    sim::{LogFeedback, SimulatedBoard},
};

const TAP_HOLD: Duration = Duration::from_millis(150);
const HELP: &str = "commands: r|g|b|y tap a button, reset, hold, state, score, clear-score, quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = GameConfig::load();
    let board = SimulatedBoard::new(config.input);
    let peripherals = Peripherals::new(Box::new(LogFeedback), Box::new(LogFeedback))
        .with_display(Box::new(LogFeedback))
        .with_system(Box::new(LogFeedback));
    let reset_button = SystemButton::new(
        Box::new(board.clone()),
        config.debounce_ms,
        config.long_press_ms,
    );

    let mut controller = GameController::new(
        config.clone(),
        Box::new(SystemClock::new()),
        board.input_source(&config),
        peripherals,
        open_store(&config),
    )
    .with_system_button(reset_button);
    controller.setup().context("starting game controller")?;

    let tick = Duration::from_millis(config.tick_interval_ms);
    let (handle, task) = spawn_controller(controller, tick);
    info!("{HELP}");

    tokio::select! {
        result = read_commands(&board, &handle, &config) => result?,
        _ = shutdown_signal() => info!("shutdown signal received"),
    }

    if handle.shutdown().await.is_err() {
        warn!("controller task already stopped");
    }
    let controller = task.await.context("joining controller task")?;
    info!(high_score = controller.high_score(), "simulator stopped");

    Ok(())
}

#[cfg(feature = "json-store")]
fn open_store(config: &GameConfig) -> Box<dyn PersistentStore> {
    use simon_game::dao::{json_file::JsonFileStore, storage::NAMESPACE};

    info!(path = %config.score_path.display(), "persisting high score to file");
    Box::new(JsonFileStore::new(&config.score_path, NAMESPACE))
}

#[cfg(not(feature = "json-store"))]
fn open_store(_config: &GameConfig) -> Box<dyn PersistentStore> {
    warn!("built without json-store; the high score is lost on exit");
    Box::new(simon_game::dao::memory::MemoryStore::new())
}

/// Translate stdin lines into simulated button activity until EOF or `quit`.
async fn read_commands(
    board: &SimulatedBoard,
    handle: &ControllerHandle,
    config: &GameConfig,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        match line.trim() {
            "" => continue,
            "q" | "quit" | "exit" => break,
            "help" => info!("{HELP}"),
            "state" => info!(state = %handle.current_state().await?, "current state"),
            "score" => info!(high_score = handle.high_score().await?, "current high score"),
            "clear-score" => {
                let value = handle.reset_high_score().await?;
                info!(high_score = value, "high score cleared");
            }
            "reset" => {
                board.set_reset(true);
                sleep(TAP_HOLD).await;
                board.set_reset(false);
            }
            "hold" => {
                info!(hold_ms = config.long_press_ms, "holding the reset button");
                board.set_reset(true);
                sleep(Duration::from_millis(config.long_press_ms) + TAP_HOLD).await;
                board.set_reset(false);
            }
            other => match parse_button(other) {
                Some(id) => {
                    board.press(id);
                    sleep(TAP_HOLD).await;
                    board.release();
                }
                None => warn!(command = other, "unknown command; type `help`"),
            },
        }
    }

    Ok(())
}

fn parse_button(input: &str) -> Option<ButtonId> {
    match input {
        "r" | "red" => Some(ButtonId::Red),
        "g" | "green" => Some(ButtonId::Green),
        "b" | "blue" => Some(ButtonId::Blue),
        "y" | "yellow" => Some(ButtonId::Yellow),
        _ => None,
    }
}

/// Configure tracing subscribers; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

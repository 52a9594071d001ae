//! The event loop.
//!
//! Three producers run independently: the script player, a frame ticker and
//! a one-second countdown ticker. `tokio::select!` merges them into
//! [`Engine::handle`], so no two inputs are ever applied concurrently.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, instrument};

use crate::engine::{Engine, EngineInput};
use crate::error::AppError;
use crate::script::{Script, ScriptStep};

/// Plays `script` against `engine`, then keeps ticking for `linger`.
///
/// Returns the engine in its final state.
///
/// # Errors
///
/// Returns the first error raised by [`Engine::handle`].
#[instrument(skip_all, fields(steps = script.steps.len(), frame = ?frame))]
pub async fn run(
    mut engine: Engine,
    script: &Script,
    frame: Duration,
    linger: Duration,
) -> Result<Engine, AppError> {
    let start = Instant::now();
    let (tx, mut rx) = mpsc::channel(64);
    let player = tokio::spawn(play(script.steps.clone(), start, tx));

    let mut frames = time::interval_at(start + frame, frame);
    frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut seconds = time::interval_at(start + Duration::from_secs(1), Duration::from_secs(1));
    seconds.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let deadline = time::sleep_until(start + Duration::from_millis(script.duration_ms()) + linger);
    tokio::pin!(deadline);

    info!(mode = %engine.mode(), "playback started");
    let mut handled: u64 = 0;
    loop {
        tokio::select! {
            biased;
            Some(step) = rx.recv() => {
                let ScriptStep { at_ms, event } = step;
                engine.handle(EngineInput::Ui { event, at_ms })?;
                handled += 1;
            }
            _ = frames.tick() => engine.handle(EngineInput::Frame(frame))?,
            _ = seconds.tick() => engine.handle(EngineInput::ClockSecond)?,
            () = &mut deadline => break,
        }
    }
    player.abort();

    info!(
        handled,
        stage = %engine.session().current_stage(),
        finished = engine.session().is_finished(),
        "playback finished"
    );
    Ok(engine)
}

async fn play(steps: Vec<ScriptStep>, start: Instant, tx: mpsc::Sender<ScriptStep>) {
    for step in steps {
        time::sleep_until(start + Duration::from_millis(step.at_ms)).await;
        if tx.send(step).await.is_err() {
            break;
        }
    }
}

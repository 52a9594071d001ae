//! Diancha headless runtime entry point.

use std::error::Error;
use std::sync::Arc;

use diancha_core::clock::SystemClock;
use diancha_runtime::config::AppConfig;
use diancha_runtime::driver;
use diancha_runtime::engine::{Engine, load_content};
use diancha_runtime::layout::SceneLayout;
use diancha_runtime::script::Script;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Diancha ritual runtime");

    // Read configuration from environment.
    let config = AppConfig::from_env()?;

    let script = match &config.script {
        Some(path) => Script::load(path).await?,
        None => Script::demo()?,
    };
    let content = load_content(config.content.as_deref()).await?;

    // Lay out the scene, applying any overrides from the script.
    let layout = SceneLayout::standard();
    layout.apply(&script.layout);

    let engine = Engine::new(
        config.mode,
        layout.bindings(),
        content,
        config.challenge_seconds,
        Arc::new(SystemClock),
    )?;

    let engine = driver::run(engine, &script, config.frame, config.linger).await?;

    println!("{}", serde_json::to_string_pretty(&engine.view())?);

    Ok(())
}

//! Consilium console host entry point.
//!
//! Wires the decision loop to terminal collaborators: synthetic frames,
//! stdin as the speech source (type a line containing the trigger phrase
//! to fire the voice override) and a log-line overlay. Ctrl-C stops the
//! engine and prints a session summary.

mod presenter;
mod settings;
mod speech;

use consilium_core::inference::stub::StubModel;
use consilium_core::{ConsiliumEngine, ModelHandle, SyntheticFrames};
use presenter::TerminalOverlay;
use speech::StdinSpeech;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "onnx")]
fn build_model(settings: &settings::AppSettings) -> ModelHandle {
    use consilium_core::{OnnxModelConfig, OnnxStrategyModel};

    match &settings.model_path {
        Some(path) => {
            info!(path = %path.display(), "using ONNX strategy classifier");
            ModelHandle::new(OnnxStrategyModel::new(OnnxModelConfig::new(path)))
        }
        None => {
            info!("no modelPath configured — using stub scores");
            ModelHandle::new(StubModel::new())
        }
    }
}

#[cfg(not(feature = "onnx"))]
fn build_model(settings: &settings::AppSettings) -> ModelHandle {
    if settings.model_path.is_some() {
        tracing::warn!("modelPath set but built without the onnx feature — using stub scores");
    }
    ModelHandle::new(StubModel::new())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings_path = settings::default_settings_path();
    let settings = settings::load_settings(&settings_path);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.clone())),
        )
        .init();
    info!(path = %settings_path.display(), "settings loaded");

    let engine = ConsiliumEngine::new(
        settings.engine_config(),
        build_model(&settings),
        Box::new(SyntheticFrames::new()),
        Box::new(StdinSpeech::new()),
        Box::new(TerminalOverlay),
    );

    // Forward engine events to the log.
    let mut status_rx = engine.subscribe_status();
    tokio::spawn(async move {
        while let Ok(event) = status_rx.recv().await {
            info!(status = ?event.status, detail = ?event.detail, "engine status");
        }
    });
    let mut decisions_rx = engine.subscribe_decisions();
    tokio::spawn(async move {
        while let Ok(event) = decisions_rx.recv().await {
            info!(
                generation = event.generation,
                source = ?event.source,
                suggestion = event.decision.suggestion.label(),
                "decision applied"
            );
        }
    });

    engine.start()?;
    info!(
        trigger = %settings.trigger_phrase,
        "type a line containing the trigger phrase to override; Ctrl-C to exit"
    );

    tokio::signal::ctrl_c().await?;
    engine.stop()?;

    let snap = engine.diagnostics_snapshot();
    info!(
        ticks = snap.ticks,
        decisions_applied = snap.decisions_applied,
        overrides_applied = snap.overrides_applied,
        capture_errors = snap.capture_errors,
        inference_errors = snap.inference_errors,
        history_entries = engine.action_history_len(),
        "session summary"
    );
    Ok(())
}

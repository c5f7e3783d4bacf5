//! `ConsiliumEngine` — top-level lifecycle controller.
//!
//! ## Lifecycle
//!
//! ```text
//! ConsiliumEngine::new()
//!     └─► start()        → model warm-up, loop spawned, status = Running
//!         └─► stop()     → producers torn down, sink closed, status = Stopped
//! ```
//!
//! `Stopped` is terminal: producers and the presenter are released, and a
//! later `start()` is rejected. `stop()` itself is idempotent.
//!
//! ## Threading
//!
//! The decision loop is a blocking thread hosted in `spawn_blocking`; the
//! frame provider moves into it at start. The speech source stays with the
//! engine so `stop()` can unregister it from any thread, and the sink's
//! close latch guarantees no decision application lands after `stop()`
//! returns even if a cycle is mid-flight.

pub mod cycle;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    capture::FrameProvider,
    decision::Decision,
    error::{ConsiliumError, Result},
    events::{DecisionEvent, EngineStatus, EngineStatusEvent},
    inference::ModelHandle,
    overlay::OverlayPresenter,
    recorder::{ActionRecorder, GameAction},
    sink::DecisionSink,
    voice::SpeechSource,
};

/// Broadcast channel capacity: 256 events buffered for slow consumers.
const BROADCAST_CAP: usize = 256;

/// Configuration for `ConsiliumEngine`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Delay between the end of one sampler tick's work and the start of
    /// the next (fixed-delay scheduling). Default: 1000 ms.
    pub tick_interval: std::time::Duration,
    /// Maximum entries retained in the action history ring. Default: 1000.
    pub history_capacity: usize,
    /// Case-sensitive substring a final transcript must contain to trigger
    /// the voice override. Default: "commander".
    pub trigger_phrase: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval: std::time::Duration::from_millis(1_000),
            history_capacity: 1_000,
            trigger_phrase: "commander".into(),
        }
    }
}

/// The top-level engine handle.
///
/// `ConsiliumEngine` is `Send + Sync` — all fields use interior mutability.
/// Wrap in `Arc<ConsiliumEngine>` to share between the host shell and
/// event-forwarding async tasks.
pub struct ConsiliumEngine {
    config: EngineConfig,
    model: ModelHandle,
    /// Moves into the loop thread at `start()`.
    frames: Mutex<Option<Box<dyn FrameProvider>>>,
    speech: Mutex<Box<dyn SpeechSource>>,
    sink: Arc<DecisionSink>,
    recorder: Arc<ActionRecorder>,
    /// `true` while the decision loop is active.
    running: Arc<AtomicBool>,
    /// Latched by the first `stop()`; `Stopped` is terminal.
    stopped: AtomicBool,
    /// Canonical status (written via Mutex, read from the host).
    status: Arc<Mutex<EngineStatus>>,
    /// Broadcast sender for decision events (shared with the sink).
    decision_tx: broadcast::Sender<DecisionEvent>,
    /// Broadcast sender for status events.
    status_tx: broadcast::Sender<EngineStatusEvent>,
    /// Wakes the loop out of its select on stop.
    stop_tx: Mutex<Option<Sender<()>>>,
    /// Shared loop diagnostics counters.
    diagnostics: Arc<cycle::CycleDiagnostics>,
}

impl ConsiliumEngine {
    /// Create a new engine. Does not start the loop — call `start()`.
    pub fn new(
        config: EngineConfig,
        model: ModelHandle,
        frames: Box<dyn FrameProvider>,
        speech: Box<dyn SpeechSource>,
        presenter: Box<dyn OverlayPresenter>,
    ) -> Self {
        let (decision_tx, _) = broadcast::channel(BROADCAST_CAP);
        let (status_tx, _) = broadcast::channel(BROADCAST_CAP);
        let recorder = Arc::new(ActionRecorder::new(config.history_capacity));
        let sink = Arc::new(DecisionSink::new(
            presenter,
            Arc::clone(&recorder),
            decision_tx.clone(),
        ));
        let diagnostics = Arc::new(cycle::CycleDiagnostics::default());

        Self {
            config,
            model,
            frames: Mutex::new(Some(frames)),
            speech: Mutex::new(speech),
            sink,
            recorder,
            running: Arc::new(AtomicBool::new(false)),
            stopped: AtomicBool::new(false),
            status: Arc::new(Mutex::new(EngineStatus::Idle)),
            decision_tx,
            status_tx,
            stop_tx: Mutex::new(None),
            diagnostics,
        }
    }

    /// Start the capture sampler and the voice command channel.
    ///
    /// Blocks until the model is warmed up, then returns with the loop
    /// running in a background blocking thread. A speech source that fails
    /// to start degrades the engine to sampler-only operation; a model
    /// that fails to load is fatal and no loop runs.
    ///
    /// # Errors
    /// - `ConsiliumError::EngineStopped` after a terminal `stop()`.
    /// - `ConsiliumError::AlreadyRunning` if already started.
    /// - `ConsiliumError::ModelLoad` if the model cannot be loaded.
    pub fn start(&self) -> Result<()> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(ConsiliumError::EngineStopped);
        }
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ConsiliumError::AlreadyRunning);
        }

        self.set_status(EngineStatus::WarmingUp, None);
        info!("warming up strategy model");
        if let Err(e) = self.model.0.lock().warm_up() {
            self.running.store(false, Ordering::SeqCst);
            self.set_status(EngineStatus::Error, Some(e.to_string()));
            return Err(ConsiliumError::ModelLoad(e.to_string()));
        }
        info!("strategy model ready");

        let frames = match self.frames.lock().take() {
            Some(frames) => frames,
            None => {
                self.running.store(false, Ordering::SeqCst);
                self.set_status(EngineStatus::Error, Some("frame provider missing".into()));
                return Err(ConsiliumError::Other(anyhow::anyhow!(
                    "frame provider already consumed"
                )));
            }
        };

        let (voice_tx, voice_rx) = crossbeam_channel::unbounded();
        if let Err(e) = self.speech.lock().start(voice_tx) {
            warn!(error = %e, "speech source failed to start — running sampler-only");
        }

        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
        *self.stop_tx.lock() = Some(stop_tx);

        self.diagnostics.reset();

        let ctx = cycle::CycleContext {
            config: self.config.clone(),
            model: self.model.clone(),
            frames,
            voice_rx,
            stop_rx,
            running: Arc::clone(&self.running),
            sink: Arc::clone(&self.sink),
            diagnostics: Arc::clone(&self.diagnostics),
        };

        tokio::task::spawn_blocking(move || cycle::run(ctx));

        self.set_status(EngineStatus::Running, None);
        info!("engine started");
        Ok(())
    }

    /// Tear down both producers and release the presenter binding.
    ///
    /// Idempotent. After `stop()` returns, no further decision reaches the
    /// overlay and the action history stops growing, even if a cycle was
    /// mid-flight. The engine cannot be restarted.
    pub fn stop(&self) -> Result<()> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        self.running.store(false, Ordering::SeqCst);
        self.speech.lock().stop();
        if let Some(stop_tx) = self.stop_tx.lock().take() {
            let _ = stop_tx.try_send(());
        }
        // Closing the sink is the hard guarantee: anything still in flight
        // on the loop thread is rejected at the serialization point.
        self.sink.close();
        self.set_status(EngineStatus::Stopped, None);
        info!("engine stopped");
        Ok(())
    }

    /// Current engine status (snapshot).
    pub fn status(&self) -> EngineStatus {
        *self.status.lock()
    }

    /// Subscribe to applied-decision events.
    pub fn subscribe_decisions(&self) -> broadcast::Receiver<DecisionEvent> {
        self.decision_tx.subscribe()
    }

    /// Subscribe to status change events.
    pub fn subscribe_status(&self) -> broadcast::Receiver<EngineStatusEvent> {
        self.status_tx.subscribe()
    }

    /// The decision currently displayed on the overlay.
    pub fn current_decision(&self) -> Decision {
        self.sink.current_decision()
    }

    /// Generation of the currently displayed decision.
    pub fn last_generation(&self) -> u64 {
        self.sink.last_generation()
    }

    /// Chronological copy of the action history, oldest first.
    pub fn action_history(&self) -> Vec<GameAction> {
        self.recorder.snapshot()
    }

    /// Number of entries currently in the action history.
    pub fn action_history_len(&self) -> usize {
        self.recorder.len()
    }

    /// Snapshot of loop counters for observability.
    pub fn diagnostics_snapshot(&self) -> cycle::DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    fn set_status(&self, new_status: EngineStatus, detail: Option<String>) {
        *self.status.lock() = new_status;
        let _ = self.status_tx.send(EngineStatusEvent {
            status: new_status,
            detail,
        });
    }
}

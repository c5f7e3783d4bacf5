//! Blocking decision loop.
//!
//! ## Per-iteration shape
//!
//! ```text
//! select {
//!   stop signal     → exit
//!   tick timer      → capture → features → score → synthesize → sink → record
//!                     then re-arm the timer (fixed-delay)
//!   voice event     → Final transcript? → override check → sink
//! }
//! ```
//!
//! One thread consumes both event sources, so every write to the sink and
//! the recorder is serialised without further locking discipline at the
//! call sites. The tick timer is re-armed only after a tick's work
//! completes — fixed-delay, not fixed-rate, so slow cycles push later
//! ticks back rather than bunching them. This drift is deliberate and
//! matches the scheduling contract the overlay was built against.
//!
//! The loop runs in `spawn_blocking`, keeping the host's async executor
//! free for event forwarding.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use crossbeam_channel::{after, never, Receiver};
use tracing::{debug, error, info, warn};

use crate::{
    capture::features::{extract_features, locate_enemies},
    capture::FrameProvider,
    decision::{synthesize, synthesize_override},
    engine::EngineConfig,
    events::DecisionSource,
    inference::ModelHandle,
    sink::DecisionSink,
    voice::VoiceEvent,
};

pub struct CycleDiagnostics {
    pub ticks: AtomicUsize,
    pub capture_errors: AtomicUsize,
    pub inference_calls: AtomicUsize,
    pub inference_errors: AtomicUsize,
    pub decisions_applied: AtomicUsize,
    pub decisions_rejected: AtomicUsize,
    pub actions_recorded: AtomicUsize,
    pub voice_events: AtomicUsize,
    pub voice_errors: AtomicUsize,
    pub overrides_applied: AtomicUsize,
}

impl Default for CycleDiagnostics {
    fn default() -> Self {
        Self {
            ticks: AtomicUsize::new(0),
            capture_errors: AtomicUsize::new(0),
            inference_calls: AtomicUsize::new(0),
            inference_errors: AtomicUsize::new(0),
            decisions_applied: AtomicUsize::new(0),
            decisions_rejected: AtomicUsize::new(0),
            actions_recorded: AtomicUsize::new(0),
            voice_events: AtomicUsize::new(0),
            voice_errors: AtomicUsize::new(0),
            overrides_applied: AtomicUsize::new(0),
        }
    }
}

impl CycleDiagnostics {
    pub fn reset(&self) {
        self.ticks.store(0, Ordering::Relaxed);
        self.capture_errors.store(0, Ordering::Relaxed);
        self.inference_calls.store(0, Ordering::Relaxed);
        self.inference_errors.store(0, Ordering::Relaxed);
        self.decisions_applied.store(0, Ordering::Relaxed);
        self.decisions_rejected.store(0, Ordering::Relaxed);
        self.actions_recorded.store(0, Ordering::Relaxed);
        self.voice_events.store(0, Ordering::Relaxed);
        self.voice_errors.store(0, Ordering::Relaxed);
        self.overrides_applied.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            capture_errors: self.capture_errors.load(Ordering::Relaxed),
            inference_calls: self.inference_calls.load(Ordering::Relaxed),
            inference_errors: self.inference_errors.load(Ordering::Relaxed),
            decisions_applied: self.decisions_applied.load(Ordering::Relaxed),
            decisions_rejected: self.decisions_rejected.load(Ordering::Relaxed),
            actions_recorded: self.actions_recorded.load(Ordering::Relaxed),
            voice_events: self.voice_events.load(Ordering::Relaxed),
            voice_errors: self.voice_errors.load(Ordering::Relaxed),
            overrides_applied: self.overrides_applied.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DiagnosticsSnapshot {
    pub ticks: usize,
    pub capture_errors: usize,
    pub inference_calls: usize,
    pub inference_errors: usize,
    pub decisions_applied: usize,
    pub decisions_rejected: usize,
    pub actions_recorded: usize,
    pub voice_events: usize,
    pub voice_errors: usize,
    pub overrides_applied: usize,
}

/// All context the loop needs, passed as one struct so the closure stays tidy.
pub struct CycleContext {
    pub config: EngineConfig,
    pub model: ModelHandle,
    pub frames: Box<dyn FrameProvider>,
    pub voice_rx: Receiver<VoiceEvent>,
    pub stop_rx: Receiver<()>,
    pub running: Arc<AtomicBool>,
    pub sink: Arc<DecisionSink>,
    pub diagnostics: Arc<CycleDiagnostics>,
}

/// Run the blocking loop until stopped.
pub fn run(mut ctx: CycleContext) {
    info!(
        interval_ms = ctx.config.tick_interval.as_millis() as u64,
        "decision loop started"
    );

    let interval = ctx.config.tick_interval;
    let stop_rx = ctx.stop_rx.clone();
    let mut voice_rx = ctx.voice_rx.clone();

    // The first tick fires immediately; later ticks are re-armed after
    // each tick's work completes (fixed-delay).
    let mut next_tick = after(std::time::Duration::ZERO);

    loop {
        if !ctx.running.load(Ordering::Relaxed) {
            break;
        }

        crossbeam_channel::select! {
            recv(stop_rx) -> _ => break,
            recv(next_tick) -> _ => {
                run_cycle(&mut ctx);
                next_tick = after(interval);
            }
            recv(voice_rx) -> event => match event {
                Ok(event) => handle_voice_event(&mut ctx, event),
                Err(_) => {
                    // Speech source dropped its sender; park this select
                    // arm instead of spinning on a closed channel.
                    debug!("voice channel closed — continuing sampler-only");
                    voice_rx = never();
                }
            },
        }
    }

    let snap = ctx.diagnostics.snapshot();
    info!(
        ticks = snap.ticks,
        capture_errors = snap.capture_errors,
        inference_calls = snap.inference_calls,
        inference_errors = snap.inference_errors,
        decisions_applied = snap.decisions_applied,
        decisions_rejected = snap.decisions_rejected,
        actions_recorded = snap.actions_recorded,
        voice_events = snap.voice_events,
        voice_errors = snap.voice_errors,
        overrides_applied = snap.overrides_applied,
        "decision loop stopped — diagnostics"
    );
}

/// One sampler cycle: frame → features → scores → decision → sink + log.
fn run_cycle(ctx: &mut CycleContext) {
    ctx.diagnostics.ticks.fetch_add(1, Ordering::Relaxed);

    let frame = match ctx.frames.capture_frame() {
        Ok(frame) => frame,
        Err(e) => {
            ctx.diagnostics.capture_errors.fetch_add(1, Ordering::Relaxed);
            warn!(error = %e, "frame capture failed — skipping this cycle");
            return;
        }
    };

    let features = extract_features(&frame);

    ctx.diagnostics.inference_calls.fetch_add(1, Ordering::Relaxed);
    let scores = {
        let mut model = ctx.model.0.lock();
        match model.score(&features) {
            Ok(scores) => scores,
            Err(e) => {
                ctx.diagnostics.inference_errors.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, "inference failed — skipping this cycle");
                return;
            }
        }
    };

    let class_index = scores.best_index();
    let enemies = locate_enemies(&frame);
    let decision = synthesize(class_index, enemies);
    let label = decision.suggestion.label();

    // Applying the decision and logging the action happen inside the
    // sink's critical section, so a concurrent stop() cannot split them.
    match ctx
        .sink
        .submit(decision, DecisionSource::Sampler, Some(frame.frame_ref()))
    {
        Some(generation) => {
            ctx.diagnostics.decisions_applied.fetch_add(1, Ordering::Relaxed);
            ctx.diagnostics.actions_recorded.fetch_add(1, Ordering::Relaxed);
            debug!(generation, suggestion = label, frame = frame.seq, "cycle decision applied");
        }
        None => {
            ctx.diagnostics.decisions_rejected.fetch_add(1, Ordering::Relaxed);
            debug!("sink closed — cycle decision dropped");
        }
    }
}

fn handle_voice_event(ctx: &mut CycleContext, event: VoiceEvent) {
    ctx.diagnostics.voice_events.fetch_add(1, Ordering::Relaxed);

    match event {
        VoiceEvent::Ready => debug!("speech source listening"),
        VoiceEvent::Partial(text) => {
            debug!(chars = text.chars().count(), "partial transcript ignored");
        }
        VoiceEvent::Final(text) => {
            match synthesize_override(&text, &ctx.config.trigger_phrase) {
                Some(decision) => {
                    match ctx.sink.submit(decision, DecisionSource::Voice, None) {
                        Some(generation) => {
                            ctx.diagnostics.overrides_applied.fetch_add(1, Ordering::Relaxed);
                            info!(generation, "voice override applied");
                        }
                        None => {
                            ctx.diagnostics.decisions_rejected.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
                None => debug!("final transcript without trigger phrase"),
            }
        }
        VoiceEvent::Error(code) => {
            ctx.diagnostics.voice_errors.fetch_add(1, Ordering::Relaxed);
            warn!(code, "speech recognition error — listening continues");
        }
    }
}

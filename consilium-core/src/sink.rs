//! Decision sink — the single serialization point between producers.
//!
//! Both the capture sampler and the voice channel end here. Generations
//! are assigned inside the critical section (never by producers), so
//! competing submissions get a total order and the overlay can never
//! revert to an older decision. The action log is written under the same
//! lock: an applied decision and its history entry are one atomic step.
//! `close()` flips a latch under that lock too, which is what gives
//! `stop()` its postcondition — once close returns, no render and no
//! history append can happen.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

use crate::capture::FrameRef;
use crate::decision::Decision;
use crate::events::{DecisionEvent, DecisionSource};
use crate::overlay::OverlayPresenter;
use crate::recorder::ActionRecorder;

struct SinkState {
    presenter: Box<dyn OverlayPresenter>,
    /// Generation of the decision currently displayed; 0 = none yet.
    last_generation: u64,
    current: Option<Decision>,
    closed: bool,
}

/// Generation-guarded funnel in front of the overlay presenter.
pub struct DecisionSink {
    state: Mutex<SinkState>,
    recorder: Arc<ActionRecorder>,
    decision_tx: broadcast::Sender<DecisionEvent>,
}

impl DecisionSink {
    pub fn new(
        presenter: Box<dyn OverlayPresenter>,
        recorder: Arc<ActionRecorder>,
        decision_tx: broadcast::Sender<DecisionEvent>,
    ) -> Self {
        Self {
            state: Mutex::new(SinkState {
                presenter,
                last_generation: 0,
                current: None,
                closed: false,
            }),
            recorder,
            decision_tx,
        }
    }

    /// Assign the next generation and apply the decision. When `frame` is
    /// given, the application is also logged to the action history —
    /// inside the same critical section, so the log can never outlive a
    /// close.
    ///
    /// Returns the generation on success, `None` once the sink is closed.
    pub fn submit(
        &self,
        decision: Decision,
        source: DecisionSource,
        frame: Option<FrameRef>,
    ) -> Option<u64> {
        let label = decision.suggestion.label();
        let mut state = self.state.lock();
        if state.closed {
            return None;
        }
        let generation = state.last_generation + 1;
        if !self.apply_locked(&mut state, decision, generation, source) {
            return None;
        }
        if let Some(frame_ref) = frame {
            self.recorder.record(label, frame_ref);
        }
        Some(generation)
    }

    /// Apply a decision under an externally known generation.
    ///
    /// Applies only if `generation` is strictly greater than the last
    /// applied one; stale and replayed submissions are discarded with no
    /// observable effect. Returns whether the decision was applied.
    pub fn apply(&self, decision: Decision, generation: u64, source: DecisionSource) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        self.apply_locked(&mut state, decision, generation, source)
    }

    fn apply_locked(
        &self,
        state: &mut SinkState,
        decision: Decision,
        generation: u64,
        source: DecisionSource,
    ) -> bool {
        if generation <= state.last_generation {
            debug!(
                generation,
                last = state.last_generation,
                "stale decision discarded"
            );
            return false;
        }
        state.last_generation = generation;
        state.presenter.render(&decision);
        state.current = Some(decision.clone());
        let _ = self.decision_tx.send(DecisionEvent {
            generation,
            source,
            decision,
        });
        true
    }

    /// Tear down the presenter and reject all further submissions.
    /// Idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        state.presenter.teardown();
    }

    /// The decision currently displayed; `Default` (unknown, no markers)
    /// before the first application.
    pub fn current_decision(&self) -> Decision {
        self.state.lock().current.clone().unwrap_or_default()
    }

    /// Generation of the currently displayed decision.
    pub fn last_generation(&self) -> u64 {
        self.state.lock().last_generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::Suggestion;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Presenter that records every render and teardown for assertions.
    struct InstrumentedPresenter {
        renders: Arc<Mutex<Vec<Decision>>>,
        teardowns: Arc<AtomicUsize>,
    }

    impl OverlayPresenter for InstrumentedPresenter {
        fn render(&mut self, decision: &Decision) {
            self.renders.lock().push(decision.clone());
        }

        fn teardown(&mut self) {
            self.teardowns.fetch_add(1, Ordering::Relaxed);
        }
    }

    struct Fixture {
        sink: DecisionSink,
        recorder: Arc<ActionRecorder>,
        renders: Arc<Mutex<Vec<Decision>>>,
        teardowns: Arc<AtomicUsize>,
        events: broadcast::Receiver<DecisionEvent>,
    }

    fn fixture() -> Fixture {
        let renders = Arc::new(Mutex::new(Vec::new()));
        let teardowns = Arc::new(AtomicUsize::new(0));
        let recorder = Arc::new(ActionRecorder::new(16));
        let (tx, events) = broadcast::channel(16);
        let sink = DecisionSink::new(
            Box::new(InstrumentedPresenter {
                renders: Arc::clone(&renders),
                teardowns: Arc::clone(&teardowns),
            }),
            Arc::clone(&recorder),
            tx,
        );
        Fixture {
            sink,
            recorder,
            renders,
            teardowns,
            events,
        }
    }

    fn decision(suggestion: Suggestion) -> Decision {
        Decision::new(suggestion, Vec::new())
    }

    #[test]
    fn submit_assigns_strictly_increasing_generations() {
        let f = fixture();
        let first = f
            .sink
            .submit(decision(Suggestion::Attack), DecisionSource::Sampler, None);
        let second = f
            .sink
            .submit(decision(Suggestion::Push), DecisionSource::Voice, None);
        assert_eq!(first, Some(1));
        assert_eq!(second, Some(2));
        assert_eq!(f.sink.last_generation(), 2);
        assert_eq!(f.renders.lock().len(), 2);
        assert_eq!(f.sink.current_decision().suggestion, Suggestion::Push);
    }

    #[test]
    fn submit_with_a_frame_logs_the_action_atomically() {
        let f = fixture();
        f.sink.submit(
            decision(Suggestion::Defend),
            DecisionSource::Sampler,
            Some(FrameRef(42)),
        );
        f.sink
            .submit(decision(Suggestion::Push), DecisionSource::Voice, None);

        let log = f.recorder.snapshot();
        assert_eq!(log.len(), 1, "voice overrides carry no frame to log");
        assert_eq!(log[0].label, "defend");
        assert_eq!(log[0].frame_ref, FrameRef(42));
    }

    #[test]
    fn stale_generations_never_revert_the_displayed_decision() {
        let f = fixture();
        assert!(f
            .sink
            .apply(decision(Suggestion::Defend), 5, DecisionSource::Sampler));
        assert!(!f
            .sink
            .apply(decision(Suggestion::Attack), 5, DecisionSource::Voice));
        assert!(!f
            .sink
            .apply(decision(Suggestion::Attack), 3, DecisionSource::Voice));
        assert_eq!(f.sink.current_decision().suggestion, Suggestion::Defend);
        assert_eq!(f.renders.lock().len(), 1);
    }

    #[test]
    fn replaying_the_same_application_has_no_additional_effect() {
        let f = fixture();
        assert!(f
            .sink
            .apply(decision(Suggestion::Attack), 1, DecisionSource::Sampler));
        assert!(!f
            .sink
            .apply(decision(Suggestion::Attack), 1, DecisionSource::Sampler));
        assert_eq!(f.renders.lock().len(), 1);
        assert_eq!(f.sink.last_generation(), 1);
    }

    #[test]
    fn close_rejects_everything_and_tears_down_once() {
        let f = fixture();
        f.sink
            .submit(decision(Suggestion::Attack), DecisionSource::Sampler, None);
        f.sink.close();
        f.sink.close();
        assert_eq!(f.teardowns.load(Ordering::Relaxed), 1);
        assert_eq!(
            f.sink.submit(
                decision(Suggestion::Push),
                DecisionSource::Voice,
                Some(FrameRef(7))
            ),
            None
        );
        assert!(!f
            .sink
            .apply(decision(Suggestion::Push), 99, DecisionSource::Voice));
        assert_eq!(f.renders.lock().len(), 1);
        assert!(f.recorder.is_empty(), "no history append after close");
        assert_eq!(f.sink.current_decision().suggestion, Suggestion::Attack);
    }

    #[test]
    fn current_decision_defaults_to_unknown_before_first_application() {
        let f = fixture();
        let current = f.sink.current_decision();
        assert_eq!(current.suggestion, Suggestion::Unknown);
        assert!(current.enemies.is_empty());
        assert_eq!(f.sink.last_generation(), 0);
    }

    #[test]
    fn applied_decisions_are_broadcast_to_subscribers() {
        let mut f = fixture();
        f.sink
            .submit(decision(Suggestion::Defend), DecisionSource::Sampler, None);
        let event = f.events.try_recv().expect("broadcast event");
        assert_eq!(event.generation, 1);
        assert_eq!(event.source, DecisionSource::Sampler);
        assert_eq!(event.decision.suggestion, Suggestion::Defend);
    }
}

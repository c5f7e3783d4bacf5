//! Voice command channel.
//!
//! The speech-recognition primitive is an external collaborator. It pushes
//! `VoiceEvent`s into a channel the decision loop selects over, so voice
//! input and sampler ticks are consumed by a single thread — one tagged
//! event type on one queue instead of a listener object with per-callback
//! methods.

use crossbeam_channel::Sender;

use crate::error::Result;

/// Events produced by a speech-recognition backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    /// The recogniser is listening.
    Ready,
    /// A streaming partial hypothesis. The core ignores these.
    Partial(String),
    /// A committed final transcript; drives the override path.
    Final(String),
    /// A recognition error. Recoverable: listening continues.
    Error(i32),
}

/// Contract for speech-recognition backends.
pub trait SpeechSource: Send + 'static {
    /// Begin listening and deliver events on `events` until `stop` is
    /// called. The sender should be dropped when listening ends so the
    /// consumer can observe channel closure.
    ///
    /// # Errors
    /// Returns an error if the backend cannot start listening. The engine
    /// treats this as degraded operation (sampler-only), not as a startup
    /// failure.
    fn start(&mut self, events: Sender<VoiceEvent>) -> Result<()>;

    /// Stop listening and discard in-flight state. Idempotent.
    fn stop(&mut self);
}

/// Speech source that never produces transcripts.
///
/// Default collaborator for hosts without a recogniser; emits `Ready` once
/// so subscribers can distinguish "no STT wired" from "STT wedged".
pub struct SilentSpeech {
    events: Option<Sender<VoiceEvent>>,
}

impl SilentSpeech {
    pub fn new() -> Self {
        Self { events: None }
    }
}

impl Default for SilentSpeech {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechSource for SilentSpeech {
    fn start(&mut self, events: Sender<VoiceEvent>) -> Result<()> {
        let _ = events.send(VoiceEvent::Ready);
        self.events = Some(events);
        Ok(())
    }

    fn stop(&mut self) {
        // Dropping the sender closes the channel on the consumer side.
        self.events = None;
    }
}

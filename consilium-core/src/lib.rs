//! # consilium-core
//!
//! Reusable strategy-assistant decision loop SDK.
//!
//! ## Architecture
//!
//! ```text
//! FrameProvider ──tick (fixed delay)──► StrategyModel::score
//!                                              │
//!                                     argmax → synthesize
//!                                              │
//! SpeechSource ──VoiceEvent──► override ──► DecisionSink (generation guard)
//!                                              │            │
//!                                  OverlayPresenter    ActionRecorder
//! ```
//!
//! Both producers — the periodic capture sampler and the asynchronous
//! voice channel — funnel into one consumer thread, and the sink assigns
//! a generation to each applied decision so the overlay can never revert
//! to an older one.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod capture;
pub mod decision;
pub mod engine;
pub mod error;
pub mod events;
pub mod inference;
pub mod overlay;
pub mod recorder;
pub mod sink;
pub mod voice;

// Convenience re-exports for downstream crates
pub use capture::{Frame, FrameProvider, FrameRef, SyntheticFrames};
pub use decision::{Decision, Enemy, Suggestion};
pub use engine::{ConsiliumEngine, EngineConfig};
pub use error::ConsiliumError;
pub use events::{DecisionEvent, DecisionSource, EngineStatus, EngineStatusEvent};
pub use inference::{ModelHandle, ScoreVector, StrategyModel};
pub use overlay::OverlayPresenter;
pub use recorder::{ActionRecorder, GameAction};
pub use voice::{SilentSpeech, SpeechSource, VoiceEvent};

#[cfg(feature = "onnx")]
pub use inference::{OnnxModelConfig, OnnxStrategyModel};

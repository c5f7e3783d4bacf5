//! Event types emitted to engine subscribers.
//!
//! | Event | Channel |
//! |-------|---------|
//! | `DecisionEvent` | `ConsiliumEngine::subscribe_decisions` |
//! | `EngineStatusEvent` | `ConsiliumEngine::subscribe_status` |
//!
//! All types serialise with camelCase fields and lowercase enum variants
//! so hosts can forward them over whatever bus they use unchanged.

use serde::{Deserialize, Serialize};

use crate::decision::Decision;

/// Which producer a decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionSource {
    /// The periodic capture sampler.
    Sampler,
    /// A voice-command override.
    Voice,
}

/// Emitted whenever the sink applies a decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionEvent {
    /// Generation the sink assigned at application time. Strictly
    /// increasing across all sources.
    pub generation: u64,
    pub source: DecisionSource,
    pub decision: Decision,
}

/// Current state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    /// Engine created but `start()` not yet called.
    Idle,
    /// Loading/validating the strategy model.
    WarmingUp,
    /// Decision loop and voice channel active.
    Running,
    /// Terminal: producers torn down, restart rejected.
    Stopped,
    /// Startup failed — model could not be loaded.
    Error,
}

/// Emitted when the engine state changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatusEvent {
    pub status: EngineStatus,
    /// Optional human-readable detail (e.g. error message).
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{Enemy, Suggestion};

    #[test]
    fn decision_event_serializes_with_camel_case_and_lowercase_source() {
        let event = DecisionEvent {
            generation: 7,
            source: DecisionSource::Voice,
            decision: Decision::new(
                Suggestion::Push,
                vec![Enemy {
                    id: "hostile-1".into(),
                    x: 200,
                    y: 400,
                }],
            ),
        };

        let json = serde_json::to_value(&event).expect("serialize decision event");
        assert_eq!(json["generation"], 7);
        assert_eq!(json["source"], "voice");
        assert_eq!(json["decision"]["suggestion"], "push");
        assert_eq!(json["decision"]["enemies"][0]["id"], "hostile-1");

        let round_trip: DecisionEvent =
            serde_json::from_value(json).expect("deserialize decision event");
        assert_eq!(round_trip.generation, 7);
        assert_eq!(round_trip.source, DecisionSource::Voice);
        assert_eq!(round_trip.decision.suggestion, Suggestion::Push);
    }

    #[test]
    fn engine_status_event_serializes_with_lowercase_status() {
        let event = EngineStatusEvent {
            status: EngineStatus::WarmingUp,
            detail: Some("loading model".into()),
        };

        let json = serde_json::to_value(&event).expect("serialize status event");
        assert_eq!(json["status"], "warmingup");
        assert_eq!(json["detail"], "loading model");

        let round_trip: EngineStatusEvent =
            serde_json::from_value(json).expect("deserialize status event");
        assert_eq!(round_trip.status, EngineStatus::WarmingUp);
        assert_eq!(round_trip.detail.as_deref(), Some("loading model"));
    }

    #[test]
    fn decision_source_rejects_non_lowercase_values() {
        let invalid = r#""Sampler""#;
        let err = serde_json::from_str::<DecisionSource>(invalid);
        assert!(err.is_err(), "expected invalid casing to fail");
    }
}

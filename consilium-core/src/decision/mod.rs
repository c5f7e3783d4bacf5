//! Decision synthesis.
//!
//! Pure functions from inference output (a strategy class index) and
//! auxiliary marker data to the `Decision` value the overlay renders.
//! The voice override path lives here too: a final transcript either
//! matches the trigger phrase and yields a fixed advisory decision, or
//! it yields nothing and the currently displayed decision stands.

use serde::{Deserialize, Serialize};

/// The strategic suggestion rendered to the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suggestion {
    /// Press the advantage.
    Attack,
    /// Hold position and play safe.
    Defend,
    /// Commit to objectives.
    Push,
    /// No classification yet (initial overlay state).
    #[default]
    Unknown,
}

impl Suggestion {
    /// Map a classifier output index to a suggestion.
    ///
    /// The mapping is total: index 0 and 1 have dedicated meanings and every
    /// other index (including anything out of range) maps to `Push`.
    pub fn from_class_index(index: usize) -> Self {
        match index {
            0 => Suggestion::Attack,
            1 => Suggestion::Defend,
            _ => Suggestion::Push,
        }
    }

    /// Stable string label, used for the action log.
    pub fn label(self) -> &'static str {
        match self {
            Suggestion::Attack => "attack",
            Suggestion::Defend => "defend",
            Suggestion::Push => "push",
            Suggestion::Unknown => "unknown",
        }
    }
}

/// A hostile marker in overlay coordinate space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enemy {
    pub id: String,
    pub x: i32,
    pub y: i32,
}

/// One rendered decision: the current suggestion plus enemy markers.
///
/// Immutable once constructed; a fresh value is built for every cycle and
/// every override. Marker order is render order and carries no other
/// meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub suggestion: Suggestion,
    pub enemies: Vec<Enemy>,
}

impl Decision {
    pub fn new(suggestion: Suggestion, enemies: Vec<Enemy>) -> Self {
        Self {
            suggestion,
            enemies,
        }
    }
}

/// Build the decision for one sampler cycle.
pub fn synthesize(class_index: usize, enemies: Vec<Enemy>) -> Decision {
    Decision::new(Suggestion::from_class_index(class_index), enemies)
}

/// Check a final transcript for the trigger phrase.
///
/// Matching is a case-sensitive substring test. On a match the override is
/// a fixed advisory decision with no markers; otherwise `None` and the
/// current decision stands. An empty transcript or an empty trigger phrase
/// never matches.
pub fn synthesize_override(transcript: &str, trigger_phrase: &str) -> Option<Decision> {
    if trigger_phrase.is_empty() || !transcript.contains(trigger_phrase) {
        return None;
    }
    Some(Decision::new(Suggestion::Push, Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_index_mapping_is_total() {
        assert_eq!(Suggestion::from_class_index(0), Suggestion::Attack);
        assert_eq!(Suggestion::from_class_index(1), Suggestion::Defend);
        assert_eq!(Suggestion::from_class_index(2), Suggestion::Push);
        // Out-of-range indices still classify rather than erroring.
        assert_eq!(Suggestion::from_class_index(3), Suggestion::Push);
        assert_eq!(Suggestion::from_class_index(usize::MAX), Suggestion::Push);
    }

    #[test]
    fn synthesize_carries_markers_through() {
        let enemies = vec![Enemy {
            id: "hostile-1".into(),
            x: 200,
            y: 400,
        }];
        let decision = synthesize(1, enemies.clone());
        assert_eq!(decision.suggestion, Suggestion::Defend);
        assert_eq!(decision.enemies, enemies);
    }

    #[test]
    fn override_matches_trigger_substring() {
        let decision = synthesize_override("ok commander push mid", "commander")
            .expect("trigger phrase should match");
        assert_eq!(decision.suggestion, Suggestion::Push);
        assert!(decision.enemies.is_empty());
    }

    #[test]
    fn override_is_case_sensitive() {
        assert!(synthesize_override("ok Commander push mid", "commander").is_none());
    }

    #[test]
    fn override_rejects_non_matching_and_empty_transcripts() {
        assert!(synthesize_override("regroup at base", "commander").is_none());
        assert!(synthesize_override("", "commander").is_none());
    }

    #[test]
    fn empty_trigger_phrase_never_matches() {
        assert!(synthesize_override("anything at all", "").is_none());
    }

    #[test]
    fn decision_serializes_with_camel_case_and_lowercase_suggestion() {
        let decision = Decision::new(
            Suggestion::Attack,
            vec![Enemy {
                id: "hostile-1".into(),
                x: 200,
                y: 400,
            }],
        );

        let json = serde_json::to_value(&decision).expect("serialize decision");
        assert_eq!(json["suggestion"], "attack");
        assert_eq!(json["enemies"][0]["id"], "hostile-1");
        assert_eq!(json["enemies"][0]["x"], 200);

        let round_trip: Decision = serde_json::from_value(json).expect("deserialize decision");
        assert_eq!(round_trip, decision);
    }

    #[test]
    fn default_decision_is_unknown_with_no_markers() {
        let decision = Decision::default();
        assert_eq!(decision.suggestion, Suggestion::Unknown);
        assert!(decision.enemies.is_empty());
    }
}

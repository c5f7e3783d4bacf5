//! `StubModel` — placeholder backend that returns fixed scores.
//!
//! Used during development and in headless hosts before a trained
//! classifier is wired in. Produces a deterministic score vector so the
//! full loop/overlay path can be exercised end-to-end.

use crate::capture::features::FeatureVector;
use crate::error::Result;
use crate::inference::{ScoreVector, StrategyModel};
use tracing::debug;

/// Fixed-score stub model.
///
/// The default scores favour class 0 (attack) so a fresh host visibly
/// renders something; `with_scores` pins any distribution for tests.
pub struct StubModel {
    scores: ScoreVector,
}

impl StubModel {
    pub fn new() -> Self {
        Self::with_scores(ScoreVector([0.6, 0.3, 0.1]))
    }

    pub fn with_scores(scores: ScoreVector) -> Self {
        Self { scores }
    }
}

impl Default for StubModel {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyModel for StubModel {
    fn warm_up(&mut self) -> Result<()> {
        debug!("StubModel::warm_up — no-op");
        Ok(())
    }

    fn score(&mut self, _features: &FeatureVector) -> Result<ScoreVector> {
        Ok(self.scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_scores_are_deterministic() {
        let mut model = StubModel::with_scores(ScoreVector([0.2, 0.5, 0.3]));
        model.warm_up().expect("warm up");
        let features = FeatureVector::placeholder();
        let first = model.score(&features).expect("score");
        let second = model.score(&features).expect("score");
        assert_eq!(first, second);
        assert_eq!(first.best_index(), 1);
    }
}

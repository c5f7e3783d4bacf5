//! Strategy model abstraction.
//!
//! The `StrategyModel` trait decouples the decision loop from any specific
//! backend (stub scores, ONNX classifier, etc.).
//!
//! `&mut self` on `score` intentionally leaves room for stateful backends
//! (session caches, device queues). All mutation is serialised through
//! `ModelHandle`'s `parking_lot::Mutex`.

pub mod stub;

#[cfg(feature = "onnx")]
pub mod onnx;

#[cfg(feature = "onnx")]
pub use onnx::{OnnxModelConfig, OnnxStrategyModel};

use std::sync::Arc;

use parking_lot::Mutex;

use crate::capture::features::FeatureVector;
use crate::error::Result;

/// Number of strategy classes the classifier scores.
pub const STRATEGY_CLASSES: usize = 3;

/// One score per strategy class, as produced by a model's forward pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreVector(pub [f32; STRATEGY_CLASSES]);

impl ScoreVector {
    /// Index of the best-scoring class.
    ///
    /// Always in `0..STRATEGY_CLASSES`. On an exact tie the lowest index
    /// wins; a candidate must be strictly greater to displace the current
    /// best, which also means NaN scores can never win.
    pub fn best_index(&self) -> usize {
        let mut best = 0;
        for (i, &score) in self.0.iter().enumerate().skip(1) {
            if score > self.0[best] {
                best = i;
            }
        }
        best
    }
}

/// Contract for strategy classification backends.
pub trait StrategyModel: Send + 'static {
    /// One-time warm-up: load weights, validate the graph, run a dummy
    /// forward pass. Called once at engine startup; failure here is fatal
    /// to `start()` because no cycle can produce a suggestion without a
    /// working model.
    ///
    /// # Errors
    /// Returns an error if model files are missing or corrupt.
    fn warm_up(&mut self) -> Result<()>;

    /// Score a feature vector. Deterministic and bounded-time: the loop
    /// calls this once per tick and must not be starved.
    fn score(&mut self, features: &FeatureVector) -> Result<ScoreVector>;
}

/// Thread-safe reference-counted handle to any `StrategyModel` implementor.
///
/// Uses `parking_lot::Mutex` for non-poisoning behaviour on panic and a
/// cheaper uncontended lock than `std::sync::Mutex`.
#[derive(Clone)]
pub struct ModelHandle(pub Arc<Mutex<dyn StrategyModel>>);

impl ModelHandle {
    /// Wrap any `StrategyModel` in a `ModelHandle`.
    pub fn new<M: StrategyModel>(model: M) -> Self {
        Self(Arc::new(Mutex::new(model)))
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle").finish_non_exhaustive()
    }
}

//! Strategy classifier backend via the `ort` crate.
//!
//! Expects a single-graph ONNX export with one input and one output:
//! - input  `[1, 11]` f32 — the feature vector
//! - output `[1, 3]` f32 — one score per strategy class
//!
//! Input/output names are read from the graph at load time, so exports
//! from different toolchains (`dense_input`, `serving_default_…`, etc.)
//! work without configuration.

use std::path::PathBuf;

use ort::ep;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::{Session, SessionInputValue};
use ort::value::TensorRef;
use tracing::{debug, info};

use crate::capture::features::{FeatureVector, FEATURE_ARITY};
use crate::error::{ConsiliumError, Result};
use crate::inference::{ScoreVector, StrategyModel, STRATEGY_CLASSES};

/// Location of the classifier graph.
pub struct OnnxModelConfig {
    pub model_path: PathBuf,
}

impl OnnxModelConfig {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
        }
    }
}

impl Default for OnnxModelConfig {
    fn default() -> Self {
        Self::new("models/strategy_classifier.onnx")
    }
}

/// ONNX-backed strategy model.
///
/// The session is created in `warm_up` so that a missing or corrupt model
/// file surfaces as a startup failure, not mid-loop.
pub struct OnnxStrategyModel {
    config: OnnxModelConfig,
    session: Option<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxStrategyModel {
    pub fn new(config: OnnxModelConfig) -> Self {
        Self {
            config,
            session: None,
            input_name: String::new(),
            output_name: String::new(),
        }
    }

    fn create_session(&self) -> Result<Session> {
        let intra_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
            .clamp(1, 4);

        SessionBuilder::new()
            .map_err(|e| ConsiliumError::OnnxSession(e.to_string()))?
            .with_intra_threads(intra_threads)
            .map_err(|e| ConsiliumError::OnnxSession(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::All)
            .map_err(|e| ConsiliumError::OnnxSession(e.to_string()))?
            .with_execution_providers([ep::CPU::default().build()])
            .map_err(|e| ConsiliumError::OnnxSession(e.to_string()))?
            .commit_from_file(&self.config.model_path)
            .map_err(|e| ConsiliumError::OnnxSession(e.to_string()))
    }

    fn run_forward(&mut self, features: &FeatureVector) -> Result<ScoreVector> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| ConsiliumError::Inference("model not warmed up".into()))?;

        let tensor =
            TensorRef::from_array_view(([1_i64, FEATURE_ARITY as i64], features.as_slice()))
                .map_err(|e| ConsiliumError::OnnxSession(e.to_string()))?;
        let inputs: Vec<(String, SessionInputValue<'_>)> =
            vec![(self.input_name.clone(), SessionInputValue::from(tensor))];

        let outputs = session
            .run(inputs)
            .map_err(|e| ConsiliumError::OnnxSession(e.to_string()))?;
        let (_, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| ConsiliumError::OnnxSession(e.to_string()))?;

        if data.len() < STRATEGY_CLASSES {
            return Err(ConsiliumError::Inference(format!(
                "classifier output has {} values, expected {}",
                data.len(),
                STRATEGY_CLASSES
            )));
        }

        Ok(ScoreVector([data[0], data[1], data[2]]))
    }
}

impl StrategyModel for OnnxStrategyModel {
    fn warm_up(&mut self) -> Result<()> {
        if !self.config.model_path.exists() {
            return Err(ConsiliumError::ModelNotFound {
                path: self.config.model_path.clone(),
            });
        }

        let session = self.create_session()?;
        self.input_name = session
            .inputs()
            .first()
            .map(|outlet| outlet.name().to_string())
            .ok_or_else(|| ConsiliumError::OnnxSession("graph declares no inputs".into()))?;
        self.output_name = session
            .outputs()
            .first()
            .map(|outlet| outlet.name().to_string())
            .ok_or_else(|| ConsiliumError::OnnxSession("graph declares no outputs".into()))?;
        info!(
            path = %self.config.model_path.display(),
            input = %self.input_name,
            output = %self.output_name,
            "strategy classifier session created"
        );
        self.session = Some(session);

        // Dummy forward pass: surfaces shape mismatches at startup and
        // populates runtime caches before the first real tick.
        let scores = self.run_forward(&FeatureVector::placeholder())?;
        debug!(?scores, "warm-up forward pass complete");
        Ok(())
    }

    fn score(&mut self, features: &FeatureVector) -> Result<ScoreVector> {
        self.run_forward(features)
    }
}

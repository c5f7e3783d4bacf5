use thiserror::Error;

/// All errors produced by consilium-core.
#[derive(Debug, Error)]
pub enum ConsiliumError {
    #[error("model load error: {0}")]
    ModelLoad(String),

    #[error("frame capture error: {0}")]
    Capture(String),

    #[error("inference error: {0}")]
    Inference(String),

    #[error("speech source error: {0}")]
    SpeechSource(String),

    #[error("engine is already running")]
    AlreadyRunning,

    #[error("engine has been stopped and cannot be restarted")]
    EngineStopped,

    #[error("ONNX session error: {0}")]
    OnnxSession(String),

    #[error("model file not found: {path}")]
    ModelNotFound { path: std::path::PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ConsiliumError>;

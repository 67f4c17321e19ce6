//! Error types for the depth-viewer pipeline.
//!
//! This module defines the errors that can occur while turning a photograph
//! into a displayable image/depth pair: codec failures, inference failures,
//! asset resolution failures, and configuration problems. Utility
//! constructors attach context to the underlying causes.

use thiserror::Error;

/// Enum representing different stages of the pixel/tensor transform pipeline.
///
/// Used to identify which stage a processing error occurred in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred during tensor operations.
    TensorOperation,
    /// Error occurred while building the model input tensor.
    Preprocess,
    /// Error occurred while converting model output to a depth image.
    Postprocess,
    /// Error occurred while decoding or resizing an image.
    Decode,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::TensorOperation => write!(f, "tensor operation"),
            ProcessingStage::Preprocess => write!(f, "preprocess"),
            ProcessingStage::Postprocess => write!(f, "postprocess"),
            ProcessingStage::Decode => write!(f, "decode"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Enum representing the errors that can occur in the depth-viewer pipeline.
#[derive(Error, Debug)]
pub enum RelievoError {
    /// Error occurred while decoding an image payload.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error occurred during a transform stage.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred while loading the depth model.
    #[error("model load ({path}): {context}")]
    ModelLoad {
        /// Path of the model that failed to load.
        path: String,
        /// Additional context about the error.
        context: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error occurred during inference.
    #[error("inference: {context}")]
    Inference {
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An inference request reached the worker before it was initialized.
    #[error("worker not initialized")]
    NotInitialized,

    /// The worker execution context is gone (thread exited or handle dropped).
    #[error("worker unavailable: {0}")]
    WorkerUnavailable(String),

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error occurred while fetching a remote asset.
    #[error("fetch {url}: {context}")]
    Fetch {
        /// The URL that failed to fetch.
        url: String,
        /// Additional context about the failure.
        context: String,
        /// The underlying transport error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor shape operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// A minimal error used when a failure has no richer underlying cause.
#[derive(Debug)]
pub struct SimpleError {
    message: String,
}

impl SimpleError {
    /// Creates a new SimpleError with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SimpleError {}

impl RelievoError {
    /// Creates a RelievoError for tensor operations.
    pub fn tensor_operation(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::TensorOperation,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a RelievoError for preprocess failures.
    pub fn preprocess(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::Preprocess,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a RelievoError for postprocess failures.
    pub fn postprocess(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::Postprocess,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a RelievoError for decode failures.
    pub fn decode(context: &str, error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Processing {
            kind: ProcessingStage::Decode,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a RelievoError for model load failures.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the model file.
    /// * `context` - What went wrong while loading.
    /// * `suggestion` - Optional hint appended to the context.
    /// * `source` - The underlying error, if any.
    pub fn model_load_error(
        path: impl AsRef<std::path::Path>,
        context: &str,
        suggestion: Option<&str>,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        let context = match suggestion {
            Some(hint) => format!("{context} ({hint})"),
            None => context.to_string(),
        };
        Self::ModelLoad {
            path: path.as_ref().display().to_string(),
            context,
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Creates a RelievoError for inference failures.
    pub fn inference_error(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a RelievoError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a RelievoError for configuration errors.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a RelievoError for remote fetch failures.
    pub fn fetch_error(
        url: &str,
        context: &str,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        Self::Fetch {
            url: url.to_string(),
            context: context.to_string(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Creates a RelievoError for shape mismatches in tensor operations.
    pub fn tensor_operation_error(
        operation: &str,
        expected: &[usize],
        actual: &[usize],
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::TensorOperation,
            context: format!("{operation}: expected {expected:?}, got {actual:?}: {context}"),
            source: Box::new(error),
        }
    }
}

/// Core error types for hookreel.
use std::fmt;

/// A specialized Result type for hookreel operations.
pub type HookreelResult<T> = Result<T, HookreelError>;

/// The stage of frame composition that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionStep {
    /// Decoding the background image.
    Decode,
    /// Resolving a font (both preferred and fallback candidates failed).
    Font,
    /// Writing the composed frame to disk for the encoder.
    Materialize,
}

impl fmt::Display for CompositionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompositionStep::Decode => "decode",
            CompositionStep::Font => "font",
            CompositionStep::Materialize => "materialize",
        };
        f.write_str(name)
    }
}

/// Top-level error type encompassing all hookreel subsystems.
#[derive(Debug, thiserror::Error)]
pub enum HookreelError {
    /// The language model call failed or returned output of the wrong shape.
    /// `raw` carries the model's response text when one was received.
    #[error("model error: {message}")]
    Model {
        message: String,
        raw: Option<String>,
    },

    #[error("composition error ({step}): {message}")]
    Composition {
        step: CompositionStep,
        message: String,
    },

    #[error("encode error: {0}")]
    Encode(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl HookreelError {
    /// Create a model error without a raw response (e.g. a network failure).
    pub fn model(message: impl Into<String>) -> Self {
        HookreelError::Model {
            message: message.into(),
            raw: None,
        }
    }

    /// Create a model error that keeps the raw response for diagnosis.
    pub fn model_with_raw(message: impl Into<String>, raw: impl Into<String>) -> Self {
        HookreelError::Model {
            message: message.into(),
            raw: Some(raw.into()),
        }
    }

    /// Create a composition error for the given step.
    pub fn composition(step: CompositionStep, message: impl Into<String>) -> Self {
        HookreelError::Composition {
            step,
            message: message.into(),
        }
    }

    /// The raw model response attached to a [`HookreelError::Model`], if any.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            HookreelError::Model { raw, .. } => raw.as_deref(),
            _ => None,
        }
    }
}

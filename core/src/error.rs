// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Errors produced by the engine itself rather than by step handlers.
///
/// Handler error types must implement `From<FlowError>` so that these can be
/// surfaced through the same `Result` a pipeline run returns.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Step '{step_name}' is not optional but has no handlers")]
  HandlerMissing { step_name: String },

  #[error("No pipeline registered for context type {context_type}")]
  NotRegistered { context_type: &'static str },

  #[error("Context type mismatch while dispatching (expected {expected_type})")]
  TypeMismatch { expected_type: &'static str },

  #[error("Handler failed: {source}")]
  Handler {
    #[source]
    source: AnyhowError,
  },
}

impl From<AnyhowError> for FlowError {
  fn from(source: AnyhowError) -> Self {
    FlowError::Handler { source }
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;

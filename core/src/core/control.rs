// core/src/core/control.rs

/// Returned by every handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halt the run. Remaining handlers of this step and all later steps are not executed.
  Stop,
}

/// How a run ended when no handler returned an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  Completed,
  Stopped,
}

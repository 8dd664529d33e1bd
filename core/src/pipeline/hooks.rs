// core/src/pipeline/hooks.rs

//! Handler registration. All three phases share one code path; the public
//! methods only pick the phase.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use crate::core::handler::Handler;
use crate::error::FlowError;
use crate::pipeline::definition::{Phase, Pipeline};
use std::future::Future;
use std::pin::Pin;
use tracing::{event, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Registers a handler that runs before the step's `on` handlers.
  ///
  /// The handler's own error type only has to convert into the pipeline's `Err`.
  pub fn before_root<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.register(Phase::Before, step_name, handler_fn);
  }

  pub fn on_root<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.register(Phase::On, step_name, handler_fn);
  }

  pub fn after_root<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.register(Phase::After, step_name, handler_fn);
  }

  fn register<F, HandlerErr>(
    &mut self,
    phase: Phase,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    // Panics on unknown step names.
    self.step_mut(step_name);

    let boxed: Handler<TData, Err> = Box::new(
      move |ctx_data| -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>> {
        let fut = handler_fn(ctx_data);
        Box::pin(async move { fut.await.map_err(Into::into) })
      },
    );
    self
      .handlers_mut(phase)
      .entry(step_name.to_string())
      .or_default()
      .push(boxed);

    event!(Level::TRACE, step_name, phase = phase.label(), "Handler registered.");
  }
}

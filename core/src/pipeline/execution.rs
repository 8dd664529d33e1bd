// core/src/pipeline/execution.rs

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::error::FlowError;
use crate::pipeline::definition::{Phase, Pipeline};
use tracing::{event, info_span, instrument, Instrument, Level};

/// What a single step decided.
enum StepOutcome {
  Continue,
  Stop,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step in declaration order against `ctx_data`.
  ///
  /// For each step: evaluate `skip_if`, then run `before`, `on` and `after`
  /// handlers in registration order. The first error aborts the run and is
  /// returned unchanged; the first `Stop` ends it with [`PipelineResult::Stopped`].
  /// A non-optional step with no handlers at all fails with
  /// [`FlowError::HandlerMissing`].
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline run starting.");

    for (step_index, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(ctx_data.clone()) {
          event!(Level::DEBUG, step_name, "Step skipped by condition.");
          continue;
        }
      }

      let has_handlers = Phase::ALL
        .iter()
        .any(|phase| !self.handlers(*phase, step_name).is_empty());
      if !has_handlers {
        if step_def.optional {
          event!(Level::DEBUG, step_name, "Optional step has no handlers, passing over.");
          continue;
        }
        event!(Level::ERROR, step_name, "Required step has no handlers.");
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      let step_span = info_span!("step", step_name, step_index, optional = step_def.optional);
      match self.run_step(step_name, &ctx_data).instrument(step_span).await? {
        StepOutcome::Continue => {}
        StepOutcome::Stop => return Ok(PipelineResult::Stopped),
      }
    }

    event!(Level::DEBUG, "Pipeline run completed.");
    Ok(PipelineResult::Completed)
  }

  async fn run_step(&self, step_name: &str, ctx_data: &ContextData<TData>) -> Result<StepOutcome, Err> {
    for phase in Phase::ALL {
      for (handler_index, handler) in self.handlers(phase, step_name).iter().enumerate() {
        match handler(ctx_data.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            event!(Level::INFO, phase = phase.label(), handler_index, "Pipeline stopped by handler.");
            return Ok(StepOutcome::Stop);
          }
          Err(e) => {
            event!(Level::WARN, phase = phase.label(), handler_index, error = %e, "Handler failed.");
            return Err(e);
          }
        }
      }
    }
    Ok(StepOutcome::Continue)
  }
}

// core/src/pipeline/definition.rs

use crate::core::handler::Handler;
use crate::core::step::{SkipCondition, StepDef};
use crate::error::FlowError;
use std::collections::HashMap;

/// Hook phases of a step, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
  Before,
  On,
  After,
}

impl Phase {
  pub(crate) const ALL: [Phase; 3] = [Phase::Before, Phase::On, Phase::After];

  pub(crate) fn label(self) -> &'static str {
    match self {
      Phase::Before => "before",
      Phase::On => "on",
      Phase::After => "after",
    }
  }
}

/// An ordered set of named steps over a context `ContextData<TData>`.
///
/// `Err` is what handlers return; it must absorb [`FlowError`] so engine
/// failures (a required step without handlers, a registry miss) come back
/// through the same channel.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) before: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Builds a pipeline from `(name, optional, skip_if)` triples.
  ///
  /// Panics on duplicate step names; that is a wiring mistake, not a runtime condition.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let mut steps: Vec<StepDef<TData>> = Vec::with_capacity(step_defs.len());
    for (name, optional, skip_if) in step_defs {
      if steps.iter().any(|s| s.name == *name) {
        panic!("souk-flow setup error: step '{}' declared twice", name);
      }
      steps.push(StepDef {
        name: (*name).to_string(),
        optional: *optional,
        skip_if: skip_if.clone(),
      });
    }

    Self {
      steps,
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) {
    self.step_mut(step_name).optional = optional;
  }

  pub fn set_skip_condition(&mut self, step_name: &str, skip_if: Option<SkipCondition<TData>>) {
    self.step_mut(step_name).skip_if = skip_if;
  }

  pub(crate) fn handlers(&self, phase: Phase, step_name: &str) -> &[Handler<TData, Err>] {
    let table = match phase {
      Phase::Before => &self.before,
      Phase::On => &self.on,
      Phase::After => &self.after,
    };
    table.get(step_name).map(Vec::as_slice).unwrap_or(&[])
  }

  pub(crate) fn handlers_mut(&mut self, phase: Phase) -> &mut HashMap<String, Vec<Handler<TData, Err>>> {
    match phase {
      Phase::Before => &mut self.before,
      Phase::On => &mut self.on,
      Phase::After => &mut self.after,
    }
  }

  /// Panics when the step is unknown (typo in a step name at wiring time).
  pub(crate) fn step_mut(&mut self, step_name: &str) -> &mut StepDef<TData> {
    match self.steps.iter_mut().find(|s| s.name == step_name) {
      Some(step) => step,
      None => panic!("souk-flow setup error: step '{}' not found in pipeline definition", step_name),
    }
  }
}

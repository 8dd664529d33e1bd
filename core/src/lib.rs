// core/src/lib.rs

//! souk-flow: a small async step-pipeline engine.
//!
//! A [`Pipeline`] is an ordered list of named steps. Each step may carry
//! `before`, `on` and `after` handlers which receive a shared [`ContextData`]
//! and return a [`PipelineControl`] telling the engine whether to keep going.
//! Steps can be marked optional or skipped by a predicate evaluated against the
//! context at run time, which is how callers express branches such as
//! "only when paying through the gateway".
//!
//! Pipelines are registered in a [`Flows`] registry keyed by their context
//! data type, so a request handler only needs to build a context and call
//! `flows.run(ctx)`.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::handler::Handler;
pub use crate::core::step::{SkipCondition, StepDef};
pub use crate::error::{FlowError, FlowResult};
pub use crate::pipeline::Pipeline;
pub use crate::registry::Flows;

/*
    Typical wiring:
    1. Define a context struct `OrderCtx` holding request input and step output.
    2. Build `Pipeline::<OrderCtx, AppError>::new(&[("validate", false, None), ...])`.
    3. Attach async handlers with `.on_root("validate", |ctx| Box::pin(async move { ... }))`.
    4. `flows.register_pipeline(pipeline)` once at startup.
    5. Per request: `let ctx = ContextData::new(OrderCtx { .. }); flows.run(ctx.clone()).await?`
       and read the results back out of `ctx`.
*/

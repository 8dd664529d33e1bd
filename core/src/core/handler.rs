// core/src/core/handler.rs

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// A boxed step handler.
///
/// Handlers take ownership of a `ContextData<TData>` clone and resolve to
/// `Result<PipelineControl, Err>`. The future must be `Send`, which in practice
/// means lock guards obtained from the context are dropped before any `.await`.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;

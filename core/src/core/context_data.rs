// core/src/core/context_data.rs
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared, lockable pipeline context.
///
/// Every handler receives a clone of the same `Arc`, so writes made by one
/// step are visible to the next one and to the caller once the run returns.
///
/// The guards are blocking `parking_lot` guards: take what you need inside a
/// block and let the guard drop before the next `.await`.
#[derive(Debug)]
pub struct ContextData<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> ContextData<T> {
  pub fn new(data: T) -> Self {
    ContextData(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }

  /// Runs `f` under a read lock and returns its result, dropping the guard
  /// before returning.
  pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
    let guard = self.0.read();
    f(&*guard)
  }
}

impl<T: Send + Sync + Clone + 'static> ContextData<T> {
  /// Clones the current value out of the lock.
  pub fn snapshot(&self) -> T {
    self.0.read().clone()
  }
}

impl<T: Send + Sync + 'static> Clone for ContextData<T> {
  fn clone(&self) -> Self {
    ContextData(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + 'static + Default> Default for ContextData<T> {
  fn default() -> Self {
    Self::new(T::default())
  }
}

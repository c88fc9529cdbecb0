use std::sync::{Arc, Mutex, MutexGuard};

use crate::params::Parameters;

/// Shared, lock-guarded parameter state.
///
/// Every mutation happens under the lock, and readers only ever receive a
/// copy, so a frame that calls [`ParameterHandle::snapshot`] sees either the
/// state before an update or after it, never a mix.
#[derive(Debug, Clone, Default)]
pub struct ParameterHandle {
    inner: Arc<Mutex<Parameters>>,
}

impl ParameterHandle {
    pub fn new(initial: Parameters) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial)),
        }
    }

    /// Copies the current parameters out of the lock.
    pub fn snapshot(&self) -> Parameters {
        *self.lock()
    }

    /// Applies `apply` atomically and returns the resulting parameters.
    pub fn update<F>(&self, apply: F) -> Parameters
    where
        F: FnOnce(&mut Parameters),
    {
        let mut guard = self.lock();
        apply(&mut guard);
        *guard
    }

    /// Replaces the whole parameter set.
    pub fn replace(&self, params: Parameters) {
        *self.lock() = params;
    }

    /// Restores the defaults.
    pub fn reset(&self) -> Parameters {
        self.update(Parameters::reset)
    }

    fn lock(&self) -> MutexGuard<'_, Parameters> {
        // Parameters is plain data; a writer that panicked mid-update cannot
        // leave it structurally invalid.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

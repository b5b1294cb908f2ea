//! Shared handle to the emulation engine.
//!
//! The engine runs on its own thread. Every debugger entry point takes the
//! lock for one bounded call sequence and releases it before returning, so
//! no component keeps an engine reference across calls.

use std::sync::{Arc, Mutex, MutexGuard};

pub struct EngineHandle<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> EngineHandle<T> {
    pub fn new(engine: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn from_shared(inner: Arc<Mutex<T>>) -> Self {
        Self { inner }
    }

    /// Acquire the engine lock. Released when the guard drops.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned. A thread dying while it held the
    /// engine means the engine's lifecycle was broken underneath us.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().expect("engine lock poisoned")
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock())
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.lock())
    }
}

impl<T> Clone for EngineHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

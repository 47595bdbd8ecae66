//! # Tick driver
//!
//! Channels with deferred messages register themselves with a [Driver] and
//! unregister on their next flush. The host advances the driver once per
//! logical tick, either from its own main loop with [Driver::tick] or with the
//! tokio based [spawn_ticker].
//!
//! Order between callbacks of one tick is newest first and must not be relied
//! upon; only the order inside one channel is guaranteed.

use crate::error::BusError;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::{fmt, ptr, sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::trace;

#[cfg(test)]
mod test;

/// Periodic callback driven by a [Driver]
pub trait Tick: Send + Sync {
    /// Called once per driver tick while registered
    fn tick(&self);
}

/// Set of [Tick] callbacks invoked once per tick
#[derive(Default)]
pub struct Driver {
    callbacks: Mutex<Vec<Arc<dyn Tick>>>,
}

/// Returns the process-wide driver, creating it on first use
pub fn global() -> Arc<Driver> {
    static DRIVER: Lazy<Arc<Driver>> = Lazy::new(|| Arc::new(Driver::new()));
    Arc::clone(&DRIVER)
}

impl Driver {
    /// Creates a driver without callbacks
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback`
    ///
    /// Fails with [BusError::DuplicateDriverCallback] if it is already registered.
    pub fn add(&self, callback: Arc<dyn Tick>) -> Result<(), BusError> {
        let mut callbacks = self.callbacks.lock();
        if callbacks.iter().any(|c| same(c, &callback)) {
            return Err(BusError::DuplicateDriverCallback);
        }
        callbacks.push(callback);
        Ok(())
    }

    /// Unregisters `callback`
    ///
    /// Fails with [BusError::MissingDriverCallback] if it is not registered.
    pub fn remove(&self, callback: &Arc<dyn Tick>) -> Result<(), BusError> {
        let mut callbacks = self.callbacks.lock();
        let index = callbacks
            .iter()
            .position(|c| same(c, callback))
            .ok_or(BusError::MissingDriverCallback)?;
        callbacks.remove(index);
        Ok(())
    }

    /// `true` if `callback` is registered
    pub fn contains(&self, callback: &Arc<dyn Tick>) -> bool {
        self.callbacks.lock().iter().any(|c| same(c, callback))
    }

    /// Invokes every callback registered at the start of the tick, once
    ///
    /// Callbacks added or removed meanwhile take effect on the next tick.
    pub fn tick(&self) {
        let callbacks = self.callbacks.lock().clone();
        if callbacks.is_empty() {
            return;
        }
        trace!(callbacks = callbacks.len(), "tick");
        for callback in callbacks.iter().rev() {
            callback.tick();
        }
    }

    /// Number of registered callbacks
    pub fn len(&self) -> usize {
        self.callbacks.lock().len()
    }

    /// `true` if no callback is registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.lock().is_empty()
    }
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("callbacks", &self.len())
            .finish()
    }
}

/// Ticks `driver` every `period` on the current tokio runtime
///
/// The period is clamped to at least one millisecond and missed ticks are
/// skipped, not replayed. Abort the returned handle to stop ticking.
pub fn spawn_ticker(driver: Arc<Driver>, period: Duration) -> JoinHandle<()> {
    let period = period.max(Duration::from_millis(1));
    tokio::spawn(async move {
        let mut ticks = interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticks.tick().await;
            driver.tick();
        }
    })
}

fn same(a: &Arc<dyn Tick>, b: &Arc<dyn Tick>) -> bool {
    ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

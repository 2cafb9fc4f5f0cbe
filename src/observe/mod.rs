//! Run observers
//!
//! Observers receive every `EventRecord` a run emits. Delivery is
//! fire-and-forget: an observer error is logged and the run carries on.

mod journal;
mod log_observer;
mod memory;

use std::sync::Arc;

use crate::domain::EventRecord;
use crate::error::Result;

pub use journal::JsonlObserver;
pub use log_observer::LogObserver;
pub use memory::MemoryObserver;

pub trait RunObserver: Send + Sync {
    /// Short name used when reporting observer failures
    fn name(&self) -> &str;

    fn on_event(&self, event: &EventRecord) -> Result<()>;
}

impl<T: RunObserver + ?Sized> RunObserver for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn on_event(&self, event: &EventRecord) -> Result<()> {
        (**self).on_event(event)
    }
}

/// Observers notified in registration order
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Box<dyn RunObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, observer: impl RunObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn with(mut self, observer: impl RunObserver + 'static) -> Self {
        self.add(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn notify(&self, event: &EventRecord) {
        for observer in &self.observers {
            if let Err(e) = observer.on_event(event) {
                log::warn!(
                    "observer '{}' failed on {} for {}: {}",
                    observer.name(),
                    event.event_type,
                    event.run_id,
                    e
                );
            }
        }
    }
}

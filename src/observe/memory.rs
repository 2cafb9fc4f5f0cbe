use std::sync::Mutex;

use super::RunObserver;
use crate::domain::EventRecord;
use crate::error::Result;

/// Keeps every event in memory, in delivery order.
#[derive(Debug, Default)]
pub struct MemoryObserver {
    events: Mutex<Vec<EventRecord>>,
}

impl MemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EventRecord> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Event types received so far
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }
}

impl RunObserver for MemoryObserver {
    fn name(&self) -> &str {
        "memory"
    }

    fn on_event(&self, event: &EventRecord) -> Result<()> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
        Ok(())
    }
}

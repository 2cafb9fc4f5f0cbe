use super::RunObserver;
use crate::domain::EventRecord;
use crate::error::Result;

/// Writes each event to the `log` facade.
///
/// Terminal events log at info, the rest at debug.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl RunObserver for LogObserver {
    fn name(&self) -> &str {
        "log"
    }

    fn on_event(&self, event: &EventRecord) -> Result<()> {
        let level = if event.is_terminal_event() {
            log::Level::Info
        } else {
            log::Level::Debug
        };
        log::log!(
            level,
            "[{}] {} round={} {}",
            event.run_id,
            event.event_type,
            event.round,
            event.payload
        );
        Ok(())
    }
}

//! ID generation utilities for draftloop
//!
//! Provides identifiers for runs and journal events.

use rand::Rng;

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Generate a unique run ID
///
/// Format: `run-{timestamp_ms}-{random_hex}`
/// Example: `run-1738300800123-a1b2`
pub fn generate_run_id() -> String {
    let random: u16 = rand::rng().random();
    format!("run-{}-{:04x}", now_ms(), random)
}

/// Generate an event ID scoped to a run and round
///
/// Format: `evt-{run_suffix}-{round:03}-{random_hex}`
pub fn generate_event_id(run_id: &str, round: u32) -> String {
    let run_suffix = run_id.rsplit('-').next().unwrap_or(run_id);
    let random: u16 = rand::rng().random();
    format!("evt-{}-{:03}-{:04x}", run_suffix, round, random)
}

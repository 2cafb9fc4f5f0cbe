//! Event record types for observability.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::outcome::{FinalResult, TerminationReason};
use super::turn::Round;
use crate::id::{generate_event_id, now_ms};

/// Event type constants
pub mod event_types {
    pub const RUN_STARTED: &str = "run.started";
    pub const ROUND_COMPLETE: &str = "round.complete";
    pub const LOOP_TERMINATED: &str = "loop.terminated";
    pub const RUN_FINISHED: &str = "run.finished";
    pub const RUN_FAILED: &str = "run.failed";
}

/// Run event delivered to observers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventRecord {
    /// Unique event identifier
    pub id: String,
    /// Event type (e.g., "run.started", "round.complete")
    pub event_type: String,
    /// Run the event belongs to
    pub run_id: String,
    /// Round number the event refers to (0 = outside any round)
    pub round: u32,
    /// Event-specific payload data
    pub payload: Value,
    /// Unix timestamp in milliseconds
    pub created_at: u64,
}

impl EventRecord {
    pub fn new(event_type: &str, run_id: &str, round: u32, payload: Value) -> Self {
        Self {
            id: generate_event_id(run_id, round),
            event_type: event_type.to_string(),
            run_id: run_id.to_string(),
            round,
            payload,
            created_at: now_ms(),
        }
    }

    pub fn run_started(run_id: &str, request: &str, max_rounds: u32) -> Self {
        Self::new(
            event_types::RUN_STARTED,
            run_id,
            0,
            serde_json::json!({ "request": request, "max_rounds": max_rounds }),
        )
    }

    pub fn round_complete(run_id: &str, round: &Round) -> Self {
        Self::new(
            event_types::ROUND_COMPLETE,
            run_id,
            round.number,
            serde_json::json!({
                "role": round.role,
                "directive": round.directive,
                "appended": round.appended,
            }),
        )
    }

    pub fn loop_terminated(run_id: &str, rounds: u32, reason: TerminationReason) -> Self {
        Self::new(
            event_types::LOOP_TERMINATED,
            run_id,
            rounds,
            serde_json::json!({ "reason": reason }),
        )
    }

    /// `state` is the latest value of every store field at run end
    pub fn run_finished(
        run_id: &str,
        rounds: u32,
        result: &FinalResult,
        state: &BTreeMap<String, String>,
    ) -> Self {
        Self::new(
            event_types::RUN_FINISHED,
            run_id,
            rounds,
            serde_json::json!({
                "artifact": result.is_artifact(),
                "artifact_round": result.round(),
                "state": state,
            }),
        )
    }

    pub fn run_failed(run_id: &str, rounds: u32, error: &str) -> Self {
        Self::new(
            event_types::RUN_FAILED,
            run_id,
            rounds,
            serde_json::json!({ "error": error }),
        )
    }

    pub fn is_terminal_event(&self) -> bool {
        self.event_type == event_types::RUN_FINISHED || self.event_type == event_types::RUN_FAILED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Directive, Role};

    #[test]
    fn test_event_record_new() {
        let event = EventRecord::new("test.event", "run-1-abcd", 3, Value::Null);
        assert!(event.id.starts_with("evt-abcd-003-"));
        assert_eq!(event.event_type, "test.event");
        assert_eq!(event.run_id, "run-1-abcd");
        assert!(event.created_at > 0);
    }

    #[test]
    fn test_run_started() {
        let event = EventRecord::run_started("run-1-abcd", "add two numbers", 5);
        assert_eq!(event.event_type, event_types::RUN_STARTED);
        assert_eq!(event.round, 0);
        assert_eq!(event.payload["request"], "add two numbers");
        assert_eq!(event.payload["max_rounds"], 5);
    }

    #[test]
    fn test_round_complete() {
        let round = Round {
            number: 2,
            role: Role::Reviewer,
            observed: BTreeMap::new(),
            appended: vec!["CRITICAL_FEEDBACK".to_string()],
            directive: Directive::Continue(Role::Producer),
        };
        let event = EventRecord::round_complete("run-1-abcd", &round);
        assert_eq!(event.event_type, event_types::ROUND_COMPLETE);
        assert_eq!(event.round, 2);
        assert_eq!(event.payload["role"], "reviewer");
        assert_eq!(event.payload["directive"]["next"], "producer");
        assert_eq!(event.payload["appended"][0], "CRITICAL_FEEDBACK");
    }

    #[test]
    fn test_loop_terminated() {
        let event = EventRecord::loop_terminated("run-1-abcd", 4, TerminationReason::Approved);
        assert_eq!(event.payload["reason"], "approved");
        assert!(!event.is_terminal_event());
    }

    #[test]
    fn test_run_finished_and_failed_are_terminal() {
        let state = BTreeMap::from([("PROMPT".to_string(), "add two numbers".to_string())]);
        let finished = EventRecord::run_finished("r", 2, &FinalResult::NoArtifact, &state);
        assert!(finished.is_terminal_event());
        assert_eq!(finished.payload["artifact"], false);
        assert_eq!(finished.payload["state"]["PROMPT"], "add two numbers");

        let failed = EventRecord::run_failed("r", 1, "misrouted");
        assert!(failed.is_terminal_event());
        assert_eq!(failed.payload["error"], "misrouted");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let event = EventRecord::loop_terminated("run-x", 2, TerminationReason::RoundCap);
        let json = serde_json::to_string(&event).unwrap();
        let restored: EventRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(event, restored);
    }
}

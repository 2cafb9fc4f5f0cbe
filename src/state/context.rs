//! RunContext - the state threaded through every participant turn.
//!
//! The controller owns the context and lends participants a shared
//! reference, so only the controller can commit appends.

use super::store::{StateStore, fields};
use crate::domain::Append;
use crate::id::generate_run_id;

#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: String,
    store: StateStore,
    round: u32,
    max_rounds: u32,
}

impl RunContext {
    pub fn new(max_rounds: u32) -> Self {
        Self::with_run_id(generate_run_id(), max_rounds)
    }

    pub fn with_run_id(run_id: impl Into<String>, max_rounds: u32) -> Self {
        Self {
            run_id: run_id.into(),
            store: StateStore::new(),
            round: 0,
            max_rounds,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Current round number (0 before the first round starts)
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Whether the current round is the last one the cap allows
    pub fn is_final_round(&self) -> bool {
        self.round >= self.max_rounds
    }

    /// The caller's request
    pub fn request(&self) -> &str {
        self.store.latest(fields::PROMPT)
    }

    /// Write a value before the loop starts (round 0).
    pub fn seed(&mut self, field: &str, value: impl Into<String>) -> usize {
        self.store.append(field, value, 0)
    }

    pub(crate) fn begin_round(&mut self) -> u32 {
        self.round += 1;
        self.round
    }

    /// Commit a turn's appends under the current round number.
    pub(crate) fn commit(&mut self, appends: &[Append]) {
        for append in appends {
            self.store.append(&append.field, append.value.clone(), self.round);
        }
    }

    pub(crate) fn into_store(self) -> StateStore {
        self.store
    }
}

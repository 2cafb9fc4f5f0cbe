//! LoopRun - the bounded sequence of rounds for one run.

use serde::{Deserialize, Serialize};

use super::outcome::TerminationReason;
use super::role::Role;
use super::turn::Round;
use crate::error::{DraftloopError, Result};

/// Lifecycle status of a loop run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum LoopStatus {
    Running,
    Terminated(TerminationReason),
}

impl LoopStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopStatus::Terminated(_))
    }
}

/// The ordered rounds of one run plus its cap and status.
///
/// Invariants: `round_count <= max_rounds`, and once terminated no further
/// rounds are recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopRun {
    pub rounds: Vec<Round>,
    pub round_count: u32,
    pub max_rounds: u32,
    pub status: LoopStatus,
}

impl LoopRun {
    pub fn new(max_rounds: u32) -> Self {
        Self {
            rounds: Vec::new(),
            round_count: 0,
            max_rounds,
            status: LoopStatus::Running,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// True once the round counter has reached the cap
    pub fn cap_reached(&self) -> bool {
        self.round_count >= self.max_rounds
    }

    pub fn termination_reason(&self) -> Option<TerminationReason> {
        match self.status {
            LoopStatus::Terminated(reason) => Some(reason),
            LoopStatus::Running => None,
        }
    }

    /// Append an accepted round.
    pub fn record(&mut self, round: Round) -> Result<()> {
        if self.is_terminal() {
            return Err(DraftloopError::InvalidState(format!(
                "cannot record round {} on a terminated run",
                round.number
            )));
        }
        if self.cap_reached() {
            return Err(DraftloopError::InvalidState(format!(
                "round cap of {} already reached",
                self.max_rounds
            )));
        }
        let expected = self.round_count + 1;
        if round.number != expected {
            return Err(DraftloopError::InvalidState(format!(
                "expected round {}, got round {}",
                expected, round.number
            )));
        }

        self.round_count = round.number;
        self.rounds.push(round);
        Ok(())
    }

    /// Move the run to its terminal status.
    pub fn terminate(&mut self, reason: TerminationReason) -> Result<()> {
        if let LoopStatus::Terminated(existing) = self.status {
            return Err(DraftloopError::InvalidState(format!(
                "run already terminated ({})",
                existing
            )));
        }
        self.status = LoopStatus::Terminated(reason);
        Ok(())
    }

    pub fn last_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    /// Acting role of each round, in order
    pub fn roles(&self) -> Vec<Role> {
        self.rounds.iter().map(|r| r.role).collect()
    }
}

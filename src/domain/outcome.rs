//! Run outcome types.
//!
//! This module defines why a loop stopped and what it produced.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a loop run reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The reviewer raised the terminate signal
    Approved,
    /// The round cap was reached without a terminate signal
    RoundCap,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::Approved => f.write_str("approved"),
            TerminationReason::RoundCap => f.write_str("round cap reached"),
        }
    }
}

/// The consolidated artifact emitted after the loop ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FinalResult {
    /// The normalized latest draft and the round that produced it
    Artifact { content: String, round: u32 },
    /// No usable draft existed at termination
    NoArtifact,
}

impl FinalResult {
    pub fn is_artifact(&self) -> bool {
        matches!(self, FinalResult::Artifact { .. })
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            FinalResult::Artifact { content, .. } => Some(content),
            FinalResult::NoArtifact => None,
        }
    }

    /// Round in which the artifact was last produced
    pub fn round(&self) -> Option<u32> {
        match self {
            FinalResult::Artifact { round, .. } => Some(*round),
            FinalResult::NoArtifact => None,
        }
    }

    /// Format for presentation, optionally inside a fenced code block.
    pub fn render(&self, fence_language: Option<&str>) -> String {
        match (self, fence_language) {
            (FinalResult::Artifact { content, .. }, Some(lang)) => {
                format!("```{}\n{}\n```", lang, content)
            }
            (FinalResult::Artifact { content, .. }, None) => content.clone(),
            (FinalResult::NoArtifact, _) => "no artifact produced".to_string(),
        }
    }
}

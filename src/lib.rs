//! Draftloop - a bounded producer/reviewer refinement loop
//!
//! A Producer writes or revises a code draft, a Reviewer accepts it or asks
//! for changes, and the loop stops on approval or at the round cap. The
//! latest draft is then normalized into the final result.

pub mod consolidate;
pub mod controller;
pub mod domain;
pub mod error;
pub mod id;
pub mod llm;
pub mod observe;
pub mod orchestrator;
pub mod participant;
pub mod prompt;
pub mod state;

pub use domain::{Directive, FinalResult, LoopRun, Role, TerminationReason};
pub use error::{DraftloopError, LlmError, Result};
pub use orchestrator::{Orchestrator, RunReport, RunSettings};

//! Domain types for draftloop
//!
//! - Role / Directive: participant identities and the turn directive
//! - Turn / Round: one participant invocation, before and after commit
//! - LoopRun: the bounded sequence of rounds and its status
//! - FinalResult / TerminationReason: what the run produced and why it stopped
//! - EventRecord: observability events

pub mod event;
pub mod loop_run;
pub mod outcome;
pub mod role;
pub mod turn;

pub use event::{EventRecord, event_types};
pub use loop_run::{LoopRun, LoopStatus};
pub use outcome::{FinalResult, TerminationReason};
pub use role::{Directive, Role};
pub use turn::{Append, Round, Turn};

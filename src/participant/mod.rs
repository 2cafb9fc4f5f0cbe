//! Participants - the two roles that take turns in the loop
//!
//! A participant reads the `RunContext`, calls the model, and returns a
//! `Turn`. It never writes to the store; the controller commits a turn's
//! appends only after accepting its directive.

mod checklist;
pub mod directive;
mod producer;
mod reviewer;

use async_trait::async_trait;

use crate::domain::{Role, Turn};
use crate::error::Result;
use crate::state::RunContext;

pub use checklist::ReviewChecklist;
pub use directive::{ControlCalls, EXIT_LOOP, HANDOFF_TO};
pub use producer::Producer;
pub use reviewer::Reviewer;

#[async_trait]
pub trait Participant: Send + Sync {
    /// Role this participant plays
    fn role(&self) -> Role;

    /// Take one turn against the current state
    async fn take_turn(&self, ctx: &RunContext) -> Result<Turn>;
}

//! Shared versioned state for a run
//!
//! - StateStore: append-only named lists with an empty sentinel for unknown fields
//! - RunContext: the store plus run identity and round position

mod context;
mod store;

pub use context::RunContext;
pub use store::{EMPTY, Entry, StateStore, fields};

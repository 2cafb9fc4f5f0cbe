//! Turn and round records.
//!
//! A `Turn` is what a participant hands back to the controller: the state
//! it looked at, the appends it wants committed, and its directive. Once the
//! controller accepts a turn it is recorded as a `Round`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::role::{Directive, Role};
use crate::llm::Usage;

/// A pending append to the state store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Append {
    pub field: String,
    pub value: String,
}

/// The uncommitted result of one participant invocation.
#[derive(Debug, Clone)]
pub struct Turn {
    /// Role that produced this turn
    pub role: Role,
    /// Latest-value snapshot of every field the participant read
    pub observed: BTreeMap<String, String>,
    /// Appends to commit once the directive is accepted
    pub appends: Vec<Append>,
    /// Exactly one directive per turn
    pub directive: Directive,
    /// Tokens spent producing this turn
    pub usage: Usage,
}

impl Turn {
    pub fn new(role: Role, directive: Directive) -> Self {
        Self {
            role,
            observed: BTreeMap::new(),
            appends: Vec::new(),
            directive,
            usage: Usage::default(),
        }
    }

    /// Record a field value the participant read
    pub fn observing(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.observed.insert(field.into(), value.into());
        self
    }

    /// Queue an append
    pub fn appending(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.appends.push(Append {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }
}

/// One accepted participant turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based round number
    pub number: u32,
    pub role: Role,
    pub observed: BTreeMap<String, String>,
    /// Fields appended to, in commit order
    pub appended: Vec<String>,
    pub directive: Directive,
}

impl Round {
    pub fn from_turn(number: u32, turn: &Turn) -> Self {
        Self {
            number,
            role: turn.role,
            observed: turn.observed.clone(),
            appended: turn.appends.iter().map(|a| a.field.clone()).collect(),
            directive: turn.directive,
        }
    }
}

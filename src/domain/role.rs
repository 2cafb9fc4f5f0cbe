//! Participant identities and turn directives
//!
//! The refine loop has exactly two roles. Peer names coming back from the
//! model are free text, so they are resolved here into the closed `Role`
//! enum; anything that does not resolve has no legitimate destination.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two alternating roles in the refine loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Writes the initial draft and every revision
    Producer,
    /// Accepts the latest draft or asks for changes
    Reviewer,
}

impl Role {
    /// Canonical lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            Role::Producer => "producer",
            Role::Reviewer => "reviewer",
        }
    }

    /// The other role in the loop
    pub fn peer(self) -> Role {
        match self {
            Role::Producer => Role::Reviewer,
            Role::Reviewer => Role::Producer,
        }
    }

    /// Resolve a peer name emitted by the model.
    ///
    /// Accepts the canonical names plus the writer/critic aliases the role
    /// prompts use, case-insensitively. Returns `None` for any other name
    /// (e.g. a parent or greeter agent).
    pub fn from_name(name: &str) -> Option<Role> {
        match name.trim().to_ascii_lowercase().as_str() {
            "producer" | "writer" | "code_writer" => Some(Role::Producer),
            "reviewer" | "critic" | "code_critic" => Some(Role::Reviewer),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a participant asks the controller to do after its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "next", rename_all = "snake_case")]
pub enum Directive {
    /// Hand control to the named role
    Continue(Role),
    /// End the loop now
    Terminate,
}

impl Directive {
    pub fn is_terminate(&self) -> bool {
        matches!(self, Directive::Terminate)
    }

    /// The role this directive hands off to, if any
    pub fn next_role(&self) -> Option<Role> {
        match self {
            Directive::Continue(role) => Some(*role),
            Directive::Terminate => None,
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Continue(role) => write!(f, "continue({})", role),
            Directive::Terminate => f.write_str("terminate"),
        }
    }
}

//! Control tools offered to the model and how their calls become directives
//!
//! A participant hands off with `handoff_to { agent_name }` and the reviewer
//! ends the loop with `exit_loop {}`. Peer names are free text from the
//! model, so they are resolved against the closed `Role` set here.

use serde_json::json;

use crate::domain::Role;
use crate::error::{DraftloopError, Result};
use crate::llm::{CompletionResponse, ToolDefinition};

pub const HANDOFF_TO: &str = "handoff_to";
pub const EXIT_LOOP: &str = "exit_loop";

pub fn handoff_tool() -> ToolDefinition {
    ToolDefinition::new(
        HANDOFF_TO,
        "Transfer control to another participant in the loop.",
        json!({
            "type": "object",
            "properties": {
                "agent_name": {
                    "type": "string",
                    "description": "Name of the participant that should act next"
                }
            },
            "required": ["agent_name"]
        }),
    )
}

pub fn exit_loop_tool() -> ToolDefinition {
    ToolDefinition::new(
        EXIT_LOOP,
        "Call this only when the code passes every checklist item. Ends the refinement loop.",
        json!({ "type": "object", "properties": {} }),
    )
}

/// Control tool calls found in one model response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlCalls {
    /// `agent_name` of the first `handoff_to` call
    pub handoff: Option<String>,
    /// Whether `exit_loop` was called
    pub exit: bool,
}

impl ControlCalls {
    pub fn from_response(response: &CompletionResponse) -> Self {
        let mut calls = Self::default();

        for call in &response.tool_calls {
            match call.name.as_str() {
                HANDOFF_TO => {
                    let target = call
                        .input
                        .get("agent_name")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string();
                    match &calls.handoff {
                        None => calls.handoff = Some(target),
                        Some(first) => log::warn!("ignoring extra handoff_to '{}' after '{}'", target, first),
                    }
                }
                EXIT_LOOP => calls.exit = true,
                other => log::warn!("ignoring unknown tool call '{}'", other),
            }
        }

        calls
    }

    pub fn is_empty(&self) -> bool {
        self.handoff.is_none() && !self.exit
    }
}

/// Resolve a peer name emitted by `from` into a role
pub fn resolve_peer(from: Role, target: &str) -> Result<Role> {
    Role::from_name(target).ok_or_else(|| DraftloopError::MisroutedDirective {
        from,
        target: target.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ToolCall;

    fn handoff(name: &str) -> ToolCall {
        ToolCall::new("t-handoff", HANDOFF_TO, json!({ "agent_name": name }))
    }

    fn exit() -> ToolCall {
        ToolCall::new("t-exit", EXIT_LOOP, json!({}))
    }

    #[test]
    fn test_tool_schemas() {
        let schema = handoff_tool().to_anthropic_schema();
        assert_eq!(schema["name"], HANDOFF_TO);
        assert_eq!(schema["input_schema"]["required"][0], "agent_name");
        assert_eq!(exit_loop_tool().name, EXIT_LOOP);
    }

    #[test]
    fn test_no_calls() {
        let calls = ControlCalls::from_response(&CompletionResponse::text("def f(): pass"));
        assert!(calls.is_empty());
    }

    #[test]
    fn test_handoff_and_exit_extracted() {
        let response = CompletionResponse::text("PASS")
            .with_tool_call(exit())
            .with_tool_call(handoff("code_writer"));
        let calls = ControlCalls::from_response(&response);
        assert!(calls.exit);
        assert_eq!(calls.handoff.as_deref(), Some("code_writer"));
    }

    #[test]
    fn test_first_handoff_wins() {
        let response = CompletionResponse::text("")
            .with_tool_call(handoff("code_critic"))
            .with_tool_call(handoff("somebody_else"));
        let calls = ControlCalls::from_response(&response);
        assert_eq!(calls.handoff.as_deref(), Some("code_critic"));
    }

    #[test]
    fn test_handoff_without_name_is_blank_target() {
        let response = CompletionResponse::text("").with_tool_call(ToolCall::new("t", HANDOFF_TO, json!({})));
        let calls = ControlCalls::from_response(&response);
        assert_eq!(calls.handoff.as_deref(), Some(""));
    }

    #[test]
    fn test_unknown_tools_ignored() {
        let response = CompletionResponse::text("x").with_tool_call(ToolCall::new("t", "run_command", json!({})));
        assert!(ControlCalls::from_response(&response).is_empty());
    }

    #[test]
    fn test_resolve_peer() {
        assert_eq!(resolve_peer(Role::Producer, "code_critic").unwrap(), Role::Reviewer);
        assert_eq!(resolve_peer(Role::Reviewer, "Writer").unwrap(), Role::Producer);

        let err = resolve_peer(Role::Producer, "user").unwrap_err();
        assert!(matches!(
            err,
            DraftloopError::MisroutedDirective { from: Role::Producer, ref target } if target == "user"
        ));
    }
}

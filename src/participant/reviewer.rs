//! Reviewer - approves the latest draft or returns feedback
//!
//! ## Verdicts
//!
//! - `exit_loop`, or text opening with PASS / PASSED / APPROVE / APPROVED:
//!   terminate, no append
//! - `handoff_to` the producer, or any other text: the text (minus a leading
//!   `FAIL:`) becomes feedback and control returns to the producer
//! - a hand-off with no feedback, or nothing at all: missing directive
//!
//! An empty draft never reaches the model. The reviewer forwards the
//! request as feedback so the producer gets another chance to write one.

use std::sync::Arc;

use async_trait::async_trait;

use super::Participant;
use super::checklist::ReviewChecklist;
use super::directive::{ControlCalls, exit_loop_tool, handoff_tool, resolve_peer};
use crate::domain::{Directive, Role, Turn};
use crate::error::{DraftloopError, Result};
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompt::{PromptLibrary, ReviewerPrompt};
use crate::state::{RunContext, fields};

const APPROVAL_WORDS: [&str; 4] = ["PASSED", "PASS", "APPROVED", "APPROVE"];
const FAIL_PREFIX: &str = "FAIL:";

pub struct Reviewer<L: LlmClient> {
    client: L,
    prompts: Arc<PromptLibrary>,
    checklist: ReviewChecklist,
    max_tokens: Option<u32>,
}

impl<L: LlmClient> Reviewer<L> {
    pub fn new(client: L, prompts: Arc<PromptLibrary>) -> Self {
        Self {
            client,
            prompts,
            checklist: ReviewChecklist::default(),
            max_tokens: None,
        }
    }

    pub fn with_checklist(mut self, checklist: ReviewChecklist) -> Self {
        self.checklist = checklist;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn checklist(&self) -> &ReviewChecklist {
        &self.checklist
    }

    pub fn client(&self) -> &L {
        &self.client
    }
}

/// Text opens with an approval word followed by a non-word character
fn is_approval(text: &str) -> bool {
    let text = text.trim_start();
    APPROVAL_WORDS.iter().any(|word| {
        text.get(..word.len()).is_some_and(|head| head.eq_ignore_ascii_case(word))
            && text[word.len()..].chars().next().is_none_or(|c| !c.is_alphanumeric())
    })
}

fn strip_fail_prefix(text: &str) -> &str {
    let text = text.trim();
    match text.get(..FAIL_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(FAIL_PREFIX) => text[FAIL_PREFIX.len()..].trim(),
        _ => text,
    }
}

/// Directive and optional feedback from one review response
fn verdict(calls: &ControlCalls, text: &str) -> Result<(Directive, Option<String>)> {
    let feedback = || {
        let body = strip_fail_prefix(text);
        (!body.is_empty()).then(|| body.to_string())
    };

    match (&calls.handoff, calls.exit) {
        (Some(_), true) => Err(DraftloopError::ConflictingDirectives(Role::Reviewer)),
        (Some(target), false) => {
            let next = resolve_peer(Role::Reviewer, target)?;
            match (next, feedback()) {
                // a hand-off back must carry this round's feedback
                (Role::Producer, None) => Err(DraftloopError::MissingDirective(Role::Reviewer)),
                (next, feedback) => Ok((Directive::Continue(next), feedback)),
            }
        }
        (None, true) => Ok((Directive::Terminate, None)),
        (None, false) if is_approval(text) => Ok((Directive::Terminate, None)),
        (None, false) if !text.trim().is_empty() => Ok((Directive::Continue(Role::Producer), feedback())),
        (None, false) => Err(DraftloopError::MissingDirective(Role::Reviewer)),
    }
}

#[async_trait]
impl<L: LlmClient> Participant for Reviewer<L> {
    fn role(&self) -> Role {
        Role::Reviewer
    }

    async fn take_turn(&self, ctx: &RunContext) -> Result<Turn> {
        let draft = ctx.store().latest(fields::CODE_DRAFT);

        if draft.trim().is_empty() {
            log::warn!(
                "reviewer round {}: no draft to review, returning the request to the producer",
                ctx.round()
            );
            let request = ctx.request();
            let turn = Turn::new(Role::Reviewer, Directive::Continue(Role::Producer)).observing(fields::CODE_DRAFT, draft);
            return Ok(if request.trim().is_empty() {
                turn
            } else {
                turn.appending(fields::CRITICAL_FEEDBACK, request)
            });
        }

        let rendered = self.prompts.render_reviewer(&ReviewerPrompt {
            latest_code_draft: draft,
            checklist: self.checklist.items(),
            round: ctx.round(),
            max_rounds: ctx.max_rounds(),
            final_round: ctx.is_final_round(),
        })?;

        let mut completion = CompletionRequest::new(rendered.system)
            .with_user_message(rendered.user)
            .with_tools(vec![handoff_tool(), exit_loop_tool()]);
        if let Some(max_tokens) = self.max_tokens {
            completion = completion.with_max_tokens(max_tokens);
        }

        let response = self.client.complete(completion).await?;
        let (directive, feedback) = verdict(&ControlCalls::from_response(&response), &response.content)?;
        log::debug!("reviewer round {}: {}", ctx.round(), directive);

        let turn = Turn::new(Role::Reviewer, directive)
            .observing(fields::CODE_DRAFT, draft)
            .with_usage(response.usage);
        Ok(match feedback {
            Some(feedback) => turn.appending(fields::CRITICAL_FEEDBACK, feedback),
            None => turn,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionResponse, MockLlmClient, ToolCall};
    use crate::participant::directive::{EXIT_LOOP, HANDOFF_TO};
    use serde_json::json;

    fn reviewer(responses: Vec<CompletionResponse>) -> Reviewer<MockLlmClient> {
        Reviewer::new(MockLlmClient::new(responses), Arc::new(PromptLibrary::builtin().unwrap()))
    }

    fn context(draft: Option<&str>, max_rounds: u32, round: u32) -> RunContext {
        let mut ctx = RunContext::with_run_id("run-test", max_rounds);
        ctx.seed(fields::PROMPT, "add two numbers");
        if let Some(draft) = draft {
            ctx.seed(fields::CODE_DRAFT, draft);
        }
        for _ in 0..round {
            ctx.begin_round();
        }
        ctx
    }

    fn handoff(name: &str) -> ToolCall {
        ToolCall::new("t1", HANDOFF_TO, json!({ "agent_name": name }))
    }

    fn exit() -> ToolCall {
        ToolCall::new("t2", EXIT_LOOP, json!({}))
    }

    #[test]
    fn test_is_approval() {
        assert!(is_approval("PASS"));
        assert!(is_approval("  pass."));
        assert!(is_approval("APPROVED: looks good"));
        assert!(is_approval("Passed"));
        assert!(is_approval("approve - ship it"));
        assert!(!is_approval("PASSWORD handling is missing"));
        assert!(!is_approval("APPROVAL pending on logging"));
        assert!(!is_approval("PASSES half the checks"));
        assert!(!is_approval("FAIL: no docstring"));
        assert!(!is_approval(""));
    }

    #[test]
    fn test_strip_fail_prefix() {
        assert_eq!(strip_fail_prefix("FAIL: add logging"), "add logging");
        assert_eq!(strip_fail_prefix("fail:add logging "), "add logging");
        assert_eq!(strip_fail_prefix("add logging"), "add logging");
        assert_eq!(strip_fail_prefix("FAIL:"), "");
    }

    #[tokio::test]
    async fn test_exit_loop_terminates_without_append() {
        let reviewer = reviewer(vec![CompletionResponse::text("PASS").with_tool_call(exit())]);
        let turn = reviewer.take_turn(&context(Some("v1"), 5, 2)).await.unwrap();
        assert_eq!(turn.directive, Directive::Terminate);
        assert!(turn.appends.is_empty());
    }

    #[tokio::test]
    async fn test_pass_text_terminates() {
        let reviewer = reviewer(vec![CompletionResponse::text("PASS")]);
        let turn = reviewer.take_turn(&context(Some("v1"), 5, 2)).await.unwrap();
        assert!(turn.directive.is_terminate());
        assert!(turn.appends.is_empty());
    }

    #[tokio::test]
    async fn test_fail_becomes_feedback() {
        let reviewer = reviewer(vec![
            CompletionResponse::text("FAIL: add a docstring").with_tool_call(handoff("code_writer")),
        ]);
        let turn = reviewer.take_turn(&context(Some("v1"), 5, 2)).await.unwrap();
        assert_eq!(turn.directive, Directive::Continue(Role::Producer));
        assert_eq!(turn.appends.len(), 1);
        assert_eq!(turn.appends[0].field, fields::CRITICAL_FEEDBACK);
        assert_eq!(turn.appends[0].value, "add a docstring");
        assert_eq!(turn.observed.get(fields::CODE_DRAFT).map(String::as_str), Some("v1"));
    }

    #[tokio::test]
    async fn test_plain_text_without_tool_is_feedback() {
        let reviewer = reviewer(vec![CompletionResponse::text("Imports are missing")]);
        let turn = reviewer.take_turn(&context(Some("v1"), 5, 2)).await.unwrap();
        assert_eq!(turn.directive, Directive::Continue(Role::Producer));
        assert_eq!(turn.appends[0].value, "Imports are missing");
    }

    #[tokio::test]
    async fn test_handoff_without_feedback_is_missing_directive() {
        for text in ["  ", "FAIL:"] {
            let reviewer = reviewer(vec![CompletionResponse::text(text).with_tool_call(handoff("code_writer"))]);
            let err = reviewer.take_turn(&context(Some("v1"), 5, 2)).await.unwrap_err();
            assert!(matches!(err, DraftloopError::MissingDirective(Role::Reviewer)));
        }
    }

    #[tokio::test]
    async fn test_empty_response_is_missing_directive() {
        let reviewer = reviewer(vec![CompletionResponse::text("")]);
        let err = reviewer.take_turn(&context(Some("v1"), 5, 2)).await.unwrap_err();
        assert!(matches!(err, DraftloopError::MissingDirective(Role::Reviewer)));
    }

    #[tokio::test]
    async fn test_exit_with_handoff_conflicts() {
        let reviewer = reviewer(vec![
            CompletionResponse::text("PASS")
                .with_tool_call(exit())
                .with_tool_call(handoff("code_writer")),
        ]);
        let err = reviewer.take_turn(&context(Some("v1"), 5, 2)).await.unwrap_err();
        assert!(matches!(err, DraftloopError::ConflictingDirectives(Role::Reviewer)));
    }

    #[tokio::test]
    async fn test_handoff_to_unknown_peer_is_misrouted() {
        let reviewer = reviewer(vec![CompletionResponse::text("done").with_tool_call(handoff("greeter"))]);
        let err = reviewer.take_turn(&context(Some("v1"), 5, 2)).await.unwrap_err();
        assert!(matches!(
            err,
            DraftloopError::MisroutedDirective { from: Role::Reviewer, ref target } if target == "greeter"
        ));
    }

    #[tokio::test]
    async fn test_empty_draft_skips_model_and_forwards_request() {
        let reviewer = reviewer(Vec::new());
        let turn = reviewer.take_turn(&context(None, 5, 2)).await.unwrap();

        assert_eq!(reviewer.client().call_count(), 0);
        assert_eq!(turn.directive, Directive::Continue(Role::Producer));
        assert_eq!(turn.appends.len(), 1);
        assert_eq!(turn.appends[0].field, fields::CRITICAL_FEEDBACK);
        assert_eq!(turn.appends[0].value, "add two numbers");
    }

    #[tokio::test]
    async fn test_prompt_carries_draft_checklist_and_final_round() {
        let reviewer = reviewer(vec![CompletionResponse::text("PASS")])
            .with_checklist(ReviewChecklist::new().with_item("Uses type hints"));
        reviewer.take_turn(&context(Some("def f(): pass"), 4, 4)).await.unwrap();

        let request = &reviewer.client().requests()[0];
        assert!(request.system.contains("- Uses type hints"));
        assert!(request.system.contains("final round"));
        assert_eq!(request.last_user_message().map(str::trim), Some("CODE_DRAFT:\ndef f(): pass"));
        let tools: Vec<&str> = request.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tools, vec![HANDOFF_TO, EXIT_LOOP]);
    }
}

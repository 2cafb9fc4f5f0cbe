//! Producer - writes the first draft and every revision

use std::sync::Arc;

use async_trait::async_trait;

use super::Participant;
use super::directive::{ControlCalls, handoff_tool, resolve_peer};
use crate::domain::{Directive, Role, Turn};
use crate::error::{DraftloopError, Result};
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompt::{ProducerPrompt, PromptLibrary};
use crate::state::{RunContext, fields};

pub struct Producer<L: LlmClient> {
    client: L,
    prompts: Arc<PromptLibrary>,
    max_tokens: Option<u32>,
}

impl<L: LlmClient> Producer<L> {
    pub fn new(client: L, prompts: Arc<PromptLibrary>) -> Self {
        Self {
            client,
            prompts,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn client(&self) -> &L {
        &self.client
    }
}

/// Directive carried by the producer's control calls.
///
/// No hand-off call means the draft goes to the reviewer. The controller
/// rejects anything but `Continue(Reviewer)`.
fn producer_directive(calls: &ControlCalls) -> Result<Directive> {
    match (&calls.handoff, calls.exit) {
        (Some(_), true) => Err(DraftloopError::ConflictingDirectives(Role::Producer)),
        (Some(target), false) => resolve_peer(Role::Producer, target).map(Directive::Continue),
        (None, true) => Ok(Directive::Terminate),
        (None, false) => Ok(Directive::Continue(Role::Reviewer)),
    }
}

#[async_trait]
impl<L: LlmClient> Participant for Producer<L> {
    fn role(&self) -> Role {
        Role::Producer
    }

    async fn take_turn(&self, ctx: &RunContext) -> Result<Turn> {
        let store = ctx.store();
        let request = ctx.request();
        let (draft, feedback) = store.latest_pair(fields::CODE_DRAFT, fields::CRITICAL_FEEDBACK);

        let rendered = self.prompts.render_producer(&ProducerPrompt {
            prompt: request,
            latest_code_draft: draft,
            latest_feedback: feedback,
            round: ctx.round(),
            max_rounds: ctx.max_rounds(),
        })?;

        let mut completion = CompletionRequest::new(rendered.system)
            .with_user_message(rendered.user)
            .with_tools(vec![handoff_tool()]);
        if let Some(max_tokens) = self.max_tokens {
            completion = completion.with_max_tokens(max_tokens);
        }

        log::debug!(
            "producer round {}: {} draft",
            ctx.round(),
            if draft.is_empty() { "initial" } else { "revising" }
        );
        let response = self.client.complete(completion).await?;
        if response.stop_reason.is_truncated() {
            log::warn!("producer round {}: draft truncated at max_tokens", ctx.round());
        }

        let directive = producer_directive(&ControlCalls::from_response(&response))?;

        Ok(Turn::new(Role::Producer, directive)
            .observing(fields::PROMPT, request)
            .observing(fields::CODE_DRAFT, draft)
            .observing(fields::CRITICAL_FEEDBACK, feedback)
            .appending(fields::CODE_DRAFT, response.content)
            .with_usage(response.usage))
    }
}

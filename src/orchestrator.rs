//! Run Orchestrator - one request in, one `RunReport` out

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consolidate::Consolidator;
use crate::controller::LoopController;
use crate::domain::{EventRecord, FinalResult, LoopRun, TerminationReason};
use crate::error::{DraftloopError, Result};
use crate::llm::{LlmClient, Usage};
use crate::observe::{ObserverSet, RunObserver};
use crate::participant::{Producer, ReviewChecklist, Reviewer};
use crate::prompt::PromptLibrary;
use crate::state::{RunContext, StateStore, fields};

/// Default round cap
pub const DEFAULT_MAX_ROUNDS: u32 = 5;

/// Knobs for a run built from a single model client
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub max_rounds: u32,
    pub max_tokens: Option<u32>,
    pub normalize: bool,
    pub checklist: ReviewChecklist,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            max_tokens: None,
            normalize: true,
            checklist: ReviewChecklist::default(),
        }
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub result: FinalResult,
    pub reason: TerminationReason,
    pub run: LoopRun,
    pub store: StateStore,
    pub usage: Usage,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn rounds(&self) -> u32 {
        self.run.round_count
    }

    pub fn is_approved(&self) -> bool {
        self.reason == TerminationReason::Approved
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

pub struct Orchestrator {
    controller: LoopController,
    consolidator: Consolidator,
    observers: ObserverSet,
    max_rounds: u32,
}

impl Orchestrator {
    pub fn new(controller: LoopController, max_rounds: u32) -> Self {
        Self {
            controller,
            consolidator: Consolidator::default(),
            observers: ObserverSet::new(),
            max_rounds,
        }
    }

    /// Producer and reviewer sharing one model client
    pub fn with_client(client: Arc<dyn LlmClient>, prompts: Arc<PromptLibrary>, settings: RunSettings) -> Result<Self> {
        let mut producer = Producer::new(client.clone(), prompts.clone());
        let mut reviewer = Reviewer::new(client, prompts).with_checklist(settings.checklist);
        if let Some(max_tokens) = settings.max_tokens {
            producer = producer.with_max_tokens(max_tokens);
            reviewer = reviewer.with_max_tokens(max_tokens);
        }

        let controller = LoopController::new(producer, reviewer)?;
        Ok(Self::new(controller, settings.max_rounds).with_consolidator(Consolidator::new(settings.normalize)))
    }

    pub fn with_consolidator(mut self, consolidator: Consolidator) -> Self {
        self.consolidator = consolidator;
        self
    }

    pub fn with_observer(mut self, observer: impl RunObserver + 'static) -> Self {
        self.observers.add(observer);
        self
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub async fn run(&self, request: &str) -> Result<RunReport> {
        if request.trim().is_empty() {
            return Err(DraftloopError::InvalidRequest("request is blank".to_string()));
        }

        let started_at = Utc::now();
        let mut ctx = RunContext::new(self.max_rounds);
        ctx.seed(fields::PROMPT, request);

        log::info!("[{}] run started (max_rounds={})", ctx.run_id(), self.max_rounds);
        self.observers
            .notify(&EventRecord::run_started(ctx.run_id(), request, self.max_rounds));

        let outcome = match self.controller.run(&mut ctx, &self.observers).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("[{}] run failed in round {}: {}", ctx.run_id(), ctx.round(), e);
                self.observers
                    .notify(&EventRecord::run_failed(ctx.run_id(), ctx.round(), &e.to_string()));
                return Err(e);
            }
        };

        let reason = outcome
            .reason()
            .ok_or_else(|| DraftloopError::InvalidState("loop returned without terminating".to_string()))?;
        let result = self.consolidator.consolidate(ctx.store());

        log::info!(
            "[{}] run finished: {} after {} rounds, {}",
            ctx.run_id(),
            reason,
            outcome.run.round_count,
            if result.is_artifact() { "artifact emitted" } else { "no artifact" }
        );
        self.observers
            .notify(&EventRecord::run_finished(
                ctx.run_id(),
                outcome.run.round_count,
                &result,
                &ctx.store().snapshot(),
            ));

        let run_id = ctx.run_id().to_string();
        Ok(RunReport {
            run_id,
            result,
            reason,
            run: outcome.run,
            store: ctx.into_store(),
            usage: outcome.usage,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

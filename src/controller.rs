//! Loop Controller - alternates the participants under a round cap
//!
//! ## State machine
//!
//! ```text
//! AwaitingProducer --continue(reviewer)--> AwaitingReviewer
//! AwaitingReviewer --continue(producer)--> AwaitingProducer
//! AwaitingReviewer --terminate-----------> Terminated(approved)
//! any, round == max_rounds --------------> Terminated(round cap)
//! ```
//!
//! Each participant turn is one round. A turn is validated against the
//! routing table before anything it asked for is committed, so a rejected
//! turn leaves the store exactly as it was.

use std::fmt;

use crate::domain::{Directive, EventRecord, LoopRun, Role, Round, TerminationReason, Turn};
use crate::error::{DraftloopError, Result};
use crate::llm::Usage;
use crate::observe::ObserverSet;
use crate::participant::Participant;
use crate::state::RunContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    AwaitingProducer,
    AwaitingReviewer,
    Terminated(TerminationReason),
}

impl ControllerState {
    /// Role whose turn it is, if the loop is still running
    pub fn expected_role(&self) -> Option<Role> {
        match self {
            ControllerState::AwaitingProducer => Some(Role::Producer),
            ControllerState::AwaitingReviewer => Some(Role::Reviewer),
            ControllerState::Terminated(_) => None,
        }
    }

    /// Whether `directive` is a legal exit from this state
    pub fn permits(&self, directive: Directive) -> bool {
        matches!(
            (self, directive),
            (ControllerState::AwaitingProducer, Directive::Continue(Role::Reviewer))
                | (ControllerState::AwaitingReviewer, Directive::Continue(Role::Producer))
                | (ControllerState::AwaitingReviewer, Directive::Terminate)
        )
    }

    /// State after an accepted `directive` in round `round` of `max_rounds`
    pub fn advance(self, directive: Directive, round: u32, max_rounds: u32) -> ControllerState {
        if directive.is_terminate() {
            return ControllerState::Terminated(TerminationReason::Approved);
        }
        if round >= max_rounds {
            return ControllerState::Terminated(TerminationReason::RoundCap);
        }
        match self {
            ControllerState::AwaitingProducer => ControllerState::AwaitingReviewer,
            ControllerState::AwaitingReviewer => ControllerState::AwaitingProducer,
            terminated => terminated,
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerState::AwaitingProducer => f.write_str("awaiting producer"),
            ControllerState::AwaitingReviewer => f.write_str("awaiting reviewer"),
            ControllerState::Terminated(reason) => write!(f, "terminated ({})", reason),
        }
    }
}

/// What a completed loop hands back to the orchestrator
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    pub run: LoopRun,
    pub usage: Usage,
}

impl LoopOutcome {
    pub fn reason(&self) -> Option<TerminationReason> {
        self.run.termination_reason()
    }
}

pub struct LoopController {
    producer: Box<dyn Participant>,
    reviewer: Box<dyn Participant>,
}

impl LoopController {
    pub fn new(producer: impl Participant + 'static, reviewer: impl Participant + 'static) -> Result<Self> {
        if producer.role() != Role::Producer {
            return Err(DraftloopError::InvalidState(format!(
                "producer slot holds a {} participant",
                producer.role()
            )));
        }
        if reviewer.role() != Role::Reviewer {
            return Err(DraftloopError::InvalidState(format!(
                "reviewer slot holds a {} participant",
                reviewer.role()
            )));
        }
        Ok(Self {
            producer: Box::new(producer),
            reviewer: Box::new(reviewer),
        })
    }

    fn participant(&self, role: Role) -> &dyn Participant {
        match role {
            Role::Producer => self.producer.as_ref(),
            Role::Reviewer => self.reviewer.as_ref(),
        }
    }

    /// Drive the loop to termination.
    ///
    /// Returns `Err` on the first participant failure or rejected turn;
    /// `ctx.round()` then names the round that failed.
    pub async fn run(&self, ctx: &mut RunContext, observers: &ObserverSet) -> Result<LoopOutcome> {
        let max_rounds = ctx.max_rounds();
        let mut run = LoopRun::new(max_rounds);
        let mut usage = Usage::default();
        let mut state = if max_rounds == 0 {
            log::warn!("[{}] max_rounds is 0, terminating before the first round", ctx.run_id());
            ControllerState::Terminated(TerminationReason::RoundCap)
        } else {
            ControllerState::AwaitingProducer
        };

        while let Some(expected) = state.expected_role() {
            let number = ctx.begin_round();
            log::info!("[{}] round {}/{}: {}", ctx.run_id(), number, max_rounds, state);

            let turn = match self.participant(expected).take_turn(ctx).await {
                Ok(turn) => turn,
                Err(e) => {
                    log::error!("[{}] round {} {} failed: {}", ctx.run_id(), number, expected, e);
                    return Err(e);
                }
            };
            usage.add(&turn.usage);

            if let Err(e) = validate(state, &turn) {
                log::error!("[{}] round {} rejected: {}", ctx.run_id(), number, e);
                return Err(e);
            }

            run.record(Round::from_turn(number, &turn))?;
            ctx.commit(&turn.appends);
            if let Some(round) = run.last_round() {
                observers.notify(&EventRecord::round_complete(ctx.run_id(), round));
            }

            state = state.advance(turn.directive, number, max_rounds);
        }

        if let ControllerState::Terminated(reason) = state {
            run.terminate(reason)?;
            log::info!("[{}] loop terminated after {} rounds: {}", ctx.run_id(), run.round_count, reason);
            observers.notify(&EventRecord::loop_terminated(ctx.run_id(), run.round_count, reason));
        }

        Ok(LoopOutcome { run, usage })
    }
}

/// Check a turn against the state it was taken in
fn validate(state: ControllerState, turn: &Turn) -> Result<()> {
    let expected = state
        .expected_role()
        .ok_or_else(|| DraftloopError::InvalidState("turn taken after termination".to_string()))?;

    if turn.role != expected {
        return Err(DraftloopError::InvalidState(format!(
            "expected a {} turn, got a {} turn",
            expected, turn.role
        )));
    }

    if !state.permits(turn.directive) {
        let target = match turn.directive {
            Directive::Continue(role) => role.name().to_string(),
            Directive::Terminate => turn.directive.to_string(),
        };
        return Err(DraftloopError::MisroutedDirective { from: turn.role, target });
    }

    Ok(())
}

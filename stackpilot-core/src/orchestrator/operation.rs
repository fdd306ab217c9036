//! Per-operation bookkeeping: phase tracking, timing and the in-flight guard.

use crate::error::{Result, StackError};
use crate::observability::format_elapsed;
use crate::types::{
    OperationKind, OperationPhase, OperationReport, ParameterDirective, StackEvent, TagEntry,
};
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Stack names with an operation in progress in this process.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    stacks: Mutex<HashSet<String>>,
}

impl InFlight {
    /// Claim `stack` for the lifetime of the returned guard.
    pub(crate) fn claim(&self, stack: &str) -> Result<InFlightGuard<'_>> {
        let mut stacks = self.stacks.lock().unwrap_or_else(PoisonError::into_inner);
        if !stacks.insert(stack.to_string()) {
            return Err(StackError::StackBusy { stack: stack.to_string() });
        }
        Ok(InFlightGuard { owner: self, stack: stack.to_string() })
    }
}

pub(crate) struct InFlightGuard<'a> {
    owner: &'a InFlight,
    stack: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut stacks = self.owner.stacks.lock().unwrap_or_else(PoisonError::into_inner);
        stacks.remove(&self.stack);
    }
}

/// A running operation.
pub(crate) struct Operation<'a> {
    pub(crate) kind: OperationKind,
    pub(crate) stack: String,
    phase: OperationPhase,
    started: Instant,
    created: bool,
    directives: Vec<ParameterDirective>,
    tags: Vec<TagEntry>,
    waited_for: Vec<StackEvent>,
    _guard: InFlightGuard<'a>,
}

impl<'a> Operation<'a> {
    pub(crate) fn begin(kind: OperationKind, stack: &str, guard: InFlightGuard<'a>) -> Self {
        debug!(operation = %kind, stack = %stack, "Operation pending");
        Self {
            kind,
            stack: stack.to_string(),
            phase: OperationPhase::Pending,
            started: Instant::now(),
            created: false,
            directives: Vec::new(),
            tags: Vec::new(),
            waited_for: Vec::new(),
            _guard: guard,
        }
    }

    pub(crate) fn phase(&self) -> OperationPhase {
        self.phase
    }

    /// Record what was accepted by the control plane.
    pub(crate) fn submitted(
        &mut self,
        created: bool,
        directives: Vec<ParameterDirective>,
        tags: Vec<TagEntry>,
    ) {
        self.created = created;
        self.directives = directives;
        self.tags = tags;
        self.advance(OperationPhase::Submitted);
    }

    pub(crate) fn waiting_for(&mut self, event: StackEvent) {
        if self.phase == OperationPhase::Submitted {
            self.advance(OperationPhase::Waiting);
        }
        debug!(stack = %self.stack, %event, "Waiting for stack event");
        self.waited_for.push(event);
    }

    fn advance(&mut self, next: OperationPhase) {
        if !self.phase.can_advance_to(next) {
            warn!(
                stack = %self.stack,
                from = ?self.phase,
                to = ?next,
                "Unexpected phase transition"
            );
        }
        debug!(operation = %self.kind, stack = %self.stack, phase = ?next, "Operation phase");
        self.phase = next;
    }

    fn fail(&mut self, err: &StackError) {
        let failed_in = self.phase;
        self.advance(OperationPhase::Failed);
        error!(
            operation = %self.kind,
            stack = %self.stack,
            phase = ?failed_in,
            error = %err,
            "Operation failed"
        );
    }

    /// Close the operation: `Done` with a report, or `Failed` with the error
    /// returned unchanged.
    pub(crate) fn finish(mut self, outcome: Result<()>) -> Result<OperationReport> {
        let elapsed = self.started.elapsed();

        if let Err(e) = outcome {
            self.fail(&e);
            return Err(e);
        }

        self.advance(OperationPhase::Done);
        let verb = self.kind.verb().to_lowercase();
        info!(operation = %self.kind, stack = %self.stack, "Finished {}", verb);
        info!(stack = %self.stack, "{}", format_elapsed(elapsed));

        Ok(OperationReport {
            kind: self.kind,
            stack_name: self.stack.clone(),
            created: self.created,
            directives: std::mem::take(&mut self.directives),
            tags: std::mem::take(&mut self.tags),
            waited_for: std::mem::take(&mut self.waited_for),
            elapsed,
        })
    }
}

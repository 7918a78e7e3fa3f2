//! Dependency-aware scheduler.
//!
//! The [`Runner`] owns a registry of pending steps and resolves it to a fixed
//! point: each pass runs every step whose predecessor has a satisfied outcome,
//! persists state after every attempt, and the loop ends with the first pass
//! that runs nothing.
//!
//! Ordering rules:
//!
//! - Steps run one at a time, in registry (insertion) order. Reloading a name
//!   replaces the step in place.
//! - Readiness is decided once per pass, from the outcomes recorded before the
//!   pass started. A step unblocked during a pass runs in the next one.
//! - A failed step stays in the registry and is ready again on the next pass.
//!   Its own attempt budget bounds the retries; running out of it aborts the
//!   resolution with [`OutpostError::StepExhausted`](crate::error::OutpostError).

use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::state::StateStore;
use crate::steps::{Attempt, Step};
use crate::ui::OutputSink;

/// Summary of one [`Runner::resolve`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Scans of the registry, including the final one that ran nothing.
    pub passes: usize,

    /// Step attempts made, successful or not.
    pub attempted: usize,

    /// Failed attempts that were left for a retry.
    pub failures: usize,

    /// Steps that finished during this call, in completion order.
    pub completed: Vec<String>,

    /// Loaded steps dropped up front because they had already completed.
    pub skipped: Vec<String>,

    /// Steps still pending because their predecessor never became satisfied.
    pub stalled: Vec<String>,
}

impl ResolveReport {
    /// Whether every loaded step finished.
    pub fn is_complete(&self) -> bool {
        self.stalled.is_empty()
    }
}

/// Owns pending steps and the persisted state they update.
pub struct Runner {
    registry: Vec<Box<dyn Step>>,
    state: StateStore,
}

impl Runner {
    pub fn new(state: StateStore) -> Self {
        Self {
            registry: Vec::new(),
            state,
        }
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn into_state(self) -> StateStore {
        self.state
    }

    /// Names of the steps currently pending, in run order.
    pub fn pending(&self) -> Vec<&str> {
        self.registry.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Insert a step, replacing any pending step with the same name.
    pub fn load_step(&mut self, step: Box<dyn Step>) {
        match self.registry.iter().position(|s| s.name() == step.name()) {
            Some(idx) => self.registry[idx] = step,
            None => self.registry.push(step),
        }
    }

    /// Link `steps` into a chain and load them.
    ///
    /// The first step depends on `start` (or nothing), every later step on
    /// the one before it. Any predecessor set on the steps beforehand is
    /// overwritten.
    pub fn load_dependency_chain(&mut self, steps: Vec<Box<dyn Step>>, start: Option<&str>) {
        let mut previous = start.map(str::to_string);
        for mut step in steps {
            step.set_depends(previous.take());
            previous = Some(step.name().to_string());
            self.load_step(step);
        }
    }

    /// Run pending steps until a pass makes no attempt.
    ///
    /// Errors from a step (attempt budget exhausted, I/O failures) abort the
    /// call immediately. State saved after earlier attempts stays on disk.
    pub fn resolve(&mut self, sink: &mut dyn OutputSink) -> Result<ResolveReport> {
        let mut report = ResolveReport::default();

        let state = &self.state;
        self.registry.retain(|step| {
            let done = state.is_complete(step.name());
            if done {
                debug!("Skipping '{}': already completed", step.name());
                report.skipped.push(step.name().to_string());
            }
            !done
        });

        loop {
            report.passes += 1;
            let ready: Vec<usize> = self
                .registry
                .iter()
                .enumerate()
                .filter(|(_, step)| step.depends().is_none_or(|dep| self.state.is_satisfied(dep)))
                .map(|(idx, _)| idx)
                .collect();

            if ready.is_empty() {
                break;
            }
            debug!("Pass {}: {} ready", report.passes, ready.len());

            let mut finished = HashSet::new();
            for idx in ready {
                let remaining = self.registry.len() - finished.len();
                let step = &mut self.registry[idx];
                let name = step.name().to_string();

                if step.core().is_exhausted() {
                    error!("'{}' used all {} attempts", name, step.max_attempts());
                    return Err(step.core().exhausted_error());
                }

                sink.clear();
                sink.start_step(self.state.counter(), &name, remaining)?;
                info!(
                    "Running '{}' (attempt {}/{})",
                    name,
                    step.attempts() + 1,
                    step.max_attempts()
                );

                let attempt = step.run(sink)?;
                self.state.bump_counter();
                report.attempted += 1;
                sink.finish_step(&name, &attempt)?;

                match attempt {
                    Attempt::Done(outcome) => {
                        // Recorded even when unsatisfied: never rerun, dependents stay blocked.
                        info!("'{}' completed: {}", name, outcome);
                        self.state.record(&name, outcome);
                        report.completed.push(name);
                        finished.insert(idx);
                    }
                    Attempt::Failed => {
                        warn!("'{}' failed, will retry", name);
                        report.failures += 1;
                    }
                }
                self.state.save()?;
            }

            let mut idx = 0;
            self.registry.retain(|_| {
                let keep = !finished.contains(&idx);
                idx += 1;
                keep
            });
        }

        report.stalled = self.pending().into_iter().map(String::from).collect();
        if !report.stalled.is_empty() {
            warn!(
                "Resolution stopped with {} step(s) waiting on unsatisfied predecessors: {}",
                report.stalled.len(),
                report.stalled.join(", ")
            );
        }

        Ok(report)
    }
}

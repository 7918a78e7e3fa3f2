//! Driving a plan through the runner, one stage at a time.
//!
//! Stages are built lazily: each one is interpolated against the outcomes
//! recorded by everything before it, then loaded and resolved. Steps left
//! pending by an earlier stage stay in the runner and are retried by every
//! later resolution.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{OutpostError, Result};
use crate::runner::{ResolveReport, Runner};
use crate::state::StateStore;
use crate::ui::OutputSink;

use super::build::StageBuilder;
use super::interpolation::Variables;
use super::loader::Plan;
use super::schema::StepKind;

/// Summary of a plan run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanReport {
    /// One report per stage that was loaded, in order.
    pub stages: Vec<ResolveReport>,

    /// Indexes of stages whose `when` gate was not satisfied.
    pub gated: Vec<usize>,

    /// Steps still pending after the last resolution.
    pub stalled: Vec<String>,
}

impl PlanReport {
    pub fn attempted(&self) -> usize {
        self.stages.iter().map(|s| s.attempted).sum()
    }

    /// Steps completed during this run, in completion order.
    pub fn completed(&self) -> Vec<&str> {
        self.stages
            .iter()
            .flat_map(|s| s.completed.iter().map(String::as_str))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.stalled.is_empty()
    }
}

/// Runs a [`Plan`] with the given settings.
pub struct PlanExecutor<'a> {
    plan: &'a Plan,
    settings: &'a Settings,
}

impl<'a> PlanExecutor<'a> {
    pub fn new(plan: &'a Plan, settings: &'a Settings) -> Self {
        Self { plan, settings }
    }

    /// Fail early if a question still to be asked cannot be answered.
    ///
    /// Questions already recorded in `state` are not asked again and are
    /// ignored here, as are questions in stages that can no longer run: a
    /// stage gated on a recorded but unsatisfied step, or on any step of such
    /// a stage.
    pub fn check_answers(&self, state: &StateStore, sink: &dyn OutputSink) -> Result<()> {
        let mut unreachable: HashSet<&str> = HashSet::new();

        for stage in &self.plan.config().stages {
            let steps = stage.chains.iter().flat_map(|chain| chain.steps.iter());

            if let Some(gate) = stage.when.as_deref() {
                let refused = state.is_complete(gate) && !state.is_satisfied(gate);
                if refused || unreachable.contains(gate) {
                    unreachable.extend(steps.map(|step| step.name.as_str()));
                    continue;
                }
            }

            for step in steps {
                let StepKind::Question { label, .. } = &step.kind else {
                    continue;
                };
                if state.is_complete(&step.name) {
                    continue;
                }
                if !sink.can_answer(&step.name) {
                    return Err(OutpostError::PromptUnavailable {
                        label: label.clone(),
                        reason: sink.answer_hint(&step.name),
                    });
                }
            }
        }
        Ok(())
    }

    /// Load and resolve every stage in order.
    pub fn run(&self, runner: &mut Runner, sink: &mut dyn OutputSink) -> Result<PlanReport> {
        let mut report = PlanReport::default();
        let stages = &self.plan.config().stages;

        for (idx, stage) in stages.iter().enumerate() {
            if let Some(gate) = &stage.when {
                if !runner.state().is_satisfied(gate) {
                    info!("Stage {}: skipped, '{}' is not satisfied", idx + 1, gate);
                    report.gated.push(idx);
                    continue;
                }
            }

            let vars = Variables::from_state(runner.state());
            let chains = StageBuilder::new(self.plan, self.settings, &vars).build(stage)?;
            debug!(
                "Stage {}/{}: loading {} chain(s)",
                idx + 1,
                stages.len(),
                chains.len()
            );
            for chain in chains {
                runner.load_dependency_chain(chain.steps, chain.after.as_deref());
            }

            let resolved = runner.resolve(sink)?;
            report.stalled = resolved.stalled.clone();
            report.stages.push(resolved);
        }

        Ok(report)
    }
}

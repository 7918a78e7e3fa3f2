//! Interactive question steps.

use crate::error::Result;
use crate::ui::OutputSink;

use super::{Attempt, Outcome, Step, StepCore};

/// Asks the operator for a line of free text.
///
/// Always finishes with the literal answer. An empty answer is recorded but
/// leaves dependents blocked, which is how plans gate optional steps.
#[derive(Debug, Clone)]
pub struct QuestionStep {
    core: StepCore,
    title: String,
    help: String,
    label: String,
}

impl QuestionStep {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        help: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            core: StepCore::new(name),
            title: title.into(),
            help: help.into(),
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Step for QuestionStep {
    fn core(&self) -> &StepCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StepCore {
        &mut self.core
    }

    fn run(&mut self, sink: &mut dyn OutputSink) -> Result<Attempt> {
        self.core.begin_attempt()?;

        sink.emit(&self.title)?;
        if !self.help.is_empty() {
            sink.emit("")?;
            sink.emit(&self.help)?;
            sink.emit("")?;
        }
        let answer = sink.prompt(&self.label)?;

        Ok(Attempt::Done(Outcome::text(answer)))
    }
}

//! Turning plan stages into runnable steps.

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::Result;
use crate::shell::EnvOverlay;
use crate::steps::{
    BulkRegexEdit, CommandStep, CopyFile, EditRule, FileAppend, QuestionStep, RegexEdit, Step,
};

use super::interpolation::Variables;
use super::loader::Plan;
use super::schema::{StageConfig, StepConfig, StepKind};

/// A chain ready to hand to
/// [`Runner::load_dependency_chain`](crate::runner::Runner::load_dependency_chain).
pub struct BuiltChain {
    pub after: Option<String>,
    pub steps: Vec<Box<dyn Step>>,
}

/// Builds steps for one stage against the outcomes recorded so far.
pub struct StageBuilder<'a> {
    plan: &'a Plan,
    settings: &'a Settings,
    vars: &'a Variables,
}

impl<'a> StageBuilder<'a> {
    pub fn new(plan: &'a Plan, settings: &'a Settings, vars: &'a Variables) -> Self {
        Self {
            plan,
            settings,
            vars,
        }
    }

    /// Build every chain of `stage`, interpolating all string fields.
    pub fn build(&self, stage: &StageConfig) -> Result<Vec<BuiltChain>> {
        stage
            .chains
            .iter()
            .map(|chain| {
                let steps = chain
                    .steps
                    .iter()
                    .map(|step| self.build_step(step))
                    .collect::<Result<Vec<_>>>()?;
                Ok(BuiltChain {
                    after: chain.after.clone(),
                    steps,
                })
            })
            .collect()
    }

    /// Build a single step.
    pub fn build_step(&self, config: &StepConfig) -> Result<Box<dyn Step>> {
        let max_attempts = config.max_attempts.unwrap_or(self.settings.max_attempts);
        let name = config.name.as_str();

        let step: Box<dyn Step> = match &config.kind {
            StepKind::Command { run, cwd, env } => {
                let cwd = match cwd {
                    Some(dir) => self.path(dir)?,
                    None => self.plan.base_dir().to_path_buf(),
                };
                let env = self.plan.config().env.layered(env);
                Box::new(
                    CommandStep::new(name, self.text(run)?)
                        .in_dir(cwd)
                        .with_env(self.env(&env)?)
                        .with_poll_interval(self.settings.poll_interval)
                        .with_max_attempts(max_attempts),
                )
            }
            StepKind::Question { title, help, label } => Box::new(
                QuestionStep::new(
                    name,
                    self.text(title)?,
                    self.text(help)?,
                    self.text(label)?,
                )
                .with_max_attempts(max_attempts),
            ),
            StepKind::RegexEdit {
                path,
                pattern,
                replace,
            } => {
                let rule = EditRule::new(&self.text(pattern)?, self.text(replace)?)?;
                Box::new(RegexEdit::new(name, self.path(path)?, rule).with_max_attempts(max_attempts))
            }
            StepKind::BulkRegexEdit { dir, files, rules } => {
                let rules = rules
                    .iter()
                    .map(|r| EditRule::new(&self.text(&r.pattern)?, self.text(&r.replace)?))
                    .collect::<Result<Vec<_>>>()?;
                Box::new(
                    BulkRegexEdit::new(name, self.path(dir)?, &self.text(files)?, rules)?
                        .with_max_attempts(max_attempts),
                )
            }
            StepKind::FileAppend { path, text } => Box::new(
                FileAppend::new(name, self.path(path)?, self.text(text)?)
                    .with_max_attempts(max_attempts),
            ),
            StepKind::CopyFile { from, to } => Box::new(
                CopyFile::new(name, self.path(from)?, self.path(to)?)
                    .with_max_attempts(max_attempts),
            ),
        };

        Ok(step)
    }

    fn text(&self, raw: &str) -> Result<String> {
        self.vars.resolve(raw)
    }

    /// Interpolate a path and anchor relative ones at the plan directory.
    fn path(&self, raw: &Path) -> Result<PathBuf> {
        let resolved = PathBuf::from(self.text(&raw.to_string_lossy())?);
        if resolved.is_absolute() {
            Ok(resolved)
        } else {
            Ok(self.plan.base_dir().join(resolved))
        }
    }

    fn env(&self, env: &EnvOverlay) -> Result<EnvOverlay> {
        env.iter()
            .map(|(k, v)| Ok((k.to_string(), self.text(v)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OutpostError;
    use crate::ui::MockSink;
    use std::fs;
    use tempfile::TempDir;

    const PLAN: &str = r#"
env:
  GREETING: hello
stages:
  - chains:
      - after: hostname
        steps:
          - name: greet
            kind: command
            run: echo "$GREETING from ${hostname}" > greeting.txt
            env:
              GREETING: hi
          - name: motd
            kind: file_append
            path: motd
            text: "host ${hostname}\n"
            max_attempts: 2
"#;

    fn setup(temp: &TempDir) -> (Plan, Settings) {
        let path = temp.path().join("plan.yml");
        fs::write(&path, PLAN).unwrap();
        let plan = Plan::load(&path).unwrap();
        let settings = Settings::with_home(temp.path().join("home"));
        (plan, settings)
    }

    #[test]
    fn builds_chains_with_settings_defaults() {
        let temp = TempDir::new().unwrap();
        let (plan, settings) = setup(&temp);
        let vars = Variables::new().with("hostname", "db01");

        let chains = StageBuilder::new(&plan, &settings, &vars)
            .build(&plan.config().stages[0])
            .unwrap();

        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].after.as_deref(), Some("hostname"));
        let steps = &chains[0].steps;
        assert_eq!(steps[0].name(), "greet");
        assert_eq!(steps[0].max_attempts(), settings.max_attempts);
        assert_eq!(steps[1].max_attempts(), 2);
    }

    #[test]
    fn relative_paths_resolve_against_plan_dir() {
        let temp = TempDir::new().unwrap();
        let (plan, settings) = setup(&temp);
        let vars = Variables::new().with("hostname", "db01");

        let mut chains = StageBuilder::new(&plan, &settings, &vars)
            .build(&plan.config().stages[0])
            .unwrap();
        let mut sink = MockSink::new();
        for step in chains[0].steps.iter_mut() {
            step.run(&mut sink).unwrap();
        }

        assert_eq!(
            fs::read_to_string(temp.path().join("greeting.txt")).unwrap(),
            "hi from db01\n"
        );
        assert_eq!(
            fs::read_to_string(temp.path().join("motd")).unwrap(),
            "host db01\n"
        );
    }

    #[test]
    fn missing_answer_fails_the_build() {
        let temp = TempDir::new().unwrap();
        let (plan, settings) = setup(&temp);
        let vars = Variables::new();

        let err = StageBuilder::new(&plan, &settings, &vars)
            .build(&plan.config().stages[0])
            .err()
            .unwrap();
        assert!(matches!(err, OutpostError::UnknownVariable { name } if name == "hostname"));
    }

    #[test]
    fn invalid_pattern_fails_the_build() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plan.yml");
        fs::write(
            &path,
            "stages:\n  - chains:\n      - steps:\n          - {name: e, kind: regex_edit, path: f, pattern: '(', replace: x}\n",
        )
        .unwrap();
        let plan = Plan::load(&path).unwrap();
        let settings = Settings::with_home(temp.path());
        let vars = Variables::new();

        let err = StageBuilder::new(&plan, &settings, &vars)
            .build(&plan.config().stages[0])
            .err()
            .unwrap();
        assert!(matches!(err, OutpostError::InvalidPattern { .. }));
    }
}

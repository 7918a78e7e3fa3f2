//! Regex search/replace steps over configuration files.
//!
//! Both variants report the number of changed lines and always finish
//! satisfied, even when nothing changed. Plans rely on that, so a rule that
//! no longer matches (because an earlier attempt already applied it) does not
//! block the rest of the chain.

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{OutpostError, Result};
use crate::state::write_atomic;
use crate::ui::OutputSink;

use super::{Attempt, Outcome, Step, StepCore};

/// A single search/replace rule applied line by line.
///
/// The replacement uses `regex` syntax, so `$1` and `${name}` refer to
/// capture groups.
#[derive(Debug, Clone)]
pub struct EditRule {
    pattern: Regex,
    replacement: String,
}

impl EditRule {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| OutpostError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            pattern,
            replacement: replacement.into(),
        })
    }

    /// Apply the rule to one line (without its line ending).
    pub fn apply(&self, line: &str) -> String {
        self.pattern
            .replace_all(line, self.replacement.as_str())
            .into_owned()
    }
}

/// Rewrite `path` in place, writing a line diff to `sink`.
///
/// Returns the number of lines that changed.
fn edit_file(path: &Path, rules: &[EditRule], sink: &mut dyn OutputSink) -> Result<usize> {
    let content = fs::read_to_string(path)?;
    let mut rewritten = String::with_capacity(content.len());
    let mut changed = 0;

    sink.emit(&format!("--- {}", path.display()))?;
    for raw in content.split_inclusive('\n') {
        let (line, ending) = split_line_ending(raw);
        let edited = rules
            .iter()
            .fold(line.to_string(), |acc, rule| rule.apply(&acc));

        if edited == line {
            sink.emit(&format!("  {}", line))?;
        } else {
            changed += 1;
            sink.emit(&format!("- {}", line))?;
            sink.emit(&format!("+ {}", edited))?;
        }

        rewritten.push_str(&edited);
        rewritten.push_str(ending);
    }

    if changed > 0 {
        write_atomic(path, rewritten.as_bytes())?;
    }
    Ok(changed)
}

fn split_line_ending(raw: &str) -> (&str, &str) {
    if let Some(line) = raw.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = raw.strip_suffix('\n') {
        (line, "\n")
    } else {
        (raw, "")
    }
}

/// Applies one rule to a single file.
#[derive(Debug, Clone)]
pub struct RegexEdit {
    core: StepCore,
    path: PathBuf,
    rule: EditRule,
}

impl RegexEdit {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, rule: EditRule) -> Self {
        Self {
            core: StepCore::new(name),
            path: path.into(),
            rule,
        }
    }
}

impl Step for RegexEdit {
    fn core(&self) -> &StepCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StepCore {
        &mut self.core
    }

    fn run(&mut self, sink: &mut dyn OutputSink) -> Result<Attempt> {
        self.core.begin_attempt()?;
        let changed = edit_file(&self.path, std::slice::from_ref(&self.rule), sink)?;
        Ok(Attempt::Done(Outcome::text(format!(
            "{} lines changed",
            changed
        ))))
    }
}

/// Applies an ordered list of rules to every matching file under a directory.
#[derive(Debug, Clone)]
pub struct BulkRegexEdit {
    core: StepCore,
    dir: PathBuf,
    files: Regex,
    rules: Vec<EditRule>,
}

impl BulkRegexEdit {
    /// `files` is matched against each file's name, not its full path.
    pub fn new(
        name: impl Into<String>,
        dir: impl Into<PathBuf>,
        files: &str,
        rules: Vec<EditRule>,
    ) -> Result<Self> {
        let files = Regex::new(files).map_err(|e| OutpostError::InvalidPattern {
            pattern: files.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            core: StepCore::new(name),
            dir: dir.into(),
            files,
            rules,
        })
    }
}

impl Step for BulkRegexEdit {
    fn core(&self) -> &StepCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StepCore {
        &mut self.core
    }

    fn run(&mut self, sink: &mut dyn OutputSink) -> Result<Attempt> {
        self.core.begin_attempt()?;

        let mut targets = Vec::new();
        collect_files(&self.dir, &self.files, &mut targets)?;
        targets.sort();

        let mut changed = 0;
        for path in &targets {
            changed += edit_file(path, &self.rules, sink)?;
        }

        Ok(Attempt::Done(Outcome::text(format!(
            "{} lines changed in {} files",
            changed,
            targets.len()
        ))))
    }
}

fn collect_files(dir: &Path, pattern: &Regex, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();
        if file_type.is_dir() {
            collect_files(&path, pattern, out)?;
        } else if file_type.is_file() && pattern.is_match(&entry.file_name().to_string_lossy()) {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::Payload;
    use crate::ui::MockSink;
    use tempfile::TempDir;

    fn payload(attempt: Attempt) -> Payload {
        match attempt {
            Attempt::Done(outcome) => outcome.payload().clone(),
            Attempt::Failed => panic!("expected a finished edit"),
        }
    }

    #[test]
    fn rule_applies_capture_groups() {
        let rule = EditRule::new(r"^#\s*(Port) \d+$", "$1 2222").unwrap();
        assert_eq!(rule.apply("# Port 22"), "Port 2222");
        assert_eq!(rule.apply("Port 22"), "Port 22");
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = EditRule::new("(oops", "x").unwrap_err();
        assert!(matches!(err, OutpostError::InvalidPattern { .. }));
    }

    #[test]
    fn regex_edit_rewrites_and_reports_diff() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sshd_config");
        fs::write(&path, "# Port 22\nPermitRootLogin yes\n").unwrap();

        let rule = EditRule::new(r"^# Port 22$", "Port 2222").unwrap();
        let mut step = RegexEdit::new("ssh_port", &path, rule);
        let mut sink = MockSink::new();

        let attempt = step.run(&mut sink).unwrap();

        assert_eq!(payload(attempt), Payload::Text("1 lines changed".into()));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Port 2222\nPermitRootLogin yes\n"
        );
        assert!(sink.has_line("- # Port 22"));
        assert!(sink.has_line("+ Port 2222"));
        assert!(sink.has_line("  PermitRootLogin yes"));
    }

    #[test]
    fn zero_changes_still_satisfies() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hosts");
        fs::write(&path, "127.0.0.1 localhost").unwrap();

        let rule = EditRule::new("nomatch", "x").unwrap();
        let mut step = RegexEdit::new("hosts", &path, rule);
        let attempt = step.run(&mut MockSink::new()).unwrap();

        assert!(attempt.is_satisfied());
        assert_eq!(payload(attempt), Payload::Text("0 lines changed".into()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "127.0.0.1 localhost");
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let rule = EditRule::new("a", "b").unwrap();
        let mut step = RegexEdit::new("gone", temp.path().join("missing"), rule);

        let err = step.run(&mut MockSink::new()).unwrap_err();
        assert!(matches!(err, OutpostError::Io(_)));
    }

    #[test]
    fn preserves_crlf_endings() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("win.ini");
        fs::write(&path, "a=1\r\nb=2\r\n").unwrap();

        let rule = EditRule::new("^a=1$", "a=9").unwrap();
        RegexEdit::new("ini", &path, rule)
            .run(&mut MockSink::new())
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a=9\r\nb=2\r\n");
    }

    #[cfg(unix)]
    #[test]
    fn edit_replaces_file_atomically_keeping_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sshd_config");
        fs::write(&path, "PasswordAuthentication yes\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        let rule = EditRule::new("yes$", "no").unwrap();
        RegexEdit::new("no_passwords", &path, rule)
            .run(&mut MockSink::new())
            .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "PasswordAuthentication no\n"
        );
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!temp.path().join("sshd_config.tmp").exists());
    }

    #[test]
    fn bulk_edit_applies_rules_in_order_to_matching_files() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("conf.d");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join("app.conf"), "host=old\n").unwrap();
        fs::write(nested.join("db.conf"), "host=old\nport=1\n").unwrap();
        fs::write(temp.path().join("notes.txt"), "host=old\n").unwrap();

        let rules = vec![
            EditRule::new("old", "mid").unwrap(),
            EditRule::new("mid", "new").unwrap(),
        ];
        let mut step = BulkRegexEdit::new("hosts", temp.path(), r"\.conf$", rules).unwrap();

        let attempt = step.run(&mut MockSink::new()).unwrap();

        assert_eq!(
            payload(attempt),
            Payload::Text("2 lines changed in 2 files".into())
        );
        assert_eq!(
            fs::read_to_string(temp.path().join("app.conf")).unwrap(),
            "host=new\n"
        );
        assert_eq!(
            fs::read_to_string(nested.join("db.conf")).unwrap(),
            "host=new\nport=1\n"
        );
        assert_eq!(
            fs::read_to_string(temp.path().join("notes.txt")).unwrap(),
            "host=old\n"
        );
    }

    #[test]
    fn bulk_edit_is_repeatable() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.conf"), "x=1\n").unwrap();
        let rules = vec![EditRule::new("^x=1$", "x=2").unwrap()];
        let mut step = BulkRegexEdit::new("bump", temp.path(), "conf", rules).unwrap();

        step.run(&mut MockSink::new()).unwrap();
        let second = step.run(&mut MockSink::new()).unwrap();

        assert_eq!(
            payload(second),
            Payload::Text("0 lines changed in 1 files".into())
        );
        assert_eq!(step.attempts(), 2);
    }
}

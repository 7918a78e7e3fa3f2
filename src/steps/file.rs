//! File append and copy steps.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use crate::error::Result;
use crate::ui::OutputSink;

use super::{Attempt, Outcome, Step, StepCore};

/// Appends a literal block of text to a file.
///
/// The block is not appended a second time if the file already contains it,
/// so a run interrupted after the write but before the state save does not
/// duplicate it.
#[derive(Debug, Clone)]
pub struct FileAppend {
    core: StepCore,
    path: PathBuf,
    text: String,
}

impl FileAppend {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            core: StepCore::new(name),
            path: path.into(),
            text: text.into(),
        }
    }
}

impl Step for FileAppend {
    fn core(&self) -> &StepCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StepCore {
        &mut self.core
    }

    fn run(&mut self, sink: &mut dyn OutputSink) -> Result<Attempt> {
        self.core.begin_attempt()?;

        let existing = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        if !self.text.is_empty() && existing.contains(&self.text) {
            sink.emit(&format!("{} already contains the block", self.path.display()))?;
        } else {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            file.write_all(self.text.as_bytes())?;
            for line in self.text.lines() {
                sink.emit(&format!("+ {}", line))?;
            }
            sink.emit(&format!("appended to {}", self.path.display()))?;
        }

        Ok(Attempt::Done(Outcome::success()))
    }
}

/// Copies a file, creating the destination's parent directories.
#[derive(Debug, Clone)]
pub struct CopyFile {
    core: StepCore,
    from: PathBuf,
    to: PathBuf,
}

impl CopyFile {
    pub fn new(name: impl Into<String>, from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self {
            core: StepCore::new(name),
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Step for CopyFile {
    fn core(&self) -> &StepCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StepCore {
        &mut self.core
    }

    fn run(&mut self, sink: &mut dyn OutputSink) -> Result<Attempt> {
        self.core.begin_attempt()?;

        if let Some(parent) = self.to.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = fs::copy(&self.from, &self.to)?;
        sink.emit(&format!(
            "copied {} -> {} ({} bytes)",
            self.from.display(),
            self.to.display(),
            bytes
        ))?;

        Ok(Attempt::Done(Outcome::success()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OutpostError;
    use crate::ui::MockSink;
    use tempfile::TempDir;

    #[test]
    fn append_creates_and_appends() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bashrc");
        fs::write(&path, "export A=1\n").unwrap();

        let mut step = FileAppend::new("path", &path, "export PATH=$PATH:/opt/bin\n");
        let mut sink = MockSink::new();

        assert!(step.run(&mut sink).unwrap().is_satisfied());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "export A=1\nexport PATH=$PATH:/opt/bin\n"
        );
        assert!(sink.has_line("+ export PATH"));
    }

    #[test]
    fn append_is_not_repeated() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fstab");

        let mut step = FileAppend::new("mount", &path, "tmpfs /tmp tmpfs defaults 0 0\n");
        step.run(&mut MockSink::new()).unwrap();
        let mut sink = MockSink::new();
        step.run(&mut sink).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "tmpfs /tmp tmpfs defaults 0 0\n"
        );
        assert!(sink.has_line("already contains"));
    }

    #[test]
    fn copy_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("nginx.conf");
        let to = temp.path().join("etc").join("nginx").join("nginx.conf");
        fs::write(&from, "worker_processes 4;\n").unwrap();

        let mut step = CopyFile::new("nginx", &from, &to);
        assert!(step.run(&mut MockSink::new()).unwrap().is_satisfied());
        assert_eq!(fs::read_to_string(&to).unwrap(), "worker_processes 4;\n");
    }

    #[test]
    fn copy_missing_source_is_an_error() {
        let temp = TempDir::new().unwrap();
        let mut step = CopyFile::new("x", temp.path().join("nope"), temp.path().join("dst"));
        let err = step.run(&mut MockSink::new()).unwrap_err();
        assert!(matches!(err, OutpostError::Io(_)));
    }
}

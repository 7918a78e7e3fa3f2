//! Per-step log files.
//!
//! Every step attempt gets its own file under the log directory, named by the
//! zero-padded attempt counter and the step name (`000042-clone_repo.log`), so
//! a directory listing reads as the history of the run. Each line carries a
//! local timestamp.

use chrono::Local;
use std::fs::{self, File};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Writer for the log file of the step currently running.
#[derive(Debug)]
pub struct StepLog {
    dir: PathBuf,
    current: Option<(PathBuf, LineWriter<File>)>,
}

impl StepLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            current: None,
        }
    }

    /// File name for attempt `index` of step `name`.
    pub fn file_name(index: u64, name: &str) -> String {
        let safe: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{:06}-{}.log", index, safe)
    }

    /// Close the previous step's log and start a fresh one.
    pub fn open(&mut self, index: u64, name: &str) -> Result<&Path> {
        self.close()?;
        fs::create_dir_all(&self.dir)?;

        let path = self.dir.join(Self::file_name(index, name));
        let file = File::create(&path)?;
        let (path, _) = self.current.insert((path, LineWriter::new(file)));
        Ok(path)
    }

    /// Append `text` line by line. Does nothing when no log is open.
    pub fn write(&mut self, text: &str) -> Result<()> {
        if let Some((_, writer)) = self.current.as_mut() {
            let stamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            for line in text.split('\n') {
                writeln!(writer, "{} {}", stamp, line)?;
            }
        }
        Ok(())
    }

    pub fn close(&mut self) -> Result<()> {
        if let Some((_, mut writer)) = self.current.take() {
            writer.flush()?;
        }
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.current.as_ref().map(|(path, _)| path.as_path())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

//! Process supervision.
//!
//! [`Supervisor::run`] spawns a command and then drives a poll loop on the
//! calling thread:
//!
//! 1. check whether the child has exited (without waiting)
//! 2. wait up to the poll interval for either output pipe to become readable
//! 3. drain every byte currently available, forwarding complete lines
//! 4. diff the child's descendant processes against the tracked set
//!
//! Pipes are switched to non-blocking mode, so no step of the loop can stall
//! on a child that stays silent. There is no timeout: a child that never
//! exits keeps the loop running.

use std::fs::File;
use std::io::{self, Read};
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::debug;

use crate::error::{OutpostError, Result};
use crate::ui::OutputSink;

use super::process_tree::{self, ProcessTracker};
use super::{EnvOverlay, LineBuffer};

/// Shell used to interpret step commands.
const SHELL: &str = "/bin/sh";

/// Default wait between poll iterations.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How a supervised command finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitReport {
    /// Exit code, `None` if the child was killed by a signal.
    pub code: Option<i32>,

    /// Number of distinct descendant processes observed.
    pub descendants_seen: usize,
}

impl ExitReport {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs commands to completion while streaming their output.
#[derive(Debug, Clone, Copy)]
pub struct Supervisor {
    poll_interval: Duration,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl Supervisor {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Run `command` in `cwd` with `env` layered over the inherited environment.
    pub fn run(
        &self,
        command: &str,
        cwd: &Path,
        env: &EnvOverlay,
        sink: &mut dyn OutputSink,
    ) -> Result<ExitReport> {
        let mut cmd = Command::new(SHELL);
        cmd.arg("-c")
            .arg(command)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        env.apply(&mut cmd);

        let mut child = cmd.spawn().map_err(|e| OutpostError::CommandSpawn {
            command: command.to_string(),
            message: e.to_string(),
        })?;
        let root = child.id();
        debug!("Spawned pid {} for '{}'", root, command);

        let mut pipes = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            pipes.push(Pipe::new(OwnedFd::from(stdout))?);
        }
        if let Some(stderr) = child.stderr.take() {
            pipes.push(Pipe::new(OwnedFd::from(stderr))?);
        }

        let mut tracker = ProcessTracker::new();
        let mut seen = std::collections::BTreeSet::new();

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }

            wait_readable(&pipes, self.poll_interval);
            for pipe in &mut pipes {
                pipe.drain(sink)?;
            }

            for event in tracker.observe(process_tree::descendants(root)) {
                sink.emit(&event.to_string())?;
            }
            seen.extend(tracker.tracked().keys().copied());
        };

        // Background grandchildren may still hold the pipes open, so this
        // only takes what is already buffered.
        for pipe in &mut pipes {
            pipe.drain(sink)?;
            pipe.flush(sink)?;
        }
        for event in tracker.observe(process_tree::ProcessMap::new()) {
            sink.emit(&event.to_string())?;
        }

        let code = status.code();
        match code {
            Some(code) => sink.emit(&format!("exit code {}", code))?,
            None => sink.emit("terminated by signal")?,
        }
        debug!("pid {} finished with {:?}", root, code);

        Ok(ExitReport {
            code,
            descendants_seen: seen.len(),
        })
    }
}

/// One non-blocking output pipe of the child.
struct Pipe {
    file: File,
    lines: LineBuffer,
    open: bool,
}

impl Pipe {
    fn new(fd: OwnedFd) -> Result<Self> {
        set_nonblocking(fd.as_raw_fd())?;
        Ok(Self {
            file: File::from(fd),
            lines: LineBuffer::new(),
            open: true,
        })
    }

    /// Forward everything readable right now.
    fn drain(&mut self, sink: &mut dyn OutputSink) -> Result<()> {
        let mut buf = [0u8; 8192];
        while self.open {
            match self.file.read(&mut buf) {
                Ok(0) => self.open = false,
                Ok(n) => {
                    for line in self.lines.push(&buf[..n]) {
                        sink.emit(&line)?;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn flush(&mut self, sink: &mut dyn OutputSink) -> Result<()> {
        if let Some(line) = self.lines.finish() {
            sink.emit(&line)?;
        }
        Ok(())
    }
}

fn set_nonblocking(fd: RawFd) -> io::Result<()> {
    // SAFETY: fcntl with F_GETFL/F_SETFL only reads and writes descriptor
    // flags; `fd` is owned by the caller for the duration of the call.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: as above.
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Block for at most `timeout` until an open pipe has data or hangs up.
fn wait_readable(pipes: &[Pipe], timeout: Duration) {
    let mut fds: Vec<libc::pollfd> = pipes
        .iter()
        .filter(|pipe| pipe.open)
        .map(|pipe| libc::pollfd {
            fd: pipe.file.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        })
        .collect();

    if fds.is_empty() {
        std::thread::sleep(timeout);
        return;
    }

    let timeout_ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;
    // SAFETY: `fds` is a live, exclusively borrowed array of `fds.len()`
    // pollfd structs for the duration of the call. Errors (EINTR) simply end
    // this wait early; the loop polls again.
    unsafe {
        libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout_ms);
    }
}

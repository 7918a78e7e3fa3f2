//! Descendant process discovery.
//!
//! On Linux the process table is read from `/proc`. Other platforms report no
//! descendants; supervision still works, only the start/end notices are lost.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Live descendants of a process, keyed by pid, with their command lines.
pub type ProcessMap = BTreeMap<u32, String>;

/// A change in the set of tracked descendants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Started { pid: u32, cmdline: String },
    Ended { pid: u32, cmdline: String },
}

impl fmt::Display for ProcessEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { pid, cmdline } => write!(f, "[pid {}] started: {}", pid, cmdline),
            Self::Ended { pid, cmdline } => write!(f, "[pid {}] ended: {}", pid, cmdline),
        }
    }
}

/// Remembers which descendants have been reported.
#[derive(Debug, Default)]
pub struct ProcessTracker {
    known: ProcessMap,
}

impl ProcessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `current` against the tracked set and adopt it.
    pub fn observe(&mut self, current: ProcessMap) -> Vec<ProcessEvent> {
        let mut events = Vec::new();

        for (pid, cmdline) in &self.known {
            if !current.contains_key(pid) {
                events.push(ProcessEvent::Ended {
                    pid: *pid,
                    cmdline: cmdline.clone(),
                });
            }
        }
        for (pid, cmdline) in &current {
            if !self.known.contains_key(pid) {
                events.push(ProcessEvent::Started {
                    pid: *pid,
                    cmdline: cmdline.clone(),
                });
            }
        }

        self.known = current;
        events
    }

    pub fn tracked(&self) -> &ProcessMap {
        &self.known
    }
}

/// Extract `(pid, ppid)` from the contents of `/proc/<pid>/stat`.
///
/// The command name is parenthesised and may itself contain spaces or
/// parentheses, so fields are counted from the last `)`.
pub fn parse_stat(contents: &str) -> Option<(u32, u32)> {
    let open = contents.find('(')?;
    let close = contents.rfind(')')?;
    let pid = contents[..open].trim().parse().ok()?;
    let mut fields = contents[close + 1..].split_whitespace();
    let _state = fields.next()?;
    let ppid = fields.next()?.parse().ok()?;
    Some((pid, ppid))
}

/// Every pid below `root` given `(pid, ppid)` pairs, in breadth-first order.
pub fn descendants_in(pairs: &[(u32, u32)], root: u32) -> Vec<u32> {
    let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
    for &(pid, ppid) in pairs {
        children.entry(ppid).or_default().push(pid);
    }

    let mut found = Vec::new();
    let mut frontier = vec![root];
    while let Some(parent) = frontier.pop() {
        if let Some(kids) = children.get(&parent) {
            for &kid in kids {
                if kid != root && !found.contains(&kid) {
                    found.push(kid);
                    frontier.push(kid);
                }
            }
        }
    }
    found
}

/// Snapshot the live descendants of `root`.
#[cfg(target_os = "linux")]
pub fn descendants(root: u32) -> ProcessMap {
    let Ok(entries) = std::fs::read_dir("/proc") else {
        return ProcessMap::new();
    };

    let pairs: Vec<(u32, u32)> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str()?.parse::<u32>().ok())
        .filter_map(|pid| {
            let stat = std::fs::read_to_string(format!("/proc/{}/stat", pid)).ok()?;
            parse_stat(&stat)
        })
        .collect();

    descendants_in(&pairs, root)
        .into_iter()
        .map(|pid| (pid, cmdline(pid)))
        .collect()
}

#[cfg(not(target_os = "linux"))]
pub fn descendants(_root: u32) -> ProcessMap {
    ProcessMap::new()
}

#[cfg(target_os = "linux")]
fn cmdline(pid: u32) -> String {
    let raw = std::fs::read(format!("/proc/{}/cmdline", pid)).unwrap_or_default();
    let args: Vec<String> = raw
        .split(|&b| b == 0)
        .filter(|arg| !arg.is_empty())
        .map(|arg| String::from_utf8_lossy(arg).into_owned())
        .collect();

    if args.is_empty() {
        // Kernel threads and zombies have no argv.
        std::fs::read_to_string(format!("/proc/{}/comm", pid))
            .map(|comm| format!("[{}]", comm.trim()))
            .unwrap_or_else(|_| "[unknown]".to_string())
    } else {
        args.join(" ")
    }
}

//! Newtypes and type aliases for domain concepts.
//!
//! Newtypes for identifiers prevent silent type confusion. Type aliases
//! for quantities provide self-documenting code without the boilerplate
//! of implementing arithmetic traits.

use std::fmt;
use std::str::FromStr;

/// Simulated time, in abstract workload time units.
pub type SimTime = u64;

/// Dense thread identifier: index into the simulator's flat thread table,
/// assigned in (process, thread) input order. Ordering a pair of these is
/// therefore the same as ordering (process position, thread ordinal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(pub usize);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Priority band assigned to a process. Lower numeric value is higher
/// priority: SYSTEM is served first, BATCH last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProcessClass {
    System = 0,
    Interactive = 1,
    Normal = 2,
    Batch = 3,
}

impl ProcessClass {
    /// All classes in descending priority (ascending numeric) order.
    pub const ALL: [ProcessClass; 4] = [
        ProcessClass::System,
        ProcessClass::Interactive,
        ProcessClass::Normal,
        ProcessClass::Batch,
    ];

    /// Decode the numeric class field of a workload file.
    pub fn from_index(index: u64) -> Option<ProcessClass> {
        match index {
            0 => Some(ProcessClass::System),
            1 => Some(ProcessClass::Interactive),
            2 => Some(ProcessClass::Normal),
            3 => Some(ProcessClass::Batch),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Label used in trace records and report headings.
    pub fn label(self) -> &'static str {
        match self {
            ProcessClass::System => "SYSTEM",
            ProcessClass::Interactive => "INTERACTIVE",
            ProcessClass::Normal => "NORMAL",
            ProcessClass::Batch => "BATCH",
        }
    }
}

impl fmt::Display for ProcessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scheduling policy selected at construction time.
///
/// The event loop never branches on this; it only parameterizes which
/// ready-queue implementation the simulator is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// First-come first-served. Non-preemptive single FIFO.
    Fcfs,
    /// Round-robin with a fixed quantum. Preemptive single FIFO.
    RoundRobin,
    /// Strict priority over the four process classes. Non-preemptive.
    Priority,
    /// Adaptive dual-tier queue with a dynamic quantum. Preemptive.
    Custom,
}

impl Policy {
    /// The command-line token for this policy.
    pub fn token(self) -> &'static str {
        match self {
            Policy::Fcfs => "FCFS",
            Policy::RoundRobin => "RR",
            Policy::Priority => "PRIORITY",
            Policy::Custom => "CUSTOM",
        }
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for policy in [
            Policy::Fcfs,
            Policy::RoundRobin,
            Policy::Priority,
            Policy::Custom,
        ] {
            if s.eq_ignore_ascii_case(policy.token()) {
                return Ok(policy);
            }
        }
        Err(format!(
            "unknown algorithm {s:?}; expected FCFS, RR, PRIORITY, or CUSTOM"
        ))
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

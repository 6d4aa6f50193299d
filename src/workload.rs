//! Workload model and the line-based workload-file parser.
//!
//! A workload is an immutable description of what the simulated machine
//! has to execute: processes, each with a priority class and a set of
//! threads, each thread with an arrival time and a non-empty sequence of
//! CPU/I/O bursts. Runtime scheduling state lives in the engine, not here.
//!
//! # File format
//!
//! - Line 1: `num_processes thread_switch_overhead process_switch_overhead`
//! - Per process: `process_id process_class num_threads`, then per thread
//!   `arrival_time num_bursts`, then one line per burst: `cpu_time io_time`,
//!   where the terminal burst may be written as a bare `cpu_time` (io
//!   defaults to 0).
//! - Blank lines between records are ignored.
//!
//! # Validation
//!
//! Parsing rejects, with the offending line number: malformed numbers,
//! wrong field counts, a process class outside 0..=3, a thread with no
//! bursts, and a terminal burst with nonzero I/O time (the terminal burst
//! is the end-of-thread marker and must not block).

use std::error::Error;
use std::fmt;

use crate::types::{ProcessClass, SimTime};

/// A single burst: a CPU demand followed by an optional I/O demand.
///
/// `io_time == 0` means "no I/O": the thread completes after the CPU
/// demand instead of blocking, even if later bursts follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Burst {
    pub cpu_time: SimTime,
    pub io_time: SimTime,
}

/// Definition of one thread: when it arrives and what it executes.
/// The thread's id is its ordinal within the owning process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadDef {
    pub arrival_time: SimTime,
    pub bursts: Vec<Burst>,
}

impl ThreadDef {
    /// Total CPU demand over all bursts.
    pub fn cpu_demand(&self) -> SimTime {
        self.bursts.iter().map(|b| b.cpu_time).sum()
    }

    /// Total I/O demand over all bursts.
    pub fn io_demand(&self) -> SimTime {
        self.bursts.iter().map(|b| b.io_time).sum()
    }
}

/// Definition of one process and its threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDef {
    pub id: u32,
    pub class: ProcessClass,
    pub threads: Vec<ThreadDef>,
}

/// A complete, validated workload plus the machine's dispatch overheads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    pub thread_switch_overhead: SimTime,
    pub process_switch_overhead: SimTime,
    pub processes: Vec<ProcessDef>,
}

impl Workload {
    /// Parse and validate a workload description.
    pub fn parse(input: &str) -> Result<Workload, WorkloadError> {
        Parser::new(input).parse()
    }

    /// Number of threads across all processes.
    pub fn thread_count(&self) -> usize {
        self.processes.iter().map(|p| p.threads.len()).sum()
    }
}

/// Errors from parsing a workload file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkloadError {
    /// The file ended before the record described by `expected`.
    UnexpectedEnd { expected: &'static str },
    /// A record line had the wrong number of fields.
    FieldCount {
        line: usize,
        expected: &'static str,
        found: usize,
    },
    /// A field failed to parse as a non-negative integer.
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },
    /// The process class field was outside 0..=3.
    InvalidClass { line: usize, value: u64 },
    /// A thread declared zero bursts.
    NoBursts { line: usize },
    /// The terminal burst of a thread had a nonzero I/O time.
    TerminalIo { line: usize, io_time: SimTime },
}

impl fmt::Display for WorkloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadError::UnexpectedEnd { expected } => {
                write!(f, "unexpected end of input: expected {expected}")
            }
            WorkloadError::FieldCount {
                line,
                expected,
                found,
            } => {
                write!(f, "line {line}: expected {expected}, found {found} fields")
            }
            WorkloadError::InvalidNumber { line, field, value } => {
                write!(f, "line {line}: invalid {field}: {value:?}")
            }
            WorkloadError::InvalidClass { line, value } => {
                write!(f, "line {line}: process class {value} is not in 0..=3")
            }
            WorkloadError::NoBursts { line } => {
                write!(f, "line {line}: thread must have at least one burst")
            }
            WorkloadError::TerminalIo { line, io_time } => {
                write!(
                    f,
                    "line {line}: terminal burst has io_time {io_time}, expected 0"
                )
            }
        }
    }
}

impl Error for WorkloadError {}

/// Cursor over non-blank lines, tracking 1-based line numbers.
struct Parser<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser {
            lines: input.lines().enumerate(),
        }
    }

    /// Next non-blank line split into whitespace-separated fields.
    fn next_record(&mut self, expected: &'static str) -> Result<(usize, Vec<&'a str>), WorkloadError> {
        for (idx, line) in self.lines.by_ref() {
            if line.trim().is_empty() {
                continue;
            }
            return Ok((idx + 1, line.split_whitespace().collect()));
        }
        Err(WorkloadError::UnexpectedEnd { expected })
    }

    fn parse(mut self) -> Result<Workload, WorkloadError> {
        let (line, fields) = self.next_record("header line")?;
        if fields.len() != 3 {
            return Err(WorkloadError::FieldCount {
                line,
                expected: "header with 3 fields",
                found: fields.len(),
            });
        }
        let num_processes = parse_field(line, "process count", fields[0])?;
        let thread_switch_overhead = parse_field(line, "thread switch overhead", fields[1])?;
        let process_switch_overhead = parse_field(line, "process switch overhead", fields[2])?;

        let mut processes = Vec::with_capacity(num_processes as usize);
        for _ in 0..num_processes {
            processes.push(self.parse_process()?);
        }

        Ok(Workload {
            thread_switch_overhead,
            process_switch_overhead,
            processes,
        })
    }

    fn parse_process(&mut self) -> Result<ProcessDef, WorkloadError> {
        let (line, fields) = self.next_record("process line")?;
        if fields.len() != 3 {
            return Err(WorkloadError::FieldCount {
                line,
                expected: "process line with 3 fields",
                found: fields.len(),
            });
        }
        let id = parse_field(line, "process id", fields[0])? as u32;
        let class_index = parse_field(line, "process class", fields[1])?;
        let class = ProcessClass::from_index(class_index).ok_or(WorkloadError::InvalidClass {
            line,
            value: class_index,
        })?;
        let num_threads = parse_field(line, "thread count", fields[2])?;

        let mut threads = Vec::with_capacity(num_threads as usize);
        for _ in 0..num_threads {
            threads.push(self.parse_thread()?);
        }

        Ok(ProcessDef { id, class, threads })
    }

    fn parse_thread(&mut self) -> Result<ThreadDef, WorkloadError> {
        let (line, fields) = self.next_record("thread line")?;
        if fields.len() != 2 {
            return Err(WorkloadError::FieldCount {
                line,
                expected: "thread line with 2 fields",
                found: fields.len(),
            });
        }
        let arrival_time = parse_field(line, "arrival time", fields[0])?;
        let num_bursts = parse_field(line, "burst count", fields[1])?;
        if num_bursts == 0 {
            return Err(WorkloadError::NoBursts { line });
        }

        let mut bursts = Vec::with_capacity(num_bursts as usize);
        let mut last_line = line;
        for _ in 0..num_bursts {
            let (line, fields) = self.next_record("burst line")?;
            let burst = match fields.len() {
                // A bare cpu_time is a terminal burst with no I/O.
                1 => Burst {
                    cpu_time: parse_field(line, "cpu time", fields[0])?,
                    io_time: 0,
                },
                2 => Burst {
                    cpu_time: parse_field(line, "cpu time", fields[0])?,
                    io_time: parse_field(line, "io time", fields[1])?,
                },
                n => {
                    return Err(WorkloadError::FieldCount {
                        line,
                        expected: "burst line with 1 or 2 fields",
                        found: n,
                    })
                }
            };
            bursts.push(burst);
            last_line = line;
        }

        let terminal = bursts.last().unwrap();
        if terminal.io_time != 0 {
            return Err(WorkloadError::TerminalIo {
                line: last_line,
                io_time: terminal.io_time,
            });
        }

        Ok(ThreadDef {
            arrival_time,
            bursts,
        })
    }
}

fn parse_field(line: usize, field: &'static str, value: &str) -> Result<u64, WorkloadError> {
    value.parse().map_err(|_| WorkloadError::InvalidNumber {
        line,
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_thread() {
        let workload = Workload::parse("1 3 6\n0 2 1\n0 1\n10 0\n").unwrap();
        assert_eq!(workload.thread_switch_overhead, 3);
        assert_eq!(workload.process_switch_overhead, 6);
        assert_eq!(workload.processes.len(), 1);
        let proc = &workload.processes[0];
        assert_eq!(proc.id, 0);
        assert_eq!(proc.class, ProcessClass::Normal);
        assert_eq!(
            proc.threads[0].bursts,
            vec![Burst {
                cpu_time: 10,
                io_time: 0
            }]
        );
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let with_blanks = "1 3 6\n\n\n0 2 1\n\n0 2\n4 5\n\n3 0\n";
        let compact = "1 3 6\n0 2 1\n0 2\n4 5\n3 0\n";
        assert_eq!(
            Workload::parse(with_blanks).unwrap(),
            Workload::parse(compact).unwrap()
        );
    }

    #[test]
    fn test_parse_bare_terminal_burst() {
        let workload = Workload::parse("1 3 6\n0 2 1\n0 2\n4 5\n3\n").unwrap();
        let bursts = &workload.processes[0].threads[0].bursts;
        assert_eq!(bursts[1], Burst {
            cpu_time: 3,
            io_time: 0
        });
    }

    #[test]
    fn test_thread_demand_sums() {
        let workload = Workload::parse("1 3 6\n0 2 1\n0 3\n4 5\n2 7\n3 0\n").unwrap();
        let thread = &workload.processes[0].threads[0];
        assert_eq!(thread.cpu_demand(), 9);
        assert_eq!(thread.io_demand(), 12);
    }

    #[test]
    fn test_parse_reports_line_numbers() {
        let err = Workload::parse("1 3 6\n0 9 1\n0 1\n10 0\n").unwrap_err();
        assert_eq!(err, WorkloadError::InvalidClass { line: 2, value: 9 });

        let err = Workload::parse("1 3 6\n0 2 1\n0 1\n\n\nten 0\n").unwrap_err();
        assert_eq!(
            err,
            WorkloadError::InvalidNumber {
                line: 6,
                field: "cpu time",
                value: "ten".into()
            }
        );
    }

    #[test]
    fn test_parse_rejects_truncated_input() {
        let err = Workload::parse("2 3 6\n0 2 1\n0 1\n10 0\n").unwrap_err();
        assert_eq!(
            err,
            WorkloadError::UnexpectedEnd {
                expected: "process line"
            }
        );
    }

    #[test]
    fn test_parse_rejects_zero_bursts() {
        let err = Workload::parse("1 3 6\n0 2 1\n0 0\n").unwrap_err();
        assert_eq!(err, WorkloadError::NoBursts { line: 3 });
    }

    #[test]
    fn test_parse_rejects_terminal_io() {
        let err = Workload::parse("1 3 6\n0 2 1\n0 1\n10 4\n").unwrap_err();
        assert_eq!(err, WorkloadError::TerminalIo { line: 4, io_time: 4 });
    }
}

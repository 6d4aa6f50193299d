//! schedsim - Deterministic event-driven simulator of an OS CPU scheduler.
//!
//! The simulator consumes a workload description (processes, threads,
//! alternating CPU/I/O bursts) and a scheduling policy, advances
//! simulated time through scheduler-relevant events, and produces
//! per-thread, per-class, and aggregate timing metrics.
//!
//! # Architecture
//!
//! - **Workload**: immutable parsed description of processes and bursts
//! - **Engine**: event loop driving the thread state machine
//! - **Events**: min-heap with deterministic tie-breaking, so identical
//!   inputs always replay identically
//! - **Ready queues**: policy-specific containers (FCFS, RR, PRIORITY,
//!   CUSTOM) behind one capability trait
//! - **Metrics / Trace**: accumulators and per-transition records
//!   rendered by the caller
//!
//! # Usage
//!
//! ```rust
//! use schedsim::{SimConfig, Simulator, Workload};
//!
//! let workload = Workload::parse("1 3 6\n0 2 1\n0 1\n10 0\n").unwrap();
//! let result = Simulator::new(&workload, &SimConfig::default()).run();
//! assert_eq!(result.report.total_elapsed_time, 16);
//! ```

pub mod engine;
pub mod event;
pub mod metrics;
pub mod ready;
pub mod trace;
pub mod types;
pub mod workload;

// Re-export the main public types for convenience.
pub use engine::{SimConfig, SimResult, Simulator, DEFAULT_QUANTUM};
pub use event::{Event, EventKind, EventQueue};
pub use metrics::{ClassReport, ClassTotals, Metrics, Report};
pub use ready::{ReadyItem, ReadyQueue, QUANTUM_MAX};
pub use trace::{write_thread_table, ThreadRow, Trace, TraceRecord};
pub use types::{Policy, ProcessClass, SimTime, ThreadId};
pub use workload::{Burst, ProcessDef, ThreadDef, Workload, WorkloadError};

//! Simulation events and the deterministic event queue.
//!
//! Every scheduler-relevant occurrence is an [`Event`] in a min-heap. The
//! pop order is a total order: earliest time first, ties broken by a fixed
//! kind rank, then by thread id. The rank table is observable behavior:
//! it guarantees that a CPU burst completion takes effect before any
//! dispatcher invocation at the same instant (the freed CPU is visible),
//! and that a completing thread is recorded before the dispatcher picks a
//! successor. Identical inputs therefore produce byte-identical traces.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::types::{SimTime, ThreadId};

/// The kind of a simulation event.
///
/// `IoBurstCompleted` carries the index of the burst whose I/O phase
/// finished; all other kinds are fully described by their thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The running thread finished the CPU demand of its current burst.
    CpuBurstCompleted,
    /// A thread reached EXIT; metrics are recorded here.
    ThreadCompleted,
    /// The dispatcher selects the next thread from the ready queue.
    DispatcherInvoked,
    /// A dispatch finished after a process-switch overhead.
    ProcessDispatchCompleted,
    /// A dispatch finished after a thread-switch overhead.
    ThreadDispatchCompleted,
    /// The running thread exhausted its quantum.
    ThreadPreempted,
    /// A blocked thread finished the I/O phase of the given burst.
    IoBurstCompleted { burst: usize },
    /// A thread became ready for the first time.
    ThreadArrived,
}

impl EventKind {
    /// Fixed tie-break rank for events sharing a timestamp (lower pops
    /// first).
    pub fn rank(&self) -> u8 {
        match self {
            EventKind::CpuBurstCompleted => 0,
            EventKind::ThreadCompleted => 1,
            EventKind::DispatcherInvoked => 2,
            EventKind::ProcessDispatchCompleted => 3,
            EventKind::ThreadDispatchCompleted => 4,
            EventKind::ThreadPreempted => 5,
            EventKind::IoBurstCompleted { .. } => 6,
            EventKind::ThreadArrived => 7,
        }
    }

    /// The canonical identifier, as it appears in verbose trace records.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::CpuBurstCompleted => "CPU_BURST_COMPLETED",
            EventKind::ThreadCompleted => "THREAD_COMPLETED",
            EventKind::DispatcherInvoked => "DISPATCHER_INVOKED",
            EventKind::ProcessDispatchCompleted => "PROCESS_DISPATCH_COMPLETED",
            EventKind::ThreadDispatchCompleted => "THREAD_DISPATCH_COMPLETED",
            EventKind::ThreadPreempted => "THREAD_PREEMPTED",
            EventKind::IoBurstCompleted { .. } => "IO_BURST_COMPLETED",
            EventKind::ThreadArrived => "THREAD_ARRIVED",
        }
    }
}

/// A timestamped event referencing a thread by its dense id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub time: SimTime,
    pub kind: EventKind,
    pub thread: ThreadId,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.kind.rank().cmp(&other.kind.rank()))
            .then_with(|| self.thread.cmp(&other.thread))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of pending events.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Event>>,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue {
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, event: Event) {
        self.heap.push(Reverse(event));
    }

    /// Pop the earliest event under the (time, kind rank, thread) order.
    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|Reverse(event)| event)
    }

    /// The event the next `pop` would return, without removing it.
    pub fn peek(&self) -> Option<&Event> {
        self.heap.peek().map(|Reverse(event)| event)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

//! Policy-specific ready queues behind a common capability trait.
//!
//! The engine is polymorphic over [`ReadyQueue`]: the implementation is
//! chosen once at construction from the selected [`Policy`] and the event
//! loop never branches on the algorithm again. A queue advertises whether
//! it is preemptive and, if so, what quantum currently applies; the engine
//! reads the quantum at every dispatch completion.

use std::collections::VecDeque;

use crate::types::{Policy, ProcessClass, SimTime, ThreadId};

/// Cap on the CUSTOM policy's dynamic quantum, in simulated time units.
pub const QUANTUM_MAX: SimTime = 20;

/// What the engine hands the queue on insertion. `remaining` is the CPU
/// time still owed on the thread's current burst at push time; threads
/// sitting in a ready queue never change their remaining time, so the
/// value stays valid until the thread is popped.
#[derive(Debug, Clone, Copy)]
pub struct ReadyItem {
    pub thread: ThreadId,
    pub class: ProcessClass,
    pub remaining: SimTime,
}

/// Capability interface over the policy-specific ready structure.
pub trait ReadyQueue {
    fn push(&mut self, item: ReadyItem);

    fn pop(&mut self) -> Option<ThreadId>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the policy bounds CPU slices by a quantum.
    fn preemptive(&self) -> bool;

    /// The quantum currently in force, or `None` when the policy has no
    /// quantum (non-preemptive) or no defined value (adaptive queue with
    /// no ready threads).
    fn current_quantum(&self) -> Option<SimTime>;
}

/// Construct the ready queue for a policy. `quantum` is the static
/// round-robin quantum; the other policies ignore it.
pub fn build(policy: Policy, quantum: SimTime) -> Box<dyn ReadyQueue> {
    match policy {
        Policy::Fcfs => Box::new(FifoReady::non_preemptive()),
        Policy::RoundRobin => Box::new(FifoReady::preemptive(quantum)),
        Policy::Priority => Box::new(ClassReady::new()),
        Policy::Custom => Box::new(AdaptiveReady::new()),
    }
}

/// Single insertion-ordered FIFO, shared by FCFS (no quantum) and
/// round-robin (static quantum).
#[derive(Debug)]
pub struct FifoReady {
    queue: VecDeque<ThreadId>,
    quantum: Option<SimTime>,
}

impl FifoReady {
    pub fn non_preemptive() -> Self {
        FifoReady {
            queue: VecDeque::new(),
            quantum: None,
        }
    }

    pub fn preemptive(quantum: SimTime) -> Self {
        assert!(quantum > 0, "round-robin quantum must be positive");
        FifoReady {
            queue: VecDeque::new(),
            quantum: Some(quantum),
        }
    }
}

impl ReadyQueue for FifoReady {
    fn push(&mut self, item: ReadyItem) {
        self.queue.push_back(item.thread);
    }

    fn pop(&mut self) -> Option<ThreadId> {
        self.queue.pop_front()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn preemptive(&self) -> bool {
        self.quantum.is_some()
    }

    fn current_quantum(&self) -> Option<SimTime> {
        self.quantum
    }
}

/// One FIFO per process class, scanned in ascending class order (SYSTEM
/// first). Strictly non-preemptive: an arriving high-priority thread
/// waits for the running burst to finish.
#[derive(Debug)]
pub struct ClassReady {
    queues: [VecDeque<ThreadId>; 4],
}

impl ClassReady {
    pub fn new() -> Self {
        ClassReady {
            queues: std::array::from_fn(|_| VecDeque::new()),
        }
    }
}

impl Default for ClassReady {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadyQueue for ClassReady {
    fn push(&mut self, item: ReadyItem) {
        self.queues[item.class.index()].push_back(item.thread);
    }

    fn pop(&mut self) -> Option<ThreadId> {
        self.queues.iter_mut().find_map(|q| q.pop_front())
    }

    fn len(&self) -> usize {
        self.queues.iter().map(|q| q.len()).sum()
    }

    fn preemptive(&self) -> bool {
        false
    }

    fn current_quantum(&self) -> Option<SimTime> {
        None
    }
}

/// Adaptive dual-tier queue for the CUSTOM policy.
///
/// Each class has a short-tier and a long-tier FIFO. The quantum is
/// recomputed on every membership change as
/// `min(total_remaining / num_threads, QUANTUM_MAX)` with floor division.
/// A pushed thread lands in the short tier of its class iff its remaining
/// burst time fits inside the quantum computed with it counted; the tier
/// is fixed until the thread is popped. Pop drains every short FIFO in
/// class order before touching any long FIFO, so short work (and work
/// that has become short through preemption) overtakes long work
/// regardless of insertion order.
#[derive(Debug)]
pub struct AdaptiveReady {
    short: [VecDeque<(ThreadId, SimTime)>; 4],
    long: [VecDeque<(ThreadId, SimTime)>; 4],
    num_threads: u64,
    total_remaining: SimTime,
    quantum: Option<SimTime>,
}

impl AdaptiveReady {
    pub fn new() -> Self {
        AdaptiveReady {
            short: std::array::from_fn(|_| VecDeque::new()),
            long: std::array::from_fn(|_| VecDeque::new()),
            num_threads: 0,
            total_remaining: 0,
            quantum: None,
        }
    }

    fn recompute_quantum(&mut self) {
        self.quantum = if self.num_threads == 0 {
            None
        } else {
            Some((self.total_remaining / self.num_threads).min(QUANTUM_MAX))
        };
    }
}

impl Default for AdaptiveReady {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadyQueue for AdaptiveReady {
    fn push(&mut self, item: ReadyItem) {
        self.num_threads += 1;
        self.total_remaining += item.remaining;
        self.recompute_quantum();

        let quantum = self.quantum.unwrap();
        let tier = if item.remaining <= quantum {
            &mut self.short
        } else {
            &mut self.long
        };
        tier[item.class.index()].push_back((item.thread, item.remaining));
    }

    fn pop(&mut self) -> Option<ThreadId> {
        let (thread, remaining) = self
            .short
            .iter_mut()
            .chain(self.long.iter_mut())
            .find_map(|q| q.pop_front())?;
        self.num_threads -= 1;
        self.total_remaining -= remaining;
        self.recompute_quantum();
        Some(thread)
    }

    fn len(&self) -> usize {
        self.num_threads as usize
    }

    fn preemptive(&self) -> bool {
        true
    }

    fn current_quantum(&self) -> Option<SimTime> {
        self.quantum
    }
}

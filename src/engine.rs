//! Event-driven simulation engine.
//!
//! This is the core of the simulator. It owns the simulated clock, the
//! event queue, the policy's ready queue, and all runtime thread state,
//! and advances time by draining events in deterministic order. Each
//! handler mutates state and may push follow-on events; nothing else
//! touches the queues.
//!
//! Thread lifecycle: NEW -> READY -> RUNNING -> (BLOCKED -> READY ->
//! RUNNING)* -> EXIT, with RUNNING -> READY -> RUNNING cycles added by
//! preemptive policies. A dispatch is a two-step window: the dispatcher
//! selects a thread and charges a switch overhead, and only the
//! dispatch-completed event marks the thread RUNNING and starts its
//! CPU slice.
//!
//! At most one DISPATCHER_INVOKED event is pending at a time, and before
//! it picks, every arrival sharing its instant is made ready. Threads
//! arriving together therefore compete on what the policy orders by
//! (class, tier, FIFO position), never on their position in the input
//! file.

use tracing::{debug, info};

use crate::event::{Event, EventKind, EventQueue};
use crate::metrics::{Metrics, Report};
use crate::ready::{self, ReadyItem, ReadyQueue, QUANTUM_MAX};
use crate::trace::{ThreadRow, Trace, TraceRecord};
use crate::types::{Policy, ProcessClass, SimTime, ThreadId};
use crate::workload::{Burst, Workload};

/// Default round-robin quantum, in simulated time units.
pub const DEFAULT_QUANTUM: SimTime = 3;

/// Configuration record handed to the core by the driver.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    pub policy: Policy,
    /// Static quantum for round-robin; other policies ignore it.
    pub quantum: SimTime,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            policy: Policy::Fcfs,
            quantum: DEFAULT_QUANTUM,
        }
    }
}

/// The lifecycle state of a simulated thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThreadState {
    /// Not yet arrived.
    New,
    /// Waiting in the ready queue.
    Ready,
    /// Executing on the CPU.
    Running,
    /// Waiting for an I/O burst to finish.
    Blocked,
    /// All bursts done.
    Exit,
}

/// Runtime scheduling state for one thread; the immutable definition
/// stays in the workload.
#[derive(Debug)]
struct SimThread {
    /// Index of the owning process in the workload.
    process: usize,
    /// Ordinal within the owning process.
    id: u32,
    class: ProcessClass,
    state: ThreadState,
    /// First instant the thread was READY (the arrival event's time).
    arrival_time: SimTime,
    /// First transition to RUNNING; None until first dispatch completes.
    start_time: Option<SimTime>,
    end_time: Option<SimTime>,
    /// Next burst to execute.
    burst_index: usize,
    /// CPU time already charged to the current burst by preemptions.
    burst_completed: SimTime,
}

/// Everything a finished run produces: the finalized metrics, the full
/// transition trace, and one summary row per thread.
#[derive(Debug)]
pub struct SimResult {
    pub report: Report,
    pub trace: Trace,
    pub threads: Vec<ThreadRow>,
}

/// The simulator: single owner of all mutable simulation state.
pub struct Simulator<'w> {
    workload: &'w Workload,
    clock: SimTime,
    events: EventQueue,
    ready: Box<dyn ReadyQueue>,
    threads: Vec<SimThread>,
    /// Thread in the dispatching-or-running window, if any.
    running: Option<ThreadId>,
    /// Process id of the most recent completed dispatch; decides whether
    /// the next dispatch is a thread switch or a process switch.
    current_process: Option<u32>,
    /// Whether a DISPATCHER_INVOKED event is already in the queue. At
    /// most one is ever pending.
    dispatcher_scheduled: bool,
    preemptive: bool,
    metrics: Metrics,
    trace: Trace,
}

impl<'w> Simulator<'w> {
    /// Build a simulator and seed one arrival event per thread.
    pub fn new(workload: &'w Workload, config: &SimConfig) -> Self {
        let ready = ready::build(config.policy, config.quantum);
        let preemptive = ready.preemptive();

        let mut threads = Vec::with_capacity(workload.thread_count());
        let mut events = EventQueue::new();
        for (process, def) in workload.processes.iter().enumerate() {
            for (ordinal, thread) in def.threads.iter().enumerate() {
                let tid = ThreadId(threads.len());
                threads.push(SimThread {
                    process,
                    id: ordinal as u32,
                    class: def.class,
                    state: ThreadState::New,
                    arrival_time: thread.arrival_time,
                    start_time: None,
                    end_time: None,
                    burst_index: 0,
                    burst_completed: 0,
                });
                events.push(Event {
                    time: thread.arrival_time,
                    kind: EventKind::ThreadArrived,
                    thread: tid,
                });
            }
        }

        Simulator {
            workload,
            clock: 0,
            events,
            ready,
            threads,
            running: None,
            current_process: None,
            dispatcher_scheduled: false,
            preemptive,
            metrics: Metrics::new(),
            trace: Trace::new(),
        }
    }

    /// Drain the event queue to completion and finalize the metrics.
    pub fn run(mut self) -> SimResult {
        while let Some(event) = self.events.pop() {
            debug_assert!(event.time >= self.clock, "event time moved backwards");
            self.clock = event.time;

            match event.kind {
                EventKind::ThreadArrived => self.handle_thread_arrived(event),
                EventKind::DispatcherInvoked => self.handle_dispatcher_invoked(event),
                EventKind::ProcessDispatchCompleted | EventKind::ThreadDispatchCompleted => {
                    self.handle_dispatch_completed(event)
                }
                EventKind::CpuBurstCompleted => self.handle_cpu_burst_completed(event),
                EventKind::IoBurstCompleted { burst } => {
                    self.handle_io_burst_completed(event, burst)
                }
                EventKind::ThreadPreempted => self.handle_thread_preempted(event),
                EventKind::ThreadCompleted => self.handle_thread_completed(event),
            }
        }

        // A finite workload always drains to all-EXIT; anything else is a
        // corrupted workload or an engine bug.
        for thread in &self.threads {
            assert!(
                thread.state == ThreadState::Exit,
                "event queue drained with thread {}/{} in state {:?}",
                self.process_id(thread),
                thread.id,
                thread.state
            );
        }

        let rows = self
            .threads
            .iter()
            .map(|thread| {
                let def = &self.workload.processes[thread.process].threads[thread.id as usize];
                ThreadRow {
                    process: self.process_id(thread),
                    class: thread.class,
                    thread: thread.id,
                    arrival: thread.arrival_time,
                    cpu_time: def.cpu_demand(),
                    io_time: def.io_demand(),
                    end_time: thread.end_time.expect("exited thread has an end time"),
                }
            })
            .collect();

        SimResult {
            report: self.metrics.finalize(),
            trace: self.trace,
            threads: rows,
        }
    }

    /// The thread becomes READY for the first time. Its recorded arrival
    /// is the event instant.
    fn handle_thread_arrived(&mut self, event: Event) {
        let tid = event.thread;
        let thread = &mut self.threads[tid.0];
        assert!(
            thread.state == ThreadState::New,
            "duplicate arrival for thread {}",
            tid
        );
        thread.state = ThreadState::Ready;
        thread.arrival_time = event.time;

        debug!(
            process = self.process_id(&self.threads[tid.0]),
            thread = self.threads[tid.0].id,
            time = event.time,
            "arrived"
        );
        self.record(event, "Transitioned from NEW to READY".into());
        self.make_ready(tid, event.time);
    }

    /// Select the next thread and charge the appropriate switch overhead.
    /// The thread is only marked RUNNING when the dispatch completes.
    ///
    /// Arrivals sharing this instant are made ready before the pick:
    /// which thread wins a simultaneous arrival is the policy's call, not
    /// an artifact of input order.
    fn handle_dispatcher_invoked(&mut self, event: Event) {
        self.drain_simultaneous_arrivals(event.time);
        self.dispatcher_scheduled = false;
        debug_assert!(
            self.running.is_none(),
            "dispatcher invoked while a thread holds the CPU"
        );
        let tid = self
            .ready
            .pop()
            .expect("dispatcher invoked with an empty ready queue");
        let thread = &self.threads[tid.0];
        let process_id = self.process_id(thread);

        let (kind, overhead) = if self.current_process == Some(process_id) {
            (
                EventKind::ThreadDispatchCompleted,
                self.workload.thread_switch_overhead,
            )
        } else {
            (
                EventKind::ProcessDispatchCompleted,
                self.workload.process_switch_overhead,
            )
        };

        self.running = Some(tid);
        self.events.push(Event {
            time: event.time + overhead,
            kind,
            thread: tid,
        });

        let contenders = self.ready.len() + 1;
        debug!(
            process = process_id,
            thread = self.threads[tid.0].id,
            contenders,
            overhead,
            "dispatch"
        );
        let message = if self.preemptive {
            format!("Selected from {contenders} threads; will run for at most one quantum")
        } else {
            format!("Selected from {contenders} threads; will run to completion of burst")
        };
        self.record(
            Event {
                thread: tid,
                ..event
            },
            message,
        );
    }

    /// The switch overhead has been paid: the thread starts executing and
    /// the end of its slice is scheduled.
    fn handle_dispatch_completed(&mut self, event: Event) {
        let overhead = match event.kind {
            EventKind::ProcessDispatchCompleted => self.workload.process_switch_overhead,
            EventKind::ThreadDispatchCompleted => self.workload.thread_switch_overhead,
            _ => unreachable!("not a dispatch completion: {:?}", event.kind),
        };
        self.metrics.total_dispatch_time += overhead;

        let tid = event.thread;
        debug_assert_eq!(self.running, Some(tid), "dispatch completed for a bystander");
        debug_assert!(
            self.threads.iter().all(|t| t.state != ThreadState::Running),
            "two threads running at once"
        );

        let burst = self.current_burst(tid);
        let thread = &mut self.threads[tid.0];
        thread.state = ThreadState::Running;
        if thread.start_time.is_none() {
            thread.start_time = Some(event.time);
        }
        let process_id = self.workload.processes[thread.process].id;
        self.current_process = Some(process_id);

        if self.preemptive {
            let remaining = burst.cpu_time - thread.burst_completed;
            // Static for RR, recomputed on every membership change for
            // CUSTOM; an empty adaptive queue has no defined quantum and
            // falls back to the cap.
            let quantum = self.ready.current_quantum().unwrap_or(QUANTUM_MAX);
            if remaining <= quantum {
                self.events.push(Event {
                    time: event.time + remaining,
                    kind: EventKind::CpuBurstCompleted,
                    thread: tid,
                });
            } else {
                self.threads[tid.0].burst_completed += quantum;
                self.events.push(Event {
                    time: event.time + quantum,
                    kind: EventKind::ThreadPreempted,
                    thread: tid,
                });
            }
        } else {
            self.events.push(Event {
                time: event.time + burst.cpu_time,
                kind: EventKind::CpuBurstCompleted,
                thread: tid,
            });
        }

        info!(
            process = process_id,
            thread = self.threads[tid.0].id,
            time = event.time,
            "STARTED"
        );
        self.record(event, "Transitioned from READY to RUNNING".into());
    }

    /// The CPU demand of the current burst is done: block on I/O, or exit
    /// when the burst has none. The CPU goes idle either way.
    fn handle_cpu_burst_completed(&mut self, event: Event) {
        let tid = event.thread;
        let burst = self.current_burst(tid);
        self.metrics.total_service_time += burst.cpu_time;

        let thread = &mut self.threads[tid.0];
        thread.burst_completed = 0;

        if burst.io_time > 0 {
            thread.state = ThreadState::Blocked;
            let burst_index = thread.burst_index;
            self.events.push(Event {
                time: event.time + burst.io_time,
                kind: EventKind::IoBurstCompleted { burst: burst_index },
                thread: tid,
            });
            self.record(event, "Transitioned from RUNNING to BLOCKED".into());
        } else {
            thread.state = ThreadState::Exit;
            self.events.push(Event {
                time: event.time,
                kind: EventKind::ThreadCompleted,
                thread: tid,
            });
            self.record(event, "Finished final burst".into());
        }

        self.running = None;
        if !self.ready.is_empty() {
            self.schedule_dispatcher(event.time, tid);
        } else {
            debug!(time = event.time, "idle");
        }
    }

    /// An I/O burst finished: the thread re-enters the ready queue at its
    /// next burst.
    fn handle_io_burst_completed(&mut self, event: Event, burst: usize) {
        let io_time = self.burst(event.thread, burst).io_time;
        self.metrics.total_io_time += io_time;

        let tid = event.thread;
        let thread = &mut self.threads[tid.0];
        debug_assert_eq!(thread.state, ThreadState::Blocked);
        thread.burst_index += 1;
        thread.state = ThreadState::Ready;

        self.record(event, "Transitioned from BLOCKED to READY".into());
        self.make_ready(tid, event.time);
    }

    /// The quantum expired with CPU demand left: back to the ready queue.
    /// For CUSTOM the re-push may land in a different tier because the
    /// remaining time has shrunk.
    fn handle_thread_preempted(&mut self, event: Event) {
        let tid = event.thread;
        let thread = &mut self.threads[tid.0];
        thread.state = ThreadState::Ready;
        self.running = None;

        info!(
            process = self.process_id(&self.threads[tid.0]),
            thread = self.threads[tid.0].id,
            time = event.time,
            "PREEMPTED"
        );
        self.record(event, "Transitioned from RUNNING to READY".into());
        self.make_ready(tid, event.time);
    }

    /// Record the completion and its per-class contribution. The last
    /// completion fixes the total elapsed time.
    fn handle_thread_completed(&mut self, event: Event) {
        self.metrics.total_elapsed_time = event.time;

        let tid = event.thread;
        let thread = &mut self.threads[tid.0];
        thread.end_time = Some(event.time);
        let start = thread.start_time.expect("completed thread never ran");
        let response = start - thread.arrival_time;
        let turnaround = event.time - thread.arrival_time;
        let class = thread.class;
        self.metrics.record_completion(class, response, turnaround);

        info!(
            process = self.process_id(&self.threads[tid.0]),
            thread = self.threads[tid.0].id,
            time = event.time,
            turnaround,
            "COMPLETED"
        );
        self.record(event, "Transitioned from RUNNING to EXIT".into());
    }

    /// Insert a thread into the ready queue. Any insertion that finds the
    /// CPU free of dispatching-or-running work schedules the dispatcher
    /// at the same instant.
    fn make_ready(&mut self, tid: ThreadId, now: SimTime) {
        let thread = &self.threads[tid.0];
        let burst = self.current_burst(tid);
        let item = ReadyItem {
            thread: tid,
            class: thread.class,
            remaining: burst.cpu_time - thread.burst_completed,
        };
        self.ready.push(item);
        if self.running.is_none() {
            self.schedule_dispatcher(now, tid);
        }
    }

    /// Queue a DISPATCHER_INVOKED event at `now` unless one is already
    /// pending.
    fn schedule_dispatcher(&mut self, now: SimTime, thread: ThreadId) {
        if self.dispatcher_scheduled {
            return;
        }
        self.dispatcher_scheduled = true;
        self.events.push(Event {
            time: now,
            kind: EventKind::DispatcherInvoked,
            thread,
        });
    }

    /// Handle every THREAD_ARRIVED event sharing the given instant, so a
    /// pending dispatch sees the full set of simultaneous arrivals.
    fn drain_simultaneous_arrivals(&mut self, now: SimTime) {
        while let Some(&next) = self.events.peek() {
            if next.time != now || next.kind != EventKind::ThreadArrived {
                break;
            }
            self.events.pop();
            self.handle_thread_arrived(next);
        }
    }

    fn process_id(&self, thread: &SimThread) -> u32 {
        self.workload.processes[thread.process].id
    }

    fn burst(&self, tid: ThreadId, index: usize) -> Burst {
        let thread = &self.threads[tid.0];
        self.workload.processes[thread.process].threads[thread.id as usize].bursts[index]
    }

    fn current_burst(&self, tid: ThreadId) -> Burst {
        self.burst(tid, self.threads[tid.0].burst_index)
    }

    fn record(&mut self, event: Event, message: String) {
        let thread = &self.threads[event.thread.0];
        self.trace.record(TraceRecord {
            time: event.time,
            kind: event.kind,
            thread: thread.id,
            process: self.workload.processes[thread.process].id,
            class: thread.class,
            message,
        });
    }
}

//! Trace recording and the text artifacts built from it.
//!
//! Every handled event appends one [`TraceRecord`]; the collected
//! [`Trace`] is a pure data artifact. Rendering is the caller's choice:
//! the verbose per-transition listing, the per-thread summary table, or
//! nothing at all. Field order in the rendered forms is fixed and golden
//! tests depend on it byte for byte.

use std::io::{self, Write};

use crate::event::EventKind;
use crate::types::{ProcessClass, SimTime};

/// One per-transition record: what happened, when, and to whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub time: SimTime,
    pub kind: EventKind,
    /// Thread ordinal within its process.
    pub thread: u32,
    /// Owning process id.
    pub process: u32,
    pub class: ProcessClass,
    pub message: String,
}

/// A complete simulation trace in handling order.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    records: Vec<TraceRecord>,
}

impl Trace {
    pub(crate) fn new() -> Self {
        Trace::default()
    }

    pub(crate) fn record(&mut self, record: TraceRecord) {
        self.records.push(record);
    }

    /// All records in handling order.
    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    /// Times at which events of the named kind were handled, in order.
    /// Kind names are the canonical identifiers, e.g. `"THREAD_PREEMPTED"`.
    pub fn times(&self, kind_name: &str) -> Vec<SimTime> {
        self.records
            .iter()
            .filter(|r| r.kind.name() == kind_name)
            .map(|r| r.time)
            .collect()
    }

    /// Number of records of the named kind.
    pub fn count(&self, kind_name: &str) -> usize {
        self.records
            .iter()
            .filter(|r| r.kind.name() == kind_name)
            .count()
    }

    /// Times at which the named kind was handled for one specific thread.
    pub fn thread_times(&self, kind_name: &str, process: u32, thread: u32) -> Vec<SimTime> {
        self.records
            .iter()
            .filter(|r| r.kind.name() == kind_name && r.process == process && r.thread == thread)
            .map(|r| r.time)
            .collect()
    }

    /// Render the verbose per-transition listing.
    pub fn write_verbose<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for record in &self.records {
            writeln!(w, "At time {}:", record.time)?;
            writeln!(w, "    {}", record.kind.name())?;
            writeln!(
                w,
                "    Thread {} in process {} [{}]",
                record.thread, record.process, record.class
            )?;
            writeln!(w, "    {}", record.message)?;
            writeln!(w)?;
        }
        Ok(())
    }

    /// Pretty-print the trace to stderr for debugging.
    pub fn dump(&self) {
        for record in &self.records {
            eprintln!(
                "[{:>8}] {:<28} {}/{} {}",
                record.time,
                record.kind.name(),
                record.process,
                record.thread,
                record.message
            );
        }
    }
}

/// One row of the per-thread summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadRow {
    pub process: u32,
    pub class: ProcessClass,
    /// Thread ordinal within its process.
    pub thread: u32,
    pub arrival: SimTime,
    /// Total CPU demand over the thread's bursts.
    pub cpu_time: SimTime,
    /// Total I/O demand over the thread's bursts.
    pub io_time: SimTime,
    pub end_time: SimTime,
}

/// Render the per-thread table, grouped by process, one line per thread
/// with ARR, CPU, I/O, TRT (end - arrival), and END.
pub fn write_thread_table<W: Write>(rows: &[ThreadRow], w: &mut W) -> io::Result<()> {
    let mut current = None;
    for row in rows {
        if current != Some(row.process) {
            writeln!(w, "Process {} [{}]:", row.process, row.class)?;
            writeln!(
                w,
                "    {:>6}{:>8}{:>8}{:>8}{:>8}{:>8}",
                "THREAD", "ARR", "CPU", "I/O", "TRT", "END"
            )?;
            current = Some(row.process);
        }
        writeln!(
            w,
            "    {:>6}{:>8}{:>8}{:>8}{:>8}{:>8}",
            row.thread,
            row.arrival,
            row.cpu_time,
            row.io_time,
            row.end_time - row.arrival,
            row.end_time
        )?;
    }
    if !rows.is_empty() {
        writeln!(w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(time: SimTime, kind: EventKind) -> TraceRecord {
        TraceRecord {
            time,
            kind,
            thread: 0,
            process: 0,
            class: ProcessClass::Normal,
            message: "Transitioned from NEW to READY".into(),
        }
    }

    #[test]
    fn test_verbose_block_format() {
        let mut trace = Trace::new();
        trace.record(record(4, EventKind::ThreadArrived));

        let mut out = Vec::new();
        trace.write_verbose(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "At time 4:\n\
             \x20   THREAD_ARRIVED\n\
             \x20   Thread 0 in process 0 [NORMAL]\n\
             \x20   Transitioned from NEW to READY\n\
             \n"
        );
    }

    #[test]
    fn test_kind_queries() {
        let mut trace = Trace::new();
        trace.record(record(0, EventKind::ThreadArrived));
        trace.record(record(9, EventKind::ThreadPreempted));
        trace.record(record(15, EventKind::ThreadPreempted));

        assert_eq!(trace.times("THREAD_PREEMPTED"), vec![9, 15]);
        assert_eq!(trace.count("THREAD_ARRIVED"), 1);
        assert_eq!(trace.count("CPU_BURST_COMPLETED"), 0);
    }

    #[test]
    fn test_thread_table_groups_by_process() {
        let rows = vec![
            ThreadRow {
                process: 0,
                class: ProcessClass::Normal,
                thread: 0,
                arrival: 0,
                cpu_time: 10,
                io_time: 0,
                end_time: 16,
            },
            ThreadRow {
                process: 1,
                class: ProcessClass::Batch,
                thread: 0,
                arrival: 0,
                cpu_time: 5,
                io_time: 2,
                end_time: 22,
            },
        ];

        let mut out = Vec::new();
        write_thread_table(&rows, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Process 0 [NORMAL]:"));
        assert!(text.contains("Process 1 [BATCH]:"));
        assert!(text.contains("THREAD     ARR     CPU     I/O     TRT     END"));
        assert!(text.contains("0       0      10       0      16      16"));
        assert!(text.contains("0       0       5       2      22      22"));
    }
}

//! Metric accumulators and the finalized report.
//!
//! The engine feeds running totals and per-class completion samples into
//! [`Metrics`]; [`Metrics::finalize`] derives the idle residual and the
//! utilization/efficiency ratios into an immutable [`Report`] that the
//! formatter renders.

use std::io::{self, Write};

use crate::types::{ProcessClass, SimTime};

/// Per-class completion samples: a count plus response- and
/// turnaround-time sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassTotals {
    pub count: u64,
    pub response_sum: SimTime,
    pub turnaround_sum: SimTime,
}

/// Running totals mutated by the event loop.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    pub total_elapsed_time: SimTime,
    pub total_service_time: SimTime,
    pub total_io_time: SimTime,
    pub total_dispatch_time: SimTime,
    pub classes: [ClassTotals; 4],
}

impl Metrics {
    pub fn new() -> Self {
        Metrics::default()
    }

    /// Record one thread completion against its process class.
    pub fn record_completion(
        &mut self,
        class: ProcessClass,
        response: SimTime,
        turnaround: SimTime,
    ) {
        let totals = &mut self.classes[class.index()];
        totals.count += 1;
        totals.response_sum += response;
        totals.turnaround_sum += turnaround;
    }

    /// Derive the final report. Idle time is the exact integer residual
    /// `elapsed - dispatch - service`.
    pub fn finalize(&self) -> Report {
        let total_idle_time = self
            .total_elapsed_time
            .saturating_sub(self.total_dispatch_time)
            .saturating_sub(self.total_service_time);

        let (cpu_utilization, cpu_efficiency) = if self.total_elapsed_time == 0 {
            (0.0, 0.0)
        } else {
            let elapsed = self.total_elapsed_time as f64;
            (
                (elapsed - total_idle_time as f64) / elapsed * 100.0,
                self.total_service_time as f64 / elapsed * 100.0,
            )
        };

        let classes = self.classes.map(|totals| {
            let avg = |sum: SimTime| {
                if totals.count == 0 {
                    0.0
                } else {
                    sum as f64 / totals.count as f64
                }
            };
            ClassReport {
                count: totals.count,
                avg_response: avg(totals.response_sum),
                avg_turnaround: avg(totals.turnaround_sum),
            }
        });

        Report {
            total_elapsed_time: self.total_elapsed_time,
            total_service_time: self.total_service_time,
            total_io_time: self.total_io_time,
            total_dispatch_time: self.total_dispatch_time,
            total_idle_time,
            cpu_utilization,
            cpu_efficiency,
            classes,
        }
    }
}

/// Finalized per-class averages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassReport {
    pub count: u64,
    pub avg_response: f64,
    pub avg_turnaround: f64,
}

/// The finalized metrics record handed to the formatter.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub total_elapsed_time: SimTime,
    pub total_service_time: SimTime,
    pub total_io_time: SimTime,
    pub total_dispatch_time: SimTime,
    pub total_idle_time: SimTime,
    /// Percentage of elapsed time the CPU was busy (service + dispatch).
    pub cpu_utilization: f64,
    /// Percentage of elapsed time spent on useful service.
    pub cpu_efficiency: f64,
    /// Indexed by `ProcessClass::index()`.
    pub classes: [ClassReport; 4],
}

impl Report {
    /// Render the fixed-width summary: one block per class, the five
    /// totals, then the CPU ratios as 2-decimal percentages.
    pub fn write_summary<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for class in ProcessClass::ALL {
            let report = &self.classes[class.index()];
            writeln!(w, "{} THREADS:", class.label())?;
            writeln!(w, "    {:<22}{:>9}", "Total count:", report.count)?;
            writeln!(
                w,
                "    {:<22}{:>9.2}",
                "Avg response time:", report.avg_response
            )?;
            writeln!(
                w,
                "    {:<22}{:>9.2}",
                "Avg turnaround time:", report.avg_turnaround
            )?;
            writeln!(w)?;
        }

        writeln!(w, "{:<20}{:>13}", "Total elapsed time:", self.total_elapsed_time)?;
        writeln!(w, "{:<20}{:>13}", "Total service time:", self.total_service_time)?;
        writeln!(w, "{:<20}{:>13}", "Total I/O time:", self.total_io_time)?;
        writeln!(w, "{:<20}{:>13}", "Total dispatch time:", self.total_dispatch_time)?;
        writeln!(w, "{:<20}{:>13}", "Total idle time:", self.total_idle_time)?;
        writeln!(w)?;
        writeln!(w, "{:<20}{:>12.2}%", "CPU utilization:", self.cpu_utilization)?;
        writeln!(w, "{:<20}{:>12.2}%", "CPU efficiency:", self.cpu_efficiency)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_idle_residual() {
        let metrics = Metrics {
            total_elapsed_time: 24,
            total_service_time: 7,
            total_io_time: 5,
            total_dispatch_time: 9,
            ..Metrics::default()
        };
        let report = metrics.finalize();
        assert_eq!(report.total_idle_time, 8);
        assert_eq!(
            report.total_elapsed_time,
            report.total_service_time + report.total_dispatch_time + report.total_idle_time
        );
    }

    #[test]
    fn test_finalize_ratios() {
        let metrics = Metrics {
            total_elapsed_time: 16,
            total_service_time: 10,
            total_dispatch_time: 6,
            ..Metrics::default()
        };
        let report = metrics.finalize();
        assert_eq!(report.total_idle_time, 0);
        assert!((report.cpu_utilization - 100.0).abs() < 1e-9);
        assert!((report.cpu_efficiency - 62.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_class_averages_are_zero() {
        let mut metrics = Metrics::new();
        metrics.record_completion(ProcessClass::System, 6, 16);
        metrics.record_completion(ProcessClass::System, 10, 20);
        let report = metrics.finalize();

        let system = &report.classes[ProcessClass::System.index()];
        assert_eq!(system.count, 2);
        assert!((system.avg_response - 8.0).abs() < 1e-9);
        assert!((system.avg_turnaround - 18.0).abs() < 1e-9);

        let batch = &report.classes[ProcessClass::Batch.index()];
        assert_eq!(batch.count, 0);
        assert_eq!(batch.avg_response, 0.0);
        assert_eq!(batch.avg_turnaround, 0.0);
    }

    #[test]
    fn test_empty_run_has_no_ratios() {
        let report = Metrics::new().finalize();
        assert_eq!(report.cpu_utilization, 0.0);
        assert_eq!(report.cpu_efficiency, 0.0);
    }

    #[test]
    fn test_summary_format() {
        let mut metrics = Metrics {
            total_elapsed_time: 16,
            total_service_time: 10,
            total_dispatch_time: 6,
            ..Metrics::default()
        };
        metrics.record_completion(ProcessClass::Normal, 6, 16);

        let mut out = Vec::new();
        metrics.finalize().write_summary(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("NORMAL THREADS:"));
        assert!(text.contains("Avg response time:         6.00"));
        assert!(text.contains("Avg turnaround time:      16.00"));
        assert!(text.contains("Total elapsed time:            16"));
        assert!(text.contains("CPU utilization:          100.00%"));
        assert!(text.contains("CPU efficiency:            62.50%"));
    }
}

use schedsim::Policy;

mod common;

/// Single thread, single burst: the run is one process dispatch followed
/// by one uninterrupted burst.
#[test]
fn test_single_thread_single_burst() {
    let result = common::run("1 3 6\n0 2 1\n0 1\n10 0\n", Policy::Fcfs, 3);

    let report = &result.report;
    assert_eq!(report.total_elapsed_time, 16);
    assert_eq!(report.total_service_time, 10);
    assert_eq!(report.total_dispatch_time, 6);
    assert_eq!(report.total_io_time, 0);
    assert_eq!(report.total_idle_time, 0);
    assert!((report.cpu_utilization - 100.0).abs() < 1e-9);
    assert!((report.cpu_efficiency - 62.5).abs() < 1e-9);

    // First dispatch is a process switch; thread starts at 6 and ends at 16.
    assert_eq!(result.trace.times("PROCESS_DISPATCH_COMPLETED"), vec![6]);
    assert_eq!(result.trace.times("THREAD_COMPLETED"), vec![16]);

    let normal = &report.classes[schedsim::ProcessClass::Normal.index()];
    assert_eq!(normal.count, 1);
    assert!((normal.avg_response - 6.0).abs() < 1e-9);
    assert!((normal.avg_turnaround - 16.0).abs() < 1e-9);

    assert_eq!(result.threads.len(), 1);
    assert_eq!(result.threads[0].end_time, 16);
}

/// Two processes arriving at the same instant: both are enqueued in
/// thread-id order before the pick, so the FIFO hands process 0 the CPU
/// first and the second dispatch pays a process switch.
#[test]
fn test_simultaneous_arrivals_tie_break() {
    let input = "2 3 6\n\
                 0 0 1\n\
                 0 1\n\
                 5 0\n\
                 1 3 1\n\
                 0 1\n\
                 5 0\n";
    let result = common::run(input, Policy::Fcfs, 3);

    // Process 0 is dispatched first: [6, 11]. Process 1 starts its
    // dispatch at 11 and runs [17, 22].
    assert_eq!(
        result.trace.times("PROCESS_DISPATCH_COMPLETED"),
        vec![6, 17]
    );
    assert_eq!(result.trace.thread_times("THREAD_COMPLETED", 0, 0), vec![11]);
    assert_eq!(result.trace.thread_times("THREAD_COMPLETED", 1, 0), vec![22]);

    let report = &result.report;
    assert_eq!(report.total_elapsed_time, 22);
    assert_eq!(report.total_service_time, 10);
    assert_eq!(report.total_dispatch_time, 12);
    assert_eq!(report.total_idle_time, 0);

    let system = &report.classes[schedsim::ProcessClass::System.index()];
    assert_eq!(system.count, 1);
    assert!((system.avg_response - 6.0).abs() < 1e-9);
    assert!((system.avg_turnaround - 11.0).abs() < 1e-9);
    let batch = &report.classes[schedsim::ProcessClass::Batch.index()];
    assert!((batch.avg_response - 17.0).abs() < 1e-9);
    assert!((batch.avg_turnaround - 22.0).abs() < 1e-9);
}

/// I/O blocking: the CPU idles while the only thread waits, and the
/// re-dispatch after I/O is a thread switch because the process is
/// unchanged.
#[test]
fn test_io_blocking_idles_cpu() {
    let result = common::run("1 3 6\n0 2 1\n0 2\n4 5\n3 0\n", Policy::Fcfs, 3);

    assert_eq!(result.trace.times("PROCESS_DISPATCH_COMPLETED"), vec![6]);
    assert_eq!(result.trace.times("CPU_BURST_COMPLETED"), vec![10, 21]);
    assert_eq!(result.trace.times("IO_BURST_COMPLETED"), vec![15]);
    assert_eq!(result.trace.times("THREAD_DISPATCH_COMPLETED"), vec![18]);
    assert_eq!(result.trace.times("THREAD_COMPLETED"), vec![21]);

    let report = &result.report;
    assert_eq!(report.total_elapsed_time, 21);
    assert_eq!(report.total_service_time, 7);
    assert_eq!(report.total_io_time, 5);
    assert_eq!(report.total_dispatch_time, 9);
    // Idle is exactly the blocked window [10, 15].
    assert_eq!(report.total_idle_time, 5);
}

/// FCFS never preempts, whatever the workload shape.
#[test]
fn test_fcfs_never_preempts() {
    let input = "2 3 6\n\
                 0 0 1\n\
                 0 1\n\
                 5 0\n\
                 1 3 1\n\
                 0 1\n\
                 5 0\n";
    let result = common::run(input, Policy::Fcfs, 3);
    assert_eq!(result.trace.count("THREAD_PREEMPTED"), 0);

    let result = common::run("1 3 6\n0 2 1\n0 2\n4 5\n3 0\n", Policy::Fcfs, 3);
    assert_eq!(result.trace.count("THREAD_PREEMPTED"), 0);
}

/// A zero I/O time on a non-terminal burst ends the thread: remaining
/// bursts are never executed.
#[test]
fn test_zero_io_burst_completes_thread() {
    let result = common::run("1 3 6\n0 2 1\n0 2\n4 0\n5 0\n", Policy::Fcfs, 3);

    assert_eq!(result.trace.times("THREAD_COMPLETED"), vec![10]);
    assert_eq!(result.report.total_elapsed_time, 10);
    // Only the first burst's CPU demand was served.
    assert_eq!(result.report.total_service_time, 4);
    assert_eq!(result.report.total_io_time, 0);
}

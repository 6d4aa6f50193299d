use schedsim::{Policy, SimConfig, SimResult, Simulator, Workload};

/// Parse a workload description and run it to completion under the given
/// policy.
pub fn run(input: &str, policy: Policy, quantum: u64) -> SimResult {
    let workload = Workload::parse(input).expect("workload parses");
    let config = SimConfig { policy, quantum };
    Simulator::new(&workload, &config).run()
}

//! Coverage matrix over (workload, tool) pairs.
//!
//! Runs every adapter that claims support for each workload and indexes
//! the results. A pair where `supports` is false gets no entry at all;
//! a pair that runs gets exactly one `ResultSet`, pass or fail.

use perflens_adapters::ToolAdapter;
use perflens_core::{ResultSet, WorkloadSpec};
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of one populated matrix cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStatus {
    /// Run succeeded (`exit_code == 0`).
    Pass,
    /// Run was attempted and failed.
    Fail,
}

/// Indexed results of one batch run.
#[derive(Debug, Default)]
pub struct CoverageRun {
    results: BTreeMap<(String, String), ResultSet>,
    workloads: Vec<String>,
    tools: Vec<String>,
}

/// Run every supporting (workload, tool) pair.
///
/// Single-threaded by design: adapters may spawn subprocesses, and one
/// slow or failing pair must not disturb the rest of the batch.
pub fn run_matrix(specs: &[WorkloadSpec], adapters: &[Box<dyn ToolAdapter>]) -> CoverageRun {
    let mut run = CoverageRun {
        results: BTreeMap::new(),
        workloads: specs.iter().map(|s| s.name.clone()).collect(),
        tools: adapters.iter().map(|a| a.name().to_string()).collect(),
    };

    for spec in specs {
        for adapter in adapters {
            if !adapter.supports(spec) {
                tracing::debug!("{} does not support '{}', skipping", adapter.name(), spec.name);
                continue;
            }
            let result = adapter.run(spec);
            if let Some(err) = &result.error {
                tracing::warn!("{} failed on '{}': {err}", adapter.name(), spec.name);
            }
            run.results
                .insert((spec.name.clone(), adapter.name().to_string()), result);
        }
    }
    run
}

impl CoverageRun {
    /// Workload names, in input order.
    pub fn workloads(&self) -> &[String] {
        &self.workloads
    }

    /// Tool names, in input order.
    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    /// The recorded result for a pair, if the pair was run.
    pub fn result(&self, workload: &str, tool: &str) -> Option<&ResultSet> {
        self.results
            .get(&(workload.to_string(), tool.to_string()))
    }

    /// Matrix cell status; `None` when the pair was skipped as unsupported.
    pub fn cell(&self, workload: &str, tool: &str) -> Option<CellStatus> {
        self.result(workload, tool).map(|rs| {
            if rs.is_ok() {
                CellStatus::Pass
            } else {
                CellStatus::Fail
            }
        })
    }

    /// Union of metric keys produced by successful runs for one workload.
    pub fn metric_keys(&self, workload: &str) -> Vec<String> {
        let mut keys = BTreeSet::new();
        for ((w, _), rs) in &self.results {
            if w == workload && rs.is_ok() {
                keys.extend(rs.metrics.keys().cloned());
            }
        }
        keys.into_iter().collect()
    }

    /// All recorded results.
    pub fn results(&self) -> impl Iterator<Item = (&(String, String), &ResultSet)> {
        self.results.iter()
    }

    /// Count of successful runs.
    pub fn pass_count(&self) -> usize {
        self.results.values().filter(|rs| rs.is_ok()).count()
    }

    /// Count of attempted-and-failed runs.
    pub fn fail_count(&self) -> usize {
        self.results.len() - self.pass_count()
    }
}

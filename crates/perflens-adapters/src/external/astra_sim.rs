//! Shim for the ASTRA-sim distributed-training simulator.
//!
//! ASTRA-sim logs cycle totals to a text file as it runs; the shim scrapes
//! the final `Wall time:` / `Comm time:` lines from a finished log and,
//! when the workload names a cataloged model and a link bandwidth, adds a
//! ring all-reduce closed-form estimate as a cross-check.

use crate::adapter::{ToolAdapter, ToolCategory};
use perflens_catalog::model_profile;
use perflens_core::{ModelType, ResultSet, Task, WorkloadSpec, SENTINEL_EXIT_CODE};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

const WALL_TIME_PATTERN: &str = r"Wall time:\s*([0-9][0-9.eE+]*)";
const COMM_TIME_PATTERN: &str = r"Comm time:\s*([0-9][0-9.eE+]*)";

/// Distributed-training simulator adapter reading ASTRA-sim logs.
#[derive(Debug, Default)]
pub struct AstraSimAdapter;

impl AstraSimAdapter {
    /// Create the adapter.
    pub const fn new() -> Self {
        Self
    }
}

/// Last capture of `pattern` in `text`, parsed as f64. The simulator logs
/// running totals; the final line is the result.
fn scrape_last(text: &str, pattern: &str) -> Option<f64> {
    let re = Regex::new(pattern).ok()?;
    re.captures_iter(text)
        .last()?
        .get(1)?
        .as_str()
        .parse::<f64>()
        .ok()
}

/// Ring all-reduce time in ms: each of N ranks moves `2(N-1)/N` of the
/// gradient bytes over its link.
fn ring_allreduce_ms(param_bytes: f64, devices: u32, link_bw_gb_s: f64) -> f64 {
    let n = f64::from(devices);
    2.0 * (n - 1.0) / n * param_bytes / (link_bw_gb_s * 1e9) * 1e3
}

impl ToolAdapter for AstraSimAdapter {
    fn name(&self) -> &'static str {
        "astra-sim"
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Simulation
    }

    fn supported_metrics(&self) -> &'static [&'static str] {
        &[
            "wall_time_cycles",
            "comm_time_cycles",
            "comm_overhead_pct",
            "ring_allreduce_ms",
        ]
    }

    fn supported_workloads(&self) -> &'static [ModelType] {
        &[ModelType::Transformer, ModelType::Llm]
    }

    fn supports(&self, spec: &WorkloadSpec) -> bool {
        self.supported_workloads().contains(&spec.model_type) && spec.task == Task::Training
    }

    fn run(&self, spec: &WorkloadSpec) -> ResultSet {
        let Some(log_path) = spec.extra_str("astra_log") else {
            let msg = "workload extra has no 'astra_log'";
            return ResultSet::failed(self.name(), &spec.name, msg, 1);
        };
        let log_path = Path::new(log_path);
        let text = match std::fs::read_to_string(log_path) {
            Ok(text) => text,
            Err(_) => {
                let msg = format!("missing output artifact: {}", log_path.display());
                return ResultSet::failed(self.name(), &spec.name, msg, SENTINEL_EXIT_CODE);
            }
        };

        let Some(wall) = scrape_last(&text, WALL_TIME_PATTERN) else {
            let msg = "unparsable simulator log: no 'Wall time:' line".to_string();
            return ResultSet::failed(self.name(), &spec.name, msg, 1);
        };

        let mut metrics = BTreeMap::new();
        metrics.insert("wall_time_cycles".to_string(), wall);
        if let Some(comm) = scrape_last(&text, COMM_TIME_PATTERN) {
            metrics.insert("comm_time_cycles".to_string(), comm);
            if wall > 0.0 {
                metrics.insert("comm_overhead_pct".to_string(), comm / wall * 100.0);
            }
        }

        // Closed-form cross-check when the workload gives enough to compute it.
        let link_bw = spec
            .hardware
            .get("link_bw_gb_s")
            .and_then(serde_yaml::Value::as_f64);
        if let (Some(model), Some(link_bw)) =
            (spec.model_name().and_then(model_profile), link_bw)
        {
            let devices = spec.device_count();
            if devices > 1 {
                metrics.insert(
                    "ring_allreduce_ms".to_string(),
                    ring_allreduce_ms(model.param_bytes(4), devices, link_bw),
                );
            }
        }

        ResultSet::ok(self.name(), &spec.name, metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
sys[0] finished
Wall time: 1.2e6
Comm time: 3.0e5
sys[1] finished
Wall time: 2.0e6
Comm time: 5.0e5
";

    fn training_spec(log_path: &str, hardware: &str) -> WorkloadSpec {
        let yaml = format!(
            "name: gpt2-train\nmodel_type: llm\nmodel:\n  name: GPT-2\ntask: training\nhardware:\n{hardware}extra:\n  astra_log: {log_path}\n",
        );
        serde_yaml::from_str(&yaml).unwrap()
    }

    #[test]
    fn test_scrapes_last_occurrence() {
        assert_eq!(scrape_last(LOG, WALL_TIME_PATTERN), Some(2.0e6));
        assert_eq!(scrape_last(LOG, COMM_TIME_PATTERN), Some(5.0e5));
        assert_eq!(scrape_last("nothing here", WALL_TIME_PATTERN), None);
    }

    #[test]
    fn test_comm_overhead_from_log() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = dir.path().join("run.log");
        std::fs::write(&log, LOG).unwrap();

        let spec = training_spec(&log.to_string_lossy(), "  device: H100\n  count: 8\n");
        let rs = AstraSimAdapter::new().run(&spec);
        assert!(rs.is_ok(), "error: {:?}", rs.error);
        assert_eq!(rs.metric("wall_time_cycles"), Some(2.0e6));
        assert!((rs.metric("comm_overhead_pct").unwrap() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_ring_allreduce_cross_check() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = dir.path().join("run.log");
        std::fs::write(&log, LOG).unwrap();

        let spec = training_spec(
            &log.to_string_lossy(),
            "  device: H100\n  count: 8\n  link_bw_gb_s: 450\n",
        );
        let rs = AstraSimAdapter::new().run(&spec);
        // GPT-2: 1.5e9 params * 4 B; 2*(7/8) of that over 450 GB/s
        let expected = 2.0 * 7.0 / 8.0 * 1.5e9 * 4.0 / 450e9 * 1e3;
        assert!((rs.metric("ring_allreduce_ms").unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_missing_log_is_distinct_error() {
        let spec = training_spec("/nonexistent/run.log", "  device: H100\n");
        let rs = AstraSimAdapter::new().run(&spec);
        assert_eq!(rs.exit_code, SENTINEL_EXIT_CODE);
        assert!(rs.error.unwrap().contains("missing output artifact"));
    }

    #[test]
    fn test_log_without_wall_time_is_unparsable() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = dir.path().join("run.log");
        std::fs::write(&log, "sys[0] booted\n").unwrap();
        let spec = training_spec(&log.to_string_lossy(), "  device: H100\n");
        let rs = AstraSimAdapter::new().run(&spec);
        assert_eq!(rs.exit_code, 1);
        assert!(rs.error.unwrap().contains("unparsable"));
    }
}

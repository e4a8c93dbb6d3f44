//! Shim for the Timeloop accelerator mapper.
//!
//! Timeloop takes a problem description file, searches mappings, and writes
//! a plain-text stats file next to its working directory. The shim
//! generates a minimal problem config for the workload, runs the mapper
//! under a deadline, and scrapes cycles/energy/utilization out of the
//! stats file.

use crate::adapter::{ToolAdapter, ToolCategory};
use crate::exec::{run_bounded, ExecOutcome};
use perflens_core::{ModelType, ResultSet, Task, WorkloadSpec, SENTINEL_EXIT_CODE};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

const DEFAULT_BIN: &str = "timeloop-model";
const STATS_FILE: &str = "timeloop-model.stats.txt";
const TIMEOUT: Duration = Duration::from_secs(60);

/// Accelerator clock assumed when the workload does not pin one.
const DEFAULT_CLOCK_MHZ: f64 = 1000.0;

/// Cycle-level accelerator mapping via the `timeloop-model` binary.
#[derive(Debug, Default)]
pub struct TimeloopAdapter;

impl TimeloopAdapter {
    /// Create the adapter.
    pub const fn new() -> Self {
        Self
    }
}

struct Stats {
    cycles: f64,
    energy_uj: Option<f64>,
    utilization: Option<f64>,
}

/// Scrape the stats summary. Only `Cycles:` is mandatory; energy and
/// utilization lines vary with the architecture config.
fn parse_stats(text: &str) -> Option<Stats> {
    let grab = |pattern: &str| {
        Regex::new(pattern)
            .ok()?
            .captures(text)?
            .get(1)?
            .as_str()
            .parse::<f64>()
            .ok()
    };
    Some(Stats {
        cycles: grab(r"(?m)^Cycles:\s*([0-9]+)")?,
        energy_uj: grab(r"(?m)^Energy:\s*([0-9.]+)\s*uJ"),
        utilization: grab(r"(?m)^Utilization:\s*([0-9.]+)"),
    })
}

fn problem_config(spec: &WorkloadSpec) -> String {
    format!(
        "problem:\n  shape: cnn-layer\n  instance:\n    model: {}\n    N: {}\n",
        spec.model_name().unwrap_or(&spec.name),
        spec.batch_size,
    )
}

impl ToolAdapter for TimeloopAdapter {
    fn name(&self) -> &'static str {
        "timeloop"
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Simulation
    }

    fn supported_metrics(&self) -> &'static [&'static str] {
        &["cycles", "energy_uj", "utilization", "latency_ms"]
    }

    fn supported_workloads(&self) -> &'static [ModelType] {
        &[ModelType::Cnn]
    }

    fn supports(&self, spec: &WorkloadSpec) -> bool {
        spec.model_type == ModelType::Cnn && spec.task == Task::Inference
    }

    fn run(&self, spec: &WorkloadSpec) -> ResultSet {
        let bin = spec.extra_str("timeloop_bin").unwrap_or(DEFAULT_BIN);

        let workdir = match tempfile::TempDir::new() {
            Ok(dir) => dir,
            Err(e) => {
                let msg = format!("cannot create working directory: {e}");
                return ResultSet::failed(self.name(), &spec.name, msg, SENTINEL_EXIT_CODE);
            }
        };
        let config_path = workdir.path().join("problem.yaml");
        if let Err(e) = std::fs::write(&config_path, problem_config(spec)) {
            let msg = format!("cannot write problem config: {e}");
            return ResultSet::failed(self.name(), &spec.name, msg, SENTINEL_EXIT_CODE);
        }

        let config_arg = config_path.to_string_lossy();
        let outcome = run_bounded(bin, &[&*config_arg], Some(workdir.path()), TIMEOUT);
        match outcome {
            ExecOutcome::LaunchFailed { reason } => {
                let msg = format!("timeloop binary '{bin}' not found or not runnable: {reason}");
                ResultSet::failed(self.name(), &spec.name, msg, SENTINEL_EXIT_CODE)
            }
            ExecOutcome::TimedOut { limit } => {
                let msg = format!("timeloop timed out after {}s", limit.as_secs());
                ResultSet::failed(self.name(), &spec.name, msg, SENTINEL_EXIT_CODE)
            }
            ExecOutcome::Completed {
                stdout,
                stderr,
                exit_code,
            } => {
                if exit_code != 0 {
                    let detail = stderr.lines().next().unwrap_or("").trim();
                    let msg = format!("timeloop exited with code {exit_code}: {detail}");
                    return ResultSet::failed(self.name(), &spec.name, msg, exit_code)
                        .with_raw_output(stdout);
                }
                self.read_stats(spec, workdir.path(), stdout)
            }
        }
    }
}

impl TimeloopAdapter {
    fn read_stats(&self, spec: &WorkloadSpec, workdir: &Path, stdout: String) -> ResultSet {
        let stats_path = workdir.join(STATS_FILE);
        let text = match std::fs::read_to_string(&stats_path) {
            Ok(text) => text,
            Err(_) => {
                let msg = format!("missing output artifact: {}", stats_path.display());
                return ResultSet::failed(self.name(), &spec.name, msg, 1).with_raw_output(stdout);
            }
        };
        let Some(stats) = parse_stats(&text) else {
            let msg = "unparsable timeloop stats: no Cycles line".to_string();
            return ResultSet::failed(self.name(), &spec.name, msg, 1).with_raw_output(text);
        };

        let clock_mhz = spec
            .extra
            .get("clock_mhz")
            .and_then(serde_yaml::Value::as_f64)
            .unwrap_or(DEFAULT_CLOCK_MHZ);

        let mut metrics = BTreeMap::new();
        metrics.insert("cycles".to_string(), stats.cycles);
        metrics.insert("latency_ms".to_string(), stats.cycles / (clock_mhz * 1e3));
        if let Some(energy) = stats.energy_uj {
            metrics.insert("energy_uj".to_string(), energy);
        }
        if let Some(util) = stats.utilization {
            metrics.insert("utilization".to_string(), util);
        }
        ResultSet::ok(self.name(), &spec.name, metrics).with_raw_output(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn cnn_spec(extra: &str) -> WorkloadSpec {
        let yaml = format!(
            "name: resnet50-inf\nmodel_type: cnn\nmodel:\n  name: ResNet-50\nextra:\n{extra}",
        );
        serde_yaml::from_str(&yaml).unwrap()
    }

    #[test]
    fn test_supports_cnn_inference_only() {
        let adapter = TimeloopAdapter::new();
        assert!(adapter.supports(&cnn_spec("  x: 0\n")));
        let training: WorkloadSpec =
            serde_yaml::from_str("name: w\nmodel_type: cnn\ntask: training\n").unwrap();
        assert!(!adapter.supports(&training));
        let llm: WorkloadSpec = serde_yaml::from_str("name: w\nmodel_type: llm\n").unwrap();
        assert!(!adapter.supports(&llm));
    }

    #[test]
    fn test_parse_stats() {
        let text = "Summary\nCycles: 1234567\nEnergy: 8901.2 uJ\nUtilization: 0.87\n";
        let stats = parse_stats(text).unwrap();
        assert!((stats.cycles - 1_234_567.0).abs() < f64::EPSILON);
        assert_eq!(stats.energy_uj, Some(8901.2));
        assert_eq!(stats.utilization, Some(0.87));
        assert!(parse_stats("no cycles here\n").is_none());
    }

    #[test]
    fn test_missing_binary_reported_distinctly() {
        let spec = cnn_spec("  timeloop_bin: /nonexistent/timeloop-model\n");
        let rs = TimeloopAdapter::new().run(&spec);
        assert_eq!(rs.exit_code, SENTINEL_EXIT_CODE);
        assert!(rs.error.unwrap().contains("not found"));
    }

    #[test]
    fn test_fake_mapper_end_to_end() {
        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("fake-timeloop.sh");
        std::fs::write(
            &script,
            "#!/bin/sh\nprintf 'Cycles: 2000000\\nEnergy: 15.5 uJ\\nUtilization: 0.5\\n' > timeloop-model.stats.txt\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let spec = cnn_spec(&format!("  timeloop_bin: {}\n", script.display()));
        let rs = TimeloopAdapter::new().run(&spec);
        assert!(rs.is_ok(), "error: {:?}", rs.error);
        assert_eq!(rs.metric("cycles"), Some(2_000_000.0));
        // 2e6 cycles at the default 1 GHz clock
        assert!((rs.metric("latency_ms").unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_nonzero_exit_propagates_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("fail.sh");
        std::fs::write(&script, "#!/bin/sh\necho 'bad mapping' >&2\nexit 7\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let spec = cnn_spec(&format!("  timeloop_bin: {}\n", script.display()));
        let rs = TimeloopAdapter::new().run(&spec);
        assert_eq!(rs.exit_code, 7);
        assert!(rs.error.unwrap().contains("bad mapping"));
    }
}

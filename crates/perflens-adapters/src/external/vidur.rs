//! Shim for the Vidur LLM serving simulator.
//!
//! Vidur runs are expensive and usually pre-computed; the shim reads a
//! finished run directory (`request_metrics.csv`) rather than launching
//! the simulator, and summarizes per-request latency into the usual
//! serving metrics: end-to-end percentiles, time-to-first-token, and
//! time-per-output-token.

use crate::adapter::{ToolAdapter, ToolCategory};
use perflens_core::{ModelType, ResultSet, Task, WorkloadSpec, SENTINEL_EXIT_CODE};
use std::collections::BTreeMap;
use std::path::Path;

const METRICS_FILE: &str = "request_metrics.csv";
const E2E_COLUMN: &str = "request_e2e_time";
const TTFT_COLUMN: &str = "prefill_e2e_time";
const TPOT_COLUMN: &str = "decode_time_per_output_token";

/// Serving-simulator adapter reading pre-computed Vidur run directories.
#[derive(Debug, Default)]
pub struct VidurAdapter;

impl VidurAdapter {
    /// Create the adapter.
    pub const fn new() -> Self {
        Self
    }
}

/// Linear-interpolated percentile of a sorted slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    #[allow(clippy::cast_precision_loss)]
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = rank - rank.floor();
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

fn mean(values: &[f64]) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    values.iter().sum::<f64>() / n
}

struct RequestColumns {
    e2e: Vec<f64>,
    ttft: Vec<f64>,
    tpot: Vec<f64>,
}

fn read_request_metrics(path: &Path) -> Result<RequestColumns, String> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| e.to_string())?;
    let headers = reader.headers().map_err(|e| e.to_string())?.clone();
    let col = |name: &str| headers.iter().position(|h| h == name);

    let Some(e2e_idx) = col(E2E_COLUMN) else {
        return Err(format!("no '{E2E_COLUMN}' column"));
    };
    let ttft_idx = col(TTFT_COLUMN);
    let tpot_idx = col(TPOT_COLUMN);

    let mut cols = RequestColumns {
        e2e: Vec::new(),
        ttft: Vec::new(),
        tpot: Vec::new(),
    };
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        let field = |idx: usize| -> Result<f64, String> {
            record
                .get(idx)
                .ok_or_else(|| "short row".to_string())?
                .trim()
                .parse::<f64>()
                .map_err(|e| e.to_string())
        };
        cols.e2e.push(field(e2e_idx)?);
        if let Some(idx) = ttft_idx {
            cols.ttft.push(field(idx)?);
        }
        if let Some(idx) = tpot_idx {
            cols.tpot.push(field(idx)?);
        }
    }
    if cols.e2e.is_empty() {
        return Err("no request rows".to_string());
    }
    Ok(cols)
}

impl ToolAdapter for VidurAdapter {
    fn name(&self) -> &'static str {
        "vidur"
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Simulation
    }

    fn supported_metrics(&self) -> &'static [&'static str] {
        &[
            "num_requests",
            "avg_e2e_s",
            "median_e2e_s",
            "p90_e2e_s",
            "p99_e2e_s",
            "avg_ttft_s",
            "avg_tpot_s",
        ]
    }

    fn supported_workloads(&self) -> &'static [ModelType] {
        &[ModelType::Llm]
    }

    fn supports(&self, spec: &WorkloadSpec) -> bool {
        spec.model_type == ModelType::Llm && spec.task == Task::Serving
    }

    fn run(&self, spec: &WorkloadSpec) -> ResultSet {
        let Some(run_dir) = spec.extra_str("vidur_run_dir") else {
            let msg = "workload extra has no 'vidur_run_dir'";
            return ResultSet::failed(self.name(), &spec.name, msg, 1);
        };
        let run_dir = Path::new(run_dir);
        if !run_dir.is_dir() {
            let msg = format!("vidur run directory not found: {}", run_dir.display());
            return ResultSet::failed(self.name(), &spec.name, msg, SENTINEL_EXIT_CODE);
        }
        let csv_path = run_dir.join(METRICS_FILE);
        if !csv_path.is_file() {
            let msg = format!("missing output artifact: {}", csv_path.display());
            return ResultSet::failed(self.name(), &spec.name, msg, SENTINEL_EXIT_CODE);
        }

        let cols = match read_request_metrics(&csv_path) {
            Ok(cols) => cols,
            Err(reason) => {
                let msg = format!("unparsable {METRICS_FILE}: {reason}");
                return ResultSet::failed(self.name(), &spec.name, msg, 1);
            }
        };

        let mut sorted = cols.e2e.clone();
        sorted.sort_by(f64::total_cmp);

        let mut metrics = BTreeMap::new();
        #[allow(clippy::cast_precision_loss)]
        metrics.insert("num_requests".to_string(), cols.e2e.len() as f64);
        metrics.insert("avg_e2e_s".to_string(), mean(&cols.e2e));
        metrics.insert("median_e2e_s".to_string(), percentile(&sorted, 50.0));
        metrics.insert("p90_e2e_s".to_string(), percentile(&sorted, 90.0));
        metrics.insert("p99_e2e_s".to_string(), percentile(&sorted, 99.0));
        if !cols.ttft.is_empty() {
            metrics.insert("avg_ttft_s".to_string(), mean(&cols.ttft));
        }
        if !cols.tpot.is_empty() {
            metrics.insert("avg_tpot_s".to_string(), mean(&cols.tpot));
        }

        tracing::debug!(
            "Vidur run {}: {} requests, avg e2e {:.3}s",
            run_dir.display(),
            cols.e2e.len(),
            mean(&cols.e2e),
        );
        ResultSet::ok(self.name(), &spec.name, metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serving_spec(run_dir: &str) -> WorkloadSpec {
        let yaml = format!(
            "name: llama-serving\nmodel_type: llm\ntask: serving\nextra:\n  vidur_run_dir: {run_dir}\n",
        );
        serde_yaml::from_str(&yaml).unwrap()
    }

    #[test]
    fn test_supports_llm_serving_only() {
        let adapter = VidurAdapter::new();
        assert!(adapter.supports(&serving_spec("/tmp/x")));
        let inference: WorkloadSpec =
            serde_yaml::from_str("name: w\nmodel_type: llm\n").unwrap();
        assert!(!adapter.supports(&inference));
    }

    #[test]
    fn test_percentile_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&sorted, 50.0) - 2.5).abs() < 1e-12);
        assert!((percentile(&sorted, 0.0) - 1.0).abs() < 1e-12);
        assert!((percentile(&sorted, 100.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_summarizes_run_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(METRICS_FILE),
            "request_id,request_e2e_time,prefill_e2e_time,decode_time_per_output_token\n\
             0,1.0,0.2,0.01\n\
             1,2.0,0.4,0.02\n\
             2,3.0,0.6,0.03\n",
        )
        .unwrap();

        let rs = VidurAdapter::new().run(&serving_spec(&dir.path().to_string_lossy()));
        assert!(rs.is_ok(), "error: {:?}", rs.error);
        assert_eq!(rs.metric("num_requests"), Some(3.0));
        assert!((rs.metric("avg_e2e_s").unwrap() - 2.0).abs() < 1e-12);
        assert!((rs.metric("median_e2e_s").unwrap() - 2.0).abs() < 1e-12);
        assert!((rs.metric("avg_ttft_s").unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_missing_directory_and_artifact() {
        let rs = VidurAdapter::new().run(&serving_spec("/nonexistent/run"));
        assert_eq!(rs.exit_code, SENTINEL_EXIT_CODE);
        assert!(rs.error.unwrap().contains("not found"));

        let dir = tempfile::TempDir::new().unwrap();
        let rs = VidurAdapter::new().run(&serving_spec(&dir.path().to_string_lossy()));
        assert_eq!(rs.exit_code, SENTINEL_EXIT_CODE);
        assert!(rs.error.unwrap().contains("missing output artifact"));
    }

    #[test]
    fn test_missing_column_is_unparsable() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(METRICS_FILE), "request_id,latency\n0,1.0\n").unwrap();
        let rs = VidurAdapter::new().run(&serving_spec(&dir.path().to_string_lossy()));
        assert_eq!(rs.exit_code, 1);
        assert!(rs.error.unwrap().contains("unparsable"));
    }
}

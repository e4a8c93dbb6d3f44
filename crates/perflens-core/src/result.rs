//! Normalized tool output.
//!
//! Every adapter `run()` produces exactly one [`ResultSet`]. Failure is a
//! state of the result, not an exception: missing binaries, timeouts, and
//! unparsable output all land here with `error` set and a non-zero
//! `exit_code`. Results are collected into batches but never merged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Exit code recorded when no subprocess status exists (launch failure,
/// timeout, artifact-only adapters that failed before any tool ran).
pub const SENTINEL_EXIT_CODE: i32 = -1;

/// Standardized result from one performance prediction or simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Tool that produced this result.
    pub tool: String,
    /// Workload the tool ran against.
    pub workload: String,
    /// Normalized metrics: latency_ms, throughput_samples_s, cycles, ...
    /// Deterministically ordered so rendered reports are stable.
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
    /// Raw tool stdout/log excerpt, kept for diagnosis. Not serialized into
    /// the result document.
    #[serde(skip)]
    pub raw_output: Option<String>,
    /// 0 on success; tool exit code or [`SENTINEL_EXIT_CODE`] on failure.
    #[serde(default)]
    pub exit_code: i32,
    /// Failure description, `None` on success.
    #[serde(default)]
    pub error: Option<String>,
}

impl ResultSet {
    /// Successful result with the given metrics.
    pub fn ok(
        tool: impl Into<String>,
        workload: impl Into<String>,
        metrics: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            tool: tool.into(),
            workload: workload.into(),
            metrics,
            raw_output: None,
            exit_code: 0,
            error: None,
        }
    }

    /// Failed result: empty metrics, error string, non-zero exit code.
    pub fn failed(
        tool: impl Into<String>,
        workload: impl Into<String>,
        error: impl Into<String>,
        exit_code: i32,
    ) -> Self {
        Self {
            tool: tool.into(),
            workload: workload.into(),
            metrics: BTreeMap::new(),
            raw_output: None,
            exit_code: if exit_code == 0 { 1 } else { exit_code },
            error: Some(error.into()),
        }
    }

    /// Attach raw tool output for diagnosis.
    #[must_use]
    pub fn with_raw_output(mut self, raw: impl Into<String>) -> Self {
        self.raw_output = Some(raw.into());
        self
    }

    /// Whether the run succeeded.
    pub const fn is_ok(&self) -> bool {
        self.exit_code == 0
    }

    /// One metric by name.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metrics() -> BTreeMap<String, f64> {
        let mut m = BTreeMap::new();
        m.insert("latency_ms".to_string(), 1.2345);
        m.insert("throughput_samples_s".to_string(), 810.0);
        m.insert("cycles".to_string(), 1_048_576.0);
        m
    }

    #[test]
    fn test_ok_result() {
        let rs = ResultSet::ok("analytical", "w1", sample_metrics());
        assert!(rs.is_ok());
        assert!(rs.error.is_none());
        assert_eq!(rs.metric("latency_ms"), Some(1.2345));
        assert_eq!(rs.metric("energy_uj"), None);
    }

    #[test]
    fn test_failed_result_never_reports_zero_exit() {
        let rs = ResultSet::failed("timeloop", "w1", "binary not found", 0);
        assert!(!rs.is_ok());
        assert_eq!(rs.exit_code, 1);
        assert!(rs.metrics.is_empty());
    }

    #[test]
    fn test_json_round_trip_preserves_metrics() {
        let rs = ResultSet::ok("analytical", "w1", sample_metrics())
            .with_raw_output("stdout noise");
        let json = serde_json::to_string(&rs).unwrap();
        let back: ResultSet = serde_json::from_str(&json).unwrap();

        assert_eq!(back.metrics, rs.metrics);
        assert_eq!(back.tool, rs.tool);
        assert_eq!(back.workload, rs.workload);
        assert_eq!(back.exit_code, 0);
        // raw_output is diagnostic only, not part of the document
        assert!(back.raw_output.is_none());
    }

    #[test]
    fn test_sentinel_exit_code_round_trip() {
        let rs = ResultSet::failed("vidur", "w2", "timeout after 120s", SENTINEL_EXIT_CODE);
        let json = serde_json::to_value(&rs).unwrap();
        assert_eq!(json["exit_code"], -1);
        assert_eq!(json["error"], "timeout after 120s");
    }
}

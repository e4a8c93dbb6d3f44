//! Shim for the nn-Meter edge-latency predictor.
//!
//! nn-Meter batch runs produce a `predictions.json` artifact mapping model
//! names to predicted latencies in milliseconds. The shim looks up the
//! workload's model in that map.

use crate::adapter::{ToolAdapter, ToolCategory};
use perflens_core::{ModelType, ResultSet, Task, WorkloadSpec, SENTINEL_EXIT_CODE};
use std::collections::BTreeMap;
use std::path::Path;

/// Learned per-kernel latency predictor, read from its batch output.
#[derive(Debug, Default)]
pub struct NnMeterAdapter;

impl NnMeterAdapter {
    /// Create the adapter.
    pub const fn new() -> Self {
        Self
    }
}

impl ToolAdapter for NnMeterAdapter {
    fn name(&self) -> &'static str {
        "nn-meter"
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::MlBased
    }

    fn supported_metrics(&self) -> &'static [&'static str] {
        &["predicted_latency_ms"]
    }

    fn supported_workloads(&self) -> &'static [ModelType] {
        &[ModelType::Cnn]
    }

    fn supports(&self, spec: &WorkloadSpec) -> bool {
        spec.model_type == ModelType::Cnn && spec.task == Task::Inference
    }

    fn run(&self, spec: &WorkloadSpec) -> ResultSet {
        let Some(model_name) = spec.model_name() else {
            return ResultSet::failed(self.name(), &spec.name, "workload has no model.name", 1);
        };
        let Some(artifact) = spec.extra_str("nn_meter_predictions") else {
            let msg = "workload extra has no 'nn_meter_predictions'";
            return ResultSet::failed(self.name(), &spec.name, msg, 1);
        };
        let artifact = Path::new(artifact);
        let text = match std::fs::read_to_string(artifact) {
            Ok(text) => text,
            Err(_) => {
                let msg = format!("missing output artifact: {}", artifact.display());
                return ResultSet::failed(self.name(), &spec.name, msg, SENTINEL_EXIT_CODE);
            }
        };

        let predictions: BTreeMap<String, f64> = match serde_json::from_str(&text) {
            Ok(map) => map,
            Err(e) => {
                let msg = format!("unparsable predictions artifact: {e}");
                return ResultSet::failed(self.name(), &spec.name, msg, 1);
            }
        };

        let Some(latency) = predictions.get(model_name).copied() else {
            let msg = format!("no prediction for model '{model_name}' in artifact");
            return ResultSet::failed(self.name(), &spec.name, msg, 1);
        };

        let mut metrics = BTreeMap::new();
        metrics.insert("predicted_latency_ms".to_string(), latency);
        ResultSet::ok(self.name(), &spec.name, metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cnn_spec(artifact: &str) -> WorkloadSpec {
        let yaml = format!(
            "name: resnet-edge\nmodel_type: cnn\nmodel:\n  name: ResNet-50\nextra:\n  nn_meter_predictions: {artifact}\n",
        );
        serde_yaml::from_str(&yaml).unwrap()
    }

    #[test]
    fn test_looks_up_model_prediction() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("predictions.json");
        std::fs::write(&path, r#"{"ResNet-50": 12.7, "MobileNet-V2": 3.4}"#).unwrap();

        let rs = NnMeterAdapter::new().run(&cnn_spec(&path.to_string_lossy()));
        assert!(rs.is_ok(), "error: {:?}", rs.error);
        assert_eq!(rs.metric("predicted_latency_ms"), Some(12.7));
    }

    #[test]
    fn test_model_absent_from_artifact() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("predictions.json");
        std::fs::write(&path, r#"{"MobileNet-V2": 3.4}"#).unwrap();

        let rs = NnMeterAdapter::new().run(&cnn_spec(&path.to_string_lossy()));
        assert_eq!(rs.exit_code, 1);
        assert!(rs.error.unwrap().contains("ResNet-50"));
    }

    #[test]
    fn test_missing_and_malformed_artifact() {
        let rs = NnMeterAdapter::new().run(&cnn_spec("/nonexistent/predictions.json"));
        assert_eq!(rs.exit_code, SENTINEL_EXIT_CODE);
        assert!(rs.error.unwrap().contains("missing output artifact"));

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("predictions.json");
        std::fs::write(&path, "not json at all").unwrap();
        let rs = NnMeterAdapter::new().run(&cnn_spec(&path.to_string_lossy()));
        assert_eq!(rs.exit_code, 1);
        assert!(rs.error.unwrap().contains("unparsable"));
    }
}

//! Unified workload description.
//!
//! A [`WorkloadSpec`] describes an ML workload in a tool-agnostic way; each
//! adapter translates it into tool-specific inputs. Specs are parsed once
//! from YAML and never mutated afterwards — every adapter sees the same
//! read-only view.
//!
//! Example config:
//!
//! ```yaml
//! name: resnet50-training
//! model_type: cnn
//! model:
//!   name: ResNet-50
//!   layers: 50
//! task: training
//! batch_size: 32
//! hardware:
//!   device: A100
//!   count: 8
//!   interconnect: NVLink
//! ```

use crate::error::{PerflensError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Workload model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    /// Convolutional networks (ResNet, MobileNet, ...).
    Cnn,
    /// Encoder transformers (BERT family).
    Transformer,
    /// Autoregressive language models (GPT family).
    Llm,
}

impl ModelType {
    /// Canonical lowercase name, as used in workload configs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cnn => "cnn",
            Self::Transformer => "transformer",
            Self::Llm => "llm",
        }
    }
}

/// What the workload is doing with the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Gradient training.
    Training,
    /// Single-model forward passes (default).
    #[default]
    Inference,
    /// Online LLM serving with request arrival.
    Serving,
}

impl Task {
    /// Canonical lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Training => "training",
            Self::Inference => "inference",
            Self::Serving => "serving",
        }
    }
}

/// Free-form nested section of a workload config (model/hardware/dataset/extra).
pub type Section = BTreeMap<String, serde_yaml::Value>;

/// Unified workload specification.
///
/// Immutable once parsed: all fields are public for reading but no method
/// mutates a spec, and adapters receive `&WorkloadSpec` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadSpec {
    /// Workload identifier ("resnet50-training").
    pub name: String,
    /// Model family.
    pub model_type: ModelType,
    /// Model section: name, flops, params, layers, ...
    #[serde(default)]
    pub model: Section,
    /// Task; defaults to inference.
    #[serde(default)]
    pub task: Task,
    /// Batch size; defaults to 1, must be positive.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    /// Hardware section: device, count, interconnect.
    #[serde(default)]
    pub hardware: Section,
    /// Dataset section.
    #[serde(default)]
    pub dataset: Section,
    /// Tool-specific extras (artifact paths, scheduler names, ...).
    #[serde(default)]
    pub extra: Section,
}

const fn default_batch_size() -> u32 {
    1
}

impl WorkloadSpec {
    /// Load a workload spec from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if the file is unreadable and
    /// `MalformedConfig` if it fails to parse or has a non-positive batch.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|_| PerflensError::ConfigNotFound {
            path: path.to_path_buf(),
        })?;

        let spec: Self = serde_yaml::from_str(&text)
            .map_err(|e| PerflensError::malformed_config(path, e.to_string()))?;

        if spec.batch_size == 0 {
            return Err(PerflensError::malformed_config(path, "batch_size must be > 0"));
        }

        tracing::debug!("Loaded workload '{}' ({})", spec.name, spec.model_type.as_str());
        Ok(spec)
    }

    /// Model name from the model section, if present.
    pub fn model_name(&self) -> Option<&str> {
        self.model.get("name").and_then(serde_yaml::Value::as_str)
    }

    /// Device name from the hardware section, if present.
    pub fn device(&self) -> Option<&str> {
        self.hardware.get("device").and_then(serde_yaml::Value::as_str)
    }

    /// Device count from the hardware section; defaults to 1.
    pub fn device_count(&self) -> u32 {
        self.hardware
            .get("count")
            .and_then(serde_yaml::Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(1)
    }

    /// String value from the extra section.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(serde_yaml::Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "name: w1\nmodel_type: transformer\n";

    const FULL: &str = r"
name: resnet50-training
model_type: cnn
model:
  name: ResNet-50
  layers: 50
task: training
batch_size: 32
hardware:
  device: A100
  count: 8
  interconnect: NVLink
dataset:
  name: ImageNet
";

    #[test]
    fn test_minimal_spec_defaults() {
        let spec: WorkloadSpec = serde_yaml::from_str(MINIMAL).unwrap();
        assert_eq!(spec.name, "w1");
        assert_eq!(spec.model_type, ModelType::Transformer);
        assert_eq!(spec.task, Task::Inference);
        assert_eq!(spec.batch_size, 1);
        assert!(spec.model.is_empty());
        assert!(spec.model_name().is_none());
        assert_eq!(spec.device_count(), 1);
    }

    #[test]
    fn test_full_spec_fields() {
        let spec: WorkloadSpec = serde_yaml::from_str(FULL).unwrap();
        assert_eq!(spec.model_name(), Some("ResNet-50"));
        assert_eq!(spec.device(), Some("A100"));
        assert_eq!(spec.device_count(), 8);
        assert_eq!(spec.task, Task::Training);
        assert_eq!(spec.batch_size, 32);
    }

    #[test]
    fn test_missing_required_field_fails() {
        assert!(serde_yaml::from_str::<WorkloadSpec>("model_type: cnn\n").is_err());
        assert!(serde_yaml::from_str::<WorkloadSpec>("name: x\n").is_err());
    }

    #[test]
    fn test_unknown_model_type_fails() {
        let err = serde_yaml::from_str::<WorkloadSpec>("name: x\nmodel_type: rnn\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_from_path_zero_batch_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("w.yaml");
        std::fs::write(&path, "name: x\nmodel_type: llm\nbatch_size: 0\n").unwrap();
        let err = WorkloadSpec::from_path(&path).unwrap_err();
        assert!(matches!(err, PerflensError::MalformedConfig { .. }));
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = WorkloadSpec::from_path("/nonexistent/w.yaml").unwrap_err();
        assert!(matches!(err, PerflensError::ConfigNotFound { .. }));
    }
}

//! Adapter abstraction for wrapped performance tools.
//!
//! Provides a unified interface over heterogeneous estimators: closed-form
//! models, cycle-level simulators, learned predictors. One trait, one
//! normalized result shape.

use perflens_core::{ModelType, ResultSet, WorkloadSpec};
use std::fmt::Debug;

/// How a tool arrives at its numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCategory {
    /// Closed-form model (roofline, ring all-reduce).
    Analytical,
    /// Event- or cycle-level simulation.
    Simulation,
    /// Learned latency predictor.
    MlBased,
    /// Mixes analytical and learned components.
    Hybrid,
}

impl ToolCategory {
    /// Report label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Analytical => "analytical",
            Self::Simulation => "simulation",
            Self::MlBased => "ml-based",
            Self::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified interface every wrapped tool implements.
///
/// `supports` is a pure predicate; `run` may spawn subprocesses and touch
/// the filesystem but must never panic or return an error past this
/// boundary. Every failure mode is a `ResultSet` with `error` set and a
/// non-zero `exit_code`.
pub trait ToolAdapter: Debug + Send + Sync {
    /// Registry key and report label for this tool.
    fn name(&self) -> &'static str;

    /// Tool category for the report breakdown.
    fn category(&self) -> ToolCategory;

    /// Metric keys this tool can produce on success.
    fn supported_metrics(&self) -> &'static [&'static str];

    /// Model families this tool understands.
    fn supported_workloads(&self) -> &'static [ModelType];

    /// Whether this tool can run the given workload.
    ///
    /// Default: model family is in `supported_workloads()`. Adapters with
    /// task or artifact requirements narrow this further.
    fn supports(&self, spec: &WorkloadSpec) -> bool {
        self.supported_workloads().contains(&spec.model_type)
    }

    /// Run the tool against the workload.
    fn run(&self, spec: &WorkloadSpec) -> ResultSet;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FamilyOnly;

    impl ToolAdapter for FamilyOnly {
        fn name(&self) -> &'static str {
            "family-only"
        }
        fn category(&self) -> ToolCategory {
            ToolCategory::Analytical
        }
        fn supported_metrics(&self) -> &'static [&'static str] {
            &["latency_ms"]
        }
        fn supported_workloads(&self) -> &'static [ModelType] {
            &[ModelType::Cnn]
        }
        fn run(&self, spec: &WorkloadSpec) -> ResultSet {
            ResultSet::failed(self.name(), &spec.name, "stub", 1)
        }
    }

    #[test]
    fn test_default_supports_checks_model_family() {
        let cnn: WorkloadSpec = serde_yaml::from_str("name: w\nmodel_type: cnn\n").unwrap();
        let llm: WorkloadSpec = serde_yaml::from_str("name: w\nmodel_type: llm\n").unwrap();
        assert!(FamilyOnly.supports(&cnn));
        assert!(!FamilyOnly.supports(&llm));
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(ToolCategory::MlBased.as_str(), "ml-based");
        assert_eq!(ToolCategory::Simulation.to_string(), "simulation");
    }
}

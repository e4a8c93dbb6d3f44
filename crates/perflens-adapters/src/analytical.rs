//! Roofline latency estimator over the static catalog.
//!
//! Latency is bounded below by both compute time (FLOPs over peak
//! throughput) and memory time (parameter bytes over bandwidth); the
//! roofline estimate takes the larger of the two. Deterministic and
//! side-effect free: same spec in, same metrics out.

use crate::adapter::{ToolAdapter, ToolCategory};
use perflens_catalog::{device_spec, model_profile};
use perflens_core::{ModelType, ResultSet, Task, WorkloadSpec};
use std::collections::BTreeMap;

/// Default datatype width when the workload does not specify one.
const DEFAULT_DTYPE_BYTES: u32 = 4;

/// Backward pass costs roughly twice the forward pass in FLOPs.
const TRAINING_FLOP_MULTIPLIER: f64 = 3.0;

/// Closed-form roofline estimator. Needs no external tool, only the
/// device and model catalog tables.
#[derive(Debug, Default)]
pub struct AnalyticalAdapter;

impl AnalyticalAdapter {
    /// Create the adapter.
    pub const fn new() -> Self {
        Self
    }
}

impl ToolAdapter for AnalyticalAdapter {
    fn name(&self) -> &'static str {
        "analytical"
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Analytical
    }

    fn supported_metrics(&self) -> &'static [&'static str] {
        &[
            "latency_ms",
            "throughput_samples_s",
            "arithmetic_intensity",
            "memory_gb",
            "compute_time_ms",
            "memory_time_ms",
            "compute_bound",
        ]
    }

    fn supported_workloads(&self) -> &'static [ModelType] {
        &[ModelType::Cnn, ModelType::Transformer, ModelType::Llm]
    }

    fn run(&self, spec: &WorkloadSpec) -> ResultSet {
        let Some(model_name) = spec.model_name() else {
            return ResultSet::failed(self.name(), &spec.name, "workload has no model.name", 1);
        };
        let Some(device_name) = spec.device() else {
            return ResultSet::failed(self.name(), &spec.name, "workload has no hardware.device", 1);
        };
        let Some(model) = model_profile(model_name) else {
            let msg = format!("unknown model '{model_name}': not in the model catalog");
            return ResultSet::failed(self.name(), &spec.name, msg, 1);
        };
        let Some(device) = device_spec(device_name) else {
            let msg = format!("unknown device '{device_name}': not in the device catalog");
            return ResultSet::failed(self.name(), &spec.name, msg, 1);
        };

        let dtype_bytes = spec
            .model
            .get("dtype_bytes")
            .and_then(serde_yaml::Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(DEFAULT_DTYPE_BYTES);

        let mut flops = model.flops * f64::from(spec.batch_size);
        if spec.task == Task::Training {
            flops *= TRAINING_FLOP_MULTIPLIER;
        }
        let param_bytes = model.param_bytes(dtype_bytes);

        let compute_time_s = flops / device.peak_flops();
        let memory_time_s = param_bytes / device.mem_bw_bytes();
        let latency_s = compute_time_s.max(memory_time_s);
        let throughput = if latency_s > 0.0 { 1.0 / latency_s } else { 0.0 };
        let compute_bound = compute_time_s > memory_time_s;

        let mut metrics = BTreeMap::new();
        metrics.insert("latency_ms".to_string(), latency_s * 1e3);
        metrics.insert("throughput_samples_s".to_string(), throughput);
        metrics.insert("arithmetic_intensity".to_string(), flops / param_bytes);
        metrics.insert("memory_gb".to_string(), param_bytes / 1e9);
        metrics.insert("compute_time_ms".to_string(), compute_time_s * 1e3);
        metrics.insert("memory_time_ms".to_string(), memory_time_s * 1e3);
        metrics.insert(
            "compute_bound".to_string(),
            if compute_bound { 1.0 } else { 0.0 },
        );

        tracing::debug!(
            "Roofline {model_name} on {device_name}: {:.3} ms ({})",
            latency_s * 1e3,
            if compute_bound { "compute" } else { "memory" },
        );

        ResultSet::ok(self.name(), &spec.name, metrics).with_raw_output(format!(
            "bottleneck: {}",
            if compute_bound { "compute" } else { "memory" }
        ))
    }
}

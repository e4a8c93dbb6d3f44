//! Model cost profiles.
//!
//! Approximate FLOP and parameter counts for the reference models, FP16
//! inference at batch=1. FLOPs scale linearly with batch size; parameter
//! traffic does not.

/// Compute/parameter profile for one reference model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelProfile {
    /// Canonical model name as it appears in workload specs ("ResNet-50").
    pub name: &'static str,
    /// FLOPs for a single forward pass at batch=1.
    pub flops: f64,
    /// Parameter count.
    pub params: f64,
}

impl ModelProfile {
    /// Parameter footprint in bytes at the given dtype width.
    pub fn param_bytes(&self, dtype_bytes: u32) -> f64 {
        self.params * f64::from(dtype_bytes)
    }
}

/// All models known to the roofline estimator.
pub static ALL_MODELS: &[ModelProfile] = &[
    ModelProfile { name: "ResNet-50", flops: 8.2e9, params: 25.6e6 },
    ModelProfile { name: "BERT-base", flops: 22.5e9, params: 110e6 },
    ModelProfile { name: "BERT-large", flops: 72.4e9, params: 340e6 },
    ModelProfile { name: "GPT-2", flops: 35.4e9, params: 1.5e9 },
    ModelProfile { name: "GPT-3", flops: 350e12, params: 175e9 },
];

/// Look up a model profile by canonical name. Unknown names return `None`.
pub fn model_profile(name: &str) -> Option<&'static ModelProfile> {
    ALL_MODELS.iter().find(|m| m.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_models_resolve() {
        for name in ["ResNet-50", "BERT-base", "BERT-large", "GPT-2", "GPT-3"] {
            assert!(model_profile(name).is_some(), "{name} should be in catalog");
        }
    }

    #[test]
    fn test_unknown_model_is_none() {
        assert!(model_profile("LLaMA-7B").is_none());
    }

    #[test]
    fn test_param_bytes_fp16() {
        let bert = model_profile("BERT-base").unwrap();
        assert!((bert.param_bytes(2) - 220e6).abs() < 1.0);
    }
}

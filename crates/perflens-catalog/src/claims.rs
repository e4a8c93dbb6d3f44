//! Literature-claimed accuracy figures.
//!
//! Error percentages the wrapped tools publish for themselves, keyed by
//! `(tool, device, mode)`. The accuracy-validation engine compares its own
//! computed mean APE against these numbers; it never treats them as ground
//! truth, only as claims to be checked.
//!
//! Mode is a plain string ("inference" / "training") so this crate stays
//! dependency-free; callers match it against their own mode enum.

/// One published accuracy claim for a `(tool, device, mode)` triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PublishedClaim {
    /// Tool the claim belongs to ("neusight", "astra-sim", "vidur").
    pub tool: &'static str,
    /// Device the claim was measured on ("H100").
    pub device: &'static str,
    /// Mode: "inference" or "training".
    pub mode: &'static str,
    /// Claimed mean prediction error in percent.
    pub claimed_error_pct: f64,
    /// Citation for the claim.
    pub source: &'static str,
}

/// All published claims known to the validation engine.
pub static ALL_CLAIMS: &[PublishedClaim] = &[
    // NeuSight, ASPLOS 2025, Table 2 (end-to-end prediction error).
    PublishedClaim {
        tool: "neusight",
        device: "H100",
        mode: "inference",
        claimed_error_pct: 2.3,
        source: "NeuSight Table 2, ASPLOS 2025",
    },
    PublishedClaim {
        tool: "neusight",
        device: "A100",
        mode: "inference",
        claimed_error_pct: 3.1,
        source: "NeuSight Table 2, ASPLOS 2025",
    },
    PublishedClaim {
        tool: "neusight",
        device: "V100",
        mode: "inference",
        claimed_error_pct: 5.2,
        source: "NeuSight Table 2, ASPLOS 2025",
    },
    PublishedClaim {
        tool: "neusight",
        device: "H100",
        mode: "training",
        claimed_error_pct: 2.9,
        source: "NeuSight Table 2, ASPLOS 2025",
    },
    PublishedClaim {
        tool: "neusight",
        device: "A100",
        mode: "training",
        claimed_error_pct: 3.5,
        source: "NeuSight Table 2, ASPLOS 2025",
    },
    PublishedClaim {
        tool: "neusight",
        device: "V100",
        mode: "training",
        claimed_error_pct: 5.8,
        source: "NeuSight Table 2, ASPLOS 2025",
    },
    // ASTRA-sim HGX-H100 validation (Won et al.), geomean error vs NCCL
    // all-reduce benchmarks at 8 NPUs.
    PublishedClaim {
        tool: "astra-sim",
        device: "HGX-H100",
        mode: "training",
        claimed_error_pct: 9.69,
        source: "ASTRA-sim HGX-H100 validation (Won et al.), 8 GPU geomean",
    },
    // VIDUR, MLSys 2024: <5% vs real LLM serving traces on A100.
    PublishedClaim {
        tool: "vidur",
        device: "A100",
        mode: "inference",
        claimed_error_pct: 5.0,
        source: "VIDUR (MLSys 2024, Agrawal et al.), vs vLLM serving traces",
    },
];

/// Look up the claim for a `(tool, device, mode)` triple.
pub fn published_claim(tool: &str, device: &str, mode: &str) -> Option<&'static PublishedClaim> {
    ALL_CLAIMS
        .iter()
        .find(|c| c.tool == tool && c.device == device && c.mode == mode)
}

/// All claims published for one tool.
pub fn claims_for_tool(tool: &str) -> Vec<&'static PublishedClaim> {
    ALL_CLAIMS.iter().filter(|c| c.tool == tool).collect()
}

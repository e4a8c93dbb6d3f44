//! Accuracy types: APE records, per-device aggregates, and claim verdicts.

use serde::{Deserialize, Serialize};

/// Absolute Percentage Error: `|predicted - actual| / actual * 100`.
///
/// Returns `None` for non-positive `actual`: such pairs carry no usable
/// ground truth and are excluded from aggregation entirely.
pub fn ape(predicted: f64, actual: f64) -> Option<f64> {
    if actual <= 0.0 {
        return None;
    }
    Some((predicted - actual).abs() / actual * 100.0)
}

/// Prediction mode encoded in artifact filenames.
///
/// Artifact filenames pack `{model, mode, seq-len, batch}` into underscore
/// tokens, but token *order* varies across tool versions. The parse is
/// therefore a validated token scan: exactly one mode marker must appear,
/// anywhere in the name. Zero or conflicting markers yield `None` and the
/// caller skips the file rather than guessing by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Forward pass only.
    Inference,
    /// Forward + backward.
    Training,
}

impl Mode {
    /// Canonical lowercase name, matching catalog claim keys.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inference => "inference",
            Self::Training => "training",
        }
    }

    /// Validated parse from filename tokens.
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut found = None;
        for tok in tokens {
            let mode = match tok {
                "inference" | "infer" | "inf" => Self::Inference,
                "training" | "train" => Self::Training,
                _ => continue,
            };
            match found {
                None => found = Some(mode),
                Some(prev) if prev == mode => {}
                Some(_) => return None, // conflicting markers
            }
        }
        found
    }

    /// Parse from an underscore-delimited filename stem, e.g.
    /// `bert-base_training_seq512_b8`.
    pub fn from_stem(stem: &str) -> Option<Self> {
        Self::from_tokens(stem.split('_'))
    }
}

/// One predicted-vs-actual pair for a single config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyRecord {
    /// Config identifier (filename stem).
    pub config: String,
    /// Device the ground truth was measured on.
    pub device: String,
    /// Inference or training.
    pub mode: Mode,
    /// Tool-predicted latency.
    pub predicted: f64,
    /// Measured ground-truth latency.
    pub actual: f64,
    /// Absolute percentage error.
    pub ape: f64,
}

impl AccuracyRecord {
    /// Build a record, computing APE. Returns `None` when `actual <= 0`.
    pub fn new(
        config: impl Into<String>,
        device: impl Into<String>,
        mode: Mode,
        predicted: f64,
        actual: f64,
    ) -> Option<Self> {
        let ape = ape(predicted, actual)?;
        Some(Self {
            config: config.into(),
            device: device.into(),
            mode,
            predicted,
            actual,
            ape,
        })
    }
}

/// APE statistics for one `(device, mode)` group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceModeSummary {
    /// Number of records aggregated.
    pub count: usize,
    /// Mean APE in percent.
    pub mean_ape: f64,
    /// Minimum APE in percent.
    pub min_ape: f64,
    /// Maximum APE in percent.
    pub max_ape: f64,
}

impl DeviceModeSummary {
    /// Aggregate a non-empty slice of APE values. Returns `None` for an
    /// empty slice (that group is NO_DATA, not a zero summary).
    pub fn from_apes(apes: &[f64]) -> Option<Self> {
        if apes.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = apes.iter().sum::<f64>() / apes.len() as f64;
        let min = apes.iter().copied().fold(f64::INFINITY, f64::min);
        let max = apes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            count: apes.len(),
            mean_ape: mean,
            min_ape: min,
            max_ape: max,
        })
    }
}

/// How a computed error compares against a published claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Within 1 percentage point of the claim.
    Match,
    /// Within 3 percentage points.
    Close,
    /// 3 percentage points or more apart.
    Mismatch,
    /// No records were available for this `(device, mode)`.
    NoData,
}

impl Verdict {
    /// Classify by absolute difference in percentage points.
    ///
    /// Boundaries are strict: exactly 1.0 pp is `Close`, exactly 3.0 pp is
    /// `Mismatch`.
    pub fn classify(difference_pp: f64) -> Self {
        let d = difference_pp.abs();
        if d < 1.0 {
            Self::Match
        } else if d < 3.0 {
            Self::Close
        } else {
            Self::Mismatch
        }
    }

    /// Report label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Match => "MATCH",
            Self::Close => "CLOSE",
            Self::Mismatch => "MISMATCH",
            Self::NoData => "NO_DATA",
        }
    }
}

/// Computed-vs-claimed comparison for one `(device, mode)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimComparison {
    /// Device name.
    pub device: String,
    /// Inference or training.
    pub mode: Mode,
    /// Error percentage the tool's paper claims.
    pub paper_claimed_error_pct: f64,
    /// Mean APE we computed from the tool's own artifacts.
    pub our_computed_error_pct: Option<f64>,
    /// `|claimed - computed|` in percentage points.
    pub difference_pct: Option<f64>,
    /// Classification of the difference.
    pub verdict: Verdict,
}

impl ClaimComparison {
    /// Compare a computed summary (or its absence) against a claim.
    pub fn evaluate(
        device: impl Into<String>,
        mode: Mode,
        claimed_pct: f64,
        summary: Option<&DeviceModeSummary>,
    ) -> Self {
        match summary {
            Some(s) => {
                let diff = (claimed_pct - s.mean_ape).abs();
                Self {
                    device: device.into(),
                    mode,
                    paper_claimed_error_pct: claimed_pct,
                    our_computed_error_pct: Some(s.mean_ape),
                    difference_pct: Some(diff),
                    verdict: Verdict::classify(diff),
                }
            }
            None => Self {
                device: device.into(),
                mode,
                paper_claimed_error_pct: claimed_pct,
                our_computed_error_pct: None,
                difference_pct: None,
                verdict: Verdict::NoData,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ape_exact_match_is_zero() {
        assert_eq!(ape(100.0, 100.0), Some(0.0));
    }

    #[test]
    fn test_ape_ten_percent() {
        let v = ape(110.0, 100.0).unwrap();
        assert!((v - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_ape_symmetric_under_absolute_value() {
        let over = ape(110.0, 100.0).unwrap();
        let under = ape(90.0, 100.0).unwrap();
        assert!((over - under).abs() < 1e-12);
    }

    #[test]
    fn test_ape_nonpositive_actual_excluded() {
        assert!(ape(50.0, 0.0).is_none());
        assert!(ape(50.0, -1.0).is_none());
        assert!(AccuracyRecord::new("c", "A100", Mode::Inference, 50.0, 0.0).is_none());
    }

    #[test]
    fn test_summary_excludes_nothing_it_never_saw() {
        // An excluded record contributes neither value nor count.
        let apes = vec![10.0, 20.0];
        let s = DeviceModeSummary::from_apes(&apes).unwrap();
        assert_eq!(s.count, 2);
        assert!((s.mean_ape - 15.0).abs() < 1e-12);
        assert!((s.min_ape - 10.0).abs() < 1e-12);
        assert!((s.max_ape - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_summary_empty_is_none() {
        assert!(DeviceModeSummary::from_apes(&[]).is_none());
    }

    #[test]
    fn test_verdict_boundaries_are_strict() {
        assert_eq!(Verdict::classify(0.99), Verdict::Match);
        assert_eq!(Verdict::classify(1.0), Verdict::Close);
        assert_eq!(Verdict::classify(2.99), Verdict::Close);
        assert_eq!(Verdict::classify(3.0), Verdict::Mismatch);
        assert_eq!(Verdict::classify(-1.0), Verdict::Close);
    }

    #[test]
    fn test_mode_from_stem_scans_tokens() {
        // Marker position varies across tool versions; scan, don't index.
        assert_eq!(Mode::from_stem("bert-base_training_seq512_b8"), Some(Mode::Training));
        assert_eq!(Mode::from_stem("inf_gpt2_seq1024_b1"), Some(Mode::Inference));
        assert_eq!(Mode::from_stem("gpt2_seq1024_b1_infer"), Some(Mode::Inference));
    }

    #[test]
    fn test_mode_parse_rejects_ambiguity() {
        assert_eq!(Mode::from_stem("bert_seq512_b8"), None);
        assert_eq!(Mode::from_stem("bert_train_inf_b8"), None);
        // Repeated identical markers are fine.
        assert_eq!(Mode::from_stem("train_bert_train"), Some(Mode::Training));
    }

    #[test]
    fn test_claim_comparison_no_data() {
        let c = ClaimComparison::evaluate("T4", Mode::Inference, 4.0, None);
        assert_eq!(c.verdict, Verdict::NoData);
        assert!(c.our_computed_error_pct.is_none());
    }

    #[test]
    fn test_claim_comparison_match() {
        let s = DeviceModeSummary::from_apes(&[2.0, 3.0]).unwrap();
        let c = ClaimComparison::evaluate("H100", Mode::Inference, 2.3, Some(&s));
        assert_eq!(c.verdict, Verdict::Match);
        assert!((c.difference_pct.unwrap() - 0.2).abs() < 1e-12);
    }
}

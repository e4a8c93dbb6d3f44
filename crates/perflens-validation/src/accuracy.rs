//! Accuracy validation against a tool's own pre-computed artifacts.
//!
//! Live execution of the wrapped predictors needs hardware we may not
//! have, so the check runs over artifacts the tool's authors shipped:
//! measured ground truth under `label/<device>/<config>.json` and
//! predictions under `results/prediction/<device>/<method>/<config>`
//! (CSV with per-operator rows, or JSON with an end-to-end field).
//!
//! Per-file gaps are data, not errors: a label with no usable ground
//! truth, an ambiguous filename, or a missing prediction is logged and
//! skipped, and the affected (device, mode) group simply ends up with
//! fewer records, possibly zero (NO_DATA). Only failing to acquire the
//! artifact repository at all is fatal.

use perflens_catalog::claims_for_tool;
use perflens_core::{
    AccuracyRecord, ClaimComparison, DeviceModeSummary, Mode, PerflensError, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// What to validate and where its artifacts live.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Experiment label for the report.
    pub experiment: String,
    /// Tool name; selects the published claims to compare against.
    pub tool: String,
    /// Upstream repository the artifacts came from.
    pub repo: String,
    /// Root of the artifact checkout.
    pub artifacts_root: PathBuf,
}

/// What artifact data was discoverable, so an empty result is
/// distinguishable from a failed check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataInventory {
    /// Device directories found under `label/`.
    pub label_devices: Vec<String>,
    /// Prediction method directories per device.
    pub methods_per_device: BTreeMap<String, Vec<String>>,
    /// Ground-truth files seen.
    pub label_files: usize,
    /// Label/prediction pairs that produced a record.
    pub paired_records: usize,
    /// Labels skipped: ambiguous mode token or no usable ground truth.
    pub skipped_labels: usize,
}

/// Structured outcome of one validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Experiment label.
    pub experiment: String,
    /// Tool under validation.
    pub tool: String,
    /// Upstream artifact repository.
    pub repo: String,
    /// `"completed"`, or `"failed: <reason>"` for acquisition failures.
    pub status: String,
    /// What data was discoverable.
    pub data_inventory: DataInventory,
    /// Computed error vs published claim, one row per claimed (device, mode).
    pub claim_comparisons: Vec<ClaimComparison>,
    /// APE summaries keyed `"<device>/<mode>"`.
    pub per_device_summary: BTreeMap<String, DeviceModeSummary>,
    /// Raw per-config records.
    pub records: Vec<AccuracyRecord>,
}

impl ValidationReport {
    /// Minimal report for an artifact-acquisition failure. Written so the
    /// output document always exists, even when the run is fatal.
    pub fn failure(opts: &ValidationOptions, reason: &str) -> Self {
        Self {
            experiment: opts.experiment.clone(),
            tool: opts.tool.clone(),
            repo: opts.repo.clone(),
            status: format!("failed: {reason}"),
            data_inventory: DataInventory::default(),
            claim_comparisons: Vec::new(),
            per_device_summary: BTreeMap::new(),
            records: Vec::new(),
        }
    }
}

struct Label {
    actual: f64,
    num_layer: u64,
}

/// Ground-truth file: `e2e_latency` plus optional `num_layer`. `None` for
/// unreadable files or non-positive latency.
fn read_label(path: &Path) -> Option<Label> {
    let text = std::fs::read_to_string(path).ok()?;
    let value: serde_json::Value = serde_json::from_str(&text).ok()?;
    let actual = value.get("e2e_latency").and_then(serde_json::Value::as_f64)?;
    if actual <= 0.0 {
        return None;
    }
    let num_layer = value
        .get("num_layer")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(1);
    Some(Label { actual, num_layer })
}

/// End-to-end latency from a prediction artifact.
///
/// JSON carries `e2e_latency` directly. CSV carries per-operator rows;
/// end-to-end is reconstructed as the forward sum (plus backward for
/// training) times the label's repeated layer count.
fn read_prediction(path: &Path, mode: Mode, num_layer: u64) -> Option<f64> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => {
            let text = std::fs::read_to_string(path).ok()?;
            let value: serde_json::Value = serde_json::from_str(&text).ok()?;
            value.get("e2e_latency").and_then(serde_json::Value::as_f64)
        }
        Some("csv") => {
            let mut reader = csv::Reader::from_path(path).ok()?;
            let headers = reader.headers().ok()?.clone();
            let fw_idx = headers.iter().position(|h| h == "fw_latency")?;
            let bw_idx = headers.iter().position(|h| h == "bw_latency");

            let mut total = 0.0;
            for record in reader.records() {
                let record = record.ok()?;
                total += record.get(fw_idx)?.trim().parse::<f64>().ok()?;
                if mode == Mode::Training {
                    if let Some(idx) = bw_idx {
                        total += record.get(idx)?.trim().parse::<f64>().ok()?;
                    }
                }
            }
            #[allow(clippy::cast_precision_loss)]
            Some(total * num_layer as f64)
        }
        _ => None,
    }
}

fn sorted_subdirs(path: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(path) else {
        return Vec::new();
    };
    let mut dirs: Vec<String> = entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    dirs.sort();
    dirs
}

fn sorted_json_files(path: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(path) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    files.sort();
    files
}

/// Prediction file for a config stem: CSV preferred, JSON fallback.
fn find_prediction(method_dir: &Path, stem: &str) -> Option<PathBuf> {
    for ext in ["csv", "json"] {
        let candidate = method_dir.join(format!("{stem}.{ext}"));
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Validate a tool's accuracy from its artifact checkout.
///
/// # Errors
///
/// Returns `ArtifactAcquisition` only when `artifacts_root` is not a
/// readable directory; everything below that degrades to NO_DATA.
pub fn run_validation(opts: &ValidationOptions) -> Result<ValidationReport> {
    let root = &opts.artifacts_root;
    if !root.is_dir() {
        return Err(PerflensError::artifact_acquisition(
            root.clone(),
            "not a readable directory",
        ));
    }

    let label_root = root.join("label");
    let pred_root = root.join("results").join("prediction");

    let devices = sorted_subdirs(&label_root);
    let mut inventory = DataInventory {
        label_devices: devices.clone(),
        ..DataInventory::default()
    };
    let mut records = Vec::new();
    let mut groups: BTreeMap<(String, Mode), Vec<f64>> = BTreeMap::new();

    for device in &devices {
        let methods = sorted_subdirs(&pred_root.join(device));
        inventory
            .methods_per_device
            .insert(device.clone(), methods.clone());

        for label_path in sorted_json_files(&label_root.join(device)) {
            inventory.label_files += 1;
            let Some(stem) = label_path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let Some(mode) = Mode::from_stem(stem) else {
                tracing::debug!("Skipping '{stem}': no unambiguous mode token");
                inventory.skipped_labels += 1;
                continue;
            };
            let Some(label) = read_label(&label_path) else {
                tracing::debug!("Skipping '{stem}': no usable ground truth");
                inventory.skipped_labels += 1;
                continue;
            };

            for method in &methods {
                let method_dir = pred_root.join(device).join(method);
                let Some(pred_path) = find_prediction(&method_dir, stem) else {
                    continue;
                };
                let Some(predicted) = read_prediction(&pred_path, mode, label.num_layer) else {
                    tracing::warn!("Unparsable prediction: {}", pred_path.display());
                    continue;
                };

                if let Some(record) = AccuracyRecord::new(
                    format!("{method}/{stem}"),
                    device.clone(),
                    mode,
                    predicted,
                    label.actual,
                ) {
                    groups
                        .entry((device.clone(), mode))
                        .or_default()
                        .push(record.ape);
                    records.push(record);
                    inventory.paired_records += 1;
                }
            }
        }
    }

    let mut per_device_summary = BTreeMap::new();
    for ((device, mode), apes) in &groups {
        if let Some(summary) = DeviceModeSummary::from_apes(apes) {
            per_device_summary.insert(format!("{device}/{}", mode.as_str()), summary);
        }
    }

    let claim_comparisons = claims_for_tool(&opts.tool)
        .iter()
        .filter_map(|claim| {
            let mode = Mode::from_tokens([claim.mode])?;
            let summary = groups
                .get(&(claim.device.to_string(), mode))
                .and_then(|apes| DeviceModeSummary::from_apes(apes));
            Some(ClaimComparison::evaluate(
                claim.device,
                mode,
                claim.claimed_error_pct,
                summary.as_ref(),
            ))
        })
        .collect();

    tracing::info!(
        "Validated '{}': {} records over {} devices, {} skipped",
        opts.tool,
        inventory.paired_records,
        inventory.label_devices.len(),
        inventory.skipped_labels,
    );

    Ok(ValidationReport {
        experiment: opts.experiment.clone(),
        tool: opts.tool.clone(),
        repo: opts.repo.clone(),
        status: "completed".to_string(),
        data_inventory: inventory,
        claim_comparisons,
        per_device_summary,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use perflens_core::Verdict;

    fn opts(root: &Path) -> ValidationOptions {
        ValidationOptions {
            experiment: "asplos-repro".to_string(),
            tool: "neusight".to_string(),
            repo: "github.com/sitar-lab/NeuSight".to_string(),
            artifacts_root: root.to_path_buf(),
        }
    }

    #[test]
    fn test_missing_root_is_acquisition_error() {
        let err = run_validation(&opts(Path::new("/nonexistent/artifacts"))).unwrap_err();
        assert!(matches!(err, PerflensError::ArtifactAcquisition { .. }));
    }

    #[test]
    fn test_empty_root_completes_with_no_data() {
        let dir = tempfile::TempDir::new().unwrap();
        let report = run_validation(&opts(dir.path())).unwrap();
        assert_eq!(report.status, "completed");
        assert!(report.records.is_empty());
        assert!(!report.claim_comparisons.is_empty());
        assert!(report
            .claim_comparisons
            .iter()
            .all(|c| c.verdict == Verdict::NoData));
    }

    #[test]
    fn test_failure_report_is_minimal() {
        let report = ValidationReport::failure(
            &opts(Path::new("/x")),
            "clone failed: connection refused",
        );
        assert!(report.status.starts_with("failed:"));
        assert!(report.records.is_empty());
        assert_eq!(report.data_inventory, DataInventory::default());
    }

    #[test]
    fn test_read_label_rejects_nonpositive_latency() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("l.json");
        std::fs::write(&path, r#"{"e2e_latency": 0.0, "num_layer": 4}"#).unwrap();
        assert!(read_label(&path).is_none());

        std::fs::write(&path, r#"{"e2e_latency": 12.5}"#).unwrap();
        let label = read_label(&path).unwrap();
        assert!((label.actual - 12.5).abs() < f64::EPSILON);
        assert_eq!(label.num_layer, 1);
    }

    #[test]
    fn test_csv_reconstruction_training_includes_backward() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("p.csv");
        std::fs::write(&path, "op,fw_latency,bw_latency\nmatmul,10,20\nsoftmax,5,8\n").unwrap();

        let inference = read_prediction(&path, Mode::Inference, 3).unwrap();
        assert!((inference - 45.0).abs() < 1e-12); // (10+5) * 3

        let training = read_prediction(&path, Mode::Training, 3).unwrap();
        assert!((training - 129.0).abs() < 1e-12); // (10+5+20+8) * 3
    }

    #[test]
    fn test_json_prediction_is_already_end_to_end() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("p.json");
        std::fs::write(&path, r#"{"e2e_latency": 42.0}"#).unwrap();
        // num_layer must not multiply an end-to-end value
        assert_eq!(read_prediction(&path, Mode::Training, 9), Some(42.0));
    }
}

//! Markdown report rendering.
//!
//! Pure functions over the coverage run and validation report. Given
//! identical inputs the output is byte-identical except for the embedded
//! generation timestamp.

use crate::accuracy::ValidationReport;
use crate::coverage::{CellStatus, CoverageRun};
use perflens_adapters::ToolAdapter;
use std::collections::BTreeMap;
use std::fmt::Write;

const ABSENT_CELL: &str = "\u{2014}"; // em dash

/// Render the full markdown report: tool overview, coverage matrix,
/// per-workload metrics, category breakdown, optional accuracy section.
pub fn render_markdown(
    run: &CoverageRun,
    adapters: &[Box<dyn ToolAdapter>],
    accuracy: Option<&ValidationReport>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Performance Tool Comparison Report");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Generated: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out);

    render_tool_overview(&mut out, adapters);
    render_coverage_matrix(&mut out, run);
    render_workload_metrics(&mut out, run);
    render_category_breakdown(&mut out, adapters);
    if let Some(report) = accuracy {
        render_accuracy(&mut out, report);
    }
    out
}

fn render_tool_overview(out: &mut String, adapters: &[Box<dyn ToolAdapter>]) {
    let _ = writeln!(out, "## Tools");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Tool | Category | Metrics |");
    let _ = writeln!(out, "|------|----------|---------|");
    for adapter in adapters {
        let _ = writeln!(
            out,
            "| {} | {} | {} |",
            adapter.name(),
            adapter.category(),
            adapter.supported_metrics().join(", "),
        );
    }
    let _ = writeln!(out);
}

fn render_coverage_matrix(out: &mut String, run: &CoverageRun) {
    let _ = writeln!(out, "## Coverage");
    let _ = writeln!(out);
    let _ = write!(out, "| Workload |");
    for tool in run.tools() {
        let _ = write!(out, " {tool} |");
    }
    let _ = writeln!(out);
    let _ = write!(out, "|----------|");
    for _ in run.tools() {
        let _ = write!(out, "---|");
    }
    let _ = writeln!(out);

    for workload in run.workloads() {
        let _ = write!(out, "| {workload} |");
        for tool in run.tools() {
            let cell = match run.cell(workload, tool) {
                Some(CellStatus::Pass) => "PASS",
                Some(CellStatus::Fail) => "FAIL",
                None => ABSENT_CELL,
            };
            let _ = write!(out, " {cell} |");
        }
        let _ = writeln!(out);
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} passed, {} failed",
        run.pass_count(),
        run.fail_count()
    );
    let _ = writeln!(out);
}

fn render_workload_metrics(out: &mut String, run: &CoverageRun) {
    for workload in run.workloads() {
        let keys = run.metric_keys(workload);
        if keys.is_empty() {
            continue;
        }
        let _ = writeln!(out, "## Metrics: {workload}");
        let _ = writeln!(out);
        let _ = write!(out, "| Metric |");
        for tool in run.tools() {
            let _ = write!(out, " {tool} |");
        }
        let _ = writeln!(out);
        let _ = write!(out, "|--------|");
        for _ in run.tools() {
            let _ = write!(out, "---|");
        }
        let _ = writeln!(out);

        for key in &keys {
            let _ = write!(out, "| {key} |");
            for tool in run.tools() {
                let cell = run
                    .result(workload, tool)
                    .filter(|rs| rs.is_ok())
                    .and_then(|rs| rs.metric(key))
                    .map_or_else(|| ABSENT_CELL.to_string(), format_value);
                let _ = write!(out, " {cell} |");
            }
            let _ = writeln!(out);
        }
        let _ = writeln!(out);
    }
}

fn render_category_breakdown(out: &mut String, adapters: &[Box<dyn ToolAdapter>]) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for adapter in adapters {
        *counts.entry(adapter.category().as_str()).or_default() += 1;
    }
    let _ = writeln!(out, "## Tool Categories");
    let _ = writeln!(out);
    for (category, count) in counts {
        let _ = writeln!(out, "- {category}: {count}");
    }
    let _ = writeln!(out);
}

fn render_accuracy(out: &mut String, report: &ValidationReport) {
    let _ = writeln!(out, "## Accuracy Validation: {}", report.tool);
    let _ = writeln!(out);
    let _ = writeln!(out, "- Experiment: {}", report.experiment);
    let _ = writeln!(out, "- Artifacts: {}", report.repo);
    let _ = writeln!(out, "- Status: {}", report.status);
    let inv = &report.data_inventory;
    let _ = writeln!(
        out,
        "- Data: {} label files across {} devices, {} paired records, {} skipped",
        inv.label_files,
        inv.label_devices.len(),
        inv.paired_records,
        inv.skipped_labels,
    );
    let _ = writeln!(out);

    if !report.claim_comparisons.is_empty() {
        let _ = writeln!(
            out,
            "| Device | Mode | Claimed % | Computed % | Diff (pp) | Verdict |"
        );
        let _ = writeln!(out, "|--------|------|-----------|------------|-----------|---------|");
        for c in &report.claim_comparisons {
            let computed = c
                .our_computed_error_pct
                .map_or_else(|| ABSENT_CELL.to_string(), |v| format!("{v:.2}"));
            let diff = c
                .difference_pct
                .map_or_else(|| ABSENT_CELL.to_string(), |v| format!("{v:.2}"));
            let _ = writeln!(
                out,
                "| {} | {} | {:.2} | {computed} | {diff} | {} |",
                c.device,
                c.mode.as_str(),
                c.paper_claimed_error_pct,
                c.verdict.as_str(),
            );
        }
        let _ = writeln!(out);
    }

    if !report.per_device_summary.is_empty() {
        let _ = writeln!(out, "| Device/Mode | Count | Mean APE | Min | Max |");
        let _ = writeln!(out, "|-------------|-------|----------|-----|-----|");
        for (key, s) in &report.per_device_summary {
            let _ = writeln!(
                out,
                "| {key} | {} | {:.2} | {:.2} | {:.2} |",
                s.count, s.mean_ape, s.min_ape, s.max_ape,
            );
        }
        let _ = writeln!(out);
    }
}

/// Whole numbers get thousands separators; everything else four decimals.
fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        #[allow(clippy::cast_possible_truncation)]
        group_thousands(v as i64)
    } else {
        format!("{v:.4}")
    }
}

fn group_thousands(v: i64) -> String {
    let digits = v.abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if v < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

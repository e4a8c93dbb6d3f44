//! `perflens` — one front end for ML performance models and simulators.
//!
//! ```text
//! USAGE:
//!   perflens list                              Registered tools and capabilities
//!   perflens run --workload w.yaml --tool t    Run one tool on one workload
//!   perflens compare --workload w.yaml --tools a,b
//!   perflens validate --configs dir/           Coverage matrix over a config dir
//!   perflens report --configs dir/             Full markdown report
//!   perflens check-accuracy --artifacts dir/ --tool neusight
//! ```
//!
//! Exit code 1 for configuration errors (unknown tool, unsupported
//! workload, unacquirable artifacts). A tool run that fails is recorded
//! data, not a process error: the exit code stays 0.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use perflens_adapters::{adapter_names, all_adapters, get_adapter, ToolAdapter};
use perflens_core::{ResultSet, WorkloadSpec};
use perflens_validation::{
    render_markdown, run_matrix, run_validation, ValidationOptions, ValidationReport,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "perflens", about = "Unified ML performance-tool harness", version)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List registered tools with categories and metrics.
    List,
    /// Run one tool against one workload.
    Run {
        /// Workload config (YAML).
        #[arg(long)]
        workload: PathBuf,
        /// Tool name (see `perflens list`).
        #[arg(long)]
        tool: String,
        /// Write the result document here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run several tools against one workload and compare.
    Compare {
        /// Workload config (YAML).
        #[arg(long)]
        workload: PathBuf,
        /// Comma-separated tool names.
        #[arg(long)]
        tools: String,
    },
    /// Run every tool over a directory of workload configs.
    Validate {
        /// Directory of workload configs (YAML).
        #[arg(long)]
        configs: PathBuf,
        /// Write all result documents (JSON array) here.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Render the full markdown report for a directory of configs.
    Report {
        /// Directory of workload configs (YAML).
        #[arg(long)]
        configs: PathBuf,
        /// Saved validation report (JSON from `check-accuracy`) to include
        /// as an accuracy section.
        #[arg(long)]
        accuracy: Option<PathBuf>,
        /// Write the markdown here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate a tool's accuracy from its published artifacts.
    CheckAccuracy {
        /// Root of the artifact checkout.
        #[arg(long)]
        artifacts: PathBuf,
        /// Tool whose claims to check.
        #[arg(long, default_value = "neusight")]
        tool: String,
        /// Experiment label for the report.
        #[arg(long, default_value = "accuracy-validation")]
        experiment: String,
        /// Upstream repository the artifacts came from.
        #[arg(long, default_value = "")]
        repo: String,
        /// Write the validation report (JSON) here.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Cmd::List => cmd_list(),
        Cmd::Run {
            workload,
            tool,
            output,
        } => cmd_run(&workload, &tool, output.as_deref())?,
        Cmd::Compare { workload, tools } => cmd_compare(&workload, &tools)?,
        Cmd::Validate { configs, output } => cmd_validate(&configs, output.as_deref())?,
        Cmd::Report {
            configs,
            accuracy,
            output,
        } => cmd_report(&configs, accuracy.as_deref(), output.as_deref())?,
        Cmd::CheckAccuracy {
            artifacts,
            tool,
            experiment,
            repo,
            output,
        } => cmd_check_accuracy(&artifacts, &tool, &experiment, &repo, output.as_deref())?,
    }

    Ok(())
}

fn cmd_list() {
    println!("Registered tools:");
    println!();
    for adapter in all_adapters() {
        println!("  {:<12} [{}]", adapter.name(), adapter.category());
        println!("               metrics: {}", adapter.supported_metrics().join(", "));
    }
}

fn resolve_adapter(name: &str) -> Result<Box<dyn ToolAdapter>> {
    get_adapter(name).with_context(|| {
        format!(
            "unknown tool '{name}' (registered: {})",
            adapter_names().join(", ")
        )
    })
}

fn cmd_run(workload: &Path, tool: &str, output: Option<&Path>) -> Result<()> {
    let spec = WorkloadSpec::from_path(workload)?;
    let adapter = resolve_adapter(tool)?;
    if !adapter.supports(&spec) {
        bail!("tool '{tool}' does not support workload '{}'", spec.name);
    }

    let result = adapter.run(&spec);
    if let Some(err) = &result.error {
        eprintln!("{tool} failed: {err}");
    }
    emit_json(&result, output)
}

fn cmd_compare(workload: &Path, tools: &str) -> Result<()> {
    let spec = WorkloadSpec::from_path(workload)?;
    let adapters: Vec<Box<dyn ToolAdapter>> = tools
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(resolve_adapter)
        .collect::<Result<_>>()?;
    if adapters.is_empty() {
        bail!("no tools given");
    }

    let specs = vec![spec];
    let run = run_matrix(&specs, &adapters);
    print!("{}", render_markdown(&run, &adapters, None));
    Ok(())
}

fn load_specs(configs: &Path) -> Result<Vec<WorkloadSpec>> {
    let entries = std::fs::read_dir(configs)
        .with_context(|| format!("cannot read config directory {}", configs.display()))?;
    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("yaml" | "yml")
            )
        })
        .collect();
    paths.sort();
    if paths.is_empty() {
        bail!("no workload configs in {}", configs.display());
    }
    paths
        .iter()
        .map(|p| WorkloadSpec::from_path(p).map_err(Into::into))
        .collect()
}

fn cmd_validate(configs: &Path, output: Option<&Path>) -> Result<()> {
    let specs = load_specs(configs)?;
    let adapters = all_adapters();
    let run = run_matrix(&specs, &adapters);

    for ((workload, tool), result) in run.results() {
        let status = if result.is_ok() { "PASS" } else { "FAIL" };
        println!("{status}  {workload} / {tool}");
    }
    println!();
    println!("{} passed, {} failed", run.pass_count(), run.fail_count());

    if let Some(path) = output {
        let results: Vec<&ResultSet> = run.results().map(|(_, rs)| rs).collect();
        std::fs::write(path, serde_json::to_string_pretty(&results)?)?;
        println!("Results written to {}", path.display());
    }
    Ok(())
}

fn cmd_report(configs: &Path, accuracy: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let specs = load_specs(configs)?;
    let adapters = all_adapters();
    let run = run_matrix(&specs, &adapters);

    let validation: Option<ValidationReport> = match accuracy {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read validation report {}", path.display()))?;
            Some(serde_json::from_str(&text).with_context(|| {
                format!("malformed validation report {}", path.display())
            })?)
        }
        None => None,
    };
    let markdown = render_markdown(&run, &adapters, validation.as_ref());

    match output {
        Some(path) => {
            std::fs::write(path, &markdown)?;
            println!("Report written to {}", path.display());
        }
        None => print!("{markdown}"),
    }
    Ok(())
}

fn cmd_check_accuracy(
    artifacts: &Path,
    tool: &str,
    experiment: &str,
    repo: &str,
    output: Option<&Path>,
) -> Result<()> {
    let opts = ValidationOptions {
        experiment: experiment.to_string(),
        tool: tool.to_string(),
        repo: repo.to_string(),
        artifacts_root: artifacts.to_path_buf(),
    };

    let report = match run_validation(&opts) {
        Ok(report) => report,
        Err(e) => {
            // Acquisition failure: leave a minimal report behind, then fail.
            if let Some(path) = output {
                let failure = ValidationReport::failure(&opts, &e.to_string());
                std::fs::write(path, serde_json::to_string_pretty(&failure)?)?;
            }
            return Err(e.into());
        }
    };

    for c in &report.claim_comparisons {
        let computed = c
            .our_computed_error_pct
            .map_or_else(|| "no data".to_string(), |v| format!("{v:.2}%"));
        println!(
            "{:<10} {:<10} claimed {:>5.2}%  computed {:>8}  {}",
            c.device,
            c.mode.as_str(),
            c.paper_claimed_error_pct,
            computed,
            c.verdict.as_str(),
        );
    }
    println!();
    println!(
        "{} records, {} skipped labels, {} devices",
        report.data_inventory.paired_records,
        report.data_inventory.skipped_labels,
        report.data_inventory.label_devices.len(),
    );

    emit_json(&report, output)
}

fn emit_json<T: serde::Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            println!("Written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

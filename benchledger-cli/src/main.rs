#![forbid(unsafe_code)]

use anyhow::Context;
use benchledger_core::{analyze_files, discover_inputs, validate_csv, AnalysisConfig, BenchConfig, Error as CoreError};
use benchledger_telemetry::{dump_prometheus, record_run, RunCounters};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

mod config;

#[derive(Debug, Parser)]
#[command(name = "benchledger", version, about = "Validate benchmark run CSVs and summarise them for papers")]
struct Cli {
	/// Config file (default: $BENCHLEDGER_CONFIG, then ./benchledger.toml)
	#[arg(long, global = true)]
	config: Option<PathBuf>,
	/// Log level override (trace|debug|info|warn|error)
	#[arg(long, global = true)]
	log_level: Option<String>,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Debug, clap::Args)]
struct AnalysisArgs {
	/// Stage-sum vs total tolerance in seconds
	#[arg(long, alias = "eps-sec")]
	tolerance_sec: Option<f64>,
	/// Verify SHA-256 of local blob files for the first N main rows (best-effort)
	#[arg(long)]
	verify_blob_sample: Option<usize>,
}

impl AnalysisArgs {
	fn apply(&self, cfg: &mut AnalysisConfig) -> anyhow::Result<()> {
		if let Some(t) = self.tolerance_sec { cfg.tolerance_sec = t; }
		if let Some(n) = self.verify_blob_sample { cfg.verify_blob_sample = n; }
		cfg.validate()?;
		Ok(())
	}
}

#[derive(Debug, Subcommand)]
enum Commands {
	/// Validate a single run CSV
	Validate {
		input: PathBuf,
		#[command(flatten)]
		analysis: AnalysisArgs,
		/// Print the verdict as JSON
		#[arg(long)]
		json: bool,
	},
	/// Summarise a run CSV or every CSV under a directory
	Analyze {
		input: PathBuf,
		/// Output directory for summaries and the LaTeX table
		#[arg(long, default_value = "analysis")]
		output: PathBuf,
		#[command(flatten)]
		analysis: AnalysisArgs,
		/// Worker threads (default: one per CPU)
		#[arg(long)]
		jobs: Option<usize>,
		/// Write Prometheus counters for this batch to a file
		#[arg(long)]
		metrics_out: Option<PathBuf>,
	},
	/// Config helpers
	Config {
		#[command(subcommand)]
		action: ConfigCmd,
	},
}

#[derive(Debug, Subcommand)]
enum ConfigCmd {
	/// Show the effective configuration (file + env)
	Show,
	/// Write a benchledger.toml template
	WriteTemplate {
		/// Destination path (default: ./benchledger.toml)
		#[arg(long)]
		path: Option<PathBuf>,
		/// Overwrite if the file exists
		#[arg(long)]
		force: bool,
	},
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	match run(cli) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:#}");
			ExitCode::from(2)
		}
	}
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
	let (mut cfg, cfg_path) = config::resolve(cli.config.as_deref())?;
	if let Some(level) = cli.log_level {
		cfg.log_level = level.to_ascii_lowercase();
		cfg.validate()?;
	}
	benchledger_telemetry::init_logging(&cfg.log_level)?;

	match cli.command {
		Commands::Validate { input, analysis, json } => {
			analysis.apply(&mut cfg.analysis)?;
			cmd_validate(input, &cfg.analysis, json)
		}
		Commands::Analyze { input, output, analysis, jobs, metrics_out } => {
			analysis.apply(&mut cfg.analysis)?;
			cmd_analyze(input, output, &cfg.analysis, jobs, metrics_out)
		}
		Commands::Config { action } => match action {
			ConfigCmd::Show => cmd_config_show(&cfg, cfg_path),
			ConfigCmd::WriteTemplate { path, force } => cmd_write_template(path, force),
		},
	}
}

fn cmd_validate(input: PathBuf, cfg: &AnalysisConfig, as_json: bool) -> anyhow::Result<ExitCode> {
	if !input.is_file() {
		eprintln!("validate expects INPUT to be a CSV file: {}", input.display());
		return Ok(ExitCode::from(2));
	}
	let v = validate_csv(&input, cfg);
	if as_json {
		println!("{}", serde_json::to_string_pretty(&v)?);
	} else {
		println!("VALID={}", v.ok);
		for m in &v.messages {
			println!("{m}");
		}
	}
	Ok(if v.ok { ExitCode::SUCCESS } else { ExitCode::from(1) })
}

fn cmd_analyze(
	input: PathBuf,
	output: PathBuf,
	cfg: &AnalysisConfig,
	jobs: Option<usize>,
	metrics_out: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
	let files = match discover_inputs(&input) {
		Ok(f) => f,
		Err(e @ CoreError::NoInputs(_)) => {
			eprintln!("{e}");
			return Ok(ExitCode::from(2));
		}
		Err(e) => return Err(e.into()),
	};
	if jobs == Some(0) {
		anyhow::bail!("--jobs must be at least 1");
	}

	let report = analyze_files(&files, cfg, jobs)?;
	for o in &report.outcomes {
		let m = o.metrics();
		record_run(RunCounters { rows: m.rows_total as u64, failed: !m.validation_ok, unparseable: o.is_unparseable() });
	}

	let paths = benchledger_report::write_all(&output, &report)
		.with_context(|| format!("writing reports to {}", output.display()))?;
	info!(runs = %paths.runs_csv.display(), grouped = %paths.grouped_csv.display(), "summaries written");

	println!("\n=== Summary (grouped) ===");
	println!("{}", benchledger_report::console::grouped_table(&report.grouped));

	if let Some(path) = metrics_out {
		std::fs::write(&path, dump_prometheus()).with_context(|| format!("writing {}", path.display()))?;
	}

	let failures = report.failures();
	if failures > 0 {
		eprintln!(
			"\nWARNING: {failures} run file(s) failed validation. See {} for details.",
			paths.runs_csv.display()
		);
		return Ok(ExitCode::from(1));
	}
	Ok(ExitCode::SUCCESS)
}

fn cmd_config_show(cfg: &BenchConfig, path: Option<PathBuf>) -> anyhow::Result<ExitCode> {
	let out = json!({
		"config_file": path.map(|p| p.display().to_string()),
		"log_level": cfg.log_level,
		"tolerance_sec": cfg.analysis.tolerance_sec,
		"verify_blob_sample": cfg.analysis.verify_blob_sample,
	});
	println!("{}", serde_json::to_string_pretty(&out)?);
	Ok(ExitCode::SUCCESS)
}

fn cmd_write_template(path: Option<PathBuf>, force: bool) -> anyhow::Result<ExitCode> {
	let path = path.unwrap_or_else(|| PathBuf::from(config::DEFAULT_CONFIG_FILE));
	if path.exists() && !force {
		eprintln!("refusing to overwrite existing file: {} (use --force)", path.display());
		return Ok(ExitCode::from(2));
	}
	std::fs::write(&path, config::TEMPLATE_TOML).with_context(|| format!("writing {}", path.display()))?;
	eprintln!("wrote {}", path.display());
	Ok(ExitCode::SUCCESS)
}

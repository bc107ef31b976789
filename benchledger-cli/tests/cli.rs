#![forbid(unsafe_code)]

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

const HEADER: &str = "mode,workers,is_warmup,status,error,tx_id,merkle_root,merkle_batch_size,total_sec,hash_sec,storage_sec,db_sec,ledger_sec,merkle_wait_sec,req_start_unix_ns,req_end_unix_ns";

fn good_run(dir: &Path, name: &str) -> std::path::PathBuf {
	let p = dir.join(name);
	let body = format!(
		"{HEADER}\n\
		baseline,4,1,ok,,,,0,0.3,0.3,0,0,0,0,1000000000,1300000000\n\
		baseline,4,0,ok,,,,0,0.1,0.05,0.05,0,0,0,2000000000,2100000000\n\
		baseline,4,0,ok,,,,0,0.1,0.05,0.05,0,0,0,2500000000,2600000000\n\
		baseline,4,0,ok,,,,0,0.1,0.05,0.05,0,0,0,2900000000,3000000000\n"
	);
	std::fs::write(&p, body).unwrap();
	p
}

fn bad_run(dir: &Path, name: &str) -> std::path::PathBuf {
	let p = dir.join(name);
	let body = format!("{HEADER}\nledger,4,0,error,ledger timeout,tx1,,0,0.20,0.02,0.02,0.02,0.02,0.02,1000000000,1200000000\n");
	std::fs::write(&p, body).unwrap();
	p
}

fn bin(cwd: &Path) -> Command {
	let mut cmd = Command::cargo_bin("benchledger").unwrap();
	cmd.current_dir(cwd)
		.env_remove("BENCHLEDGER_CONFIG")
		.env_remove("BENCHLEDGER_LOG_LEVEL")
		.env_remove("BENCHLEDGER_TOLERANCE_SEC")
		.env_remove("BENCHLEDGER_VERIFY_BLOB_SAMPLE")
		.env_remove("RUST_LOG");
	cmd
}

#[test]
fn validate_passing_run() {
	let dir = tempdir().unwrap();
	let p = good_run(dir.path(), "bench_w4_r01.csv");
	bin(dir.path())
		.arg("validate")
		.arg(&p)
		.assert()
		.success()
		.stdout(predicate::str::starts_with("VALID=true"))
		.stdout(predicate::str::contains("rows_total=4 warmup=1 main=3"));
}

#[test]
fn validate_failing_run_exits_one() {
	let dir = tempdir().unwrap();
	let p = bad_run(dir.path(), "bad.csv");
	bin(dir.path())
		.arg("validate")
		.arg(&p)
		.assert()
		.code(1)
		.stdout(predicate::str::contains("VALID=false"))
		.stdout(predicate::str::contains("stage_sum_minus_total_max_abs=0.100000s (eps=0.050s)"))
		.stdout(predicate::str::contains("non_ok_status_main_rows=1"))
		.stdout(predicate::str::contains("example_errors=ledger timeout"));
}

#[test]
fn tolerance_flag_and_alias_are_honoured() {
	let dir = tempdir().unwrap();
	let p = dir.path().join("loose.csv");
	std::fs::write(&p, format!("{HEADER}\nledger,4,0,ok,,tx1,,0,0.20,0.02,0.02,0.02,0.02,0.02,1,2\n")).unwrap();
	bin(dir.path()).args(["validate", "--tolerance-sec", "0.2"]).arg(&p).assert().success();
	bin(dir.path()).args(["validate", "--eps-sec", "0.2"]).arg(&p).assert().success();
	bin(dir.path()).env("BENCHLEDGER_TOLERANCE_SEC", "0.2").arg("validate").arg(&p).assert().success();
}

#[test]
fn validate_json_output() {
	let dir = tempdir().unwrap();
	let p = good_run(dir.path(), "run.csv");
	let out = bin(dir.path()).args(["validate", "--json"]).arg(&p).output().unwrap();
	assert!(out.status.success());
	let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
	assert_eq!(v["ok"], true);
	assert_eq!(v["messages"][0], "rows_total=4 warmup=1 main=3");
}

#[test]
fn validate_requires_a_file() {
	let dir = tempdir().unwrap();
	bin(dir.path())
		.arg("validate")
		.arg(dir.path())
		.assert()
		.code(2)
		.stderr(predicate::str::contains("expects INPUT to be a CSV file"));
}

#[test]
fn analyze_directory_writes_summaries() {
	let dir = tempdir().unwrap();
	let runs = dir.path().join("runs");
	std::fs::create_dir(&runs).unwrap();
	good_run(&runs, "bench_w4_r01.csv");
	good_run(&runs, "bench_w4_r02.csv");
	let out = dir.path().join("out");
	let metrics = dir.path().join("metrics.prom");
	bin(dir.path())
		.arg("analyze")
		.arg(&runs)
		.arg("--output")
		.arg(&out)
		.arg("--metrics-out")
		.arg(&metrics)
		.args(["--jobs", "2"])
		.assert()
		.success()
		.stdout(predicate::str::contains("=== Summary (grouped) ==="))
		.stdout(predicate::str::contains("bench_w4"));

	let runs_csv = std::fs::read_to_string(out.join("summary_runs.csv")).unwrap();
	assert_eq!(runs_csv.lines().count(), 3);
	let grouped = std::fs::read_to_string(out.join("summary_grouped.csv")).unwrap();
	assert_eq!(grouped.lines().count(), 2);
	assert!(grouped.lines().nth(1).unwrap().starts_with("bench_w4,baseline,4,false,0,3.0,0.0,"));
	assert!(out.join("summary.json").is_file());
	assert!(std::fs::read_to_string(out.join("table_grouped.tex")).unwrap().contains("bench\\_w4"));
	let prom = std::fs::read_to_string(&metrics).unwrap();
	assert!(prom.contains("benchledger_files_total 2"));
	assert!(prom.contains("benchledger_rows_total 8"));
}

#[test]
fn analyze_reports_failures_but_finishes() {
	let dir = tempdir().unwrap();
	good_run(dir.path(), "a_r01.csv");
	bad_run(dir.path(), "b_r01.csv");
	std::fs::write(dir.path().join("c_r01.csv"), "x,y\n1,2,3\n").unwrap();
	let out = dir.path().join("report");
	bin(dir.path())
		.arg("analyze")
		.arg(dir.path())
		.arg("--output")
		.arg(&out)
		.assert()
		.code(1)
		.stderr(predicate::str::contains("WARNING: 2 run file(s) failed validation"));
	let runs_csv = std::fs::read_to_string(out.join("summary_runs.csv")).unwrap();
	assert_eq!(runs_csv.lines().count(), 4);
	assert!(runs_csv.contains("failed to parse CSV"));
	let grouped = std::fs::read_to_string(out.join("summary_grouped.csv")).unwrap();
	assert_eq!(grouped.lines().count(), 3);
}

#[test]
fn analyze_without_inputs_exits_two() {
	let dir = tempdir().unwrap();
	bin(dir.path())
		.arg("analyze")
		.arg(dir.path())
		.assert()
		.code(2)
		.stderr(predicate::str::contains("no CSV files found"));
}

#[test]
fn config_show_resolves_file_and_env() {
	let dir = tempdir().unwrap();
	let cfg = dir.path().join("custom.toml");
	std::fs::write(&cfg, "log_level = \"warn\"\n[analysis]\nverify_blob_sample = 7\n").unwrap();
	bin(dir.path())
		.arg("--config")
		.arg(&cfg)
		.args(["config", "show"])
		.env("BENCHLEDGER_TOLERANCE_SEC", "0.125")
		.assert()
		.success()
		.stdout(predicate::str::contains("\"log_level\": \"warn\""))
		.stdout(predicate::str::contains("\"tolerance_sec\": 0.125"))
		.stdout(predicate::str::contains("\"verify_blob_sample\": 7"));
}

#[test]
fn invalid_env_is_rejected() {
	let dir = tempdir().unwrap();
	bin(dir.path())
		.args(["config", "show"])
		.env("BENCHLEDGER_TOLERANCE_SEC", "-1")
		.assert()
		.code(2)
		.stderr(predicate::str::contains("invalid tolerance_sec"));
}

#[test]
fn write_template_then_refuse_overwrite() {
	let dir = tempdir().unwrap();
	let path = dir.path().join("benchledger.toml");
	bin(dir.path()).args(["config", "write-template", "--path"]).arg(&path).assert().success();
	let contents = std::fs::read_to_string(&path).unwrap();
	assert!(contents.contains("[analysis]"));
	bin(dir.path())
		.args(["config", "write-template", "--path"])
		.arg(&path)
		.assert()
		.code(2)
		.stderr(predicate::str::contains("refusing to overwrite"));
	bin(dir.path()).args(["config", "write-template", "--force", "--path"]).arg(&path).assert().success();
}

#[test]
fn local_config_file_is_discovered() {
	let dir = tempdir().unwrap();
	std::fs::write(dir.path().join("benchledger.toml"), "[analysis]\ntolerance_sec = 0.5\n").unwrap();
	bin(dir.path())
		.args(["config", "show"])
		.assert()
		.success()
		.stdout(predicate::str::contains("\"tolerance_sec\": 0.5"));
}

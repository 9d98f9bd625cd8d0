//! End-to-end runs of the binary against a mock backend

use assert_cmd::Command;
use axum::extract::Json;
use axum::routing::{get, post};
use axum::Router;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

async fn spawn_backend() -> String {
    let router = Router::new()
        .route(
            "/api/inpatient-revenue/init",
            get(|| async {
                Json(json!({
                    "success": true,
                    "date": "2025-11-14",
                    "departments": [{"dep_id": "0101", "dep_name": "Cardiology"}],
                    "doctors": [{"doc_id": "D01", "doc_name": "Dr. Li", "dep_id": "0101"}]
                }))
            }),
        )
        .route(
            "/api/inpatient-revenue/summary",
            post(|Json(body): Json<Value>| async move {
                // The prior window for 2025-11-10..14 starts on 11-05
                let current = if body["start_date"] == "2025-11-05" { 1000.0 } else { 1250.0 };
                Json(json!({
                    "success": true,
                    "summary": {"current": current, "growth_rate": 8.0, "bed_growth_rate": -2.5}
                }))
            }),
        )
        .route(
            "/api/inpatient-revenue/details",
            post(|| async {
                let rows: Vec<Value> = (1..=30)
                    .map(|i| {
                        let doctor = if i % 3 == 0 { "D01" } else { "D02" };
                        json!({
                            "date": format!("2025-11-{:02}", 1 + i % 14),
                            "dep_id": "0101",
                            "dep_name": "Cardiology",
                            "doc_id": doctor,
                            "revenue": i * 10
                        })
                    })
                    .collect();
                Json(json!({"success": true, "rows": rows}))
            }),
        )
        .route(
            "/api/inpatient-revenue/timeseries",
            post(|| async {
                Json(json!({
                    "success": true,
                    "rows": [{"date": "2025-11-10", "revenue": 100, "yoy": 5, "bed_yoy_pct": 1.5}]
                }))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn write_config(dir: &Path, base_url: &str) -> PathBuf {
    let path = dir.join("hospital-analytics.toml");
    let content = format!(
        r#"
[api]
base_url = "{base_url}"
timeout_secs = 5

[view]
page_size = 10
default_window_days = 0
"#
    );
    fs::write(&path, content).unwrap();
    path
}

fn cli(dir: &TempDir, config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hospital-analytics").unwrap();
    cmd.current_dir(dir.path())
        .env("HOSPITAL_ANALYTICS_SESSION_FILE", dir.path().join("session.json"))
        .env_remove("HOSPITAL_ANALYTICS_TOKEN")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(config)
        .arg("--module")
        .arg("inpatient");
    cmd
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("hospital-analytics")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("summary"))
        .stdout(predicate::str::contains("details"))
        .stdout(predicate::str::contains("trend"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn test_unknown_module_is_rejected() {
    Command::cargo_bin("hospital-analytics")
        .unwrap()
        .args(["--module", "radiology", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown module"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_summary_json_includes_backfilled_mom() {
    let base = spawn_backend().await;
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &base);

    let output = cli(&dir, &config)
        .args(["--json", "summary", "--start", "2025-11-10", "--end", "2025-11-14"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["module"], "inpatient");
    assert_eq!(report["summary"]["current"], 1250.0);
    assert_eq!(report["summary"]["momGrowthRate"], 25.0);
    assert_eq!(report["summary"]["bedGrowthRate"], -2.5);
    assert!(report.get("error").is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_details_page_and_export() {
    let base = spawn_backend().await;
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &base);
    let export = dir.path().join("details.csv");

    let output = cli(&dir, &config)
        .args(["--json", "details", "--sort", "revenue", "--desc", "--page", "2"])
        .arg("--export")
        .arg(&export)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let details = &report["details"];
    assert_eq!(details["page"]["pageNumber"], 2);
    assert_eq!(details["page"]["totalCount"], 30);
    assert_eq!(details["rows"][0]["revenue"], 200.0);

    let csv = fs::read_to_string(&export).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("date,department_code"));
    assert_eq!(lines.count(), 30);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_doctor_filter_in_text_mode() {
    let base = spawn_backend().await;
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &base);

    cli(&dir, &config)
        .args(["details", "--doctor", "D01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("page 1 of 1"))
        .stdout(predicate::str::contains("10 rows"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_report_renders_every_section() {
    let base = spawn_backend().await;
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &base);

    cli(&dir, &config)
        .args(["report", "--mode", "yoy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary - inpatient revenue"))
        .stdout(predicate::str::contains("Bed-day YoY"))
        .stdout(predicate::str::contains("Details - inpatient revenue"))
        .stdout(predicate::str::contains("Bed-day YoY %"));
}

#[test]
fn test_inverted_window_fails_before_any_request() {
    let dir = TempDir::new().unwrap();
    // Nothing listens here; the init failure is tolerated and the window check fails first.
    let config = write_config(dir.path(), "http://127.0.0.1:9");

    cli(&dir, &config)
        .args(["summary", "--start", "2025-11-20", "--end", "2025-11-10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("start date 2025-11-20 is after end date 2025-11-10"));
}

#[test]
fn test_unreachable_backend_reports_error() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "http://127.0.0.1:9");

    cli(&dir, &config)
        .args(["summary"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No data"))
        .stderr(predicate::str::contains("network error, backend may be unreachable"));
}

#[test]
fn test_degraded_run_flushes_file_logs() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "http://127.0.0.1:9");
    let log_dir = dir.path().join("logs");

    cli(&dir, &config)
        .env("LOG_OUTPUT", "file")
        .env("LOG_LEVEL", "warn")
        .env_remove("LOG_FORMAT")
        .env("HOSPITAL_ANALYTICS_LOG_DIR", &log_dir)
        .args(["summary"])
        .assert()
        .code(1);

    let logs: String = fs::read_dir(&log_dir)
        .unwrap()
        .map(|entry| fs::read_to_string(entry.unwrap().path()).unwrap())
        .collect();
    assert!(logs.contains("Section failed"));
}

//! Process-level contract: exit codes, log lines and files written.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUERY: &str = "SELECT JobNum, StartDate, LaborHoursPerUnit, ProdStandard FROM ops.jobs\n";

/// Command with a clean environment rooted at `dir`.
fn jobhours(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("jobhours").unwrap();
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("GOOGLE_CLOUD_PROJECT")
        .env_remove("GOOGLE_OAUTH_ACCESS_TOKEN")
        .env_remove("GOOGLE_APPLICATION_CREDENTIALS")
        .env_remove("BIGQUERY_LOCATION")
        .env_remove("JOBHOURS_QUERY_FILE")
        .env_remove("JOBHOURS_OUTPUT_DIR")
        .env_remove("JOBHOURS_REPORT")
        .env_remove("JOBHOURS_BIGQUERY_URL")
        .env_remove("JOBHOURS_TIMEOUT_SECS")
        .env_remove("JOBHOURS_PAGE_SIZE");
    cmd
}

fn csv_files(dir: &Path, prefix: &str) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with(prefix) && n.ends_with(".csv"))
        .collect();
    names.sort();
    names
}

#[test]
fn help_lists_flags() {
    let dir = tempdir().unwrap();
    jobhours(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--query-file"))
        .stdout(predicate::str::contains("--output-dir"))
        .stdout(predicate::str::contains("--project"));
}

#[test]
fn missing_query_file_exits_with_read_error() {
    let dir = tempdir().unwrap();

    jobhours(dir.path())
        .args(["--project", "plant-ops", "--bigquery-url", "http://127.0.0.1:9"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error in main execution"))
        .stderr(predicate::str::contains("query.txt"));

    assert!(!dir.path().join("output").exists());
    assert!(!dir.path().join("job_hours_analysis.html").exists());
}

#[test]
fn missing_query_file_is_reported_before_warehouse_setup() {
    let dir = tempdir().unwrap();

    jobhours(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("query.txt"))
        .stderr(predicate::str::contains("no project configured").not());

    jobhours(dir.path())
        .env("GOOGLE_APPLICATION_CREDENTIALS", dir.path().join("nope.json"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to read credentials file").not());
}

#[test]
fn missing_project_exits_with_query_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("query.txt"), QUERY).unwrap();

    jobhours(dir.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("no project configured"));
}

async fn run_blocking(mut cmd: Command) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .expect("command thread")
}

#[tokio::test]
async fn full_run_writes_csvs_and_report() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects/plant-ops/queries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobReference": {"projectId": "plant-ops", "jobId": "job_1"},
            "schema": {"fields": [
                {"name": "JobNum", "type": "STRING"},
                {"name": "StartDate", "type": "DATE"},
                {"name": "LaborHoursPerUnit", "type": "FLOAT"},
                {"name": "ProdStandard", "type": "FLOAT"}
            ]},
            "rows": [
                {"f": [{"v": "J-3"}, {"v": "2024-01-03"}, {"v": "8.0"}, {"v": "7.5"}]},
                {"f": [{"v": "J-2"}, {"v": "2024-01-02"}, {"v": "60.0"}, {"v": "7.5"}]},
                {"f": [{"v": "J-1"}, {"v": "2024-01-01"}, {"v": "5.0"}, {"v": "7.5"}]}
            ],
            "jobComplete": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("query.txt"), QUERY).unwrap();

    let mut cmd = jobhours(dir.path());
    cmd.env("GOOGLE_OAUTH_ACCESS_TOKEN", "test-token").args([
        "--project",
        "plant-ops",
        "--bigquery-url",
        &mock_server.uri(),
    ]);
    run_blocking(cmd)
        .await
        .success()
        .stderr(predicate::str::contains("Retrieved 3 records from BigQuery"))
        .stderr(predicate::str::contains(
            "Filtered out 1 records with LaborHoursPerUnit > 50",
        ))
        .stderr(predicate::str::contains(
            "Visualization has been saved as 'job_hours_analysis.html'",
        ));

    let output = dir.path().join("output");
    let data = csv_files(&output, "job_hours_data_");
    let stats = csv_files(&output, "job_hours_stats_");
    assert_eq!(data.len(), 1);
    assert_eq!(stats.len(), 1);
    assert_eq!(
        data[0].trim_start_matches("job_hours_data_"),
        stats[0].trim_start_matches("job_hours_stats_")
    );

    let data_csv = fs::read_to_string(output.join(&data[0])).unwrap();
    assert_eq!(
        data_csv,
        "JobNum,StartDate,LaborHoursPerUnit,ProdStandard\n\
         J-1,2024-01-01,5.0,7.5\n\
         J-3,2024-01-03,8.0,7.5\n"
    );

    let report = fs::read_to_string(dir.path().join("job_hours_analysis.html")).unwrap();
    assert!(report.contains("Labor Hours Per Unit vs Production Standard Analysis"));
    assert!(report.contains("50.0%"));
}

#[tokio::test]
async fn rejected_query_exits_with_query_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects/plant-ops/queries"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "Syntax error: Unexpected end of script", "status": "INVALID_ARGUMENT"}
        })))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("query.txt"), "SELECT").unwrap();

    let mut cmd = jobhours(dir.path());
    cmd.args([
        "--project",
        "plant-ops",
        "--bigquery-url",
        &mock_server.uri(),
    ]);
    run_blocking(cmd)
        .await
        .code(3)
        .stderr(predicate::str::contains("Syntax error: Unexpected end of script"));

    assert!(!dir.path().join("output").exists());
    assert!(!dir.path().join("job_hours_analysis.html").exists());
}

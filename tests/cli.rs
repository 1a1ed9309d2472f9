use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

const ENV_VARS: [&str; 5] = [
    "DOJOKIT_CONFIG",
    "DOJOKIT_ORG_ID",
    "DOJOKIT_API_HOST",
    "DOJOKIT_FORMAT",
    "DOJOKIT_DEBUG",
];

fn dojokit() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dojokit"));
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn write_config(temp: &Path, contents: &str) -> PathBuf {
    let path = temp.join("config.yaml");
    fs::write(&path, contents).expect("failed to write config");
    path
}

fn default_config(temp: &Path, org_id: &str) -> PathBuf {
    write_config(
        temp,
        &format!("api_key: sk_test\norg_id: {org_id}\npreferences:\n  page_limit: 100\n"),
    )
}

fn json_stdout(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn status_uses_custom_config_path() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = default_config(temp.path(), "org-status");

    let assert = dojokit()
        .arg("status")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("Default organization: org-status"));
    assert!(stdout.contains(&config_path.to_string_lossy().to_string()));
    assert!(stdout.contains("unauth 10/60s"));

    Ok(())
}

#[test]
fn status_without_config_suggests_init() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    dojokit()
        .arg("status")
        .arg("--config")
        .arg(temp.path().join("missing.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration not found"))
        .stdout(predicate::str::contains("dojokit init"));

    Ok(())
}

#[test]
fn version_prints_package_version() {
    dojokit()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn limit_check_rejects_eleventh_unauth_call() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    let assert = dojokit()
        .args(["limit", "check", "--class", "unauth", "--ip", "203.0.113.7"])
        .args(["--count", "11", "--format", "json"])
        .arg("--config")
        .arg(temp.path().join("missing.yaml"))
        .assert()
        .success();

    let output = json_stdout(assert.get_output());
    let rows = output["data"].as_array().expect("data array");
    assert_eq!(rows.len(), 11);

    for row in &rows[..10] {
        assert_eq!(row["allowed"], true);
    }
    assert_eq!(rows[9]["remaining"], "0/10");
    assert_eq!(rows[10]["allowed"], false);
    assert_eq!(rows[10]["remaining"], "0/10");
    assert_eq!(rows[10]["retryAfter"], "60s");

    Ok(())
}

#[test]
fn limit_check_counts_orgs_separately() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(
        temp.path(),
        "rate_limit:\n  quotas:\n    rpc:\n      limit: 2\n      window_secs: 60\n",
    );

    let assert = dojokit()
        .args(["limit", "check", "--for-org", "org_1", "-c", "3", "--format", "json"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let output = json_stdout(assert.get_output());
    let allowed: Vec<bool> = output["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|row| row["allowed"] == true)
        .collect();
    assert_eq!(allowed, vec![true, true, false]);

    Ok(())
}

#[test]
fn limit_check_disabled_backend_allows_everything() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "rate_limit:\n  backend: disabled\n");

    let assert = dojokit()
        .args(["limit", "check", "--class", "auth", "--ip", "198.51.100.9"])
        .args(["-c", "20", "--format", "json"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let output = json_stdout(assert.get_output());
    let rows = output["data"].as_array().expect("data array");
    assert_eq!(rows.len(), 20);
    assert!(rows.iter().all(|row| row["allowed"] == true));
    assert_eq!(rows[19]["remaining"], "5/5");

    Ok(())
}

#[test]
fn limit_identify_prefers_forwarded_for() {
    dojokit()
        .args(["limit", "identify"])
        .args(["-H", "x-real-ip: 10.0.0.2"])
        .args(["-H", "X-Forwarded-For:  203.0.113.7 , 10.0.0.1"])
        .assert()
        .success()
        .stdout("203.0.113.7\n");

    dojokit()
        .args(["limit", "identify", "-H", "cf-connecting-ip: 192.0.2.44"])
        .assert()
        .success()
        .stdout("192.0.2.44\n");

    dojokit()
        .args(["limit", "identify"])
        .assert()
        .success()
        .stdout("unknown\n");
}

#[test]
fn limit_identify_rejects_malformed_header() {
    dojokit()
        .args(["limit", "identify", "-H", "x-forwarded-for"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 'name: value'"));
}

#[test]
fn limit_request_reports_rejection() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    dojokit()
        .args(["limit", "request", "/api/auth/sign-in"])
        .args(["-H", "x-forwarded-for: 203.0.113.7", "-c", "6", "--format", "table"])
        .arg("--config")
        .arg(temp.path().join("missing.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("429"))
        .stdout(predicate::str::contains("retry-after"))
        .stdout(predicate::str::contains("Too Many Requests"));

    Ok(())
}

#[test]
fn member_list_requires_org() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "api_key: sk_test\n");

    dojokit()
        .args(["member", "list"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Organization not configured"));

    Ok(())
}

#[test]
fn member_list_requires_api_key() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "org_id: org_1\n");

    dojokit()
        .args(["member", "list"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key not configured"));

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn member_list_reads_active_org() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let api_host = server.url();

    let members = server
        .mock("GET", "/api/orgs/override-org/members")
        .match_header("authorization", "Bearer sk_test")
        .with_status(200)
        .with_body(
            r#"{"data": [
                {"id": "mem_1", "firstName": "Ada", "lastName": "Lovelace", "status": "active"},
                {"id": "mem_2", "firstName": "Grace", "lastName": "Hopper", "status": "trial"}
            ]}"#,
        )
        .expect(1)
        .create();

    let temp = tempdir()?;
    let config_path = default_config(temp.path(), "config-org");

    let assert = dojokit()
        .args(["member", "list", "--format", "json", "--org", "override-org"])
        .arg("--config")
        .arg(&config_path)
        .env("DOJOKIT_API_HOST", &api_host)
        .assert()
        .success();

    members.assert();
    let output = json_stdout(assert.get_output());
    let names: Vec<&str> = output["data"]
        .as_array()
        .expect("data array")
        .iter()
        .filter_map(|row| row["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Ada Lovelace", "Grace Hopper"]);

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn member_list_applies_limit() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let api_host = server.url();

    let _members = server
        .mock("GET", "/api/orgs/org_1/members")
        .with_status(200)
        .with_body(
            r#"{"data": [
                {"id": "mem_1", "firstName": "Ada", "lastName": "Lovelace", "status": "active"},
                {"id": "mem_2", "firstName": "Grace", "lastName": "Hopper", "status": "active"}
            ]}"#,
        )
        .create();

    let temp = tempdir()?;
    let config_path = default_config(temp.path(), "org_1");

    let assert = dojokit()
        .args(["member", "list", "-n", "1", "--format", "json"])
        .arg("--config")
        .arg(&config_path)
        .env("DOJOKIT_API_HOST", &api_host)
        .assert()
        .success();

    let output = json_stdout(assert.get_output());
    assert_eq!(output["data"].as_array().map(Vec::len), Some(1));

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn dashboard_failure_reports_error() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let api_host = server.url();

    let _stats = server
        .mock("GET", "/api/orgs/org_1/dashboard")
        .with_status(503)
        .with_body("maintenance")
        .create();

    let temp = tempdir()?;
    let config_path = default_config(temp.path(), "org_1");

    dojokit()
        .arg("dashboard")
        .arg("--config")
        .arg(&config_path)
        .env("DOJOKIT_API_HOST", &api_host)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load dashboard stats"))
        .stderr(predicate::str::contains("maintenance"));

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn member_add_posts_new_member() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let api_host = server.url();

    let create = server
        .mock("POST", "/api/orgs/org_1/members")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "firstName": "Lin",
            "lastName": "Kuei"
        })))
        .with_status(201)
        .with_body(r#"{"data": {"id": "mem_9", "firstName": "Lin", "lastName": "Kuei", "status": "active"}}"#)
        .create();

    let temp = tempdir()?;
    let config_path = default_config(temp.path(), "org_1");

    dojokit()
        .args(["member", "add", "--first-name", "Lin", "--last-name", "Kuei"])
        .arg("--config")
        .arg(&config_path)
        .env("DOJOKIT_API_HOST", &api_host)
        .assert()
        .success()
        .stdout(predicate::str::contains("Added"))
        .stdout(predicate::str::contains("mem_9"));

    create.assert();
    Ok(())
}

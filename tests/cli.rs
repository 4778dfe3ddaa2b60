use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::str::contains;
use serde_json::json;

fn cmd(bin: &str) -> Command {
    Command::cargo_bin(bin).unwrap()
}

#[test]
fn rules_help_lists_variant_flags() {
    cmd("accept_risk_rules")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--no-severity"))
        .stdout(contains("--no-repo-name"));
}

#[test]
fn missing_config_fails_with_template() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    for bin in ["accept_risk_rules", "list_users"] {
        cmd(bin)
            .arg("--config")
            .arg(&config)
            .assert()
            .failure()
            .stderr(contains("[security_center]"));
    }
}

#[test]
fn malformed_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[security_center]\nhost = \"10.0.0.1\"\n").unwrap();
    cmd("list_users")
        .args(["--csv", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(contains("config error"));
}

#[test]
fn csv_and_json_are_exclusive() {
    cmd("list_users")
        .args(["--csv", "--json"])
        .assert()
        .failure();
}

#[test]
fn no_rules_exits_clean_without_a_report() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/rest/token");
        then.status(200)
            .json_body(json!({"response": {"token": "77"}, "error_code": 0}));
    });
    let rules = server.mock(|when, then| {
        when.method(GET).path("/rest/acceptRiskRule");
        then.status(200)
            .json_body(json!({"response": [], "error_code": 0}));
    });
    server.mock(|when, then| {
        when.method(DELETE).path("/rest/token");
        then.status(200).json_body(json!({"response": {}, "error_code": 0}));
    });

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        format!(
            "[security_center]\nhost = {:?}\nusername = \"auditor\"\npassword = \"secret\"\nreport_dir = {:?}\n",
            server.base_url(),
            out.display().to_string()
        ),
    )
    .unwrap();

    cmd("accept_risk_rules")
        .env_remove("RUST_LOG")
        .env_remove("SC_HOST")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(contains("no accept risk rules found"));
    rules.assert();
    assert!(!out.join("accept_risk_rules.xml").exists());
    assert!(std::fs::read_dir(&out).map(|d| d.count() == 0).unwrap_or(true));
}

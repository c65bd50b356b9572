//! End-to-end tests of the `pillar` binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

const CURVES: &str = r#"
[[curves]]
name = "USD"
base_date = "2025-01-02"

[[curves.instruments]]
type = "deposit"
tenor = "3M"
rate = 0.0027

[[curves.instruments]]
type = "deposit"
tenor = "6M"
rate = 0.0043

[[curves.instruments]]
type = "swap"
tenor = "2Y"
rate = 0.0065

[[curves]]
name = "VOL"
kind = "volatility"
base_date = "2025-01-02"
discount_curve = "USD"

[[curves.instruments]]
type = "cap"
tenor = "2Y"
strike = 0.005
vol = 0.4
"#;

fn config_file(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn pillar() -> Command {
    let mut cmd = Command::cargo_bin("pillar").unwrap();
    cmd.env_remove("PILLAR_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_validate_ok() {
    let file = config_file(CURVES, ".toml");
    pillar()
        .args(["validate", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 curve(s) in 2 build level(s)"));
}

#[test]
fn test_validate_reports_errors() {
    let file = config_file(
        r#"
        [[curves]]
        name = "USD"
        base_date = "2025-01-02"
        "#,
        ".toml",
    );
    pillar()
        .args(["validate", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("curves[0].instruments"))
        .stderr(predicate::str::contains("1 validation error(s)"));
}

#[test]
fn test_bootstrap_table() {
    let file = config_file(CURVES, ".toml");
    pillar()
        .args(["bootstrap", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Bootstrapped Curves"))
        .stdout(predicate::str::contains("2027-01-02"))
        .stdout(predicate::str::contains("VOL"));
}

#[test]
fn test_bootstrap_report_csv() {
    let file = config_file(CURVES, ".toml");
    pillar()
        .args(["bootstrap", "--report", "--curve", "USD", "--format", "csv", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "curve,instrument,maturity,value,error,resolution",
        ))
        .stdout(predicate::str::contains("USD,DEP-3M,2025-04-02"))
        .stdout(predicate::str::contains("SWP-2Y"))
        .stdout(predicate::str::contains("VOL").not());
}

#[test]
fn test_bootstrap_from_env_json() {
    let json = r#"{ "curves": [ {
        "name": "EUR",
        "base_date": "2025-01-02",
        "instruments": [ { "type": "deposit", "tenor": "6M", "rate": 0.03 } ]
    } ] }"#;
    let file = config_file(json, ".json");
    pillar()
        .env("PILLAR_CONFIG", file.path())
        .args(["--format", "json", "bootstrap"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"curve\": \"EUR\""))
        .stdout(predicate::str::contains("2025-07-02"));
}

#[test]
fn test_query_discount_factor_minimal() {
    let file = config_file(CURVES, ".toml");
    pillar()
        .args(["query", "--curve", "USD", "--measure", "df", "-f", "minimal"])
        .args(["--dates", "2025-01-02,2025-04-02", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1\n"));
}

#[test]
fn test_query_zero_rate_of_volatility_curve_fails() {
    let file = config_file(CURVES, ".toml");
    pillar()
        .args(["query", "--curve", "VOL", "--measure", "zero", "--dates", "2026-01-02"])
        .arg("--config")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("only discount curves have zero rates"));
}

#[test]
fn test_unknown_curve_fails() {
    let file = config_file(CURVES, ".toml");
    pillar()
        .args(["query", "--curve", "GBP", "--dates", "2026-01-02", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("GBP"));
}

#[test]
fn test_unsupported_format_fails() {
    let file = config_file(CURVES, ".yaml");
    pillar()
        .args(["bootstrap", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported configuration format"));
}

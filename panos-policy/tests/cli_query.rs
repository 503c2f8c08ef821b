use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn policy() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("panos-policy"));
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn firewall_query_by_zone_and_port() {
    policy()
        .arg("--config")
        .arg(fixture("fixtures/firewall-running.xml"))
        .args([
            "query",
            "--source-zone",
            "trust",
            "--destination-port",
            "443",
            "--protocol",
            "tcp",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("allow allow-web"))
        .stdout(predicate::str::contains("allow-dns").not())
        .stdout(predicate::str::contains("browse-app-default").not())
        .stdout(predicate::str::contains("1 of 4 rules matched"));
}

#[test]
fn firewall_query_resolves_groups_and_shared_objects() {
    policy()
        .arg("--config")
        .arg(fixture("fixtures/firewall-running.xml"))
        .args([
            "query",
            "--source-ip",
            "10.0.0.15",
            "--destination-ip",
            "8.8.8.8",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("allow-dns"))
        .stdout(predicate::str::contains("browse-app-default"))
        .stdout(predicate::str::contains("2 of 4 rules matched"));
}

#[test]
fn literal_network_in_rule_source_matches() {
    policy()
        .arg("--config")
        .arg(fixture("fixtures/firewall-running.xml"))
        .args(["query", "--source-ip", "192.168.50.7", "--source-zone", "untrust"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deny block-legacy"))
        .stdout(predicate::str::contains("2 of 4 rules matched"));
}

#[test]
fn tag_query_keeps_scanning_after_first_hit() {
    policy()
        .arg("--config")
        .arg(fixture("fixtures/firewall-running.xml"))
        .args(["query", "--tag", "web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("allow-web"))
        .stdout(predicate::str::contains("block-legacy"))
        .stdout(predicate::str::contains("2 of 4 rules matched"));
}

#[test]
fn source_port_query_uses_service_source_range() {
    policy()
        .arg("--config")
        .arg(fixture("fixtures/firewall-running.xml"))
        .args(["query", "--source-port", "5000", "--protocol", "udp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("allow-dns"))
        .stdout(predicate::str::contains("block-legacy"))
        .stdout(predicate::str::contains("allow-web").not())
        .stdout(predicate::str::contains("2 of 4 rules matched"));

    policy()
        .arg("--config")
        .arg(fixture("fixtures/firewall-running.xml"))
        .args(["query", "--source-port", "1024", "--protocol", "udp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("allow-dns").not())
        .stdout(predicate::str::contains("1 of 4 rules matched"));
}

#[test]
fn zero_hits_is_a_failure() {
    policy()
        .arg("--config")
        .arg(fixture("fixtures/firewall-running.xml"))
        .args([
            "query",
            "--source-zone",
            "trust",
            "--destination-port",
            "9999",
            "--protocol",
            "tcp",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching rules found."));
}

#[test]
fn malformed_port_fails_the_query() {
    policy()
        .arg("--config")
        .arg(fixture("fixtures/firewall-running.xml"))
        .args(["query", "--destination-port", "http", "--protocol", "tcp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid port 'http'"));
}

#[test]
fn port_without_protocol_is_rejected() {
    policy()
        .arg("--config")
        .arg(fixture("fixtures/firewall-running.xml"))
        .args(["query", "--destination-port", "443"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--protocol"));
}

#[test]
fn unknown_device_group_is_reported() {
    policy()
        .arg("--config")
        .arg(fixture("fixtures/panorama-running.xml"))
        .args(["--devicegroup", "DeviceGroupA", "query"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "'DeviceGroupA' device group not found in Panorama. Is the name correct?",
        ));
}

#[test]
fn device_group_query_prefers_global_objects() {
    policy()
        .arg("--config")
        .arg(fixture("fixtures/panorama-running.xml"))
        .args([
            "--devicegroup",
            "DeviceGroupB",
            "query",
            "--source-ip",
            "10.99.1.1",
            "--source-zone",
            "trust",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("dg-deny-all"))
        .stdout(predicate::str::contains("dg-allow-admin").not())
        .stdout(predicate::str::contains("1 of 2 rules matched"));
}

#[test]
fn device_group_query_json_output() {
    let output = policy()
        .arg("--config")
        .arg(fixture("fixtures/panorama-running.xml"))
        .args([
            "--devicegroup",
            "DeviceGroupB",
            "--format",
            "json",
            "query",
            "--source-ip",
            "172.16.5.5",
            "--destination-port",
            "22",
            "--protocol",
            "tcp",
        ])
        .output()
        .expect("run");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["matched"], 2);
    assert_eq!(report["total"], 2);
    assert_eq!(report["msg"], "2 of 2 rules matched");
    let entries = report["rules"]["security"]["rules"]["entry"]
        .as_array()
        .expect("entries");
    assert_eq!(entries[0]["@name"], "dg-allow-admin");
    assert_eq!(entries[1]["@name"], "dg-deny-all");
}

#[test]
fn panorama_without_device_group_uses_shared_rulebase() {
    policy()
        .arg("--config")
        .arg(fixture("fixtures/panorama-running.xml"))
        .args(["query", "--source-ip", "172.16.1.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shared pre-rulebase"))
        .stdout(predicate::str::contains("shared-allow-ssh"))
        .stdout(predicate::str::contains("1 of 1 rules matched"));
}

#[test]
fn config_file_without_extension_is_opened() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::copy(
        fixture("fixtures/firewall-running.xml"),
        dir.path().join("running-config"),
    )
    .expect("copy fixture");

    policy()
        .current_dir(dir.path())
        .args(["--config", "running-config", "query", "--tag", "infra"])
        .assert()
        .success()
        .stdout(predicate::str::contains("allow-dns"))
        .stdout(predicate::str::contains("1 of 4 rules matched"));
}

#[test]
fn management_address_is_an_unsupported_transport() {
    policy()
        .args(["--ip-address", "10.5.172.91", "--password", "secret", "query"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported transport"))
        .stderr(predicate::str::contains("secret").not());
}

#[test]
fn missing_device_is_reported() {
    policy()
        .arg("query")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no device configured"));
}

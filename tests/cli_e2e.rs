//! End-to-end CLI tests for the sticker-downloader binary.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Binary isolated from the user's config file and session token.
fn sticker_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sticker-downloader").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.join("config"))
        .env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("SESSDATA")
        .env_remove("RUST_LOG");
    cmd
}

fn write_catalog(dir: &Path, document: &Value) -> std::path::PathBuf {
    let file = dir.join("panel.json");
    std::fs::write(&file, serde_json::to_vec(document).unwrap()).unwrap();
    file
}

fn two_pack_catalog(base: &str) -> Value {
    json!({
        "data": {
            "all_packages": [
                {"text": "Pack A", "emote": [
                    {"text": "smile", "url": format!("{base}/a.png")}
                ]},
                {"text": "Pack B", "emote": [
                    {"text": "wave", "url": format!("{base}/b.png"), "gif_url": format!("{base}/b.gif")}
                ]}
            ]
        }
    })
}

#[test]
fn test_binary_help_displays_usage() {
    let home = TempDir::new().unwrap();
    sticker_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sticker pack"));
}

#[test]
fn test_binary_version_displays_version() {
    let home = TempDir::new().unwrap();
    sticker_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sticker-downloader"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let home = TempDir::new().unwrap();
    sticker_cmd(home.path())
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_list_prints_numbered_packs() {
    let home = TempDir::new().unwrap();
    let catalog = write_catalog(home.path(), &two_pack_catalog("https://cdn.example"));

    sticker_cmd(home.path())
        .arg("--list")
        .arg("--catalog-file")
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Pack A"))
        .stdout(predicate::str::contains("2. Pack B"));
}

#[test]
fn test_missing_session_token_fails_before_network() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("out");

    sticker_cmd(home.path())
        .arg("--catalog-url")
        .arg("http://127.0.0.1:9/panel")
        .arg("-o")
        .arg(&out)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("SESSDATA"));

    assert!(!out.exists());
}

#[test]
fn test_malformed_catalog_file_is_fatal() {
    let home = TempDir::new().unwrap();
    let catalog = write_catalog(home.path(), &json!({"data": {"all_packages": "nope"}}));

    sticker_cmd(home.path())
        .arg("--catalog-file")
        .arg(&catalog)
        .arg("-o")
        .arg(home.path().join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("all_packages"));
}

#[test]
fn test_catalog_pack_name_outside_output_dir_is_fatal() {
    let home = TempDir::new().unwrap();
    let escape = home.path().join("escaped");
    let catalog = write_catalog(
        home.path(),
        &json!({"data": {"all_packages": [
            {"text": escape.to_str().unwrap(), "emote": [
                {"text": "smile", "url": "http://127.0.0.1:9/a.png"}
            ]}
        ]}}),
    );

    sticker_cmd(home.path())
        .arg("--catalog-file")
        .arg(&catalog)
        .arg("-o")
        .arg(home.path().join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("data.all_packages[0].text"));

    assert!(!escape.exists());
}

#[test]
fn test_pack_number_out_of_range_is_fatal() {
    let home = TempDir::new().unwrap();
    let catalog = write_catalog(home.path(), &two_pack_catalog("https://cdn.example"));

    sticker_cmd(home.path())
        .arg("--catalog-file")
        .arg(&catalog)
        .arg("--pack")
        .arg("5")
        .arg("-o")
        .arg(home.path().join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no pack number 5"));
}

#[test]
fn test_invalid_config_file_reports_line() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join("config").join("sticker-downloader");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "read_timeout_secs = 0\n").unwrap();

    sticker_cmd(home.path())
        .arg("--list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("read_timeout_secs"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_download_all_packs_from_catalog_file() {
    let server = MockServer::start().await;
    for (route, body) in [("/a.png", "A"), ("/b.png", "B"), ("/b.gif", "G")] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
    }
    let home = TempDir::new().unwrap();
    let catalog = write_catalog(home.path(), &two_pack_catalog(&server.uri()));
    let out = home.path().join("out");

    let mut cmd = sticker_cmd(home.path());
    cmd.arg("--catalog-file").arg(&catalog).arg("-o").arg(&out);
    tokio::task::spawn_blocking(move || {
        cmd.assert().success();
    })
    .await
    .unwrap();

    assert_eq!(std::fs::read_to_string(out.join("Pack A/smile.png")).unwrap(), "A");
    assert_eq!(std::fs::read_to_string(out.join("Pack B/wave.png")).unwrap(), "B");
    assert_eq!(std::fs::read_to_string(out.join("Pack B/wave.gif")).unwrap(), "G");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_download_single_selected_pack() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("A"))
        .expect(0)
        .mount(&server)
        .await;
    for route in ["/b.png", "/b.gif"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string("B"))
            .mount(&server)
            .await;
    }
    let home = TempDir::new().unwrap();
    let catalog = write_catalog(home.path(), &two_pack_catalog(&server.uri()));
    let out = home.path().join("out");

    let mut cmd = sticker_cmd(home.path());
    cmd.arg("--catalog-file")
        .arg(&catalog)
        .arg("-p")
        .arg("2")
        .arg("-o")
        .arg(&out);
    tokio::task::spawn_blocking(move || {
        cmd.assert().success();
    })
    .await
    .unwrap();

    assert!(out.join("Pack B/wave.png").exists());
    assert!(!out.join("Pack A").exists());
}

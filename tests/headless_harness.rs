//! Headless mode process-level integration harness.
//!
//! Runs the compiled `wpick` binary with `--query` against the fake REST
//! server and checks what a calling script would observe: JSON lines on
//! stdout and the exit status.
//!
//! `XDG_CONFIG_HOME` points at a temp dir so the user's config is never
//! read or created.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::process::Output;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;

async fn wpick(config_home: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wpick"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG")
        .kill_on_drop(true)
        .output()
        .await
        .expect("spawn wpick")
}

fn json_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| serde_json::from_str(l).expect("stdout line is JSON"))
        .collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn query_prints_matching_posts() {
    let api = FakeWpApi::start().await.unwrap();
    api.add_records("posts", sample_posts()).await;
    let home = TempDir::new().unwrap();

    let out = wpick(&home, &["--site", &api.base_url(), "--query", "cat"]).await;

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        json_lines(&out),
        vec![
            json!({ "id": 2, "label": "Cats of the internet" }),
            json!({ "id": 3, "label": "Caring for your cat" }),
        ]
    );
    assert!(home.path().join("wpick/config.toml").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn taxonomy_flag_searches_terms() {
    let api = FakeWpApi::start().await.unwrap();
    api.add_records("tags", vec![term(30, "rustlang", "post_tag")]).await;
    let home = TempDir::new().unwrap();

    let out = wpick(
        &home,
        &["--site", &api.base_url(), "--taxonomy", "post_tag", "--query", "rust", "--per-page", "7"],
    )
    .await;

    assert!(out.status.success());
    assert_eq!(json_lines(&out), vec![json!({ "id": 30, "label": "rustlang" })]);
    let requests = api.requests().await;
    assert_eq!(requests[0].route, "tags");
    assert_eq!(requests[0].per_page, Some(7));
}

#[tokio::test(flavor = "multi_thread")]
async fn server_error_is_soft() {
    let api = FakeWpApi::start().await.unwrap();
    api.fail_with("pages", 500).await;
    let home = TempDir::new().unwrap();

    let out = wpick(&home, &["--site", &api.base_url(), "--kind", "pages", "--query", "x"]).await;

    assert!(out.status.success());
    assert!(out.stdout.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn short_term_query_makes_no_request() {
    let api = FakeWpApi::start().await.unwrap();
    let home = TempDir::new().unwrap();

    let out = wpick(&home, &["--site", &api.base_url(), "--kind", "terms", "--query", "ne"]).await;

    assert!(out.status.success());
    assert!(out.stdout.is_empty());
    assert!(api.requests().await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn https_site_is_rejected() {
    let home = TempDir::new().unwrap();

    let out = wpick(&home, &["--site", "https://example.com", "--query", "x"]).await;

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("https://example.com"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unsearchable_config_still_answers_query() {
    let api = FakeWpApi::start().await.unwrap();
    api.add_records("posts", sample_posts()).await;
    let home = TempDir::new().unwrap();
    let config = home.path().join("picker.toml");
    std::fs::write(&config, "[picker]\nsearchable = false\ndisabled = true\n").unwrap();

    let out = tokio::time::timeout(
        Duration::from_secs(30),
        wpick(
            &home,
            &["--site", &api.base_url(), "--config", config.to_str().unwrap(), "--query", "cat"],
        ),
    )
    .await
    .expect("headless run must not hang");

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(json_lines(&out).len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn taxonomy_with_post_kind_is_rejected() {
    let home = TempDir::new().unwrap();

    let out = wpick(
        &home,
        &["--site", "http://127.0.0.1:9", "--kind", "posts", "--taxonomy", "post_tag", "--query", "x"],
    )
    .await;

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("--taxonomy"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unusable_stored_attribute_is_ignored() {
    let api = FakeWpApi::start().await.unwrap();
    api.add_records("posts", sample_posts()).await;
    let home = TempDir::new().unwrap();
    let attrs = home.path().join("attrs.json");
    std::fs::write(&attrs, r#"{"selectedOption": "not an array"}"#).unwrap();

    let out = wpick(
        &home,
        &["--site", &api.base_url(), "--attributes", attrs.to_str().unwrap(), "--query", "cat"],
    )
    .await;

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(json_lines(&out).len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn attributes_file_that_is_not_json_is_an_error() {
    let home = TempDir::new().unwrap();
    let attrs = home.path().join("attrs.json");
    std::fs::write(&attrs, "{selectedOption: [").unwrap();

    let out = wpick(
        &home,
        &["--site", "http://127.0.0.1:9", "--attributes", attrs.to_str().unwrap(), "--query", "x"],
    )
    .await;

    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
}

// SPDX-License-Identifier: Apache-2.0

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use axum::routing::get;
use axum::{Json, Router};
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

/// Builds a command isolated from the user's configuration and tokens.
fn isolated(config_home: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("forgestat");
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("FORGESTAT_TOKEN")
        .env_remove("FORGESTAT_PROVIDER__USERNAME")
        .env_remove("FORGESTAT_PROVIDER__KIND")
        .env_remove("GH_TOKEN")
        .env_remove("GITHUB_TOKEN")
        .env_remove("GITLAB_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_version() {
    let mut cmd = cargo_bin_cmd!("forgestat");
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("forgestat"));
}

#[test]
fn test_help_contains_all_commands() {
    let mut cmd = cargo_bin_cmd!("forgestat");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("summary"))
        .stdout(predicate::str::contains("profile"))
        .stdout(predicate::str::contains("repos"))
        .stdout(predicate::str::contains("languages"))
        .stdout(predicate::str::contains("contributions"))
        .stdout(predicate::str::contains("browse"));
}

#[test]
fn test_missing_username_fails() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .arg("profile")
        .assert()
        .failure()
        .stderr(predicate::str::contains("username is required"))
        .stderr(predicate::str::contains("Tip: Pass --user"));
}

#[test]
fn test_invalid_provider_rejected() {
    let mut cmd = cargo_bin_cmd!("forgestat");
    cmd.args(["--provider", "bitbucket", "profile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bitbucket"));
}

#[test]
fn test_browse_requires_repository() {
    let mut cmd = cargo_bin_cmd!("forgestat");
    cmd.args(["browse", "commits"]).assert().failure();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_repos_json_output() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let languages_url = format!("{base}/repos/octocat/hello/languages");
    let app = Router::new().route(
        "/users/{login}/repos",
        get(move || {
            let languages_url = languages_url.clone();
            async move {
                Json(json!([{
                    "id": 1,
                    "name": "hello",
                    "full_name": "octocat/hello",
                    "description": "Hello world",
                    "language": "Rust",
                    "stargazers_count": 1500,
                    "forks_count": 2,
                    "updated_at": "2024-01-01T00:00:00Z",
                    "html_url": "https://github.com/octocat/hello",
                    "languages_url": languages_url,
                    "size": 100,
                    "default_branch": "main"
                }]))
            }
        }),
    );
    tokio::spawn(async move { axum::serve(listener, app).await });

    let home = TempDir::new().unwrap();
    let mut cmd = isolated(&home);
    cmd.env("FORGESTAT_TOKEN", "test-token").args([
        "repos",
        "--user",
        "octocat",
        "--base-url",
        &base,
        "--output",
        "json",
    ]);
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();
    assert!(output.status.success(), "repos should succeed: {output:?}");

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let repos = parsed["repos"].as_array().expect("repos should be an array");
    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0]["name"], "hello");
    assert_eq!(repos[0]["stars"], 1500);
    assert_eq!(parsed["sort"], "recency");
}

use assert_cmd::Command;
use mockito::{Matcher, Server, ServerGuard};
use predicates::prelude::*;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

/// A stand-in `claude` that drains stdin and prints `$FAKE_CLAUDE_RESPONSE`.
#[cfg(unix)]
fn fake_claude() -> &'static Path {
    static SCRIPT: OnceLock<(TempDir, PathBuf)> = OnceLock::new();
    let (_, path) = SCRIPT.get_or_init(|| {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("claude");
        std::fs::write(
            &path,
            "#!/bin/sh\ncat > /dev/null\nprintf '%s' \"$FAKE_CLAUDE_RESPONSE\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        (dir, path)
    });
    path
}

fn tshirts(server: &ServerGuard) -> Command {
    let mut cmd = Command::cargo_bin("tshirts").unwrap();
    cmd.env("GITHUB_API_URL", server.url())
        .env("GITHUB_TOKEN", "test-token")
        .env_remove("TSHIRTS_REPO")
        .env_remove("TSHIRTS_MODEL")
        .env_remove("RUST_LOG")
        .args(["--repo", "octo/widgets"]);
    cmd
}

fn mock_repo(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("GET", "/repos/octo/widgets")
        .with_status(200)
        .with_body(r#"{"full_name":"octo/widgets"}"#)
        .create()
}

fn issue_json(number: u64, title: &str, labels: &[&str]) -> Value {
    json!({
        "number": number,
        "title": title,
        "body": "",
        "state": "open",
        "labels": labels.iter().map(|l| json!({ "name": l })).collect::<Vec<_>>(),
    })
}

#[test]
fn invalid_size_fails_before_any_request() {
    let server = Server::new();
    tshirts(&server)
        .args(["label", "1", "XXL"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid size: XXL"));
}

#[test]
fn missing_token_is_reported() {
    let server = Server::new();
    tshirts(&server)
        .env_remove("GITHUB_TOKEN")
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GITHUB_TOKEN"));
}

#[test]
fn unknown_issue_is_not_found() {
    let mut server = Server::new();
    let _repo = mock_repo(&mut server);
    let _issue = server
        .mock("GET", "/repos/octo/widgets/issues/99")
        .with_status(404)
        .with_body(r#"{"message":"Not Found"}"#)
        .create();

    tshirts(&server)
        .args(["label", "99", "M"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn unknown_repository_is_reported() {
    let mut server = Server::new();
    let _repo = server
        .mock("GET", "/repos/octo/widgets")
        .with_status(404)
        .with_body(r#"{"message":"Not Found"}"#)
        .create();

    tshirts(&server)
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("octo/widgets"));
}

#[test]
fn list_json_skips_pull_requests() {
    let mut server = Server::new();
    let _repo = mock_repo(&mut server);
    let mut pr = issue_json(3, "A PR", &[]);
    pr["pull_request"] = json!({});
    let _issues = server
        .mock("GET", "/repos/octo/widgets/issues")
        .match_query(Matcher::UrlEncoded("state".into(), "open".into()))
        .with_status(200)
        .with_body(json!([issue_json(1, "Login", &["size: S"]), pr]).to_string())
        .create();

    let output = tshirts(&server).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let issues: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(issues.as_array().unwrap().len(), 1);
    assert_eq!(issues[0]["title"], "Login");
}

#[cfg(unix)]
#[test]
fn estimate_yes_labels_with_suggested_size() {
    let mut server = Server::new();
    let _repo = mock_repo(&mut server);
    let _issues = server
        .mock("GET", "/repos/octo/widgets/issues")
        .match_query(Matcher::UrlEncoded("state".into(), "open".into()))
        .with_status(200)
        .with_body(json!([issue_json(1, "Migrate DB", &[])]).to_string())
        .create();
    let _labels = server
        .mock("GET", "/repos/octo/widgets/labels")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!([
                { "name": "size: XS" },
                { "name": "size: S" },
                { "name": "size: M" },
                { "name": "size: L" },
                { "name": "size: XL" }
            ])
            .to_string(),
        )
        .create();
    let _issue = server
        .mock("GET", "/repos/octo/widgets/issues/1")
        .with_status(200)
        .with_body(issue_json(1, "Migrate DB", &[]).to_string())
        .create();
    let add = server
        .mock("POST", "/repos/octo/widgets/issues/1/labels")
        .match_body(Matcher::Json(json!({ "labels": ["size: L"] })))
        .with_status(200)
        .with_body("[]")
        .create();

    tshirts(&server)
        .env("TSHIRTS_CLAUDE_BIN", fake_claude())
        .env(
            "FAKE_CLAUDE_RESPONSE",
            r#"{"type":"result","structured_output":{"size":"L"}}"#,
        )
        .args(["estimate", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("  Suggested: L"))
        .stdout(predicate::str::contains("1 labeled, 0 skipped"));
    add.assert();
}

#[test]
fn mcp_answers_initialize_and_lists_tools() {
    let server = Server::new();
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        "\n",
    );
    let output = tshirts(&server)
        .env_remove("GITHUB_TOKEN")
        .arg("mcp")
        .write_stdin(input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let responses: Vec<Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "tshirts");
    let tools = responses[1]["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 11);
}

#[test]
fn mcp_tool_without_token_is_error_result() {
    let server = Server::new();
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"estimate_issue","arguments":{"repo":"octo/widgets","issue_number":1}}}"#,
        "\n",
    );
    let output = tshirts(&server)
        .env_remove("GITHUB_TOKEN")
        .arg("mcp")
        .write_stdin(input)
        .output()
        .unwrap();

    let response: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(response["result"]["isError"], true);
    assert!(response["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("GITHUB_TOKEN"));
}

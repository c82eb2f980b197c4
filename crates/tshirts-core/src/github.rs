use std::collections::HashSet;
use std::sync::OnceLock;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::config::GitHubConfig;
use crate::error::{Result, TshirtsError};
use crate::repo::RepoRef;
use crate::store::IssueStore;
use crate::types::{Issue, IssueState, Size};

const PER_PAGE: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GhLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GhIssue {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    labels: Vec<GhLabel>,
    #[serde(default)]
    state: IssueState,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

impl GhIssue {
    fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

impl From<GhIssue> for Issue {
    fn from(gh: GhIssue) -> Self {
        Issue {
            number: gh.number,
            title: gh.title,
            body: gh.body.unwrap_or_default(),
            labels: gh.labels.into_iter().map(|l| l.name).collect(),
            state: gh.state,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GhRepo {
    full_name: String,
}

// ---------------------------------------------------------------------------
// GitHubClient
// ---------------------------------------------------------------------------

/// [`IssueStore`] backed by the GitHub REST API for one repository.
pub struct GitHubClient {
    http: Client,
    api_base: String,
    repo: RepoRef,
    labels_ready: OnceLock<()>,
}

fn http_client(token: &str) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static("tshirts"));
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(
        "x-github-api-version",
        HeaderValue::from_static("2022-11-28"),
    );
    let auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
        .map_err(|_| TshirtsError::MissingToken)?;
    headers.insert(header::AUTHORIZATION, auth);

    Ok(Client::builder()
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

fn require_token(config: &GitHubConfig) -> Result<&str> {
    config
        .token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or(TshirtsError::MissingToken)
}

/// Pull the `message` field out of a GitHub error body, falling back to the
/// raw text.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => body.chars().take(500).collect(),
    }
}

fn send(operation: &str, request: RequestBuilder) -> Result<Response> {
    let response = request.send()?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(TshirtsError::GitHub {
        operation: operation.to_string(),
        status: status.as_u16(),
        message: error_message(&body),
    })
}

fn send_json<T: DeserializeOwned>(operation: &str, request: RequestBuilder) -> Result<T> {
    Ok(send(operation, request)?.json()?)
}

impl GitHubClient {
    /// Build a client without touching the network.
    pub fn new(api_base: &str, token: &str, repo: RepoRef) -> Result<Self> {
        Ok(Self {
            http: http_client(token)?,
            api_base: api_base.trim_end_matches('/').to_string(),
            repo,
            labels_ready: OnceLock::new(),
        })
    }

    /// Build a client and verify the repository is reachable.
    pub fn connect(config: &GitHubConfig, repo: RepoRef) -> Result<Self> {
        let token = require_token(config)?;
        let client = Self::new(&config.api_base, token, repo)?;
        let request = client.http.get(client.repo_url(""));
        match send("get repository", request) {
            Ok(_) => Ok(client),
            Err(TshirtsError::GitHub { status: 404, .. }) => {
                tracing::debug!(repo = %client.repo, "repository lookup returned 404");
                Err(TshirtsError::RepoNotFound(client.repo.full_name()))
            }
            Err(e) => Err(e),
        }
    }

    /// Full names of the repositories visible to the token's owner, most
    /// recently updated first.
    pub fn list_user_repos(config: &GitHubConfig) -> Result<Vec<String>> {
        let token = require_token(config)?;
        let http = http_client(token)?;
        let url = format!(
            "{}/user/repos?sort=updated&per_page={PER_PAGE}",
            config.api_base.trim_end_matches('/')
        );
        let repos: Vec<GhRepo> = send_json("list repositories", http.get(url))?;
        Ok(repos.into_iter().map(|r| r.full_name).collect())
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}{path}",
            self.api_base, self.repo.owner, self.repo.name
        )
    }

    fn list_issues(&self, state: &str) -> Result<Vec<Issue>> {
        let mut page = 1_u32;
        let mut issues = Vec::new();
        loop {
            let url = self.repo_url(&format!(
                "/issues?state={state}&per_page={PER_PAGE}&page={page}"
            ));
            let chunk: Vec<GhIssue> = send_json("list issues", self.http.get(url))?;
            let chunk_len = chunk.len();
            issues.extend(
                chunk
                    .into_iter()
                    .filter(|i| !i.is_pull_request())
                    .map(Issue::from),
            );
            if chunk_len < PER_PAGE {
                break;
            }
            page = page.saturating_add(1);
        }
        Ok(issues)
    }

    fn list_label_names(&self) -> Result<HashSet<String>> {
        let mut page = 1_u32;
        let mut names = HashSet::new();
        loop {
            let url = self.repo_url(&format!("/labels?per_page={PER_PAGE}&page={page}"));
            let chunk: Vec<GhLabel> = send_json("list labels", self.http.get(url))?;
            let chunk_len = chunk.len();
            names.extend(chunk.into_iter().map(|l| l.name));
            if chunk_len < PER_PAGE {
                break;
            }
            page = page.saturating_add(1);
        }
        Ok(names)
    }

    fn create_missing_size_labels(&self) {
        let existing = match self.list_label_names() {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(error = %e, "could not list labels; size labels not ensured");
                return;
            }
        };
        for size in Size::all() {
            let name = size.label();
            if existing.contains(&name) {
                continue;
            }
            let request = self
                .http
                .post(self.repo_url("/labels"))
                .json(&json!({ "name": name, "color": size.color() }));
            match send("create label", request) {
                Ok(_) => tracing::debug!(label = %name, "created size label"),
                Err(e) => tracing::warn!(label = %name, error = %e, "could not create size label"),
            }
        }
    }

    fn remove_label(&self, number: u64, name: &str) -> Result<()> {
        let mut url = Url::parse(&self.repo_url(&format!("/issues/{number}/labels")))
            .map_err(|e| TshirtsError::ApiUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| TshirtsError::ApiUrl(self.api_base.clone()))?
            .push(name);
        match send("remove label", self.http.delete(url)) {
            Ok(_) => Ok(()),
            // Already gone.
            Err(TshirtsError::GitHub { status: 404, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl IssueStore for GitHubClient {
    fn get_issue(&self, number: u64) -> Result<Option<Issue>> {
        let url = self.repo_url(&format!("/issues/{number}"));
        let response = self.http.get(url).send()?;
        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::GONE) {
            return Ok(None);
        }
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TshirtsError::GitHub {
                operation: "get issue".into(),
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        let issue: GhIssue = response.json()?;
        if issue.is_pull_request() {
            return Ok(None);
        }
        Ok(Some(issue.into()))
    }

    fn list_open_issues(&self) -> Result<Vec<Issue>> {
        self.list_issues("open")
    }

    fn list_all_issues(&self) -> Result<Vec<Issue>> {
        self.list_issues("all")
    }

    fn apply_size_label(&self, number: u64, size: Size) -> Result<()> {
        self.ensure_size_labels();
        let issue = self.require_issue(number)?;
        let target = size.label();

        for label in &issue.labels {
            if *label != target && Size::from_label(label).is_some() {
                self.remove_label(number, label)?;
            }
        }
        if !issue.labels.contains(&target) {
            let request = self
                .http
                .post(self.repo_url(&format!("/issues/{number}/labels")))
                .json(&json!({ "labels": [target] }));
            send("add label", request)?;
        }
        tracing::debug!(number, size = %size, "applied size label");
        Ok(())
    }

    fn create_issue(&self, title: &str, body: &str, labels: &[String]) -> Result<Issue> {
        if labels.iter().any(|l| Size::from_label(l).is_some()) {
            self.ensure_size_labels();
        }
        let request = self
            .http
            .post(self.repo_url("/issues"))
            .json(&json!({ "title": title, "body": body, "labels": labels }));
        let created: GhIssue = send_json("create issue", request)?;
        tracing::debug!(number = created.number, "created issue");
        Ok(created.into())
    }

    fn update_body(&self, number: u64, body: &str) -> Result<()> {
        let request = self
            .http
            .patch(self.repo_url(&format!("/issues/{number}")))
            .json(&json!({ "body": body }));
        send("update issue", request)?;
        Ok(())
    }

    fn add_comment(&self, number: u64, body: &str) -> Result<()> {
        let request = self
            .http
            .post(self.repo_url(&format!("/issues/{number}/comments")))
            .json(&json!({ "body": body }));
        send("add comment", request)?;
        Ok(())
    }

    fn close_issue(&self, number: u64, comment: Option<&str>) -> Result<()> {
        if let Some(comment) = comment {
            self.add_comment(number, comment)?;
        }
        let request = self
            .http
            .patch(self.repo_url(&format!("/issues/{number}")))
            .json(&json!({ "state": "closed" }));
        send("close issue", request)?;
        Ok(())
    }

    fn ensure_size_labels(&self) {
        self.labels_ready
            .get_or_init(|| self.create_missing_size_labels());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::Value;

    fn client(server: &ServerGuard) -> GitHubClient {
        GitHubClient::new(&server.url(), "test-token", RepoRef::new("octo", "widgets")).unwrap()
    }

    fn issue_json(number: u64, title: &str, body: Option<&str>, labels: &[&str]) -> Value {
        json!({
            "number": number,
            "title": title,
            "body": body,
            "state": "open",
            "labels": labels.iter().map(|l| json!({ "name": l })).collect::<Vec<_>>(),
        })
    }

    fn all_size_labels() -> Value {
        Value::Array(Size::all().iter().map(|s| json!({ "name": s.label() })).collect())
    }

    #[test]
    fn connect_requires_token() {
        let config = GitHubConfig::default();
        let err = GitHubClient::connect(&config, RepoRef::new("o", "r")).err().unwrap();
        assert!(matches!(err, TshirtsError::MissingToken));
    }

    #[test]
    fn connect_reports_unknown_repo() {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/repos/octo/missing")
            .with_status(404)
            .with_body(r#"{"message":"Not Found"}"#)
            .create();
        let config = GitHubConfig {
            api_base: server.url(),
            token: Some("t".into()),
        };
        let err = GitHubClient::connect(&config, RepoRef::new("octo", "missing")).err().unwrap();
        assert!(matches!(err, TshirtsError::RepoNotFound(ref name) if name == "octo/missing"));
    }

    #[test]
    fn sends_auth_and_api_headers() {
        let mut server = Server::new();
        let m = server
            .mock("GET", "/repos/octo/widgets/issues/1")
            .match_header("authorization", "Bearer test-token")
            .match_header("accept", "application/vnd.github+json")
            .match_header("x-github-api-version", "2022-11-28")
            .match_header("user-agent", "tshirts")
            .with_body(issue_json(1, "Hello", None, &[]).to_string())
            .create();
        let issue = client(&server).get_issue(1).unwrap().unwrap();
        m.assert();
        assert_eq!(issue.title, "Hello");
        assert_eq!(issue.body, "");
    }

    #[test]
    fn missing_issue_is_none() {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/repos/octo/widgets/issues/42")
            .with_status(404)
            .create();
        assert_eq!(client(&server).get_issue(42).unwrap(), None);
    }

    #[test]
    fn pull_request_is_not_an_issue() {
        let mut server = Server::new();
        let mut pr = issue_json(7, "PR", Some("x"), &[]);
        pr["pull_request"] = json!({ "url": "https://example.invalid" });
        let _m = server
            .mock("GET", "/repos/octo/widgets/issues/7")
            .with_body(pr.to_string())
            .create();
        assert_eq!(client(&server).get_issue(7).unwrap(), None);
    }

    #[test]
    fn server_error_surfaces_status() {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/repos/octo/widgets/issues/3")
            .with_status(500)
            .with_body(r#"{"message":"boom"}"#)
            .create();
        let err = client(&server).get_issue(3).unwrap_err();
        assert!(matches!(err, TshirtsError::GitHub { status: 500, ref message, .. } if message == "boom"));
    }

    #[test]
    fn listing_skips_pull_requests_and_filters_sizes() {
        let mut server = Server::new();
        let mut pr = issue_json(4, "A PR", None, &[]);
        pr["pull_request"] = json!({});
        let body = json!([
            issue_json(1, "Unsized", Some("a"), &["bug"]),
            issue_json(2, "Tiny", None, &["size: XS"]),
            issue_json(3, "Medium", None, &["size: M"]),
            pr,
        ]);
        let _m = server
            .mock("GET", "/repos/octo/widgets/issues")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("state".into(), "open".into()),
                Matcher::UrlEncoded("per_page".into(), "100".into()),
            ]))
            .with_body(body.to_string())
            .expect_at_least(1)
            .create();
        let client = client(&server);

        let numbers = |issues: Vec<Issue>| issues.iter().map(|i| i.number).collect::<Vec<_>>();
        assert_eq!(numbers(client.list_open_issues().unwrap()), vec![1, 2, 3]);
        assert_eq!(numbers(client.list_unsized_issues().unwrap()), vec![1]);
        assert_eq!(numbers(client.list_groomable_issues().unwrap()), vec![3]);
    }

    #[test]
    fn listing_follows_full_pages() {
        let mut server = Server::new();
        let first: Vec<Value> = (1..=100).map(|n| issue_json(n, "x", None, &[])).collect();
        let second = vec![issue_json(101, "last", None, &[])];
        let _p1 = server
            .mock("GET", "/repos/octo/widgets/issues")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_body(Value::Array(first).to_string())
            .create();
        let _p2 = server
            .mock("GET", "/repos/octo/widgets/issues")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_body(Value::Array(second).to_string())
            .create();
        let issues = client(&server).list_all_issues().unwrap();
        assert_eq!(issues.len(), 101);
        assert_eq!(issues[100].title, "last");
    }

    #[test]
    fn apply_size_label_replaces_old_label() {
        let mut server = Server::new();
        let _labels = server
            .mock("GET", "/repos/octo/widgets/labels")
            .match_query(Matcher::Any)
            .with_body(all_size_labels().to_string())
            .create();
        let _issue = server
            .mock("GET", "/repos/octo/widgets/issues/5")
            .with_body(issue_json(5, "t", None, &["bug", "size: L"]).to_string())
            .create();
        let remove = server
            .mock("DELETE", "/repos/octo/widgets/issues/5/labels/size:%20L")
            .with_body("[]")
            .create();
        let add = server
            .mock("POST", "/repos/octo/widgets/issues/5/labels")
            .match_body(Matcher::Json(json!({ "labels": ["size: S"] })))
            .with_body("[]")
            .create();

        client(&server).apply_size_label(5, Size::S).unwrap();
        remove.assert();
        add.assert();
    }

    #[test]
    fn apply_same_size_twice_writes_nothing() {
        let mut server = Server::new();
        let _labels = server
            .mock("GET", "/repos/octo/widgets/labels")
            .match_query(Matcher::Any)
            .with_body(all_size_labels().to_string())
            .create();
        let _issue = server
            .mock("GET", "/repos/octo/widgets/issues/5")
            .with_body(issue_json(5, "t", None, &["size: M"]).to_string())
            .expect(2)
            .create();
        let add = server
            .mock("POST", "/repos/octo/widgets/issues/5/labels")
            .expect(0)
            .create();
        let remove = server
            .mock("DELETE", Matcher::Regex(r"^/repos/octo/widgets/issues/5/labels/".into()))
            .expect(0)
            .create();

        let client = client(&server);
        client.apply_size_label(5, Size::M).unwrap();
        client.apply_size_label(5, Size::M).unwrap();
        add.assert();
        remove.assert();
    }

    #[test]
    fn missing_size_labels_are_created_once() {
        let mut server = Server::new();
        let list = server
            .mock("GET", "/repos/octo/widgets/labels")
            .match_query(Matcher::Any)
            .with_body(json!([{ "name": "size: XS" }, { "name": "bug" }]).to_string())
            .expect(1)
            .create();
        let creates: Vec<_> = [Size::S, Size::M, Size::L, Size::Xl]
            .iter()
            .map(|size| {
                server
                    .mock("POST", "/repos/octo/widgets/labels")
                    .match_body(Matcher::Json(
                        json!({ "name": size.label(), "color": size.color() }),
                    ))
                    .with_status(201)
                    .with_body("{}")
                    .expect(1)
                    .create()
            })
            .collect();

        let client = client(&server);
        client.ensure_size_labels();
        client.ensure_size_labels();
        list.assert();
        for create in &creates {
            create.assert();
        }
    }

    #[test]
    fn label_creation_failures_are_swallowed() {
        let mut server = Server::new();
        let _list = server
            .mock("GET", "/repos/octo/widgets/labels")
            .match_query(Matcher::Any)
            .with_status(403)
            .create();
        client(&server).ensure_size_labels();
    }

    #[test]
    fn create_issue_posts_title_body_and_labels() {
        let mut server = Server::new();
        let m = server
            .mock("POST", "/repos/octo/widgets/issues")
            .match_body(Matcher::Json(json!({
                "title": "Add login",
                "body": "OAuth",
                "labels": ["enhancement"],
            })))
            .with_status(201)
            .with_body(issue_json(12, "Add login", Some("OAuth"), &["enhancement"]).to_string())
            .create();
        let issue = client(&server)
            .create_issue("Add login", "OAuth", &["enhancement".to_string()])
            .unwrap();
        m.assert();
        assert_eq!(issue.number, 12);
        assert_eq!(issue.labels, vec!["enhancement"]);
    }

    #[test]
    fn close_comments_then_closes() {
        let mut server = Server::new();
        let comment = server
            .mock("POST", "/repos/octo/widgets/issues/9/comments")
            .match_body(Matcher::Json(json!({ "body": "Shipped." })))
            .with_status(201)
            .with_body("{}")
            .create();
        let close = server
            .mock("PATCH", "/repos/octo/widgets/issues/9")
            .match_body(Matcher::Json(json!({ "state": "closed" })))
            .with_body("{}")
            .create();
        client(&server).close_issue(9, Some("Shipped.")).unwrap();
        comment.assert();
        close.assert();
    }

    #[test]
    fn sub_issues_found_by_marker() {
        let mut server = Server::new();
        let mut done = issue_json(3, "Part two", Some("Parent issue: #1\n\nb"), &[]);
        done["state"] = json!("closed");
        let body = json!([
            issue_json(1, "Epic", Some("parent"), &[]),
            issue_json(2, "Part one", Some("Parent issue: #1\n\na"), &[]),
            done,
            issue_json(4, "Other", Some("Parent issue: #10"), &[]),
        ]);
        let _m = server
            .mock("GET", "/repos/octo/widgets/issues")
            .match_query(Matcher::UrlEncoded("state".into(), "all".into()))
            .with_body(body.to_string())
            .create();
        let subs = client(&server).find_sub_issues(1).unwrap();
        assert_eq!(subs.open.iter().map(|i| i.number).collect::<Vec<_>>(), vec![2]);
        assert_eq!(subs.closed.iter().map(|i| i.number).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn user_repos_are_full_names() {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/user/repos")
            .match_query(Matcher::UrlEncoded("sort".into(), "updated".into()))
            .with_body(json!([{ "full_name": "octo/a" }, { "full_name": "octo/b" }]).to_string())
            .create();
        let config = GitHubConfig {
            api_base: server.url(),
            token: Some("t".into()),
        };
        assert_eq!(GitHubClient::list_user_repos(&config).unwrap(), vec!["octo/a", "octo/b"]);
    }

    #[test]
    fn connect_keeps_auth_failures_distinct() {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/repos/octo/widgets")
            .with_status(401)
            .with_body(r#"{"message":"Bad credentials"}"#)
            .create();
        let config = GitHubConfig {
            api_base: server.url(),
            token: Some("expired".into()),
        };
        let err = GitHubClient::connect(&config, RepoRef::new("octo", "widgets")).err().unwrap();
        assert!(
            matches!(err, TshirtsError::GitHub { status: 401, ref message, .. } if message == "Bad credentials")
        );
    }

    #[test]
    fn label_already_existing_is_not_fatal() {
        let mut server = Server::new();
        let _list = server
            .mock("GET", "/repos/octo/widgets/labels")
            .match_query(Matcher::Any)
            .with_body("[]")
            .expect(1)
            .create();
        let creates: Vec<_> = Size::all()
            .iter()
            .map(|size| {
                let mock = server
                    .mock("POST", "/repos/octo/widgets/labels")
                    .match_body(Matcher::Json(
                        json!({ "name": size.label(), "color": size.color() }),
                    ))
                    .expect(1);
                let mock = if *size == Size::M {
                    mock.with_status(422).with_body(
                        r#"{"message":"Validation Failed","errors":[{"resource":"Label","code":"already_exists","field":"name"}]}"#,
                    )
                } else {
                    mock.with_status(201).with_body("{}")
                };
                mock.create()
            })
            .collect();
        let _issue = server
            .mock("GET", "/repos/octo/widgets/issues/8")
            .with_body(issue_json(8, "t", None, &[]).to_string())
            .create();
        let add = server
            .mock("POST", "/repos/octo/widgets/issues/8/labels")
            .match_body(Matcher::Json(json!({ "labels": ["size: M"] })))
            .with_body("[]")
            .create();

        let client = client(&server);
        client.ensure_size_labels();
        for create in &creates {
            create.assert();
        }
        client.apply_size_label(8, Size::M).unwrap();
        add.assert();
    }
}

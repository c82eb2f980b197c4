use thiserror::Error;

#[derive(Debug, Error)]
pub enum TshirtsError {
    #[error("GITHUB_TOKEN environment variable required")]
    MissingToken,

    #[error("no repository specified: use --repo or set TSHIRTS_REPO")]
    MissingRepo,

    #[error("invalid repository '{0}': expected owner/name")]
    InvalidRepo(String),

    #[error("repository not found or not accessible: {0}")]
    RepoNotFound(String),

    #[error("issue #{0} not found")]
    IssueNotFound(u64),

    #[error("invalid size: {0}. Must be XS, S, M, L, or XL")]
    InvalidSize(String),

    #[error("{0}")]
    ModelNotFound(String),

    #[error("github api {operation} failed with status {status}: {message}")]
    GitHub {
        operation: String,
        status: u16,
        message: String,
    },

    #[error("invalid GitHub API url: {0}")]
    ApiUrl(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TshirtsError>;

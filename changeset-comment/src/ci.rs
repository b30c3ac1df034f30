//! CI environment capture.
//!
//! Everything the bot needs from GitLab CI is read once into an immutable
//! [`CiContext`]; nothing in the run path touches `env::var` afterwards.

use std::path::PathBuf;

use crate::errors::{BotResult, ConfigError};

/// Branch prefix used by the changeset release automation. An MR coming from
/// such a branch never receives a bot comment.
pub const RELEASE_BRANCH_PREFIX: &str = "changeset-release/";

/// Which comment primitive the bot uses. Exactly one per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Discussion,
    Note,
}

impl CommentKind {
    /// Strict parse, used on the create path. An unknown value is a fatal
    /// configuration error raised at write time.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "discussion" => Ok(Self::Discussion),
            "note" => Ok(Self::Note),
            other => Err(ConfigError::InvalidCommentType(other.to_string())),
        }
    }

    /// Lenient mapping used when listing existing comments: anything that is
    /// not `discussion` scans flat notes.
    pub fn for_listing(s: &str) -> Self {
        if s == "discussion" {
            Self::Discussion
        } else {
            Self::Note
        }
    }
}

/// Bot configuration plus the merge-request coordinates of this pipeline.
#[derive(Debug, Clone)]
pub struct CiContext {
    /// API base, e.g. "https://gitlab.com/api/v4".
    pub api_base: String,
    /// "PRIVATE-TOKEN" for the bot account.
    pub token: String,
    /// Raw comment type selector; validated by [`CommentKind::parse`] when a
    /// comment is created.
    pub comment_type: String,
    /// Optional commit message pre-filled into the add-changeset link.
    pub add_changeset_message: Option<String>,
    /// Repository checkout directory, used by changeset discovery.
    pub checkout_root: PathBuf,
    /// Present only in merge-request pipelines.
    pub merge_request: Option<MergeRequestCi>,
}

/// Merge-request coordinates supplied by a merge-request pipeline.
#[derive(Debug, Clone)]
pub struct MergeRequestCi {
    pub project_id: String,
    pub iid: u64,
    pub source_branch: String,
    pub head_sha: String,
    pub title: String,
    pub project_url: String,
}

impl CiContext {
    /// Loads the context from GitLab CI variables.
    pub fn from_env() -> BotResult<Self> {
        let token =
            std::env::var("GITLAB_TOKEN").map_err(|_| ConfigError::MissingEnv("GITLAB_TOKEN"))?;
        let api_base = std::env::var("GITLAB_API_BASE")
            .or_else(|_| std::env::var("CI_API_V4_URL"))
            .unwrap_or_else(|_| "https://gitlab.com/api/v4".into());
        let comment_type =
            std::env::var("GITLAB_COMMENT_TYPE").unwrap_or_else(|_| "discussion".into());
        let add_changeset_message = std::env::var("GITLAB_ADD_CHANGESET_MESSAGE").ok();
        let checkout_root = std::env::var("CI_PROJECT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        Ok(Self {
            api_base,
            token,
            comment_type,
            add_changeset_message,
            checkout_root,
            merge_request: merge_request_from_env(),
        })
    }
}

/// All merge-request variables must be present; otherwise this is not a
/// merge-request pipeline and the bot has nothing to do.
fn merge_request_from_env() -> Option<MergeRequestCi> {
    let iid = std::env::var("CI_MERGE_REQUEST_IID").ok()?.parse().ok()?;
    let head_sha = std::env::var("CI_MERGE_REQUEST_SOURCE_BRANCH_SHA")
        .ok()
        .filter(|s| !s.is_empty())
        .or_else(|| std::env::var("CI_COMMIT_SHA").ok())?;

    Some(MergeRequestCi {
        project_id: std::env::var("CI_MERGE_REQUEST_PROJECT_ID").ok()?,
        iid,
        source_branch: std::env::var("CI_MERGE_REQUEST_SOURCE_BRANCH_NAME").ok()?,
        head_sha,
        title: std::env::var("CI_MERGE_REQUEST_TITLE").ok()?,
        project_url: std::env::var("CI_MERGE_REQUEST_PROJECT_URL").ok()?,
    })
}

//! GitLab response shapes (subset of fields we actually use).

use serde::Deserialize;

/// A unique reference to a merge request.
///
/// * `project` – numeric project ID or "group/project" path.
/// * `iid`     – merge request IID (per-project number).
#[derive(Debug, Clone)]
pub struct MergeRequestRef {
    pub project: String,
    pub iid: u64,
}

/// Authenticated account, from `GET /user`.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoteAuthor {
    pub username: String,
}

/// A single comment, flat or nested inside a discussion.
#[derive(Debug, Clone, Deserialize)]
pub struct Note {
    pub id: u64,
    pub author: NoteAuthor,
    #[serde(default)]
    pub body: String,
    /// True for GitLab-generated activity notes, which are never ours.
    #[serde(default)]
    pub system: bool,
}

/// A discussion thread, or an individual note wrapped as one.
#[derive(Debug, Clone, Deserialize)]
pub struct Discussion {
    pub id: String,
    #[serde(default)]
    pub individual_note: bool,
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// One changed file, from `GET .../diffs`.
#[derive(Debug, Clone, Deserialize)]
pub struct DiffFile {
    pub new_path: String,
    #[serde(default)]
    pub new_file: bool,
}

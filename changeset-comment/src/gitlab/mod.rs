//! GitLab client (REST v4) for merge-request comments and diffs.
//!
//! Endpoints used:
//! - GET  /user
//! - GET  /projects/:id/merge_requests/:iid/discussions
//! - POST /projects/:id/merge_requests/:iid/discussions
//! - PUT  /projects/:id/merge_requests/:iid/discussions/:did/notes/:nid
//! - GET  /projects/:id/merge_requests/:iid/notes
//! - POST /projects/:id/merge_requests/:iid/notes
//! - PUT  /projects/:id/merge_requests/:iid/notes/:nid
//! - GET  /projects/:id/merge_requests/:iid/diffs   (preferred over the
//!   deprecated /changes)

pub mod types;
pub use types::*;

use reqwest::{Client, Response};
use serde::Serialize;
use tracing::debug;

use crate::errors::{BotResult, Error, ProviderError};

#[derive(Serialize)]
struct NoteBody<'a> {
    body: &'a str,
}

#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    base_api: String, // e.g. "https://gitlab.com/api/v4"
    token: String,    // "PRIVATE-TOKEN"
}

impl GitLabClient {
    /// Constructs a GitLab client with a shared reqwest instance and auth token.
    pub fn new(http: Client, base_api: String, token: String) -> Self {
        Self {
            http,
            base_api: base_api.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn mr_url(&self, mr: &MergeRequestRef, tail: &str) -> String {
        format!(
            "{}/projects/{}/merge_requests/{}{}",
            self.base_api,
            urlencoding::encode(&mr.project),
            mr.iid,
            tail
        )
    }

    /// Fetches the authenticated account.
    pub async fn current_user(&self) -> BotResult<CurrentUser> {
        let url = format!("{}/user", self.base_api);
        let resp = self
            .http
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;
        let resp = check_status(resp, &url).await?;
        Ok(resp.json().await?)
    }

    /// Lists all discussions on the merge request.
    pub async fn list_discussions(&self, mr: &MergeRequestRef) -> BotResult<Vec<Discussion>> {
        let url = self.mr_url(mr, "/discussions?per_page=100");
        let resp = self
            .http
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;
        let resp = check_status(resp, &url).await?;
        Ok(resp.json().await?)
    }

    /// Lists all top-level notes on the merge request.
    pub async fn list_notes(&self, mr: &MergeRequestRef) -> BotResult<Vec<Note>> {
        let url = self.mr_url(mr, "/notes?per_page=100");
        let resp = self
            .http
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;
        let resp = check_status(resp, &url).await?;
        Ok(resp.json().await?)
    }

    /// Fetches file-level diffs; only path and new-file flags are consumed.
    pub async fn merge_request_diffs(&self, mr: &MergeRequestRef) -> BotResult<Vec<DiffFile>> {
        let url = self.mr_url(mr, "/diffs?per_page=100");
        debug!("gitlab: fetch diffs for !{}", mr.iid);
        let resp = self
            .http
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;
        let resp = check_status(resp, &url).await?;
        Ok(resp.json().await?)
    }

    /// Starts a new discussion on the merge request.
    pub async fn create_discussion(&self, mr: &MergeRequestRef, body: &str) -> BotResult<()> {
        let url = self.mr_url(mr, "/discussions");
        debug!("gitlab: create discussion on !{}", mr.iid);
        let resp = self
            .http
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&NoteBody { body })
            .send()
            .await?;
        check_status(resp, &url).await?;
        Ok(())
    }

    /// Edits one note inside an existing discussion.
    pub async fn edit_discussion_note(
        &self,
        mr: &MergeRequestRef,
        discussion_id: &str,
        note_id: u64,
        body: &str,
    ) -> BotResult<()> {
        let url = self.mr_url(mr, &format!("/discussions/{discussion_id}/notes/{note_id}"));
        debug!("gitlab: edit discussion note {discussion_id}/{note_id}");
        let resp = self
            .http
            .put(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&NoteBody { body })
            .send()
            .await?;
        check_status(resp, &url).await?;
        Ok(())
    }

    /// Creates a flat note on the merge request.
    pub async fn create_note(&self, mr: &MergeRequestRef, body: &str) -> BotResult<()> {
        let url = self.mr_url(mr, "/notes");
        debug!("gitlab: create note on !{}", mr.iid);
        let resp = self
            .http
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&NoteBody { body })
            .send()
            .await?;
        check_status(resp, &url).await?;
        Ok(())
    }

    /// Edits an existing flat note in place.
    pub async fn edit_note(&self, mr: &MergeRequestRef, note_id: u64, body: &str) -> BotResult<()> {
        let url = self.mr_url(mr, &format!("/notes/{note_id}"));
        debug!("gitlab: edit note {note_id}");
        let resp = self
            .http
            .put(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&NoteBody { body })
            .send()
            .await?;
        check_status(resp, &url).await?;
        Ok(())
    }
}

/// Captures status + body into the error so failed calls can be debugged
/// from CI logs. Body capture is best-effort.
async fn check_status(resp: Response, url: &str) -> BotResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.ok();
    Err(Error::Provider(ProviderError::Http {
        status: status.as_u16(),
        url: url.to_string(),
        body,
    }))
}

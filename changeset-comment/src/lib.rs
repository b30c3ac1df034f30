//! Changeset comment bot for GitLab merge requests.
//!
//! One run per CI job:
//!
//! 1. Capture the CI context; bail out quietly off merge-request pipelines
//!    and on changeset release branches.
//! 2. Concurrently locate the bot's previous note, check the diff for a
//!    newly added changeset file, and discover the changed packages and
//!    release plan. Both diff consumers await one shared memoized fetch, so
//!    the network call happens exactly once.
//! 3. Render the comment body and create or edit exactly one note.
//!
//! Discovery failures degrade to placeholder data and never abort the run;
//! configuration and platform errors do, the latter after their HTTP
//! diagnostics were logged. Uses `tracing` for logging and plain `async fn`
//! without trait objects for dispatch.

pub mod changesets;
pub mod ci;
pub mod compose;
pub mod errors;
pub mod gitlab;
pub mod identity;
pub mod locate;
pub mod track;

use std::path::PathBuf;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{debug, info, warn};

use changeset_discovery as discovery;

use crate::ci::{CiContext, CommentKind, RELEASE_BRANCH_PREFIX};
use crate::compose::AddChangesetLink;
use crate::errors::{BotResult, Error};
use crate::gitlab::{DiffFile, GitLabClient, MergeRequestRef};
use crate::locate::NoteHandle;
use crate::track::ErrorTracker;

/// Package name substituted into the add-changeset link when discovery
/// fails, so the link still renders something editable.
const PLACEHOLDER_PACKAGE: &str = "@fake-scope/fake-pkg";

/// Shared memoized changed-files fetch, awaited by both the
/// changeset-presence check and package discovery.
type SharedDiffs = Shared<BoxFuture<'static, Result<Arc<Vec<DiffFile>>, Arc<Error>>>>;

fn shared_diffs(api: GitLabClient, mr: MergeRequestRef) -> SharedDiffs {
    async move {
        api.merge_request_diffs(&mr)
            .await
            .map(Arc::new)
            .map_err(Arc::new)
    }
    .boxed()
    .shared()
}

/// Runs one reconciliation pass.
///
/// Platform errors are re-raised (failing the CI job) after their request/
/// response diagnostics were logged best-effort.
pub async fn run(ctx: &CiContext) -> BotResult<()> {
    let result = reconcile(ctx).await;
    if let Err(err) = &result {
        errors::log_api_diagnostics(err);
    }
    result
}

async fn reconcile(ctx: &CiContext) -> BotResult<()> {
    let Some(mr_ci) = &ctx.merge_request else {
        warn!("not a merge-request pipeline, nothing to do");
        return Ok(());
    };
    if mr_ci.source_branch.starts_with(RELEASE_BRANCH_PREFIX) {
        warn!(
            "skipping changeset comment on release branch {}",
            mr_ci.source_branch
        );
        return Ok(());
    }

    let http = reqwest::Client::builder()
        .user_agent("changeset-bot/0.1")
        .build()?;
    let api = GitLabClient::new(http, ctx.api_base.clone(), ctx.token.clone());
    let mr = MergeRequestRef {
        project: mr_ci.project_id.clone(),
        iid: mr_ci.iid,
    };

    let diffs = shared_diffs(api.clone(), mr.clone());

    debug!("reconcile: fan out note lookup, changeset check, discovery");
    let (found, added, discovered) = tokio::join!(
        locate::find_bot_note(&api, &mr, CommentKind::for_listing(&ctx.comment_type)),
        changeset_added(diffs.clone()),
        discover_packages(diffs.clone(), ctx.checkout_root.clone(), ErrorTracker::default()),
    );
    let found = found?;
    let added = added?;
    let discovered = discovered?;

    let slug = compose::new_changeset_slug();
    let add_url = compose::add_changeset_url(
        &AddChangesetLink {
            project_url: &mr_ci.project_url,
            source_branch: &mr_ci.source_branch,
            mr_title: &mr_ci.title,
            changed_packages: &discovered.changed_packages,
            commit_message: ctx.add_changeset_message.as_deref(),
        },
        &slug,
    );

    let plan = discovered.release_plan.as_ref();
    let mut body = if added {
        compose::render_present(&mr_ci.head_sha, &add_url, plan)
    } else {
        compose::render_absent(&mr_ci.head_sha, &add_url, plan)
    };
    if let Some(block) = &discovered.error_block {
        body.push_str(block);
    }

    let edited = found.is_some();
    match found {
        Some(NoteHandle::Discussion {
            discussion_id,
            note_id,
        }) => {
            api.edit_discussion_note(&mr, &discussion_id, note_id, &body)
                .await?
        }
        Some(NoteHandle::Note { note_id }) => api.edit_note(&mr, note_id, &body).await?,
        None => match CommentKind::parse(&ctx.comment_type)? {
            CommentKind::Discussion => api.create_discussion(&mr, &body).await?,
            CommentKind::Note => api.create_note(&mr, &body).await?,
        },
    }

    info!(
        "reconcile: comment {} on !{} (changeset {})",
        if edited { "edited" } else { "created" },
        mr.iid,
        if added { "present" } else { "absent" },
    );
    Ok(())
}

async fn changeset_added(diffs: SharedDiffs) -> BotResult<bool> {
    let files = diffs.await.map_err(Error::Shared)?;
    Ok(changesets::added_changeset(&files))
}

/// Discovery outcome after the degradation policy: the run always gets
/// packages for the deep link, if only the placeholder.
struct Discovered {
    changed_packages: Vec<String>,
    release_plan: Option<discovery::ReleasePlan>,
    error_block: Option<String>,
}

/// Validation failures are surfaced in the comment itself; anything else is
/// reported to the tracker. Neither aborts the run.
async fn discover_packages(
    diffs: SharedDiffs,
    root: PathBuf,
    tracker: ErrorTracker,
) -> BotResult<Discovered> {
    let files = diffs.await.map_err(Error::Shared)?;
    let paths: Vec<String> = files.iter().map(|f| f.new_path.clone()).collect();

    match discovery::discover(&paths, &root) {
        Ok(found) => Ok(Discovered {
            changed_packages: found.changed_packages,
            release_plan: Some(found.release_plan),
            error_block: None,
        }),
        Err(err) => {
            let error_block = match &err {
                discovery::Error::Validation(message) => {
                    warn!("changed-package discovery rejected the changesets: {message}");
                    Some(compose::discovery_error_block(message))
                }
                other => {
                    tracker.report(other);
                    None
                }
            };
            Ok(Discovered {
                changed_packages: vec![PLACEHOLDER_PACKAGE.to_string()],
                release_plan: None,
                error_block,
            })
        }
    }
}

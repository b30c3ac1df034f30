//! Locating the bot's previous comment on a merge request.
//!
//! The listing is fetched once and scanned twice: an exact-username pass
//! first, then a retry that also accepts randomized service-account logins.
//! GitLab only assigns those randomized names to CI service accounts, and
//! only empirically, so the retry avoids false negatives without ever
//! widening the nested-discussion search.

use tracing::debug;

use crate::ci::CommentKind;
use crate::compose::GENERATED_BY_BOT;
use crate::errors::BotResult;
use crate::gitlab::{Discussion, GitLabClient, MergeRequestRef, Note};
use crate::identity;

/// Stable handle to a previously posted bot comment. Once obtained, the
/// comment is always edited in place, never duplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteHandle {
    /// Note nested in a discussion thread.
    Discussion {
        discussion_id: String,
        note_id: u64,
    },
    /// Flat merge-request note.
    Note { note_id: u64 },
}

/// One listed item: a flat note or a discussion thread.
enum CommentItem<'a> {
    Flat(&'a Note),
    Thread(&'a Discussion),
}

/// Finds the bot's existing comment, if any.
///
/// Resolves the bot username, lists comments per the configured kind and
/// scans in two passes. Returns `None` when no prior comment exists and the
/// caller must create one.
pub async fn find_bot_note(
    api: &GitLabClient,
    mr: &MergeRequestRef,
    kind: CommentKind,
) -> BotResult<Option<NoteHandle>> {
    let username = identity::resolve_username(api).await?;
    debug!("locate: scanning !{} as {username:?} ({kind:?})", mr.iid);

    let handle = match kind {
        CommentKind::Discussion => {
            let discussions = api.list_discussions(mr).await?;
            let items = discussion_items(&discussions);
            scan(&items, &username, false).or_else(|| scan(&items, &username, true))
        }
        CommentKind::Note => {
            let notes = api.list_notes(mr).await?;
            let items: Vec<CommentItem<'_>> = notes.iter().map(CommentItem::Flat).collect();
            scan(&items, &username, false).or_else(|| scan(&items, &username, true))
        }
    };

    debug!("locate: result {handle:?}");
    Ok(handle)
}

/// A discussion marked `individual_note` is structurally a flat note and is
/// edited through the notes API.
fn discussion_items(discussions: &[Discussion]) -> Vec<CommentItem<'_>> {
    discussions
        .iter()
        .map(|d| match (d.individual_note, d.notes.first()) {
            (true, Some(note)) => CommentItem::Flat(note),
            _ => CommentItem::Thread(d),
        })
        .collect()
}

/// One pure scanning pass over the listing. The first structural match wins.
///
/// `assume_random_name` widens flat-note author matching to randomized
/// service-account logins; nested discussion notes always match exactly.
/// A note without the generated-by marker is never ours, whoever wrote it.
fn scan(items: &[CommentItem<'_>], username: &str, assume_random_name: bool) -> Option<NoteHandle> {
    items.iter().find_map(|item| match item {
        CommentItem::Flat(note) => (!note.system
            && identity::author_matches(&note.author.username, username, assume_random_name)
            && note.body.contains(GENERATED_BY_BOT))
        .then(|| NoteHandle::Note { note_id: note.id }),
        CommentItem::Thread(discussion) => discussion.notes.iter().find_map(|note| {
            (!note.system
                && note.author.username == username
                && note.body.contains(GENERATED_BY_BOT))
            .then(|| NoteHandle::Discussion {
                discussion_id: discussion.id.clone(),
                note_id: note.id,
            })
        }),
    })
}

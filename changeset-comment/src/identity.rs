//! Bot identity resolution.
//!
//! GitLab may run CI under a service account whose login carries a random
//! suffix (e.g. `project_42_bot_4f9a1b`). The locator matches the exact
//! username first and widens to the randomized pattern only on its second
//! pass.

use regex::Regex;

use crate::errors::BotResult;
use crate::gitlab::GitLabClient;

/// Fetches the authenticated account's username. Never cached across runs;
/// each CI job is a fresh process.
pub async fn resolve_username(api: &GitLabClient) -> BotResult<String> {
    Ok(api.current_user().await?.username)
}

/// Extracts the base username from a randomized service-account login.
///
/// Shape: `<project|group>_<numeric id>_bot<optional suffix>_<random>`.
/// Returns `None` when `login` does not look like a service account.
pub fn random_bot_base(login: &str) -> Option<&str> {
    let re = Regex::new(r"^((?:project|group)_\d+_bot\w*?)_[0-9A-Za-z]+$").unwrap();
    re.captures(login)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// True when `author` is the bot: an exact match, or (second pass only) a
/// randomized service-account login whose base equals the resolved username.
pub fn author_matches(author: &str, username: &str, assume_random_name: bool) -> bool {
    author == username || (assume_random_name && random_bot_base(author) == Some(username))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_random_suffix() {
        assert_eq!(
            random_bot_base("project_123_bot7x_ab12"),
            Some("project_123_bot7x")
        );
        assert_eq!(
            random_bot_base("project_42_bot_4f9a1b"),
            Some("project_42_bot")
        );
        assert_eq!(
            random_bot_base("group_9_bot2_zzz"),
            Some("group_9_bot2")
        );
    }

    #[test]
    fn rejects_ordinary_logins() {
        assert_eq!(random_bot_base("someoneelse"), None);
        assert_eq!(random_bot_base("project_bot"), None);
        assert_eq!(random_bot_base("project_1_human_x"), None);
    }

    #[test]
    fn exact_match_ignores_the_flag() {
        assert!(author_matches("release-bot", "release-bot", false));
        assert!(author_matches("release-bot", "release-bot", true));
    }

    #[test]
    fn random_match_requires_the_flag() {
        assert!(!author_matches("project_123_bot7x_ab12", "project_123_bot7x", false));
        assert!(author_matches("project_123_bot7x_ab12", "project_123_bot7x", true));
        assert!(!author_matches("project_123_bot7x_ab12", "project_999_bot", true));
    }
}

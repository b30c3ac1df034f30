//! Comment body rendering.
//!
//! Both renderers are pure: same inputs, byte-identical output. The hidden
//! marker they embed is the single thing the locator keys on, so it is
//! formatted in exactly one place.

use changeset_discovery::{Bump, PlannedRelease, ReleasePlan};
use rand::Rng;

/// Marker substring present in every body the bot writes. A comment without
/// it is never treated as ours.
pub const GENERATED_BY_BOT: &str = "Generated By Changesets GitLab Bot";

const DOCS_URL: &str =
    "https://github.com/changesets/changesets/blob/main/docs/adding-a-changeset.md";

/// Inputs for the pre-filled "create changeset" link.
#[derive(Debug, Clone)]
pub struct AddChangesetLink<'a> {
    pub project_url: &'a str,
    pub source_branch: &'a str,
    pub mr_title: &'a str,
    pub changed_packages: &'a [String],
    pub commit_message: Option<&'a str>,
}

/// Comment body for an MR without a changeset.
pub fn render_absent(head_sha: &str, add_changeset_url: &str, plan: Option<&ReleasePlan>) -> String {
    format!(
        "### ⚠️ No Changeset found\n\n\
         Latest commit: {head_sha}\n\n\
         Merging this MR will not cause a version bump for any packages. \
         If these changes should not result in a new version, you're good to go. \
         **If these changes should result in a version bump, you need to add a changeset.**\n\n\
         {}\n\n\
         [Click here to learn what changesets are, and how to add one]({DOCS_URL}).\n\n\
         [Click here if you're a maintainer who wants to add a changeset to this MR]({add_changeset_url})\n\n\
         <!-- {GENERATED_BY_BOT} -->\n",
        release_plan_summary(plan)
    )
}

/// Comment body for an MR that already carries a changeset.
pub fn render_present(
    head_sha: &str,
    add_changeset_url: &str,
    plan: Option<&ReleasePlan>,
) -> String {
    format!(
        "### 🦋 Changeset detected\n\n\
         Latest commit: {head_sha}\n\n\
         **The changes in this MR will be included in the next version bump.**\n\n\
         {}\n\n\
         [Click here to learn what changesets are, and how to add one]({DOCS_URL}).\n\n\
         [Click here if you're a maintainer who wants to add another changeset to this MR]({add_changeset_url})\n\n\
         <!-- {GENERATED_BY_BOT} -->\n",
        release_plan_summary(plan)
    )
}

/// Collapsible release-plan block embedded in both variants.
///
/// Entries with a `none` bump are left out of the table; when nothing would
/// remain, explanatory text replaces it.
fn release_plan_summary(plan: Option<&ReleasePlan>) -> String {
    let plan = match plan {
        Some(p) if p.changesets > 0 => p,
        _ => {
            return "<details><summary>This MR includes no changesets</summary>\n\n\
                    When changesets are added to this MR, you'll see the packages that this MR \
                    includes changesets for and the associated semver types\n\n\
                    </details>"
                .to_string();
        }
    };

    let bumped: Vec<&PlannedRelease> = plan
        .releases
        .iter()
        .filter(|r| r.bump != Bump::None)
        .collect();
    let summary = format!(
        "This MR includes {} changeset{} to release {} package{}",
        plan.changesets,
        plural(plan.changesets),
        bumped.len(),
        plural(bumped.len()),
    );

    if bumped.is_empty() {
        return format!(
            "<details><summary>{summary}</summary>\n\n\
             The changesets in this MR do not request a version bump for any package\n\n\
             </details>"
        );
    }

    let mut table = String::from("| Name | Type |\n| ---- | ---- |\n");
    for release in &bumped {
        table.push_str(&format!("| {} | {} |\n", release.name, release.bump.as_title()));
    }
    format!("<details><summary>{summary}</summary>\n\n{table}\n</details>")
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Collapsible diagnostics appended when changed-package discovery fails.
pub fn discovery_error_block(message: &str) -> String {
    format!(
        "\n\n⚠️ An error occurred when fetching the changed packages and changesets in this merge request\n\
         <details><summary>Click to expand</summary>\n\n\
         ```\n{message}\n```\n\n\
         </details>"
    )
}

/// GitLab new-file URL pre-filled with a changeset that maps every changed
/// package to `patch` and carries the MR title as the summary.
pub fn add_changeset_url(link: &AddChangesetLink<'_>, slug: &str) -> String {
    let file_name = format!(".changeset/{slug}.md");

    let mut content = String::from("---\n");
    for package in link.changed_packages {
        content.push_str(&format!("{package:?}: patch\n"));
    }
    content.push_str("---\n\n");
    content.push_str(link.mr_title);
    content.push('\n');

    let mut url = format!(
        "{}/-/new/{}?file_name={}&file_content={}",
        link.project_url,
        urlencoding::encode(link.source_branch),
        urlencoding::encode(&file_name),
        urlencoding::encode(&content),
    );
    if let Some(message) = link.commit_message {
        url.push_str("&commit_message=");
        url.push_str(&urlencoding::encode(message));
    }
    url
}

const ADJECTIVES: &[&str] = &[
    "brave", "calm", "clever", "eager", "fuzzy", "gentle", "happy", "jolly", "lucky", "mighty",
    "quick", "shiny", "sleepy", "sunny", "tidy", "witty",
];
const NOUNS: &[&str] = &[
    "pandas", "otters", "donkeys", "falcons", "lemurs", "magpies", "newts", "owls", "pugs",
    "ravens", "seals", "sloths", "tigers", "walruses", "yaks", "zebras",
];
const VERBS: &[&str] = &[
    "admire", "agree", "argue", "cheer", "dance", "dream", "juggle", "laugh", "listen", "march",
    "sing", "smile", "travel", "wave", "whisper", "wonder",
];

/// Human-readable three-word slug, e.g. `happy-otters-smile`. Only a
/// suggested file name, not a secret; uniqueness is not required.
pub fn new_changeset_slug() -> String {
    let mut rng = rand::thread_rng();
    format!(
        "{}-{}-{}",
        pick(&mut rng, ADJECTIVES),
        pick(&mut rng, NOUNS),
        pick(&mut rng, VERBS)
    )
}

fn pick<'a>(rng: &mut impl Rng, words: &'a [&'a str]) -> &'a str {
    words[rng.gen_range(0..words.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(changesets: usize, releases: &[(&str, Bump)]) -> ReleasePlan {
        ReleasePlan {
            changesets,
            releases: releases
                .iter()
                .map(|(name, bump)| PlannedRelease {
                    name: name.to_string(),
                    bump: *bump,
                })
                .collect(),
        }
    }

    #[test]
    fn renderers_are_pure() {
        let plan = plan(2, &[("pkg-a", Bump::Minor)]);
        let a = render_absent("abc123", "https://example.com/new", Some(&plan));
        let b = render_absent("abc123", "https://example.com/new", Some(&plan));
        assert_eq!(a, b);
        let c = render_present("abc123", "https://example.com/new", Some(&plan));
        let d = render_present("abc123", "https://example.com/new", Some(&plan));
        assert_eq!(c, d);
    }

    #[test]
    fn both_variants_carry_the_marker_and_sha() {
        let absent = render_absent("deadbeef", "u", None);
        let present = render_present("deadbeef", "u", None);
        for body in [&absent, &present] {
            assert!(body.contains(GENERATED_BY_BOT));
            assert!(body.contains("Latest commit: deadbeef"));
        }
        assert!(absent.contains("No Changeset found"));
        assert!(present.contains("Changeset detected"));
    }

    #[test]
    fn table_omits_none_bumps() {
        let plan = plan(
            1,
            &[("pkg-a", Bump::Major), ("pkg-b", Bump::None), ("pkg-c", Bump::Patch)],
        );
        let block = release_plan_summary(Some(&plan));
        assert!(block.contains("| pkg-a | Major |"));
        assert!(block.contains("| pkg-c | Patch |"));
        assert!(!block.contains("pkg-b"));
        assert!(block.contains("1 changeset to release 2 packages"));
    }

    #[test]
    fn singular_package_count() {
        let plan = plan(3, &[("pkg-a", Bump::Patch)]);
        let block = release_plan_summary(Some(&plan));
        assert!(block.contains("3 changesets to release 1 package<"));
    }

    #[test]
    fn all_none_plan_renders_placeholder_text() {
        let plan = plan(1, &[("pkg-a", Bump::None)]);
        let block = release_plan_summary(Some(&plan));
        assert!(!block.contains("| Name | Type |"));
        assert!(block.contains("do not request a version bump"));
    }

    #[test]
    fn missing_or_empty_plan_says_no_changesets() {
        for plan in [None, Some(&plan(0, &[]))] {
            let block = release_plan_summary(plan);
            assert!(block.contains("This MR includes no changesets"));
        }
    }

    #[test]
    fn deep_link_encodes_file_and_content() {
        let packages = vec!["pkg-a".to_string(), "pkg-b".to_string()];
        let link = AddChangesetLink {
            project_url: "https://gitlab.example.com/group/repo",
            source_branch: "feature/new-thing",
            mr_title: "Add new thing",
            changed_packages: &packages,
            commit_message: None,
        };
        let url = add_changeset_url(&link, "brave-owls-sing");
        assert!(url.starts_with("https://gitlab.example.com/group/repo/-/new/feature%2Fnew-thing?"));
        assert!(url.contains("file_name=.changeset%2Fbrave-owls-sing.md"));
        assert!(url.contains(&*urlencoding::encode("\"pkg-a\": patch\n")));
        assert!(url.contains(&*urlencoding::encode("Add new thing")));
        assert!(!url.contains("commit_message"));
    }

    #[test]
    fn deep_link_carries_optional_commit_message() {
        let packages = vec!["pkg-a".to_string()];
        let link = AddChangesetLink {
            project_url: "https://gitlab.example.com/group/repo",
            source_branch: "main",
            mr_title: "Title",
            changed_packages: &packages,
            commit_message: Some("docs: add changeset"),
        };
        let url = add_changeset_url(&link, "slug");
        assert!(url.contains("&commit_message=docs%3A%20add%20changeset"));
    }

    #[test]
    fn slugs_are_three_known_words() {
        let slug = new_changeset_slug();
        let parts: Vec<&str> = slug.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert!(ADJECTIVES.contains(&parts[0]));
        assert!(NOUNS.contains(&parts[1]));
        assert!(VERBS.contains(&parts[2]));
    }
}

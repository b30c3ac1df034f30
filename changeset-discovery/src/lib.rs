//! Changed-package and release-plan discovery for the changeset bot.
//!
//! Works against the local CI checkout: parses `.changeset/*.md` files into
//! a release plan and maps changed file paths to the Cargo packages that own
//! them. Validation problems (malformed changesets, references to unknown
//! packages) are distinguished from I/O failures so the caller can degrade
//! gracefully instead of failing the whole run.

mod changeset;
mod workspace;

pub use changeset::{Bump, Changeset, PlannedRelease, ReleasePlan};
pub use workspace::WorkspacePackage;

use std::path::Path;

use thiserror::Error;
use tracing::debug;

/// Convenient alias for discovery results.
pub type DiscoveryResult<T> = Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The changesets themselves are invalid. Expected and recoverable: the
    /// bot surfaces the message in its comment and keeps going.
    #[error("{0}")]
    Validation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Output of a successful discovery pass.
#[derive(Debug, Clone)]
pub struct Discovered {
    /// Packages owning at least one changed file, in first-seen order.
    pub changed_packages: Vec<String>,
    pub release_plan: ReleasePlan,
}

/// Discovers the packages affected by `changed_paths` and the release plan
/// declared by the changeset files under `root`.
///
/// Every package a changeset names must exist somewhere in the checkout;
/// a stray name is a [`Error::Validation`].
pub fn discover(changed_paths: &[String], root: &Path) -> DiscoveryResult<Discovered> {
    let packages = workspace::workspace_packages(root)?;
    let changesets = changeset::read_changesets(&root.join(".changeset"))?;

    for cs in &changesets {
        for release in &cs.releases {
            if !packages.iter().any(|p| p.name == release.name) {
                return Err(Error::Validation(format!(
                    "changeset {} references unknown package {:?}",
                    cs.file, release.name
                )));
            }
        }
    }

    let changed_packages = workspace::changed_packages(changed_paths, &packages);
    let release_plan = changeset::release_plan(&changesets);
    debug!(
        "discovery: changed_packages={} changesets={} releases={}",
        changed_packages.len(),
        release_plan.changesets,
        release_plan.releases.len()
    );

    Ok(Discovered {
        changed_packages,
        release_plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn discovers_packages_and_plan() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "Cargo.toml",
            "[package]\nname = \"root-pkg\"\nversion = \"0.1.0\"\n",
        );
        write(
            root,
            "crates/leaf/Cargo.toml",
            "[package]\nname = \"leaf-pkg\"\nversion = \"0.1.0\"\n",
        );
        write(
            root,
            ".changeset/alpha.md",
            "---\n\"leaf-pkg\": minor\n---\n\nAdd a thing\n",
        );

        let changed = vec![
            "crates/leaf/src/lib.rs".to_string(),
            ".changeset/alpha.md".to_string(),
        ];
        let found = discover(&changed, root).unwrap();

        assert_eq!(found.changed_packages, vec!["leaf-pkg", "root-pkg"]);
        assert_eq!(found.release_plan.changesets, 1);
        assert_eq!(
            found.release_plan.releases,
            vec![PlannedRelease {
                name: "leaf-pkg".to_string(),
                bump: Bump::Minor,
            }]
        );
    }

    #[test]
    fn unknown_package_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            ".changeset/bogus.md",
            "---\n\"nonexistent\": patch\n---\n\nOops\n",
        );

        let err = discover(&[], root).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("nonexistent"));
    }

    #[test]
    fn empty_checkout_discovers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let found = discover(&["README.md".to_string()], dir.path()).unwrap();
        assert!(found.changed_packages.is_empty());
        assert_eq!(found.release_plan.changesets, 0);
    }
}

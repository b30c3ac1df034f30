//! Mapping changed files to the Cargo packages that own them.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::DiscoveryResult;

/// A package found in the checkout.
#[derive(Debug, Clone)]
pub struct WorkspacePackage {
    pub name: String,
    /// Directory containing the package's Cargo.toml, relative to the
    /// checkout root. Empty for the root package.
    pub dir: PathBuf,
}

#[derive(Deserialize)]
struct Manifest {
    package: Option<ManifestPackage>,
}

#[derive(Deserialize)]
struct ManifestPackage {
    name: String,
}

const MAX_DEPTH: usize = 8;

/// Scans the checkout for `[package]` manifests. Hidden directories and
/// build output are skipped; virtual workspace manifests yield nothing.
pub fn workspace_packages(root: &Path) -> DiscoveryResult<Vec<WorkspacePackage>> {
    let mut out = Vec::new();
    walk(root, root, 0, &mut out)?;
    Ok(out)
}

fn walk(
    root: &Path,
    dir: &Path,
    depth: usize,
    out: &mut Vec<WorkspacePackage>,
) -> DiscoveryResult<()> {
    if depth > MAX_DEPTH {
        return Ok(());
    }
    let manifest = dir.join("Cargo.toml");
    if manifest.is_file() {
        if let Some(name) = package_name(&manifest) {
            let rel = dir.strip_prefix(root).unwrap_or(dir).to_path_buf();
            out.push(WorkspacePackage { name, dir: rel });
        }
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') || name == "target" || name == "node_modules" {
            continue;
        }
        walk(root, &path, depth + 1, out)?;
    }
    Ok(())
}

/// Reads `[package].name`; unreadable or virtual manifests yield `None`.
fn package_name(manifest: &Path) -> Option<String> {
    let text = fs::read_to_string(manifest).ok()?;
    let parsed: Manifest = toml::from_str(&text).ok()?;
    parsed.package.map(|p| p.name)
}

/// Packages owning at least one changed path, ordered by first appearance.
pub fn changed_packages(changed_paths: &[String], packages: &[WorkspacePackage]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for path in changed_paths {
        let Some(owner) = owner_of(Path::new(path), packages) else {
            continue;
        };
        if !out.contains(&owner) {
            out.push(owner);
        }
    }
    out
}

/// Deepest package directory containing `path`.
fn owner_of(path: &Path, packages: &[WorkspacePackage]) -> Option<String> {
    packages
        .iter()
        .filter(|p| p.dir.as_os_str().is_empty() || path.starts_with(&p.dir))
        .max_by_key(|p| p.dir.components().count())
        .map(|p| p.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(name: &str, dir: &str) -> WorkspacePackage {
        WorkspacePackage {
            name: name.to_string(),
            dir: PathBuf::from(dir),
        }
    }

    #[test]
    fn nearest_package_wins() {
        let packages = vec![pkg("root", ""), pkg("leaf", "crates/leaf")];
        let changed = vec![
            "crates/leaf/src/lib.rs".to_string(),
            "docs/guide.md".to_string(),
        ];
        assert_eq!(changed_packages(&changed, &packages), vec!["leaf", "root"]);
    }

    #[test]
    fn duplicates_are_collapsed_in_order() {
        let packages = vec![pkg("a", "a"), pkg("b", "b")];
        let changed = vec![
            "b/one.rs".to_string(),
            "a/two.rs".to_string(),
            "b/three.rs".to_string(),
        ];
        assert_eq!(changed_packages(&changed, &packages), vec!["b", "a"]);
    }

    #[test]
    fn unowned_paths_are_skipped() {
        let packages = vec![pkg("a", "a")];
        let changed = vec!["elsewhere/file.rs".to_string()];
        assert!(changed_packages(&changed, &packages).is_empty());
    }
}

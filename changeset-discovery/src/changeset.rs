//! Changeset file parsing and release-plan aggregation.
//!
//! A changeset is a Markdown file under `.changeset/` with a YAML front
//! matter block mapping package names to bump levels, followed by a free-form
//! summary:
//!
//! ```text
//! ---
//! "pkg-a": minor
//! pkg-b: patch
//! ---
//!
//! Teach pkg-a a new trick.
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::{DiscoveryResult, Error};

/// Requested bump level for one package. Ordered so the highest request wins
/// when several changesets touch the same package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bump {
    None,
    Patch,
    Minor,
    Major,
}

impl Bump {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "major" => Some(Self::Major),
            "minor" => Some(Self::Minor),
            "patch" => Some(Self::Patch),
            "none" => Some(Self::None),
            _ => Option::None,
        }
    }

    /// Capitalized form used in the comment table.
    pub fn as_title(&self) -> &'static str {
        match self {
            Self::Major => "Major",
            Self::Minor => "Minor",
            Self::Patch => "Patch",
            Self::None => "None",
        }
    }
}

/// One parsed changeset file.
#[derive(Debug, Clone)]
pub struct Changeset {
    /// File name relative to `.changeset/`, kept for error messages.
    pub file: String,
    pub releases: Vec<PlannedRelease>,
    /// Human summary below the front matter.
    pub summary: String,
}

/// A planned version change for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRelease {
    pub name: String,
    pub bump: Bump,
}

/// Aggregated plan: one entry per package at its highest requested bump,
/// plus the number of contributing changeset files.
#[derive(Debug, Clone, Default)]
pub struct ReleasePlan {
    pub changesets: usize,
    pub releases: Vec<PlannedRelease>,
}

/// Reads every changeset under `dir`, in file-name order. A missing
/// directory means "no changesets", not an error.
pub fn read_changesets(dir: &Path) -> DiscoveryResult<Vec<Changeset>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut out = Vec::new();
    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(".md") || name == "README.md" {
            continue;
        }
        let text = fs::read_to_string(entry.path())?;
        out.push(parse_changeset(&name, &text)?);
    }
    Ok(out)
}

/// Splits the front-matter fence from the summary and parses both.
fn parse_changeset(file: &str, text: &str) -> DiscoveryResult<Changeset> {
    let rest = text
        .strip_prefix("---")
        .ok_or_else(|| malformed(file, "missing front matter"))?;
    let (front, summary) = rest
        .split_once("\n---")
        .ok_or_else(|| malformed(file, "unterminated front matter"))?;

    let requested: BTreeMap<String, String> = if front.trim().is_empty() {
        BTreeMap::new()
    } else {
        serde_yaml::from_str(front).map_err(|e| malformed(file, &e.to_string()))?
    };

    let releases = requested
        .into_iter()
        .map(|(name, bump)| {
            Bump::parse(&bump)
                .map(|bump| PlannedRelease { name, bump })
                .ok_or_else(|| malformed(file, &format!("unknown bump type {bump:?}")))
        })
        .collect::<DiscoveryResult<Vec<_>>>()?;

    Ok(Changeset {
        file: file.to_string(),
        releases,
        summary: summary.trim().to_string(),
    })
}

fn malformed(file: &str, detail: &str) -> Error {
    Error::Validation(format!("invalid changeset {file}: {detail}"))
}

/// Folds changesets into one release entry per package.
pub fn release_plan(changesets: &[Changeset]) -> ReleasePlan {
    let mut releases: Vec<PlannedRelease> = Vec::new();
    for cs in changesets {
        for release in &cs.releases {
            match releases.iter_mut().find(|r| r.name == release.name) {
                Some(existing) => existing.bump = existing.bump.max(release.bump),
                None => releases.push(release.clone()),
            }
        }
    }
    ReleasePlan {
        changesets: changesets.len(),
        releases,
    }
}

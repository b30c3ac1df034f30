//! Changeset-file detection in the merge-request diff.

use crate::gitlab::DiffFile;

/// Directory holding changeset files at the repository root.
pub const CHANGESET_DIR: &str = ".changeset/";

const CHANGESET_README: &str = ".changeset/README.md";

/// True when the diff contains a newly added changeset file.
pub fn added_changeset(files: &[DiffFile]) -> bool {
    files.iter().any(is_added_changeset)
}

/// A qualifying file is newly added, lives under `.changeset/`, has the
/// `.md` extension and is not the directory's own README.
fn is_added_changeset(f: &DiffFile) -> bool {
    f.new_file
        && f.new_path.starts_with(CHANGESET_DIR)
        && f.new_path.ends_with(".md")
        && f.new_path != CHANGESET_README
}

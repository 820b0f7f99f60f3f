//! File discovery for a named entity.
//!
//! An entity `NAME` under a base directory is assembled from four tiers, in
//! priority-ascending order (last = highest):
//!
//! 1. `NAME.conf`: the shipped defaults.
//! 2. `NAME.d/*.conf`: shipped drop-in fragments, lexicographic order.
//! 3. `NAME.local`: the user's override file.
//! 4. `NAME.d/*.local`: user drop-ins, lexicographic order.
//!
//! Within a tier, lexicographic filename order gives deterministic
//! last-write-wins. Candidates that do not exist are dropped; the relative
//! order of the rest is preserved.
//!
//! Drop-in matching follows shell glob rules: hidden files are not matched,
//! directories are not matched, and a missing `.d` directory contributes
//! nothing.

use std::fs;
use std::path::{Path, PathBuf};

/// Every candidate path for `name`, existing or not, in merge order.
pub fn candidate_files(basedir: &Path, name: &str) -> Vec<PathBuf> {
    let basename = basedir.join(name);
    let drop_in_dir = basedir.join(format!("{name}.d"));

    let mut files = vec![with_suffix(&basename, "conf")];
    files.extend(drop_ins(&drop_in_dir, "conf"));
    files.push(with_suffix(&basename, "local"));
    files.extend(drop_ins(&drop_in_dir, "local"));
    files
}

/// The candidates for `name` that exist on disk, in merge order.
pub fn existing_candidates(basedir: &Path, name: &str) -> Vec<PathBuf> {
    candidate_files(basedir, name)
        .into_iter()
        .filter(|path| path.exists())
        .collect()
}

/// `{basename}.{ext}` without treating dots in `basename` as an extension.
fn with_suffix(basename: &Path, ext: &str) -> PathBuf {
    let mut os = basename.as_os_str().to_os_string();
    os.push(".");
    os.push(ext);
    PathBuf::from(os)
}

/// Files matching `{dir}/*.{ext}`, sorted. Unreadable directories yield an
/// empty list.
fn drop_ins(dir: &Path, ext: &str) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return vec![];
    };
    let suffix = format!(".{ext}");

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            !name.starts_with('.') && name.len() > suffix.len() && name.ends_with(&suffix)
        })
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}

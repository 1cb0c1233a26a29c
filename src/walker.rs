use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    time::SystemTime,
};

use ignore::{DirEntry, WalkBuilder};

use crate::{query::Query, rank::Hit, sniff};

/// Directory names that are never descended into.
pub const IGNORED_DIRS: &[&str] = &[".git", ".svn", "_build"];

/// The kind of filesystem entry a search is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Dir,
}

/// A filesystem entry discovered during a search.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Path relative to the root it was found under, `/`-separated.
    pub relative_path: String,
    /// Path as discovered: the root joined with the relative path, without
    /// a leading `./`.
    pub path: PathBuf,
    /// Absolute form of `path`, used to detect duplicates.
    pub absolute_path: PathBuf,
    pub kind: EntryKind,
    pub mtime: SystemTime,
}

/// Options controlling which entries a search accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Accept only entries of this kind.
    pub want: EntryKind,
    /// Reject files whose content does not sniff as text.
    pub text_only: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::files()
    }
}

impl SearchOptions {
    /// Regular files that look like text.
    pub fn files() -> Self {
        Self {
            want: EntryKind::File,
            text_only: true,
        }
    }

    /// Directories only. The text gate never applies to directories.
    pub fn dirs() -> Self {
        Self {
            want: EntryKind::Dir,
            text_only: false,
        }
    }
}

/// Whether a directory with this base name is pruned from traversal.
pub fn is_ignored_dir(name: &OsStr) -> bool {
    IGNORED_DIRS.iter().any(|ignored| name == OsStr::new(ignored))
}

/// Run `query` over `roots`, choosing a tree walk or an ancestor search
/// depending on the query.
pub fn search<'a>(
    roots: &'a [PathBuf],
    query: &'a Query,
    options: &'a SearchOptions,
) -> Box<dyn Iterator<Item = Hit> + 'a> {
    if query.is_ancestor() {
        Box::new(ancestors(roots, query, options))
    } else {
        Box::new(walk(roots, query, options))
    }
}

/// Depth-first traversal of every root, yielding matching entries lazily.
///
/// Roots are visited in order and entries in file-name order, so the same
/// tree always produces hits in the same sequence. Unreadable entries and
/// missing roots are skipped.
pub fn walk<'a>(
    roots: &'a [PathBuf],
    query: &'a Query,
    options: &'a SearchOptions,
) -> impl Iterator<Item = Hit> + 'a {
    roots
        .iter()
        .flat_map(move |root| walk_root(root, query, options))
}

fn walk_root<'a>(
    root: &'a Path,
    query: &'a Query,
    options: &'a SearchOptions,
) -> impl Iterator<Item = Hit> + 'a {
    // The filter below never sees the root itself.
    let pruned_root =
        root.file_name().is_some_and(is_ignored_dir) && root.is_dir();
    if pruned_root {
        tracing::debug!(root = %root.display(), "root is an ignored directory");
    }

    (!pruned_root)
        .then(|| builder(root).build())
        .into_iter()
        .flatten()
        .filter_map(move |res| {
            let entry = match res {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(root = %root.display(), error = %e, "skipped entry");
                    return None;
                }
            };
            accept(root, &entry, query, options)
        })
}

fn builder(root: &Path) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| !is_pruned(entry));
    builder
}

fn is_pruned(entry: &DirEntry) -> bool {
    entry.file_type().is_some_and(|ft| ft.is_dir())
        && is_ignored_dir(entry.file_name())
}

fn accept(
    root: &Path,
    entry: &DirEntry,
    query: &Query,
    options: &SearchOptions,
) -> Option<Hit> {
    let ft = entry.file_type()?;
    let kind = if ft.is_dir() {
        EntryKind::Dir
    } else if ft.is_file() {
        EntryKind::File
    } else {
        return None;
    };
    if kind != options.want {
        return None;
    }

    let relative_path = relative_path(root, entry.path());
    let matched = query.matches(&relative_path);
    if !matched.is_match() {
        return None;
    }

    if kind == EntryKind::File
        && options.text_only
        && !sniff::looks_like_text(entry.path())
    {
        return None;
    }

    let mtime = match entry.metadata() {
        Ok(meta) => meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        Err(e) => {
            tracing::debug!(path = %entry.path().display(), error = %e, "stat failed");
            return None;
        }
    };

    Some(Hit {
        candidate: Candidate {
            relative_path,
            path: display_path(entry.path()).to_path_buf(),
            absolute_path: absolute(entry.path()),
            kind,
            mtime,
        },
        kind: matched,
    })
}

/// `/`-joined path of `path` relative to `root`; the root itself is `.`.
fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Drop a leading `./` so results under the current directory print as
/// plain relative paths. The current directory itself stays `.`.
fn display_path(path: &Path) -> &Path {
    match path.strip_prefix(".") {
        Ok(rest) if !rest.as_os_str().is_empty() => rest,
        _ => path,
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Ancestor search: for every base directory, check `dir/query` at each
/// level from the base up to the filesystem root.
///
/// Exactly one path is examined per level; nothing is traversed. The
/// query is matched against the full absolute path.
pub fn ancestors<'a>(
    bases: &'a [PathBuf],
    query: &'a Query,
    options: &'a SearchOptions,
) -> impl Iterator<Item = Hit> + 'a {
    bases
        .iter()
        .flat_map(move |base| ancestor_hits(base, query, options))
}

fn ancestor_hits(
    base: &Path,
    query: &Query,
    options: &SearchOptions,
) -> Vec<Hit> {
    let start = match std::path::absolute(base) {
        Ok(start) => start,
        Err(e) => {
            tracing::debug!(base = %base.display(), error = %e, "cannot resolve base");
            return Vec::new();
        }
    };

    // An absolute query body would replace `dir` when joined.
    let name = query.raw().trim_start_matches('/');
    start
        .ancestors()
        .filter_map(|dir| ancestor_hit(&dir.join(name), query, options))
        .collect()
}

fn ancestor_hit(
    path: &Path,
    query: &Query,
    options: &SearchOptions,
) -> Option<Hit> {
    let meta = std::fs::metadata(path).ok()?;
    let kind = if meta.is_dir() {
        EntryKind::Dir
    } else if meta.is_file() {
        EntryKind::File
    } else {
        return None;
    };
    if kind != options.want {
        return None;
    }

    let display = path.to_string_lossy().into_owned();
    let matched = query.matches(&display);
    if !matched.is_match() {
        return None;
    }

    if kind == EntryKind::File
        && options.text_only
        && !sniff::looks_like_text(path)
    {
        return None;
    }

    Some(Hit {
        candidate: Candidate {
            relative_path: display,
            path: path.to_path_buf(),
            absolute_path: path.to_path_buf(),
            kind,
            mtime: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        },
        kind: matched,
    })
}

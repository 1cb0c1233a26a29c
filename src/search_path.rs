use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

/// Environment variable holding the colon-separated search path.
pub const EDITPATH_VAR: &str = "EDITPATH";

/// Query used when none is given: everything.
pub const DEFAULT_QUERY: &str = "*";

/// What to search for and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub query: String,
    pub roots: Vec<PathBuf>,
}

/// The list of directories from `EDITPATH`.
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var_os(EDITPATH_VAR).unwrap_or_default())
    }

    /// Split a colon-separated list, dropping empty elements.
    pub fn parse(value: &OsStr) -> Self {
        let dirs = std::env::split_paths(value)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// `x/rel` for every directory `x` on the search path.
    pub fn expand(&self, rel: &Path) -> Vec<PathBuf> {
        self.dirs.iter().map(|dir| dir.join(rel)).collect()
    }

    /// Resolve root arguments, in order:
    /// 1. No arguments: the current directory
    /// 2. An existing directory: used as given
    /// 3. A missing path: looked up under every search path directory,
    ///    and kept as given (it contributes nothing on its own)
    ///
    /// Arguments that exist but are not directories are skipped.
    pub fn resolve_roots(&self, args: &[PathBuf]) -> Vec<PathBuf> {
        if args.is_empty() {
            return vec![PathBuf::from(".")];
        }

        let mut roots = Vec::new();
        for arg in args {
            match std::fs::metadata(arg) {
                Ok(meta) if meta.is_dir() => roots.push(arg.clone()),
                Ok(_) => {
                    tracing::debug!(path = %arg.display(), "not a directory, skipped");
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    roots.extend(self.expand(arg));
                    roots.push(arg.clone());
                }
                Err(e) => {
                    tracing::debug!(path = %arg.display(), error = %e, "skipped");
                }
            }
        }
        roots
    }

    /// Turn the command line into a [`Target`].
    ///
    /// An empty query means [`DEFAULT_QUERY`]. Without root arguments a
    /// query of the form `dir:query` searches `x/dir` for every `x` on the
    /// search path (or `./dir` when the search path is empty).
    pub fn resolve(&self, query: &str, args: &[PathBuf]) -> Target {
        if args.is_empty()
            && let Some((dir, rest)) = split_dir_query(query)
        {
            let roots = if self.dirs.is_empty() {
                vec![PathBuf::from(dir)]
            } else {
                self.expand(Path::new(dir))
            };
            return Target {
                query: or_default(rest),
                roots,
            };
        }

        Target {
            query: or_default(query),
            roots: self.resolve_roots(args),
        }
    }
}

fn or_default(query: &str) -> String {
    if query.is_empty() {
        DEFAULT_QUERY.to_string()
    } else {
        query.to_string()
    }
}

/// Split `dir:query`. Ancestor queries and queries without a directory
/// part are left alone.
fn split_dir_query(query: &str) -> Option<(&str, &str)> {
    if query.starts_with('~') {
        return None;
    }
    query.split_once(':').filter(|(dir, _)| !dir.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_drops_empty_elements() {
        let sp = SearchPath::parse(OsStr::new("/a::/b:"));
        assert_eq!(sp.dirs(), &[PathBuf::from("/a"), PathBuf::from("/b")]);
        assert!(SearchPath::parse(OsStr::new("")).dirs().is_empty());
    }

    #[test]
    fn no_args_means_current_dir() {
        let sp = SearchPath::default();
        assert_eq!(sp.resolve_roots(&[]), vec![PathBuf::from(".")]);
    }

    #[test]
    fn existing_dirs_are_kept_files_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("f.txt");
        std::fs::write(&file, "x").unwrap();

        let sp = SearchPath::default();
        let roots = sp.resolve_roots(&[tmp.path().to_path_buf(), file]);
        assert_eq!(roots, vec![tmp.path().to_path_buf()]);
    }

    #[test]
    fn missing_args_expand_over_search_path() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        let value = std::env::join_paths([&a, &b]).unwrap();
        let sp = SearchPath::parse(&value);

        let arg = PathBuf::from("definitely-not-here-proj");
        let roots = sp.resolve_roots(std::slice::from_ref(&arg));
        assert_eq!(roots, vec![a.join(&arg), b.join(&arg), arg]);
    }

    #[test]
    fn dir_query_uses_search_path() {
        let sp = SearchPath::parse(OsStr::new("/src:/work"));
        let target = sp.resolve("proj:main.rs", &[]);
        assert_eq!(target.query, "main.rs");
        assert_eq!(
            target.roots,
            vec![PathBuf::from("/src/proj"), PathBuf::from("/work/proj")]
        );
    }

    #[test]
    fn dir_query_without_search_path_is_relative() {
        let sp = SearchPath::default();
        let target = sp.resolve("proj:", &[]);
        assert_eq!(target.query, DEFAULT_QUERY);
        assert_eq!(target.roots, vec![PathBuf::from("proj")]);
    }

    #[test]
    fn plain_and_empty_queries() {
        let sp = SearchPath::default();
        assert_eq!(sp.resolve("main", &[]).query, "main");
        assert_eq!(sp.resolve("", &[]).query, DEFAULT_QUERY);
        assert_eq!(sp.resolve(":x", &[]).query, ":x");
        assert_eq!(sp.resolve("~a:b", &[]).query, "~a:b");
    }

    #[test]
    fn dir_query_ignored_with_explicit_roots() {
        let tmp = tempfile::tempdir().unwrap();
        let sp = SearchPath::parse(OsStr::new("/src"));
        let target = sp.resolve("proj:main", &[tmp.path().to_path_buf()]);
        assert_eq!(target.query, "proj:main");
        assert_eq!(target.roots, vec![tmp.path().to_path_buf()]);
    }
}

use std::borrow::Cow;

use crate::{
    error::Result,
    pattern::{MatchKind, Segment, is_case_sensitive},
};

/// A parsed path query such as `src/*/main.rs` or `~Cargo.toml`.
///
/// Queries are partial paths. Every non-final segment must match some
/// directory segment of the candidate, in order, while the final segment
/// must match the candidate's base name.
#[derive(Debug, Clone)]
pub struct Query {
    raw: String,
    text: String,
    case_sensitive: bool,
    ancestor: bool,
    segments: Vec<Segment>,
}

impl Query {
    /// Parse and compile a query.
    ///
    /// A leading `~` selects ancestor search (see
    /// [`walker::ancestors`](crate::walker::ancestors)). Unless the query
    /// contains an upper-case character it is lower-cased and matched
    /// case-insensitively.
    pub fn parse(raw: &str) -> Result<Self> {
        let case_sensitive = is_case_sensitive(raw);
        let (ancestor, body) = match raw.strip_prefix('~') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let text = if case_sensitive {
            body.to_string()
        } else {
            body.to_lowercase()
        };

        let segments = text
            .split('/')
            .map(Segment::parse)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: body.to_string(),
            text,
            case_sensitive,
            ancestor,
            segments,
        })
    }

    /// The query text, without the ancestor prefix and smart-cased.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The query text as typed, without the ancestor prefix.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn is_ancestor(&self) -> bool {
        self.ancestor
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Apply smart case to a candidate path.
    pub fn normalize<'a>(&self, candidate: &'a str) -> Cow<'a, str> {
        if self.case_sensitive {
            Cow::Borrowed(candidate)
        } else {
            Cow::Owned(candidate.to_lowercase())
        }
    }

    /// Evaluate this query against a `/`-separated candidate path.
    pub fn matches(&self, candidate: &str) -> MatchKind {
        let candidate = self.normalize(candidate);
        let parts: Vec<&str> = candidate.split('/').collect();

        let Some((last_query, dir_queries)) = self.segments.split_last() else {
            return MatchKind::None;
        };
        let Some((last_part, dir_parts)) = parts.split_last() else {
            return MatchKind::None;
        };

        let mut next = 0;
        for query in dir_queries {
            let mut found = false;
            while !found && next < dir_parts.len() {
                found = query.matches(dir_parts[next]).is_match();
                next += 1;
            }
            if !found {
                return MatchKind::None;
            }
        }

        last_query.matches(last_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(query: &str, path: &str) -> MatchKind {
        Query::parse(query).unwrap().matches(path)
    }

    #[test]
    fn segments_in_order_match() {
        assert_ne!(kind("a/b/c", "x/a/y/b/z/c"), MatchKind::None);
    }

    #[test]
    fn segments_out_of_order_do_not_match() {
        assert_eq!(kind("a/b/c", "x/b/y/a/z/c"), MatchKind::None);
    }

    #[test]
    fn dir_segments_need_distinct_candidates() {
        assert_eq!(kind("a/a/f", "a/f"), MatchKind::None);
        assert_ne!(kind("a/a/f", "a/ab/f"), MatchKind::None);
    }

    #[test]
    fn dir_segment_cannot_match_basename() {
        assert_eq!(kind("f/f", "f"), MatchKind::None);
        assert_eq!(kind("b/c", "a/b"), MatchKind::None);
    }

    #[test]
    fn single_segment_constrains_basename_only() {
        assert_ne!(kind("foo", "a/b/foo"), MatchKind::None);
        assert_eq!(kind("foo", "a/foo/b"), MatchKind::None);
    }

    #[test]
    fn result_is_basename_kind() {
        assert_eq!(kind("src/main.rs", "src/main.rs"), MatchKind::Exact);
        assert_eq!(kind("sr/main.rs", "src/main.rs"), MatchKind::Exact);
        assert_eq!(kind("src/main", "src/main.rs"), MatchKind::Partial);
        assert_eq!(kind("src/*.rs", "src/main.rs"), MatchKind::Partial);
    }

    #[test]
    fn smart_case_upper_is_sensitive() {
        assert_eq!(kind("Main", "Main.go"), MatchKind::Partial);
        assert_eq!(kind("Main", "main.go"), MatchKind::None);
    }

    #[test]
    fn smart_case_lower_is_insensitive() {
        assert_eq!(kind("main", "Main.go"), MatchKind::Partial);
        assert_eq!(kind("main", "main.go"), MatchKind::Partial);
        assert_eq!(kind("readme", "README"), MatchKind::Exact);
    }

    #[test]
    fn ancestor_prefix_is_stripped() {
        let q = Query::parse("~Cargo.toml").unwrap();
        assert!(q.is_ancestor());
        assert_eq!(q.as_str(), "Cargo.toml");
        assert_eq!(q.raw(), "Cargo.toml");
        assert!(q.is_case_sensitive());
        assert_eq!(q.matches("/home/u/proj/Cargo.toml"), MatchKind::Exact);
    }

    #[test]
    fn malformed_glob_fails_parse() {
        assert!(Query::parse("src/[oops/main").is_err());
    }

    #[test]
    fn star_matches_everything() {
        let q = Query::parse("*").unwrap();
        assert_eq!(q.matches("a/b/c.txt"), MatchKind::Partial);
        assert_eq!(q.matches("."), MatchKind::Partial);
    }
}

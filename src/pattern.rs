use std::{borrow::Cow, fmt};

use globset::{GlobBuilder, GlobMatcher};

use crate::error::{Error, Result};

/// Characters that turn a query segment into a glob.
pub const GLOB_META: &[char] = &['*', '?', '['];

/// How well a query matched a candidate. Ordered so that a better match
/// compares greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchKind {
    None,
    Partial,
    Exact,
}

impl MatchKind {
    pub fn is_match(self) -> bool {
        self != MatchKind::None
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchKind::None => "none",
            MatchKind::Partial => "partial",
            MatchKind::Exact => "exact",
        };
        f.write_str(s)
    }
}

/// Smart case: a query is matched case-sensitively only if it contains
/// an upper-case character.
pub fn is_case_sensitive(query: &str) -> bool {
    query.chars().any(char::is_uppercase)
}

/// One compiled query segment.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Must occur as a substring of the path segment.
    Literal(String),
    /// Shell-style pattern matched against the whole path segment.
    Glob { pattern: String, matcher: GlobMatcher },
}

impl Segment {
    /// Compile a single segment. Segments containing `*`, `?` or `[` are
    /// globs; everything else is a literal.
    pub fn parse(segment: &str) -> Result<Self> {
        if !segment.contains(GLOB_META) {
            return Ok(Segment::Literal(segment.to_string()));
        }

        let escaped = escape_braces(segment);
        let glob = GlobBuilder::new(&escaped)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .map_err(|source| Error::Pattern {
                pattern: segment.to_string(),
                source,
            })?;

        Ok(Segment::Glob {
            pattern: segment.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Segment::Literal(s) => s,
            Segment::Glob { pattern, .. } => pattern,
        }
    }

    /// Match this segment against one path segment.
    ///
    /// Glob matches are capped at [`MatchKind::Partial`], even when the
    /// pattern is textually equal to the path segment, so literal exact
    /// matches always rank above them.
    pub fn matches(&self, path_segment: &str) -> MatchKind {
        match self {
            Segment::Glob { matcher, .. } => {
                if matcher.is_match(path_segment) {
                    MatchKind::Partial
                } else {
                    MatchKind::None
                }
            }
            Segment::Literal(lit) => {
                if !path_segment.contains(lit.as_str()) {
                    MatchKind::None
                } else if path_segment.len() == lit.len() {
                    MatchKind::Exact
                } else {
                    MatchKind::Partial
                }
            }
        }
    }
}

/// Escape `{` and `}` outside character classes so that braces match
/// themselves instead of starting an alternation.
fn escape_braces(segment: &str) -> Cow<'_, str> {
    if !segment.contains(['{', '}']) {
        return Cow::Borrowed(segment);
    }

    let mut out = String::with_capacity(segment.len() + 4);
    let mut chars = segment.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '[' => {
                // Classes are copied verbatim; a leading `]` is a member.
                out.push(c);
                if let Some(&neg @ ('!' | '^')) = chars.peek() {
                    out.push(neg);
                    chars.next();
                }
                if chars.peek() == Some(&']') {
                    out.push(']');
                    chars.next();
                }
                for member in chars.by_ref() {
                    out.push(member);
                    if member == ']' {
                        break;
                    }
                }
            }
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Convenience wrapper over [`Segment::parse`] and [`Segment::matches`].
pub fn match_segment(query: &str, path: &str) -> Result<MatchKind> {
    Ok(Segment::parse(query)?.matches(path))
}

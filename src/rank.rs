use std::{collections::HashSet, fmt, path::Path};

use chrono::{DateTime, Local, SecondsFormat};

use crate::{pattern::MatchKind, walker::Candidate};

/// A candidate together with how well it matched the query.
#[derive(Debug, Clone)]
pub struct Hit {
    pub candidate: Candidate,
    pub kind: MatchKind,
}

impl Hit {
    pub fn path(&self) -> &Path {
        &self.candidate.path
    }
}

impl fmt::Display for Hit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mtime = DateTime::<Local>::from(self.candidate.mtime)
            .to_rfc3339_opts(SecondsFormat::Secs, false);
        write!(f, "{mtime} {}: {}", self.kind, self.candidate.path.display())
    }
}

/// Sort hits best first: exact matches before partial ones, and newer
/// files before older ones within the same match kind.
///
/// The sort is stable, so hits that compare equal keep traversal order.
pub fn rank(mut hits: Vec<Hit>) -> Vec<Hit> {
    hits.sort_by(|a, b| {
        b.kind
            .cmp(&a.kind)
            .then_with(|| b.candidate.mtime.cmp(&a.candidate.mtime))
    });
    hits
}

/// Ranked hits with repeated absolute paths dropped; the first occurrence
/// wins. Used when listing every result.
pub fn unique(hits: &[Hit]) -> impl Iterator<Item = &Hit> {
    let mut seen = HashSet::new();
    hits.iter()
        .filter(move |&hit| seen.insert(hit.candidate.absolute_path.as_path()))
}

/// The single best hit of an already ranked list.
pub fn best(hits: &[Hit]) -> Option<&Hit> {
    hits.first()
}

//! edit - find files by partial path and plumb the best match to an editor.
//!
//! A query such as `src/main` is split into `/`-separated segments. The
//! last segment has to match a candidate's base name; the others have to
//! match some of its directories, in order. Segments match as substrings,
//! or as shell globs when they contain `*`, `?` or `[`. Matches are ranked
//! exact before partial, then newest first.
//!
//! # Quick start
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use edit::{Query, SearchOptions, rank, walker};
//!
//! let query = Query::parse("src/main").unwrap();
//! let roots = vec![PathBuf::from(".")];
//! let options = SearchOptions::files();
//!
//! let hits = rank::rank(walker::search(&roots, &query, &options).collect());
//! if let Some(best) = rank::best(&hits) {
//!     println!("{} ({})", best.path().display(), best.kind);
//! }
//! ```

pub mod cli;
pub mod error;
pub mod pattern;
pub mod plumb;
pub mod query;
pub mod rank;
pub mod search_path;
pub mod sniff;
pub mod walker;

pub use error::{Error, Result};
pub use pattern::MatchKind;
pub use plumb::Plumber;
pub use query::Query;
pub use rank::Hit;
pub use search_path::{SearchPath, Target};
pub use walker::{Candidate, EntryKind, SearchOptions};

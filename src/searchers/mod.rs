pub mod line_matcher;
pub mod tree_walker;

pub use line_matcher::{scan, FileOutcome, MatchError};
pub use tree_walker::{walk, TreeWalker};

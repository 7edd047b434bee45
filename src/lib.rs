pub mod cli;
pub mod display;
pub mod error;
pub mod pattern;
pub mod reporter;
pub mod scan_coordinator;
pub mod searchers;
pub mod services;
pub mod tree;
pub mod types;

// 公開API
pub use error::{CloneError, DirReadError, FatalError, FileReadError, TreeError};
pub use pattern::{CompiledPattern, JoinSeparator, OutputSchema};
pub use reporter::{CollectingReporter, LogReporter, ScanReporter};
pub use scan_coordinator::ScanCoordinator;
pub use tree::{GitTree, MemoryTree, WorkingTree};
pub use types::*;

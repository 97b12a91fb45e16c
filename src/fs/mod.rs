//! Sandboxed filesystem access
//!
//! Provides the [`Sandbox`] path guard and the [`FileOperations`] built on it.

mod error;
mod ops;
mod sandbox;

pub use error::FsError;
pub use ops::{
    DirEntry, DirectoryListing, EntryKind, FileContents, FileInfo, FileMatches, FileOperations, LineMatch,
    ListingContents, MAX_LINES_PER_FILE, SearchReport, TextStats, WriteReceipt,
};
pub use sandbox::{Sandbox, SandboxedPath};

//! Filesystem abstraction for the SuperClaude plugin sync
//!
//! Provides root-relative path keys, content checksums, atomic writes and a
//! [`FileSystem`] trait so that sync logic can run against the real disk or an
//! in-memory tree.

pub mod checksum;
pub mod config;
pub mod error;
pub mod fs;
pub mod io;
pub mod path;

pub use checksum::Checksum;
pub use config::ConfigStore;
pub use error::{Error, Result};
pub use fs::{DirEntry, FileSystem, MemoryFs, RealFs, walk_files};
pub use path::NormalizedPath;

//! Git abstraction for the SuperClaude plugin sync
//!
//! Wraps the three git operations the sync needs, all through `git2`:
//!
//! - [`clone_repo`]: fetch the upstream Framework tree
//! - [`head_commit`]: identify the revision that was synced
//! - [`move_tracked`]: rename a tracked file while keeping it staged as a move

pub mod clone;
pub mod error;
pub mod index;

pub use clone::{clone_repo, head_commit, is_remote_url};
pub use error::{Error, Result};
pub use index::{is_repository, move_tracked};

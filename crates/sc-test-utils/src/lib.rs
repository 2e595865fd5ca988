//! Shared test fixtures for the SuperClaude plugin sync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: git repository fixtures built with `git2`
//! - [`repo`]: [`repo::TestTree`] builder for plugin roots and Framework checkouts

pub mod git;
pub mod repo;

//! branch-sweep: delete stale branches from a GitHub repository.
//!
//! The default branch, protected branches and both ends of every open pull
//! request are exempt. Everything else whose last commit is older than the
//! idle cutoff is deleted, or only reported in dry-run mode.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod remote;
pub mod sweep;
pub mod test_utils;

pub use error::{Result, SweepError};

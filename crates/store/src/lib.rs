//! Storage layer for datacap
//!
//! This crate implements the in-process transactional backing store:
//! - [`UsageStore`]: the shared counter records with per-record update-intent
//!   locks, row latches, and versioned commits
//! - [`CustomerDirectory`]: the customer browsing/editing collaborator
//! - the exceeded-usage report over the directory

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod counter;
pub mod directory;
pub mod report;

pub use counter::UsageStore;
pub use directory::CustomerDirectory;

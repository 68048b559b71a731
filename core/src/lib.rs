//! Mirror the repositories of a GitHub account into a local directory.
//!
//! The [`github`] module lists repositories, [`ops`] drives `git` over them
//! with bounded concurrency and renders the resulting report.

pub mod config;
pub mod git;
pub mod github;
pub mod ops;
pub mod repo;
pub mod utils;

//! bbcli - Bitbucket Server pull request and repository CLI
//!
//! Reads local repository context through `git`, talks to the Bitbucket
//! Server REST API, and renders the results on the terminal.

pub mod cli;
pub mod core;
pub mod git;
pub mod platform;
pub mod telemetry;
pub mod util;

pub use core::credentials::Credentials;
pub use core::repo::RepoIdentity;

//! Core data for bbcli: stored credentials and repository identity

pub mod credentials;
pub mod repo;

pub use credentials::{ConfigError, CredentialStore, Credentials};
pub use repo::{parse_remote_url, RepoIdentity};

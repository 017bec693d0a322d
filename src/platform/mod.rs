//! Bitbucket Server API layer
//!
//! `client` performs raw authenticated requests, `endpoints` builds URLs,
//! `types` holds the typed schemas and `bitbucket` implements the
//! [`BitbucketApi`] trait on top of them.

pub mod bitbucket;
pub mod client;
pub mod endpoints;
pub mod traits;
pub mod types;

pub use bitbucket::BitbucketServer;
pub use client::{ApiResponse, HttpClient};
pub use endpoints::Endpoints;
pub use traits::{ApiError, BitbucketApi, CreateOutcome, MergeOutcome, RepoCreateOutcome};
pub use types::*;

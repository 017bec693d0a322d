//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod fixtures;
pub mod git_helpers;
pub mod mock_bitbucket;
pub mod prompter;

//! Pull request commands

pub mod copy;
pub mod create;
pub mod delete;
pub mod diff;
pub mod list;
pub mod merge;
pub mod review;
pub mod view;

pub use copy::run_pr_copy;
pub use create::{run_pr_create, CreateOptions};
pub use delete::run_pr_delete;
pub use diff::run_pr_diff;
pub use list::{run_pr_list, ListRole};
pub use merge::{run_pr_merge, MergeOptions};
pub use review::{run_pr_review, ReviewAction};
pub use view::run_pr_view;

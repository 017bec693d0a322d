//! Precondition checks and required-input handling

use thiserror::Error;

use super::prompt::Prompter;

/// Local preconditions a command checks before calling the server
#[derive(Error, Debug)]
pub enum PreconditionError {
    #[error("Not a git repository: {0}")]
    NotARepo(String),

    #[error("Source & target cannot be the same ('{0}')")]
    SameBranch(String),

    #[error("{0} cannot be empty or 'none'")]
    MissingInput(String),

    #[error("Invalid {what}: '{value}'")]
    InvalidInput { what: String, value: String },

    #[error("Aborted: {0}")]
    Declined(String),
}

fn is_blank(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none")
}

/// Return `value` if given, otherwise ask for it.
///
/// An empty answer or the literal `none` fails with
/// [`PreconditionError::MissingInput`].
pub fn require_input(
    value: Option<&str>,
    label: &str,
    prompter: &dyn Prompter,
) -> anyhow::Result<String> {
    let value = match value {
        Some(v) => v.to_string(),
        None => prompter.input(label, None)?,
    };
    if is_blank(&value) {
        return Err(PreconditionError::MissingInput(label.to_string()).into());
    }
    Ok(value.trim().to_string())
}

/// Parse a single pull request id.
pub fn parse_id(value: &str) -> Result<u64, PreconditionError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| PreconditionError::InvalidInput {
            what: "pull request id".to_string(),
            value: value.to_string(),
        })
}

/// Parse a comma-separated id list such as `1,2, 3`.
pub fn parse_ids(value: &str) -> Result<Vec<u64>, PreconditionError> {
    if is_blank(value) {
        return Err(PreconditionError::MissingInput(
            "pull request id".to_string(),
        ));
    }
    value
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(parse_id)
        .collect()
}

/// Return the given id, or prompt for one.
pub fn require_id(
    id: Option<u64>,
    prompter: &dyn Prompter,
) -> anyhow::Result<u64> {
    match id {
        Some(id) => Ok(id),
        None => {
            let answer = require_input(None, "Pull request id", prompter)?;
            Ok(parse_id(&answer)?)
        }
    }
}

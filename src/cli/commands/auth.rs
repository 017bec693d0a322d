//! Auth command implementation
//!
//! Creates, inspects, tests and removes the credential file.

use colored::Colorize;

use crate::cli::context::AppContext;
use crate::cli::output::Output;
use crate::cli::precondition::require_input;
use crate::cli::prompt::Prompter;
use crate::core::{CredentialStore, Credentials};
use crate::platform::{BitbucketApi, BitbucketServer};

/// Prompt for host, username and token and write a new credential file.
///
/// Returns `false` without prompting when a file is already present.
pub fn setup_credentials(
    store: &CredentialStore,
    prompter: &dyn Prompter,
) -> anyhow::Result<bool> {
    if store.exists() {
        return Ok(false);
    }
    let host = require_input(None, "bitbucket_host", prompter)?;
    let username = require_input(None, "username", prompter)?;
    let token = prompter.password("token")?;
    if token.trim().is_empty() {
        anyhow::bail!("token cannot be empty");
    }

    let credentials = Credentials::new(&host, &username, token.trim())?;
    store.create(&credentials)?;
    Ok(true)
}

/// Run the auth setup command
pub fn run_auth_setup(ctx: &AppContext, prompter: &dyn Prompter) -> anyhow::Result<()> {
    let store = ctx.store()?;
    if setup_credentials(&store, prompter)? {
        Output::success(&format!(
            "Configuration written at '{}', please re-run 'bb auth test' to validate",
            store.path().display()
        ));
    } else {
        Output::info("Configuration file found, run 'bb auth status' for more information");
    }
    Ok(())
}

/// Run the auth test command
pub async fn run_auth_test(ctx: &AppContext) -> anyhow::Result<()> {
    let credentials = ctx.credentials()?;
    let api = BitbucketServer::new(&credentials)?;

    let spinner = Output::spinner(&format!(
        "Validating connection with '{}' ...",
        credentials.host
    ));
    match api.inbox_count().await {
        Ok(_) => {
            Output::spinner_done(&spinner, "OK");
            Ok(())
        }
        Err(e) => {
            Output::spinner_failed(&spinner, "FAILED");
            Err(e.into())
        }
    }
}

/// Run the auth status command
pub fn run_auth_status(ctx: &AppContext, show_token: bool) -> anyhow::Result<()> {
    let store = ctx.store()?;
    let credentials = store.load()?;

    Output::success(&format!(
        "Configuration found at {}",
        store.path().display().to_string().cyan().bold()
    ));
    Output::success(&format!(
        "Will connect to {} as {}",
        credentials.host.bold(),
        credentials.username.bold()
    ));
    let token = if show_token {
        credentials.token.clone()
    } else {
        credentials.masked_token()
    };
    Output::success(&format!("Token: {}", token));
    Ok(())
}

/// Run the auth reset command
pub fn run_auth_reset(
    ctx: &AppContext,
    prompter: &dyn Prompter,
    yes: bool,
) -> anyhow::Result<()> {
    let store = ctx.store()?;
    if !store.exists() {
        Output::info(&format!(
            "No configuration found at '{}'",
            store.path().display()
        ));
        return Ok(());
    }

    let question = format!("Remove configuration at '{}'?", store.path().display());
    if !yes && !prompter.confirm(&question, false)? {
        Output::info("Configuration kept");
        return Ok(());
    }

    store.remove()?;
    Output::success("Configuration removed, run 'bb auth setup' to configure again");
    Ok(())
}

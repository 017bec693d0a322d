//! Command logging utilities for verbose output.

use std::process::{Command, Output};
use tracing::debug;

/// Log a command just before execution.
///
/// Emits a `tracing::debug!` event with the program name, arguments, and
/// working directory. Visible when running with `--verbose` (which sets
/// `bbcli=debug`) or via `RUST_LOG=bbcli::cmd=debug`.
pub fn log_cmd(cmd: &Command) {
    let program = cmd.get_program().to_string_lossy();
    let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy()).collect();
    let cwd = cmd
        .get_current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    debug!(
        target: "bbcli::cmd",
        %program,
        ?args,
        %cwd,
        "exec"
    );
}

/// Log and run a command, capturing its output.
pub fn run_cmd(cmd: &mut Command) -> std::io::Result<Output> {
    log_cmd(cmd);
    let output = cmd.output()?;
    debug!(
        target: "bbcli::cmd",
        code = output.status.code().unwrap_or(-1),
        "exit"
    );
    Ok(output)
}

/// Render a command line for error messages.
pub fn display_cmd(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().to_string()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().to_string()));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_cmd() {
        let mut cmd = Command::new("git");
        cmd.args(["branch", "-D", "feature/x"]);
        assert_eq!(display_cmd(&cmd), "git branch -D feature/x");
    }
}

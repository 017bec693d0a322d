//! Browser utilities
//!
//! Functions for opening URLs in the system's default browser.

use std::process::Command;

use crate::util::log_cmd;

/// Platform command that opens a URL
fn opener(url: &str) -> Command {
    #[cfg(target_os = "macos")]
    let cmd = {
        let mut c = Command::new("open");
        c.arg(url);
        c
    };

    #[cfg(target_os = "windows")]
    let cmd = {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", url]);
        c
    };

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let cmd = {
        let mut c = Command::new("xdg-open");
        c.arg(url);
        c
    };

    cmd
}

/// Open a URL in the system's default browser
///
/// Uses platform-specific commands:
/// - macOS: `open`
/// - Linux: `xdg-open`
/// - Windows: `cmd /C start`
pub fn open_url(url: &str) -> anyhow::Result<()> {
    let mut cmd = opener(url);
    log_cmd(&cmd);
    cmd.spawn()
        .map_err(|e| anyhow::anyhow!("Unable to open '{}' in a browser: {}", url, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opener_passes_url() {
        let cmd = opener("https://bb.example.com/pr/1");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect();
        assert!(args.contains(&"https://bb.example.com/pr/1".to_string()));
    }
}

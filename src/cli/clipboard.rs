//! Clipboard access
//!
//! Copying is best effort: headless sessions and VMs often have no
//! clipboard, so failures are logged and reported as `false`.

use tracing::debug;

/// Copy `text` to the system clipboard. Returns whether it worked.
pub fn copy_to_clipboard(text: &str) -> bool {
    match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.to_string())) {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "clipboard unavailable");
            false
        }
    }
}

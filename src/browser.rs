//! Best-effort launch of the host's default browser.
//!
//! The URL in the HTTP response is the primary notification channel; this is only a
//! convenience side channel. The spawned command is never waited on and its output is
//! discarded.

use std::process::{Command, Stdio};

use url::Url;

/// Pick the launcher command for the current OS family, with `xdg-open` as the fallback.
fn launch_command() -> (&'static str, &'static [&'static str]) {
    if cfg!(target_os = "macos") {
        ("open", &[])
    } else if cfg!(target_os = "windows") {
        ("cmd", &["/c", "start"])
    } else {
        ("xdg-open", &[])
    }
}

/// Attempt to open `url` in the default browser.
///
/// Returns whether the command was successfully *started*, not whether a browser
/// actually opened. Failure is logged and never escalated.
pub fn open_in_browser(url: &Url) -> bool {
    let (program, args) = launch_command();

    match Command::new(program)
        .args(args)
        .arg(url.as_str())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(_) => {
            tracing::debug!(%url, program, "Launched browser");
            true
        }
        Err(error) => {
            tracing::warn!(%url, program, %error, "Failed to start browser command");
            false
        }
    }
}

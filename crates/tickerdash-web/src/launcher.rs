use std::io;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Opens a URL in whatever displays it.
pub trait BrowserOpener: Send + Sync + 'static {
    fn open(&self, url: &str) -> io::Result<()>;
}

/// The desktop's default browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl BrowserOpener for SystemBrowser {
    fn open(&self, url: &str) -> io::Result<()> {
        let mut command = if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(target_os = "windows") {
            let mut command = Command::new("cmd");
            command.args(["/C", "start", ""]);
            command
        } else {
            Command::new("xdg-open")
        };

        command.arg(url);
        run_to_exit(command)
    }
}

/// Run `command` and wait for it so the child is reaped.
fn run_to_exit(mut command: Command) -> io::Result<()> {
    let status = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("browser command exited with {status}")))
    }
}

/// Opens the dashboard at most once per process, after a delay that gives
/// the server time to start accepting connections.
#[derive(Debug, Default)]
pub struct BrowserLauncher {
    launched: AtomicBool,
}

impl BrowserLauncher {
    pub const fn new() -> Self {
        Self {
            launched: AtomicBool::new(false),
        }
    }

    /// Schedule the open. Returns `None` when a launch was already scheduled.
    pub fn schedule<O: BrowserOpener>(
        &self,
        opener: O,
        url: String,
        delay: Duration,
    ) -> Option<JoinHandle<()>> {
        if self.launched.swap(true, Ordering::SeqCst) {
            return None;
        }

        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let opened = {
                let url = url.clone();
                tokio::task::spawn_blocking(move || opener.open(&url)).await
            };
            match opened {
                Ok(Ok(())) => tracing::info!(%url, "opened dashboard in browser"),
                Ok(Err(error)) => tracing::warn!(%url, %error, "could not open browser"),
                Err(error) => tracing::warn!(%url, %error, "browser task failed"),
            }
        }))
    }
}

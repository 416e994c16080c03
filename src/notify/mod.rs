//! User-facing failure notifications.
//!
//! Every failed operation is reported through a single [`Notifier`]. The host
//! application picks where the report goes with [`NotificationMethod`].

use serde::{Deserialize, Serialize};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Where failure notifications are delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationMethod {
    /// Print `[title] message` to stderr
    #[default]
    Console,
    /// Show a desktop notification
    Desktop,
    /// Only the tracing event is emitted
    None,
}

impl std::fmt::Display for NotificationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Console => write!(f, "console"),
            Self::Desktop => write!(f, "desktop"),
            Self::None => write!(f, "none"),
        }
    }
}

impl std::str::FromStr for NotificationMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" => Ok(Self::Console),
            "desktop" => Ok(Self::Desktop),
            "none" => Ok(Self::None),
            _ => Err(format!("Invalid notification method: {}", s)),
        }
    }
}

/// Failure notification side-channel
#[derive(Debug, Default)]
pub struct Notifier {
    method: NotificationMethod,
    delivered: AtomicUsize,
}

impl Notifier {
    /// Create a notifier for the given method
    pub fn new(method: NotificationMethod) -> Self {
        Self {
            method,
            delivered: AtomicUsize::new(0),
        }
    }

    /// Configured delivery method
    pub fn method(&self) -> NotificationMethod {
        self.method
    }

    /// Number of notifications issued so far
    pub fn count(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Report a failure.
    ///
    /// Console reports already go to stderr, so their tracing event is
    /// debug-level and stays below the default `warn` filter.
    pub fn notify(&self, title: &str, message: &str) {
        self.delivered.fetch_add(1, Ordering::Relaxed);

        match self.method {
            NotificationMethod::Console => {
                tracing::debug!(title = title, method = %self.method, "{}", message);
                eprintln!("[{}] {}", title, message);
            }
            NotificationMethod::Desktop => {
                tracing::error!(title = title, method = %self.method, "{}", message);
                if let Err(e) = desktop_notification(title, message) {
                    tracing::warn!(error = %e, "desktop notification failed");
                }
            }
            NotificationMethod::None => {
                tracing::error!(title = title, method = %self.method, "{}", message);
            }
        }
    }
}

/// Spawn the platform notification command
fn desktop_notification(title: &str, message: &str) -> std::io::Result<()> {
    let mut command = if std::env::consts::OS == "macos" {
        let script = format!(
            r#"display notification "{}" with title "{}""#,
            escape_applescript(message),
            escape_applescript(title)
        );
        let mut cmd = Command::new("osascript");
        cmd.arg("-e").arg(script);
        cmd
    } else {
        let mut cmd = Command::new("notify-send");
        cmd.arg(title).arg(message);
        cmd
    };

    let status = command
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;

    if !status.success() {
        return Err(std::io::Error::other(format!(
            "notification command exited with {}",
            status
        )));
    }
    Ok(())
}

fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

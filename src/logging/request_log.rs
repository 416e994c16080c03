//! Append-only plaintext log of outgoing API requests.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One timestamped line per request.
///
/// Write failures are logged and swallowed; the request itself never fails
/// because of the log.
#[derive(Debug, Clone)]
pub struct RequestLog {
    path: PathBuf,
}

impl RequestLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a request to `endpoint` with a short free-form detail
    pub fn record(&self, method: &str, endpoint: &str, detail: &str) {
        let line = format_entry(chrono::Utc::now(), method, endpoint, detail);
        if let Err(e) = self.append(&line) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write request log");
        }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }
}

fn format_entry(
    at: chrono::DateTime<chrono::Utc>,
    method: &str,
    endpoint: &str,
    detail: &str,
) -> String {
    let timestamp = at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    if detail.is_empty() {
        format!("[{}] {} {}", timestamp, method, endpoint)
    } else {
        format!("[{}] {} {} {}", timestamp, method, endpoint, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_entry() {
        let at = chrono::Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(
            format_entry(at, "POST", "/chat/completions", "model=gpt-4o"),
            "[2024-05-01T12:30:00Z] POST /chat/completions model=gpt-4o"
        );
        assert_eq!(
            format_entry(at, "POST", "/files", ""),
            "[2024-05-01T12:30:00Z] POST /files"
        );
    }

    #[test]
    fn test_record_appends_and_creates_parent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("logs").join("requests.log");
        let log = RequestLog::new(&path);

        log.record("POST", "/audio/speech", "voice=alloy");
        log.record("POST", "/chat/completions", "");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("POST /audio/speech voice=alloy"));
        assert!(lines[1].ends_with("POST /chat/completions"));
    }

    #[test]
    fn test_record_unwritable_path_does_not_panic() {
        let temp_dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let log = RequestLog::new(temp_dir.path());
        log.record("POST", "/files", "");
    }
}

//! Webhook notification at the end of a run
//!
//! The report is best-effort: a run that already finished (or already
//! failed) never changes outcome because the notification could not be
//! delivered, so every failure here is logged and swallowed.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::run::RunReport;

const WEBHOOK_TIMEOUT_SECS: u64 = 30;
const LOG_TAIL_LINES: usize = 100;

#[derive(Serialize)]
struct WebhookPayload<'a> {
    #[serde(flatten)]
    report: &'a RunReport,
    log: Option<String>,
}

/// Post the run report to the webhook, attaching the tail of the run log.
pub async fn send_report(webhook_url: Option<&str>, report: &RunReport, log_file: &Path) {
    let Some(url) = webhook_url else {
        debug!("no webhook configured, skipping report");
        return;
    };

    let payload = WebhookPayload {
        report,
        log: read_log_tail(log_file),
    };

    if let Err(e) = post_report(url, &payload).await {
        warn!(error = %e, url, "failed to deliver run report");
    }
}

async fn post_report(url: &str, payload: &WebhookPayload<'_>) -> reqwest::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECS))
        .build()?;

    client
        .post(url)
        .json(payload)
        .send()
        .await?
        .error_for_status()?;

    debug!(url, "run report delivered");
    Ok(())
}

fn read_log_tail(log_file: &Path) -> Option<String> {
    match std::fs::read_to_string(log_file) {
        Ok(text) => Some(tail_lines(&text, LOG_TAIL_LINES)),
        Err(e) => {
            warn!(error = %e, path = %log_file.display(), "could not read run log for report");
            None
        },
    }
}

fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_tail_keeps_the_last_lines() {
        let text = (1..=150).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let tail = tail_lines(&text, 100);
        assert!(tail.starts_with("line 51"));
        assert!(tail.ends_with("line 150"));
        assert_eq!(tail.lines().count(), 100);
    }

    #[test]
    fn test_tail_of_a_short_log_is_the_whole_log() {
        assert_eq!(tail_lines("a\nb\nc", 100), "a\nb\nc");
    }

    #[test]
    fn test_missing_log_file_yields_no_tail() {
        assert!(read_log_tail(Path::new("/nonexistent/marcout.log")).is_none());
    }

    #[test]
    fn test_log_tail_read_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "first").unwrap();
        writeln!(file, "second").unwrap();
        file.flush().unwrap();

        let tail = read_log_tail(file.path()).unwrap();
        assert_eq!(tail, "first\nsecond");
    }
}

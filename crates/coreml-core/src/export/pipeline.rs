//! Subprocess plumbing for the export script.
//!
//! Streams the script's JSON progress lines from stdout into tracing,
//! drains stderr, checks cancellation between lines, and turns a non-zero
//! exit status into an error.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::ChildStderr;
use tracing::{debug, info, warn};

use super::types::{ExportStatus, ScriptProgressLine};
use crate::cancel::CancellationToken;
use crate::error::{ExportError, Result};

/// Progress collected while streaming the export subprocess.
#[derive(Debug, Default)]
pub struct StreamedProgress {
    /// Terminal `complete` line, when the script reported one.
    pub completion: Option<ScriptProgressLine>,
    /// Message of the last `error` line, when the script reported one.
    pub error: Option<String>,
}

impl StreamedProgress {
    fn record(&mut self, line: ScriptProgressLine) {
        match ExportStatus::from_stage(&line.stage) {
            Some(ExportStatus::Completed) => {
                self.completion = Some(line);
            }
            Some(ExportStatus::Error) => {
                let message = line
                    .message
                    .unwrap_or_else(|| "export script reported an error".to_string());
                warn!("Export script error: {}", message);
                self.error = Some(message);
            }
            Some(status) => {
                if let Some(message) = line.message {
                    info!("{:?}: {}", status, message);
                } else {
                    info!("{:?}", status);
                }
            }
            None => {
                debug!("Unknown export stage: {}", line.stage);
            }
        }
    }
}

/// Stream JSON progress lines from the subprocess's stdout.
///
/// Non-JSON lines are logged at debug level. Checks cancellation between
/// lines and kills the child when it fires.
pub async fn stream_export_progress(
    child: &mut tokio::process::Child,
    cancel_token: &CancellationToken,
) -> Result<StreamedProgress> {
    let stdout = child.stdout.take().expect("stdout was piped");
    let mut reader = BufReader::new(stdout).lines();
    let mut streamed = StreamedProgress::default();

    loop {
        if cancel_token.is_cancelled() {
            child.kill().await.ok();
            return Err(ExportError::Cancelled);
        }

        match reader.next_line().await {
            Ok(Some(line)) => {
                if let Ok(progress) = serde_json::from_str::<ScriptProgressLine>(&line) {
                    streamed.record(progress);
                } else {
                    debug!("Non-JSON export output: {}", line);
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Error reading export stdout: {}", e);
                break;
            }
        }
    }

    Ok(streamed)
}

/// Drain a subprocess's stderr in the background, logging each line at
/// debug level.
pub fn drain_stderr(stderr: ChildStderr) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = reader.next_line().await {
            debug!("export stderr: {}", line);
        }
    })
}

/// Wait for a child process to exit and return an error on non-zero status.
pub async fn wait_and_check_exit(
    child: &mut tokio::process::Child,
    process_name: &str,
) -> Result<()> {
    let status = child.wait().await.map_err(|e| ExportError::ExportFailed {
        message: format!("{process_name} process error: {e}"),
    })?;

    if !status.success() {
        return Err(ExportError::ExportFailed {
            message: format!(
                "{process_name} exited with status: {}",
                status.code().unwrap_or(-1)
            ),
        });
    }
    Ok(())
}

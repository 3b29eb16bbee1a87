use crate::tools::ToolError;
use serde::Deserialize;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

const TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
pub(super) struct Args {
    cmd: String,
}

pub(super) async fn run(args: Args) -> Result<String, ToolError> {
    run_with_timeout(&args.cmd, TIMEOUT).await
}

async fn run_with_timeout(cmd: &str, timeout: Duration) -> Result<String, ToolError> {
    debug!(command = %cmd, "executing shell command");

    let mut command = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", cmd]);
        c
    } else {
        let mut c = Command::new("sh");
        c.args(["-c", cmd]);
        c
    };
    command.kill_on_drop(true);

    let output = tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| {
            warn!(command = %cmd, "shell command timed out");
            ToolError::Timeout(timeout.as_secs())
        })?
        .map_err(|e| ToolError::Execution(e.to_string()))?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
        text.push_str(&format!("\n[stderr]: {stderr}"));
    }
    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        text.push_str(&format!("\n[exit code]: {code}"));
    }

    if text.is_empty() {
        Ok("(no output)".to_string())
    } else {
        Ok(text)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout() {
        let out = run(Args {
            cmd: "echo hello".into(),
        })
        .await
        .unwrap();
        assert_eq!(out, "hello\n");
    }

    #[tokio::test]
    async fn reports_stderr_and_exit_code() {
        let out = run(Args {
            cmd: "echo oops >&2; exit 3".into(),
        })
        .await
        .unwrap();
        assert!(out.contains("[stderr]: oops"));
        assert!(out.ends_with("[exit code]: 3"));
    }

    #[tokio::test]
    async fn empty_output() {
        let out = run(Args { cmd: "true".into() }).await.unwrap();
        assert_eq!(out, "(no output)");
    }

    #[tokio::test]
    async fn timeout_is_reported() {
        let err = run_with_timeout("sleep 5", Duration::from_millis(100))
            .await
            .unwrap_err();
        assert_eq!(err, ToolError::Timeout(0));
    }
}

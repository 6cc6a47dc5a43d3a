// Subprocess plumbing and argument builders shared by the client wrappers

use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration};

use super::errors::DownloadError;
use super::models::{DownloadOptions, RetryPolicy};

/// Run a client binary to completion with a hard timeout.
///
/// stdout/stderr are drained concurrently so a chatty client cannot
/// deadlock on a full pipe. On timeout the child is killed.
pub async fn run_output_with_timeout(
    program: &str,
    args: Vec<String>,
    envs: Vec<(String, String)>,
    timeout_secs: u64,
) -> Result<std::process::Output, DownloadError> {
    let mut child = TokioCommand::new(program)
        .args(&args)
        .envs(envs)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| DownloadError::ClientNotFound(format!("{}: {}", program, e)))?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| DownloadError::ExecutionError(format!("no stdout from {}", program)))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| DownloadError::ExecutionError(format!("no stderr from {}", program)))?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe
            .read_to_end(&mut buf)
            .await
            .map_err(|e| format!("failed to read stdout: {}", e))?;
        Ok::<Vec<u8>, String>(buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe
            .read_to_end(&mut buf)
            .await
            .map_err(|e| format!("failed to read stderr: {}", e))?;
        Ok::<Vec<u8>, String>(buf)
    });

    let waited = timeout(Duration::from_secs(timeout_secs), child.wait()).await;
    match waited {
        Ok(status_res) => {
            let status = status_res
                .map_err(|e| DownloadError::ExecutionError(format!("wait on {}: {}", program, e)))?;
            let stdout = stdout_task
                .await
                .map_err(|e| DownloadError::ExecutionError(format!("stdout task: {}", e)))?
                .map_err(DownloadError::ExecutionError)?;
            let stderr = stderr_task
                .await
                .map_err(|e| DownloadError::ExecutionError(format!("stderr task: {}", e)))?
                .map_err(DownloadError::ExecutionError)?;
            Ok(std::process::Output {
                status,
                stdout,
                stderr,
            })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(DownloadError::Timeout(format!(
                "{} did not finish within {}s",
                program, timeout_secs
            )))
        }
    }
}

/// Formatting and layout arguments common to both clients
pub fn format_args(options: &DownloadOptions) -> Vec<String> {
    let mut args = vec![
        "--output-dir".to_string(),
        options.output_dir.clone(),
        "--dir-format".to_string(),
        options.custom_dir_format.clone(),
        "--track-format".to_string(),
        options.custom_track_format.clone(),
    ];

    if !options.pad_tracks {
        args.push("--no-pad-tracks".to_string());
    }
    if !options.save_cover {
        args.push("--no-save-cover".to_string());
    }

    args
}

/// Retry tuning arguments; the clients own the actual retry loop
pub fn retry_args(retry: &RetryPolicy) -> Vec<String> {
    vec![
        "--initial-retry-delay".to_string(),
        retry.initial_retry_delay.to_string(),
        "--retry-delay-increase".to_string(),
        retry.retry_delay_increase.to_string(),
        "--max-retries".to_string(),
        retry.max_retries.to_string(),
    ]
}

/// Conversion arguments, present only when a target format is set
pub fn convert_args(options: &DownloadOptions) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(convert_to) = &options.convert_to {
        args.push("--convert-to".to_string());
        args.push(convert_to.clone());
        if let Some(bitrate) = &options.bitrate {
            args.push("--bitrate".to_string());
            args.push(bitrate.clone());
        }
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_args_defaults() {
        let options = DownloadOptions::default();
        let args = format_args(&options);

        assert!(args.contains(&"--output-dir".to_string()));
        assert!(args.contains(&"./downloads".to_string()));
        assert!(args.contains(&"%ar_album%/%album%/%copyright%".to_string()));
        // Padding and covers are on by default; no negating flags
        assert!(!args.contains(&"--no-pad-tracks".to_string()));
        assert!(!args.contains(&"--no-save-cover".to_string()));
    }

    #[test]
    fn test_format_args_negating_flags() {
        let options = DownloadOptions::default()
            .with_pad_tracks(false)
            .with_save_cover(false);
        let args = format_args(&options);

        assert!(args.contains(&"--no-pad-tracks".to_string()));
        assert!(args.contains(&"--no-save-cover".to_string()));
    }

    #[test]
    fn test_retry_args() {
        let retry = RetryPolicy {
            initial_retry_delay: 10,
            retry_delay_increase: 15,
            max_retries: 7,
        };
        let args = retry_args(&retry);
        assert_eq!(
            args,
            vec![
                "--initial-retry-delay",
                "10",
                "--retry-delay-increase",
                "15",
                "--max-retries",
                "7"
            ]
        );
    }

    #[test]
    fn test_convert_args_only_when_requested() {
        let options = DownloadOptions::default();
        assert!(convert_args(&options).is_empty());

        let options = options.with_conversion("MP3", Some("320k".to_string()));
        let args = convert_args(&options);
        assert_eq!(args, vec!["--convert-to", "MP3", "--bitrate", "320k"]);
    }

    #[tokio::test]
    async fn test_run_output_captures_stdout() {
        let output = run_output_with_timeout("echo", vec!["hello".to_string()], vec![], 5)
            .await
            .unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_output_missing_binary() {
        let err = run_output_with_timeout("definitely-not-a-real-binary", vec![], vec![], 5)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::ClientNotFound(_)));
    }
}

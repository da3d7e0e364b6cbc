//! `openPath`: hand a path or URL to the platform's default handler.

use tokio::process::Command;

use super::errors::CapabilityError;

/// Platform opener: program plus leading arguments.
fn opener() -> (&'static str, &'static [&'static str]) {
    const NO_ARGS: &[&str] = &[];
    const WINDOWS_START: &[&str] = &["/C", "start", ""];

    if cfg!(target_os = "macos") {
        ("open", NO_ARGS)
    } else if cfg!(target_os = "windows") {
        ("cmd", WINDOWS_START)
    } else {
        ("xdg-open", NO_ARGS)
    }
}

/// Open `path`. Succeeds once the handler accepted the request.
pub async fn open_path(path: &str) -> Result<(), CapabilityError> {
    let (program, leading) = opener();
    run_opener(program, leading, path).await
}

async fn run_opener(program: &str, leading: &[&str], path: &str) -> Result<(), CapabilityError> {
    let output = Command::new(program)
        .args(leading)
        .arg(path)
        .output()
        .await
        .map_err(|e| CapabilityError::SpawnFailed {
            program: program.to_string(),
            reason: e.to_string(),
        })?;

    if output.status.success() {
        tracing::debug!(program, "path handed to opener");
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let reason = if stderr.is_empty() {
        format!("{program} exited with {}", output.status)
    } else {
        stderr
    };
    Err(CapabilityError::OpenFailed {
        path: path.to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opener_matches_platform() {
        let (program, _) = opener();
        if cfg!(target_os = "macos") {
            assert_eq!(program, "open");
        } else if cfg!(target_os = "linux") {
            assert_eq!(program, "xdg-open");
        }
    }

    #[tokio::test]
    async fn test_missing_opener_is_spawn_failure() {
        let err = run_opener("deskmate-no-such-opener", &[], "/tmp").await.unwrap_err();
        assert!(matches!(err, CapabilityError::SpawnFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_opener_reports_open_failure() {
        let err = run_opener("false", &[], "/tmp/x").await.unwrap_err();
        assert!(matches!(err, CapabilityError::OpenFailed { ref path, .. } if path == "/tmp/x"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_succeeding_opener() {
        assert!(run_opener("true", &[], "/tmp").await.is_ok());
    }
}

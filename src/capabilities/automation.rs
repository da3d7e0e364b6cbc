//! Automation script execution.
//!
//! Only the confirmation gate's second phase holds a [`ScriptRunner`]; the
//! orchestration loop has no path to one.

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::AutomationSettings;

use super::errors::CapabilityError;

/// Captured result of a script run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Run `script`. `Err` means the interpreter could not be run at all;
    /// a script that ran and failed is `Ok` with `success == false`.
    async fn run(&self, script: &str) -> Result<ScriptOutput, CapabilityError>;
}

/// Runs scripts through an interpreter binary, e.g. `osascript -e <script>`.
#[derive(Debug, Clone)]
pub struct CommandScriptRunner {
    interpreter: String,
    args: Vec<String>,
}

impl CommandScriptRunner {
    pub fn new(settings: &AutomationSettings) -> Self {
        Self {
            interpreter: settings.interpreter.clone(),
            args: settings.args.clone(),
        }
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }
}

#[async_trait]
impl ScriptRunner for CommandScriptRunner {
    async fn run(&self, script: &str) -> Result<ScriptOutput, CapabilityError> {
        if script.trim().is_empty() {
            return Err(CapabilityError::EmptyScript);
        }

        tracing::info!(
            interpreter = %self.interpreter,
            script_len = script.len(),
            "running confirmed automation script"
        );

        let output = Command::new(&self.interpreter)
            .args(&self.args)
            .arg(script)
            .output()
            .await
            .map_err(|e| CapabilityError::SpawnFailed {
                program: self.interpreter.clone(),
                reason: e.to_string(),
            })?;

        let result = ScriptOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        };

        tracing::info!(
            success = result.success,
            exit_code = ?result.exit_code,
            stdout_len = result.stdout.len(),
            stderr_len = result.stderr.len(),
            "automation script finished"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh_runner() -> CommandScriptRunner {
        CommandScriptRunner::new(&AutomationSettings {
            interpreter: "sh".to_string(),
            args: vec!["-c".to_string()],
        })
    }

    #[test]
    fn test_default_settings_use_osascript() {
        let runner = CommandScriptRunner::new(&AutomationSettings::default());
        assert_eq!(runner.interpreter(), "osascript");
    }

    #[tokio::test]
    async fn test_empty_script_rejected() {
        let err = sh_runner().run("   \n").await.unwrap_err();
        assert_eq!(err, CapabilityError::EmptyScript);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_stdout() {
        let out = sh_runner().run("echo hello").await.unwrap();
        assert!(out.success);
        assert_eq!(out.exit_code, Some(0));
        assert_eq!(out.stdout, "hello");
        assert!(out.stderr.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_stderr_and_exit_code() {
        let out = sh_runner().run("echo oops 1>&2; exit 3").await.unwrap();
        assert!(!out.success);
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.stderr, "oops");
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_spawn_failure() {
        let runner = CommandScriptRunner::new(&AutomationSettings {
            interpreter: "deskmate-no-such-interpreter".to_string(),
            args: vec![],
        });
        let err = runner.run("beep").await.unwrap_err();
        assert!(matches!(err, CapabilityError::SpawnFailed { .. }));
    }
}

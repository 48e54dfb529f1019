use std::io::Write;
use std::process::Stdio;
use std::time::Duration;

use anyhow::Result;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, info};

/// Runs model-supplied code in a separate interpreter process.
///
/// The code is written to a temp file, handed to the configured
/// interpreter, and killed when the wall-clock timeout elapses. Output
/// is captured; nothing from the host process leaks into the child's
/// arguments.
pub struct Sandbox {
    interpreter: String,
    default_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub success: bool,
}

impl Sandbox {
    pub fn new(interpreter: impl Into<String>, default_timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            default_timeout,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Execute `code` with the configured interpreter.
    ///
    /// Fails on empty code, spawn problems, and timeout. A non-zero exit
    /// code is not an error here; it is reported in the result.
    pub async fn run(&self, code: &str, timeout: Option<Duration>) -> Result<ExecutionResult> {
        if code.trim().is_empty() {
            anyhow::bail!("code must not be empty");
        }

        let limit = timeout.unwrap_or(self.default_timeout);
        info!(
            "Executing code with {} ({} chars, timeout {}s)",
            self.interpreter,
            code.len(),
            limit.as_secs()
        );

        let mut temp_file = NamedTempFile::with_suffix(".py")?;
        temp_file.write_all(code.as_bytes())?;
        temp_file.flush()?;

        let child = Command::new(&self.interpreter)
            .arg(temp_file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                anyhow::bail!("execution timed out after {}s", limit.as_secs());
            }
        };

        let exit_code = output.status.code().unwrap_or(-1);
        debug!("Interpreter exited with code {}", exit_code);

        Ok(ExecutionResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code,
            success: output.status.success(),
        })
    }
}

impl ExecutionResult {
    /// Render the result as the textual report fed back to the model
    pub fn render(&self) -> String {
        let mut report = String::new();
        if !self.stdout.is_empty() {
            report.push_str(&self.stdout);
        }
        if !self.stderr.is_empty() {
            if !report.is_empty() {
                report.push('\n');
            }
            report.push_str("[stderr]\n");
            report.push_str(&self.stderr);
        }
        if report.is_empty() {
            report.push_str("(no output)");
        }
        if !self.success {
            report.push_str(&format!("\n[exit code: {}]", self.exit_code));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests use `sh` so they do not depend on a python install.
    fn sandbox() -> Sandbox {
        Sandbox::new("sh", Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_captures_stdout() {
        let result = sandbox().run("echo hello", None).await.unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout.trim(), "hello");
        assert_eq!(result.render().trim(), "hello");
    }

    #[tokio::test]
    async fn test_reports_nonzero_exit_and_stderr() {
        let result = sandbox()
            .run("echo oops >&2; exit 3", None)
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, 3);
        let report = result.render();
        assert!(report.contains("[stderr]"));
        assert!(report.contains("oops"));
        assert!(report.contains("[exit code: 3]"));
    }

    #[tokio::test]
    async fn test_empty_code_fails() {
        let result = sandbox().run("   \n", None).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let result = sandbox()
            .run("sleep 30", Some(Duration::from_millis(200)))
            .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_render_no_output() {
        let result = ExecutionResult {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: 0,
            success: true,
        };

        assert_eq!(result.render(), "(no output)");
    }
}

//! External process execution

use std::future::Future;
use std::io;
use std::process::Stdio;
use std::time::Duration;

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was terminated by a signal
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a single shell command line to completion
///
/// Implementors decide how the command is launched. An `Err` means the
/// process could not be started or waited on; anything the process itself
/// reports comes back inside [`ProcessOutput`].
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &str) -> impl Future<Output = io::Result<ProcessOutput>> + Send;
}

/// Runs commands through `sh -c`, capturing stdout and stderr separately
///
/// Stdin is closed so an interactive prompt (e.g. a login prompt from the
/// search tool) fails fast instead of hanging.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
    timeout: Option<Duration>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self {
            shell: "sh".to_string(),
            timeout: None,
        }
    }

    /// Use a different shell binary
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Kill the process if it runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> io::Result<ProcessOutput> {
        let child = tokio::process::Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Dropping the wait future on timeout drops the child, which kills it
        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("process did not finish within {}s", timeout.as_secs_f64()),
                    )
                })??,
            None => child.wait_with_output().await?,
        };

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_streams_separately() {
        let runner = ShellRunner::new();
        let output = runner
            .run("printf 'a,b\\n1,2\\n'; printf 'oops' >&2")
            .await
            .unwrap();
        assert_eq!(output.stdout, b"a,b\n1,2\n");
        assert_eq!(output.stderr, "oops");
        assert!(output.success());
    }

    #[tokio::test]
    async fn test_exit_code() {
        let output = ShellRunner::new().run("exit 3").await.unwrap();
        assert_eq!(output.code, Some(3));
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_stdin_closed() {
        let output = ShellRunner::new().run("cat").await.unwrap();
        assert!(output.stdout.is_empty());
        assert!(output.success());
    }

    #[tokio::test]
    async fn test_missing_shell_is_spawn_error() {
        let runner = ShellRunner::new().with_shell("/nonexistent/shell");
        let err = runner.run("true").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_timeout() {
        let runner = ShellRunner::new().with_timeout(Duration::from_millis(200));
        let err = runner.run("sleep 5").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }
}

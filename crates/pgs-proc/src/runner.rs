//! Command specification and the tokio-backed runner

use crate::error::{ProcError, ProcResult};
use async_trait::async_trait;
use std::time::Duration;

/// One external command: program, argument vector, extra environment,
/// and an optional per-invocation deadline.
///
/// Secrets travel in `env` (e.g. `PGPASSWORD`), never in `args`, so they
/// stay out of process listings and logs.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    /// Start building a command
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            timeout: None,
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for this invocation only
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Set the deadline for this invocation
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Render the command line for logs (arguments only, env is omitted)
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Captured result of a completed command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the command exited zero
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Trait seam for executing external commands.
///
/// Implementations must be Send + Sync; tests substitute a recording mock.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion, capturing both output streams.
    ///
    /// A non-zero exit is returned as a normal `CommandOutput`; `Err` is
    /// reserved for spawn failure and deadline expiry.
    async fn run(&self, spec: &CommandSpec) -> ProcResult<CommandOutput>;
}

/// Runner backed by `tokio::process`
#[derive(Debug, Clone)]
pub struct TokioCommandRunner {
    /// Deadline applied when a spec carries none
    default_timeout: Duration,
}

impl TokioCommandRunner {
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> ProcResult<CommandOutput> {
        let deadline = spec.timeout.unwrap_or(self.default_timeout);
        log::debug!("Running: {}", spec.display());

        let mut command = tokio::process::Command::new(&spec.program);
        command.args(&spec.args).kill_on_drop(true);
        for (key, value) in &spec.env {
            command.env(key, value);
        }

        let future = command.output();
        let output = match tokio::time::timeout(deadline, future).await {
            Ok(result) => result.map_err(|e| ProcError::Spawn {
                program: spec.program.clone(),
                source: e,
            })?,
            // kill_on_drop reaps the child when the future is dropped here
            Err(_) => {
                return Err(ProcError::Timeout {
                    program: spec.program.clone(),
                    timeout_secs: deadline.as_secs(),
                })
            }
        };

        let result = CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !result.stdout.is_empty() {
            log::debug!("{} stdout: {}", spec.program, result.stdout.trim_end());
        }
        if result.success() {
            if !result.stderr.is_empty() {
                log::debug!("{} stderr: {}", spec.program, result.stderr.trim_end());
            }
        } else {
            log::warn!(
                "'{}' exited {}: {}",
                spec.display(),
                result.exit_code,
                result.stderr.trim_end()
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> TokioCommandRunner {
        TokioCommandRunner::new(Duration::from_secs(10))
    }

    #[test]
    fn test_spec_builder() {
        let spec = CommandSpec::new("pg_dump")
            .arg("-h")
            .arg("db.example.com")
            .args(["-F", "c"])
            .env("PGPASSWORD", "secret")
            .timeout(Duration::from_secs(5));
        assert_eq!(spec.display(), "pg_dump -h db.example.com -F c");
        assert_eq!(spec.env, vec![("PGPASSWORD".to_string(), "secret".to_string())]);
        assert_eq!(spec.timeout, Some(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let spec = CommandSpec::new("sh").args(["-c", "echo hello"]);
        let output = runner().run(&spec).await.unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_not_an_error() {
        let spec = CommandSpec::new("sh").args(["-c", "echo oops >&2; exit 3"]);
        let output = runner().run(&spec).await.unwrap();
        assert!(!output.success());
        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[tokio::test]
    async fn test_env_is_passed() {
        let spec = CommandSpec::new("sh")
            .args(["-c", "printf '%s' \"$PGPASSWORD\""])
            .env("PGPASSWORD", "secret");
        let output = runner().run(&spec).await.unwrap();
        assert_eq!(output.stdout, "secret");
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let spec = CommandSpec::new("pgshift-no-such-binary");
        let err = runner().run(&spec).await.unwrap_err();
        assert!(matches!(err, ProcError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_deadline_kills_command() {
        let spec = CommandSpec::new("sleep")
            .arg("30")
            .timeout(Duration::from_millis(50));
        let err = runner().run(&spec).await.unwrap_err();
        assert!(matches!(err, ProcError::Timeout { .. }));
    }
}

//! Process-backed action runner.

use std::process::{Command, Stdio};

use tracing::{debug, warn};

use super::resolve::Invocation;
use super::ActionRunner;
use crate::environment::Environment;
use crate::error::{MonitorError, Result};

/// Runs invocations as child processes and waits for them to exit.
///
/// The child sees exactly the per-call environment. Exit status is logged
/// but never treated as a failure; only a failed spawn is.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    shell: String,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
        }
    }
}

impl CommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different shell for command-line actions.
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    fn command(&self, invocation: &Invocation) -> Command {
        match invocation {
            Invocation::Program(path) => Command::new(path),
            Invocation::Shell(line) => {
                let mut cmd = Command::new(&self.shell);
                cmd.arg("-c").arg(line);
                cmd
            }
        }
    }
}

impl ActionRunner for CommandRunner {
    fn run(&mut self, invocation: &Invocation, env: &Environment) -> Result<()> {
        let mut cmd = self.command(invocation);
        cmd.env_clear().envs(env.iter()).stdin(Stdio::null());

        let status = cmd
            .status()
            .map_err(|e| MonitorError::dispatch_error(invocation.to_string(), e))?;

        if status.success() {
            debug!(%invocation, "action finished");
        } else {
            warn!(%invocation, %status, "action exited unsuccessfully");
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn test_shell_line_sees_environment() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let out = dir.path().join("out");
        let env: Environment = [("THRESHOLD", "4"), ("PATH", "/usr/bin:/bin")]
            .into_iter()
            .collect();

        let line = format!("echo \"$THRESHOLD\" > {}", out.display());
        CommandRunner::new()
            .run(&Invocation::Shell(line), &env)
            .unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap().trim(), "4");
    }

    #[test]
    fn test_environment_is_not_inherited() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let out = dir.path().join("out");
        std::env::set_var("HWWATCH_RUNNER_LEAK", "leaked");

        let line = format!("echo \"[$HWWATCH_RUNNER_LEAK]\" > {}", out.display());
        CommandRunner::new()
            .run(&Invocation::Shell(line), &Environment::new())
            .unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap().trim(), "[]");
    }

    #[test]
    fn test_nonzero_exit_is_not_an_error() {
        let result = CommandRunner::new().run(&Invocation::Shell("exit 3".into()), &Environment::new());
        assert!(result.is_ok());
    }

    #[test]
    fn test_spawn_failure_is_dispatch_error() {
        let missing = Invocation::Program(PathBuf::from("/nonexistent/hwwatch-action"));
        let err = CommandRunner::new()
            .run(&missing, &Environment::new())
            .unwrap_err();
        assert!(matches!(err, MonitorError::ActionDispatch { .. }));
    }
}

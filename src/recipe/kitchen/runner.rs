// src/recipe/kitchen/runner.rs

//! Spawning external commands for the Kitchen
//!
//! Every command a recipe runs (the clone, each build step) goes through a
//! [`CommandRunner`]. The default [`ShellRunner`] runs `sh -c <command>` and
//! captures its output; tests swap in a recording runner.

use crate::error::{Error, Result};
use crate::recipe::Phase;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// A single command invocation
#[derive(Debug, Clone, Copy)]
pub struct StepCommand<'a> {
    /// Phase the command belongs to
    pub phase: Phase,
    /// Step label within the phase ("clone", "configure", "check", ...)
    pub step: &'a str,
    /// Shell command line, already substituted
    pub command: &'a str,
    /// Working directory
    pub workdir: &'a Path,
    /// Extra environment variables
    pub env: &'a [(String, String)],
}

/// What a finished command left behind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutput {
    /// Exit code, `None` if terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl StepOutput {
    /// Successful, empty output
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human-readable status, e.g. `exit code 2`
    pub fn status(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }

    /// Turn a non-zero exit into [`Error::CommandFailed`]
    pub fn into_result(self, cmd: &StepCommand<'_>) -> Result<StepOutput> {
        if self.success() {
            return Ok(self);
        }

        Err(Error::CommandFailed {
            phase: cmd.phase,
            step: cmd.step.to_string(),
            command: cmd.command.to_string(),
            status: self.status(),
            stdout: self.stdout,
            stderr: self.stderr,
        })
    }
}

/// Runs commands on behalf of the Kitchen
///
/// Implementations return `Ok` for any command that could be spawned,
/// whatever its exit status; `Err` is reserved for failing to spawn it.
pub trait CommandRunner: Send + Sync {
    fn run(&self, cmd: &StepCommand<'_>) -> Result<StepOutput>;
}

/// Runs commands through `sh -c`, capturing stdout and stderr
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self {
            shell: "sh".to_string(),
        }
    }

    /// Use a different POSIX shell binary
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, cmd: &StepCommand<'_>) -> Result<StepOutput> {
        debug!("[{}:{}] {} (in {})", cmd.phase, cmd.step, cmd.command, cmd.workdir.display());

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(cmd.command)
            .current_dir(cmd.workdir)
            .envs(cmd.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .output()
            .map_err(|e| {
                Error::IoError(format!(
                    "Failed to run {} step '{}': {}",
                    cmd.phase, cmd.step, e
                ))
            })?;

        Ok(StepOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Quote a word for `sh` if it contains anything outside a safe set
pub fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:@%+=,".contains(c));

    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn step<'a>(command: &'a str, workdir: &'a Path, env: &'a [(String, String)]) -> StepCommand<'a> {
        StepCommand {
            phase: Phase::Build,
            step: "make",
            command,
            workdir,
            env,
        }
    }

    #[test]
    fn test_shell_runner_captures_output() {
        let dir = TempDir::new().unwrap();
        let env = vec![("GREETING".to_string(), "hello".to_string())];
        let out = ShellRunner::new()
            .run(&step("echo $GREETING; echo oops >&2", dir.path(), &env))
            .unwrap();

        assert!(out.success());
        assert_eq!(out.stdout, "hello\n");
        assert_eq!(out.stderr, "oops\n");
    }

    #[test]
    fn test_shell_runner_runs_in_workdir() {
        let dir = TempDir::new().unwrap();
        ShellRunner::new()
            .run(&step("touch marker", dir.path(), &[]))
            .unwrap();
        assert!(dir.path().join("marker").exists());
    }

    #[test]
    fn test_nonzero_exit_becomes_command_failed() {
        let dir = TempDir::new().unwrap();
        let cmd = step("echo partial; exit 3", dir.path(), &[]);
        let out = ShellRunner::new().run(&cmd).unwrap();

        assert_eq!(out.code, Some(3));
        match out.into_result(&cmd).unwrap_err() {
            Error::CommandFailed {
                phase,
                step,
                status,
                stdout,
                ..
            } => {
                assert_eq!(phase, Phase::Build);
                assert_eq!(step, "make");
                assert_eq!(status, "exit code 3");
                assert_eq!(stdout, "partial\n");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_shell_is_spawn_error() {
        let dir = TempDir::new().unwrap();
        let err = ShellRunner::with_shell("/nonexistent/sh")
            .run(&step("true", dir.path(), &[]))
            .unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(
            shell_quote("https://github.com/mwri/libeasyyaml"),
            "https://github.com/mwri/libeasyyaml"
        );
        assert_eq!(shell_quote("has space"), "'has space'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_signal_status() {
        let out = StepOutput {
            code: None,
            ..Default::default()
        };
        assert!(!out.success());
        assert_eq!(out.status(), "terminated by signal");
    }
}

//! External command execution.
//!
//! Fixups are the only external commands theme-env runs. They either succeed
//! or abort the whole build; there is no retry.

use anyhow::{bail, Context, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

/// Builder for configuring command execution.
pub struct Cmd {
    program: String,
    args: Vec<String>,
    envs: Vec<(String, OsString)>,
    error_prefix: Option<String>,
}

impl Cmd {
    pub fn new(program: impl AsRef<str>) -> Self {
        Self {
            program: program.as_ref().to_string(),
            args: Vec::new(),
            envs: Vec::new(),
            error_prefix: None,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Expose a variable to the child on top of the inherited environment.
    pub fn env(mut self, key: impl AsRef<str>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.as_ref().to_string(), value.into()));
        self
    }

    /// Set a custom error message prefix.
    pub fn error_msg(mut self, msg: impl AsRef<str>) -> Self {
        self.error_prefix = Some(msg.as_ref().to_string());
        self
    }

    /// Run the command with inherited stdio. Nonzero exit is an error.
    pub fn run_interactive(self) -> Result<ExitStatus> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }

        let status = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to execute '{}'. Is it installed?", self.program))?;

        if !status.success() {
            let prefix = self
                .error_prefix
                .unwrap_or_else(|| format!("'{}' failed", self.program));
            bail!("{} (exit code {})", prefix, status.code().unwrap_or(-1));
        }

        Ok(status)
    }
}

/// Run a shell command via `sh -c` with `$target` bound to `target`.
pub fn shell_on_target(command: &str, target: &Path) -> Result<ExitStatus> {
    Cmd::new("sh")
        .args(["-c", command])
        .env("target", target.as_os_str())
        .error_msg(format!("Fixup `{}` failed on {}", command, target.display()))
        .run_interactive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_env_is_exposed() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("marker");

        Cmd::new("sh")
            .args(["-c", "printf '%s' \"$target\" > \"$0\"", marker.to_str().unwrap()])
            .env("target", "/some/output/path")
            .run_interactive()
            .unwrap();
        assert_eq!(fs::read_to_string(&marker).unwrap(), "/some/output/path");
    }

    #[test]
    fn test_custom_error_message() {
        let err = Cmd::new("false")
            .error_msg("Custom fixup step failed")
            .run_interactive()
            .unwrap_err();
        assert!(err.to_string().contains("Custom fixup step failed"));
    }

    #[test]
    fn test_shell_on_target_writes_target() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "old").unwrap();

        shell_on_target("echo new > \"$target\"", &file).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap().trim(), "new");
    }

    #[test]
    fn test_shell_on_target_nonzero_is_fatal() {
        let err = shell_on_target("exit 3", Path::new("/tmp")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("exit code 3"));
        assert!(msg.contains("Fixup `exit 3` failed"));
    }
}

//! CLI command execution helpers
//!
//! Wraps the `bkang` binary with an isolated config file and provides
//! convenient assertion methods.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// CLI command builder
pub struct BkCommand {
    binary_path: PathBuf,
    working_dir: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
}

impl BkCommand {
    /// Create a new command in `working_dir` using `config_path` as config file
    pub fn new(working_dir: impl AsRef<Path>, config_path: impl AsRef<Path>) -> Self {
        let mut env = HashMap::new();
        env.insert(
            "BKANG_CONFIG".to_string(),
            config_path.as_ref().to_string_lossy().into_owned(),
        );
        Self {
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_bkang")),
            working_dir: working_dir.as_ref().to_path_buf(),
            args: Vec::new(),
            env,
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Execute command and return result
    pub fn execute(&self) -> Result<CommandResult> {
        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .envs(&self.env)
            .env_remove("RUST_LOG")
            .output()
            .context("Failed to execute command")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    /// Execute and assert success
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStdout: {}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stdout,
                result.stderr
            );
        }

        Ok(result)
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }

        Ok(result)
    }
}

/// Command execution result
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    /// Check if command succeeded
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Non-empty stdout lines
    pub fn stdout_lines(&self) -> Vec<&str> {
        self.stdout.lines().filter(|l| !l.trim().is_empty()).collect()
    }
}

/// Macro for convenient command construction
///
/// Usage:
/// ```
/// bk!(archive, "prune", "--hourly", "2").assert_success()?;
/// ```
#[macro_export]
macro_rules! bk {
    ($archive:expr, $($arg:expr),*) => {{
        let mut cmd = $archive.command();
        cmd.args(&[$($arg),*]);
        cmd
    }};
}

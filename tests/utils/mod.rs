use anyhow::Result;
use std::process::Command;

use super::common::TestEnvironment;

pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    /// Split `line` the way a shell would and return the words.
    pub fn command_words(line: &str) -> Vec<String> {
        shell_words::split(line).unwrap_or_default()
    }

    /// The dry-run ffmpeg command line printed on stdout.
    pub fn dry_run_line(&self) -> Option<&str> {
        self.stdout
            .lines()
            .find(|line| line.starts_with("ffmpeg "))
    }
}

/// Run the built binary with colors off and the environment's config file.
pub fn run_vidtool_command(env: &TestEnvironment, args: &[&str]) -> Result<CommandOutput> {
    let config = env.config_path();
    let output = Command::new(env!("CARGO_BIN_EXE_vidtool"))
        .arg("--no-color")
        .arg("--config")
        .arg(&config)
        .args(args)
        .current_dir(env.path())
        .output()?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

//! Where system information comes from.

use south_common::{Error, Result};
use std::future::Future;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Access to the host's identity, files and commands.
pub trait SystemSource: Send + Sync {
    /// Host name of the machine.
    fn hostname(&self) -> Result<String>;

    /// Full text of a file such as `/proc/uptime`.
    fn read_file(&self, path: &str) -> impl Future<Output = Result<String>> + Send;

    /// Standard output of a command that exited successfully.
    fn run(&self, program: &str, args: &[&str]) -> impl Future<Output = Result<String>> + Send;
}

/// The machine the plugin runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSource;

impl SystemSource for HostSource {
    fn hostname(&self) -> Result<String> {
        hostname::get()?
            .into_string()
            .map_err(|raw| Error::Parse(format!("host name is not valid UTF-8: {:?}", raw)))
    }

    async fn read_file(&self, path: &str) -> Result<String> {
        tokio::fs::read_to_string(Path::new(path)).await.map_err(|e| Error::Command {
            command: format!("cat {}", path),
            message: e.to_string(),
        })
    }

    async fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let command = command_line(program, args);
        debug!("Running {}", command);

        // Force the C locale so numbers use '.' decimals and headers stay in English.
        let output = Command::new(program)
            .args(args)
            .env("LC_ALL", "C")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::Command {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::Command {
                command,
                message: String::from_utf8_lossy(&output.stderr).replace('\n', ""),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Render a command the way it would be typed in a shell.
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Non-empty lines of command or file output.
pub fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter(|line| !line.trim().is_empty())
}

use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::process::{Command, Stdio};
use thiserror::Error;

/// The command line attached to a menu item. May be empty, in which case
/// activation launches nothing.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
    Default,
)]
#[serde(transparent)]
pub struct CommandLine(String);

crate::impl_string_newtype!(CommandLine);

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to parse command line: {0}")]
    Parse(#[from] shell_words::ParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Splits a command line into program + arguments. Empty (or all-whitespace)
/// input yields `None`.
pub fn split_command(cmd: &CommandLine) -> Result<Option<Vec<String>>, shell_words::ParseError> {
    let argv = shell_words::split(cmd)?;
    Ok(if argv.is_empty() { None } else { Some(argv) })
}

/// Starts the command as a detached process: stdio nulled, never waited on.
/// An empty command is a successful no-op.
pub fn spawn_detached(cmd: &CommandLine) -> Result<(), LaunchError> {
    let Some(argv) = split_command(cmd)? else {
        return Ok(());
    };

    Command::new(&argv[0])
        .args(&argv[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    Ok(())
}

use std::{path::PathBuf, str::FromStr};

use crate::error::ProtocolError;

/// Socket path used in debug mode, so a developer can reach the bridge
/// without looking up the browser's host process id.
pub const DEBUG_SOCKET_PATH: &str = "/tmp/native-app.sock";

/// Returns the Unix socket path for the bridge running as `pid`.
pub fn socket_path(pid: u32, debug: bool) -> PathBuf {
    if debug {
        PathBuf::from(DEBUG_SOCKET_PATH)
    } else {
        PathBuf::from(format!("/tmp/native-app.{pid}.sock"))
    }
}

/// Requests accepted on the socket, one per line:
///
/// ```text
/// list
/// select <tab id>
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Dump every known tab.
    List,
    /// Ask the browser to activate a tab.
    Select { tab_id: i64 },
}

impl FromStr for Command {
    type Err = ProtocolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();

        match words.next() {
            Some("list") => Ok(Self::List),
            Some("select") => {
                let arg = words.next().ok_or_else(|| {
                    ProtocolError::InvalidArgument("select requires a tab id".to_string())
                })?;
                let tab_id = arg
                    .parse()
                    .map_err(|_| ProtocolError::InvalidArgument(format!("invalid tab id: {arg}")))?;
                Ok(Self::Select { tab_id })
            }
            Some(word) => Err(ProtocolError::UnknownCommand(word.to_string())),
            None => Err(ProtocolError::UnknownCommand(String::new())),
        }
    }
}

use std::{
    fs, io,
    os::unix::fs::MetadataExt,
    path::{Path, PathBuf},
};

use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, BufReader},
    net::{UnixListener, UnixStream},
    sync::mpsc,
};

use super::protocol::Command;
use crate::error::Result;

/// Longest command line read from a client, newline included.
const MAX_LINE_LEN: usize = 64 * 1024;

/// A decoded command line together with the connection it arrived on.
///
/// `command` is `None` when the line did not decode; the connection is still
/// handed over so the dispatcher closes it.
#[derive(Debug)]
pub struct CommandRequest {
    pub command: Option<Command>,
    pub conn: UnixStream,
}

/// Unix socket server accepting one command per connection.
pub struct SocketServer {
    path: PathBuf,
    listener: UnixListener,
}

impl SocketServer {
    /// Remove any stale socket file at `path`, then bind.
    pub fn bind(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        match fs::remove_file(&path) {
            Ok(()) => tracing::info!("Removed stale socket {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let listener = UnixListener::bind(&path)?;
        tracing::info!("Listening on {}", path.display());

        Ok(Self { path, listener })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start accepting connections in a background task.
    /// Returns a receiver for commands from socket clients.
    pub fn start_listener(self) -> mpsc::Receiver<CommandRequest> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<CommandRequest>(16);

        tokio::spawn(async move {
            run_listener(self.listener, cmd_tx).await;
        });

        cmd_rx
    }
}

/// Accept loop. Each connection gets its own task so a slow or broken client
/// never holds up the others.
async fn run_listener(listener: UnixListener, cmd_tx: mpsc::Sender<CommandRequest>) {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                tokio::spawn(handle_client(stream, cmd_tx.clone()));
            }
            Err(e) => {
                tracing::error!("Accept error: {e}");
            }
        }
    }
}

/// Read a single line from the client and pass it on with the connection.
async fn handle_client(stream: UnixStream, cmd_tx: mpsc::Sender<CommandRequest>) {
    let mut reader = BufReader::new(stream).take(MAX_LINE_LEN as u64);
    let mut line = String::new();

    match reader.read_line(&mut line).await {
        Ok(0) => {
            tracing::debug!("Client disconnected without sending a command");
            return;
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!("Read error: {e}");
            return;
        }
    }

    let command = if line.len() >= MAX_LINE_LEN && !line.ends_with('\n') {
        tracing::warn!("Command line exceeds {MAX_LINE_LEN} bytes, ignoring it");
        None
    } else {
        parse_line(line.trim())
    };

    let request = CommandRequest {
        command,
        conn: reader.into_inner().into_inner(),
    };
    if cmd_tx.send(request).await.is_err() {
        tracing::debug!("Dispatcher gone, dropping connection");
    }
}

fn parse_line(line: &str) -> Option<Command> {
    match line.parse::<Command>() {
        Ok(command) => {
            tracing::info!("Received command: {command:?}");
            Some(command)
        }
        Err(e) => {
            tracing::warn!("Parse error: {e}, line: {line:?}");
            None
        }
    }
}

/// Removes the socket file when dropped, as long as the file at the path is
/// still the one this process bound. A later instance that replaced it keeps
/// its socket.
pub struct SocketGuard {
    path: PathBuf,
    identity: Option<(u64, u64)>,
}

impl SocketGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let identity = file_identity(&path);
        Self { path, identity }
    }
}

impl Drop for SocketGuard {
    fn drop(&mut self) {
        let Some(identity) = self.identity else {
            return;
        };
        if file_identity(&self.path) != Some(identity) {
            tracing::debug!("Socket {} was replaced, leaving it", self.path.display());
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove socket {}: {e}", self.path.display());
            }
        }
    }
}

/// `(device, inode)` of the file at `path`, without following symlinks.
fn file_identity(path: &Path) -> Option<(u64, u64)> {
    fs::symlink_metadata(path)
        .ok()
        .map(|meta| (meta.dev(), meta.ino()))
}

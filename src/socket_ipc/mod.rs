//! Local-client channel: one text command per Unix socket connection.
//!
//! This module provides:
//! - `protocol`: command grammar and socket path rules
//! - `server`: listener that hands each command and its connection to the
//!   dispatcher

mod protocol;
mod server;

pub use protocol::{socket_path, Command};
pub use server::{CommandRequest, SocketGuard, SocketServer};

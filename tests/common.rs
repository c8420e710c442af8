#![allow(dead_code)]

use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;

pub const FRAME_CEILING: usize = 10 * 1024 * 1024;

/// A running bridge with its stdin/stdout attached to the test.
pub struct BridgeHarness {
    child: Child,
    stdin: Option<ChildStdin>,
    actions: mpsc::Receiver<Value>,
    socket: PathBuf,
    log: PathBuf,
    _dir: TempDir,
}

impl BridgeHarness {
    pub fn spawn() -> Self {
        Self::spawn_with(false, None)
    }

    /// Spawn with `--debug` set as requested. The log file defaults to one
    /// inside the temp dir.
    pub fn spawn_with(debug: bool, log: Option<&Path>) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let socket = dir.path().join("bridge.sock");
        let log = log.map_or_else(|| dir.path().join("bridge.log"), Path::to_path_buf);

        let mut command = Command::new(env!("CARGO_BIN_EXE_rofi-chrome-tab"));
        if debug {
            command.arg("--debug");
        }
        let mut child = command
            .arg("--socket")
            .arg(&socket)
            .arg("--log-file")
            .arg(&log)
            .arg("chrome-extension://testextension/")
            .env_remove("RUST_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .expect("Failed to spawn rofi-chrome-tab");

        let stdin = child.stdin.take();
        let stdout = child.stdout.take().expect("stdout not piped");

        let (tx, actions) = mpsc::channel();
        thread::spawn(move || {
            let mut stdout = stdout;
            loop {
                let mut header = [0u8; 4];
                if stdout.read_exact(&mut header).is_err() {
                    return;
                }
                let mut body = vec![0u8; u32::from_le_bytes(header) as usize];
                if stdout.read_exact(&mut body).is_err() {
                    return;
                }
                let Ok(value) = serde_json::from_slice(&body) else {
                    return;
                };
                if tx.send(value).is_err() {
                    return;
                }
            }
        });

        wait_for_socket(&socket);

        Self {
            child,
            stdin,
            actions,
            socket,
            log,
            _dir: dir,
        }
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    pub fn log_path(&self) -> &Path {
        &self.log
    }

    /// Poll the log file until it contains `needle`. Returns the last contents read.
    pub fn wait_for_log(&self, needle: &str) -> String {
        let mut contents = String::new();
        for _ in 0..100 {
            contents = std::fs::read_to_string(&self.log).unwrap_or_default();
            if contents.contains(needle) {
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }
        contents
    }

    /// Send SIGTERM and wait for the process to exit.
    pub fn terminate(&mut self) -> Option<ExitStatus> {
        let status = Command::new("kill")
            .arg("-TERM")
            .arg(self.pid().to_string())
            .status()
            .expect("Failed to run kill");
        assert!(status.success(), "kill -TERM failed");

        for _ in 0..250 {
            if let Some(status) = self.child.try_wait().expect("Failed to poll child") {
                return Some(status);
            }
            thread::sleep(Duration::from_millis(20));
        }
        None
    }

    /// Write raw bytes to the bridge's stdin.
    pub fn send_raw(&mut self, bytes: &[u8]) {
        let stdin = self.stdin.as_mut().expect("stdin closed");
        stdin.write_all(bytes).expect("Failed to write to stdin");
        stdin.flush().expect("Failed to flush stdin");
    }

    pub fn send_frame(&mut self, payload: &[u8]) {
        let len = u32::try_from(payload.len()).expect("payload too large");
        self.send_raw(&len.to_le_bytes());
        self.send_raw(payload);
    }

    pub fn send_update(&mut self, tabs: &[(i64, &str, &str)]) {
        let tabs: Vec<Value> = tabs
            .iter()
            .map(|&(id, title, host)| json!({ "id": id, "title": title, "host": host }))
            .collect();
        let event = json!({ "type": "updated", "tabs": tabs });
        self.send_frame(event.to_string().as_bytes());
    }

    /// Close stdin, ending the event stream.
    pub fn close_stdin(&mut self) {
        self.stdin.take();
    }

    /// Send one raw request and read the reply until the server closes.
    pub fn request(&self, request: &str) -> String {
        send_request(&self.socket, request)
    }

    /// Poll `list` until it returns `expected` or the attempts run out.
    pub fn wait_for_list(&self, expected: &str) -> String {
        let mut reply = String::new();
        for _ in 0..100 {
            reply = self.request("list\n");
            if reply == expected {
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }
        reply
    }

    /// Next action frame written to stdout.
    pub fn next_action(&self) -> Option<Value> {
        self.actions.recv_timeout(Duration::from_secs(5)).ok()
    }

    /// Assert no further action frame arrives within `wait`.
    pub fn no_action_within(&self, wait: Duration) -> bool {
        self.actions.recv_timeout(wait).is_err()
    }

    pub fn list_line(&self, id: i64, host: &str, title: &str) -> String {
        format!("{},{id},{host},{title}\n", self.pid())
    }
}

impl Drop for BridgeHarness {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Connect to `socket`, send `request` and read until the server closes.
pub fn send_request(socket: &Path, request: &str) -> String {
    let mut stream = UnixStream::connect(socket).expect("Failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("Failed to set timeout");
    stream
        .write_all(request.as_bytes())
        .expect("Failed to send request");

    let mut reply = String::new();
    stream
        .read_to_string(&mut reply)
        .expect("Failed to read reply");
    reply
}

fn wait_for_socket(path: &Path) {
    for _ in 0..250 {
        if UnixStream::connect(path).is_ok() {
            return;
        }
        thread::sleep(Duration::from_millis(20));
    }
    panic!("Bridge never started listening on {}", path.display());
}

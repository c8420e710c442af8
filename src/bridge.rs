//! Dispatcher that owns the tab registry and serves both sides of the bridge.
//!
//! ```text
//! stdin  → event receiver ─┐
//!                          ├─→ Dispatcher (TabRegistry) → stdout (actions)
//! socket → command server ─┘                └─→ socket replies
//! ```

use std::future::Future;

use tokio::{
    io::{self, AsyncWrite, AsyncWriteExt},
    net::UnixStream,
    sync::mpsc,
};

use crate::{
    config::Config,
    error::Result,
    native_messaging::{spawn_event_receiver, Action, ActionSink, Event},
    socket_ipc::{Command, CommandRequest, SocketGuard, SocketServer},
    tabs::TabRegistry,
};

/// Single consumer of both queues. The registry lives here and nowhere
/// else, so updates and `list` reads are serialized without a lock.
pub struct Dispatcher<W> {
    pid: u32,
    events: mpsc::Receiver<Event>,
    commands: mpsc::Receiver<CommandRequest>,
    registry: TabRegistry,
    actions: ActionSink<W>,
}

impl<W: AsyncWrite + Unpin> Dispatcher<W> {
    pub fn new(
        pid: u32,
        events: mpsc::Receiver<Event>,
        commands: mpsc::Receiver<CommandRequest>,
        output: W,
    ) -> Self {
        Self {
            pid,
            events,
            commands,
            registry: TabRegistry::new(),
            actions: ActionSink::new(output),
        }
    }

    /// Process messages from either queue, whichever is ready first, until
    /// both queues are closed. Returns the action writer.
    pub async fn run(mut self) -> W {
        loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.handle_event(event),
                Some(request) = self.commands.recv() => self.handle_request(request).await,
                else => break,
            }
        }

        tracing::debug!("Both queues closed, dispatcher exiting");
        self.actions.into_inner()
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Updated(updated) => {
                self.registry.replace(updated.tabs);
                tracing::debug!("Tab list replaced ({} tabs)", self.registry.len());
            }
        }
    }

    async fn handle_request(&mut self, request: CommandRequest) {
        let CommandRequest { command, conn } = request;

        match command {
            Some(Command::List) => {
                if self.registry.is_empty() {
                    tracing::debug!("List requested before any tabs were reported");
                }
                let body = self.registry.render_list(self.pid);
                tokio::spawn(reply_and_close(conn, body));
            }
            Some(Command::Select { tab_id }) => {
                if let Err(e) = self.actions.send(Action::Select { tab_id }).await {
                    tracing::error!("Failed to send select action for tab {tab_id}: {e}");
                }
            }
            None => {}
        }
    }
}

/// Write the reply off the dispatch loop so a client that stops reading
/// cannot stall the registry.
async fn reply_and_close(mut conn: UnixStream, body: String) {
    let result = async {
        conn.write_all(body.as_bytes()).await?;
        conn.flush().await?;
        conn.shutdown().await
    }
    .await;

    if let Err(e) = result {
        tracing::warn!("Failed to write reply: {e}");
    }
}

/// Run the bridge until the process is asked to stop.
///
/// Binding the socket is the only fatal step; once it succeeds the bridge
/// keeps serving the last known tab list even after stdin closes.
pub async fn run(config: &Config) -> Result<()> {
    tracing::info!("Starting bridge (pid {})", config.pid);

    // Handlers go in before the socket appears, so a client that sees the
    // socket can always stop the bridge cleanly.
    let shutdown = shutdown_signal();

    let server = SocketServer::bind(&config.socket_path)?;
    let _guard = SocketGuard::new(server.path());
    let commands = server.start_listener();
    let events = spawn_event_receiver(io::stdin());

    let dispatcher = Dispatcher::new(config.pid, events, commands, io::stdout());

    tokio::select! {
        _ = dispatcher.run() => {}
        () = shutdown => {}
    }

    Ok(())
}

/// Register SIGTERM and SIGINT handlers and wait for either.
fn shutdown_signal() -> impl Future<Output = ()> {
    use tokio::signal::unix::{signal, SignalKind};

    let handlers = signal(SignalKind::terminate())
        .and_then(|sigterm| Ok((sigterm, signal(SignalKind::interrupt())?)));

    async move {
        let Ok((mut sigterm, mut sigint)) = handlers else {
            tracing::warn!("Failed to register signal handlers");
            return std::future::pending().await;
        };

        tokio::select! {
            _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
            _ = sigint.recv() => tracing::info!("Received SIGINT"),
        }
    }
}

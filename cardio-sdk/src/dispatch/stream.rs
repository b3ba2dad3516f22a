//! Single-client TCP stream dispatcher.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, OnceLock};

use cardio_types::{format_wire_line, PatientId};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::Dispatcher;
use crate::error::{Error, Result};

/// Streams readings as newline-terminated lines to exactly one TCP client.
///
/// Binding happens at construction. A background task then accepts a single
/// connection; once that client is in, the listener is closed and no other
/// client is ever served by this instance.
///
/// Until the client connects, readings are dropped, not queued. After it
/// disconnects, readings keep going to the dead connection and are dropped
/// there. There is no reconnection.
///
/// Lines are handed to a writer task through a channel, so concurrent
/// callers never split each other's lines.
#[derive(Debug)]
pub struct StreamSocketDispatcher {
    local_addr: SocketAddr,
    client: Arc<OnceLock<mpsc::UnboundedSender<String>>>,
    accept_task: JoinHandle<()>,
}

impl StreamSocketDispatcher {
    /// Listen on `port` on all interfaces.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn bind(port: u16) -> Result<Self> {
        Self::bind_addr(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))).await
    }

    /// Listen on a specific address. Port 0 picks a free port.
    pub async fn bind_addr(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| Error::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| Error::Bind { addr, source })?;
        info!(%local_addr, "TCP server started");

        let client = Arc::new(OnceLock::new());
        let accept_task = tokio::spawn(accept_one(listener, client.clone()));

        Ok(Self {
            local_addr,
            client,
            accept_task,
        })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns true once the one client has been accepted.
    ///
    /// Stays true after that client disconnects.
    pub fn is_connected(&self) -> bool {
        self.client.get().is_some()
    }
}

impl Drop for StreamSocketDispatcher {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

impl Dispatcher for StreamSocketDispatcher {
    fn output(&self, patient_id: PatientId, timestamp_ms: i64, label: &str, data: &str) {
        let Some(tx) = self.client.get() else {
            debug!(patient_id, label, "no TCP client yet, dropping reading");
            return;
        };

        let mut line = format_wire_line(patient_id, timestamp_ms, label, data);
        line.push('\n');

        if tx.send(line).is_err() {
            debug!(patient_id, label, "TCP client gone, dropping reading");
        }
    }
}

/// Accept exactly one client, then drop the listener.
async fn accept_one(listener: TcpListener, client: Arc<OnceLock<mpsc::UnboundedSender<String>>>) {
    match listener.accept().await {
        Ok((stream, peer)) => {
            info!(%peer, "Client connected");
            let (tx, rx) = mpsc::unbounded_channel();
            tokio::spawn(write_lines(stream, peer, rx));
            let _ = client.set(tx);
        }
        Err(e) => {
            error!(error = %e, "Failed to accept TCP client");
        }
    }
}

/// Forward lines to the client until the connection breaks.
async fn write_lines(
    mut stream: TcpStream,
    peer: SocketAddr,
    mut rx: mpsc::UnboundedReceiver<String>,
) {
    while let Some(line) = rx.recv().await {
        if let Err(e) = stream.write_all(line.as_bytes()).await {
            error!(%peer, error = %e, "Failed to write to TCP client");
            break;
        }
    }
    info!(%peer, "TCP client writer stopped");
}

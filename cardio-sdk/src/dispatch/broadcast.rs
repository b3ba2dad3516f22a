//! Multi-client WebSocket broadcast dispatcher.

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cardio_types::{format_wire_line, PatientId};
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use super::Dispatcher;
use crate::error::{Error, Result};

/// A connected client, as seen by the broadcaster.
#[derive(Debug)]
struct Connection {
    peer: SocketAddr,
    tx: mpsc::UnboundedSender<Message>,
}

/// Open client connections keyed by a per-server connection id.
type ConnectionSet = Arc<RwLock<HashMap<u64, Connection>>>;

/// Broadcasts each reading to every connected WebSocket client.
///
/// An embedded server accepts any number of clients. Each reading is sent
/// as one text frame (`<id>,<ts>,<label>,<data>`) to the clients connected
/// at the moment `output` is called. There is no replay for clients that
/// connect later.
///
/// `output` holds a read lock on the connection set only long enough to
/// queue the frame on each client's channel; connects and disconnects wait
/// for that and never see a half-iterated set.
#[derive(Debug)]
pub struct BroadcastSocketDispatcher {
    local_addr: SocketAddr,
    connections: ConnectionSet,
    server: JoinHandle<()>,
}

impl BroadcastSocketDispatcher {
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
        info!(%local_addr, "WebSocket server started");

        let connections: ConnectionSet = Arc::new(RwLock::new(HashMap::new()));
        let server = tokio::spawn(run_server(listener, connections.clone()));

        Ok(Self {
            local_addr,
            connections,
            server,
        })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of clients currently connected.
    pub fn connection_count(&self) -> usize {
        self.connections.read().len()
    }
}

impl Drop for BroadcastSocketDispatcher {
    fn drop(&mut self) {
        self.server.abort();
    }
}

impl Dispatcher for BroadcastSocketDispatcher {
    fn output(&self, patient_id: PatientId, timestamp_ms: i64, label: &str, data: &str) {
        let line = format_wire_line(patient_id, timestamp_ms, label, data);

        let connections = self.connections.read();
        for conn in connections.values() {
            if conn.tx.send(Message::Text(line.clone())).is_err() {
                warn!(peer = %conn.peer, "client disconnected mid-broadcast, skipping");
            }
        }
    }
}

async fn run_server(listener: TcpListener, connections: ConnectionSet) {
    let next_id = Arc::new(AtomicU64::new(0));

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let id = next_id.fetch_add(1, Ordering::Relaxed);
                tokio::spawn(handle_connection(stream, peer, id, connections.clone()));
            }
            Err(e) => {
                error!(error = %e, "Failed to accept WebSocket client");
            }
        }
    }
}

/// Serve one client from handshake to close.
async fn handle_connection(stream: TcpStream, peer: SocketAddr, id: u64, connections: ConnectionSet) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(%peer, error = %e, "WebSocket handshake failed");
            return;
        }
    };

    let (mut ws_tx, mut ws_rx) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    connections.write().insert(id, Connection { peer, tx });
    info!(%peer, "New connection");

    // Forward queued frames to the socket; a dead socket leaves the set here
    let forward_connections = connections.clone();
    let forward_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = ws_tx.send(msg).await {
                debug!(%peer, error = %e, "Failed to send WebSocket frame");
                forward_connections.write().remove(&id);
                break;
            }
        }
    });

    // Incoming frames are ignored; we only watch for the close
    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(%peer, error = %e, "WebSocket read error");
                break;
            }
        }
    }

    connections.write().remove(&id);
    forward_task.abort();
    info!(%peer, "Closed connection");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_tungstenite::connect_async;

    async fn bind_local() -> BroadcastSocketDispatcher {
        BroadcastSocketDispatcher::bind_addr(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
            .await
            .unwrap()
    }

    async fn wait_for_count(dispatcher: &BroadcastSocketDispatcher, expected: usize) {
        for _ in 0..200 {
            if dispatcher.connection_count() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "expected {} connections, have {}",
            expected,
            dispatcher.connection_count()
        );
    }

    async fn next_text<S>(ws: &mut S) -> String
    where
        S: futures_util::Stream<
                Item = std::result::Result<Message, tokio_tungstenite::tungstenite::Error>,
            > + Unpin,
    {
        loop {
            let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
                .await
                .expect("timed out waiting for frame")
                .expect("stream ended")
                .expect("read error");
            if let Message::Text(text) = msg {
                return text;
            }
        }
    }

    #[tokio::test]
    async fn no_clients_is_a_no_op() {
        let dispatcher = bind_local().await;
        dispatcher.output(1, 1, "Alert", "triggered");
        assert_eq!(dispatcher.connection_count(), 0);
    }

    #[tokio::test]
    async fn every_client_gets_the_same_line() {
        let dispatcher = bind_local().await;
        let url = format!("ws://{}", dispatcher.local_addr());

        let mut clients = Vec::new();
        for _ in 0..3 {
            let (ws, _) = connect_async(url.as_str()).await.unwrap();
            clients.push(ws);
        }
        wait_for_count(&dispatcher, 3).await;

        dispatcher.output(7, 123456, "Saturation", "97%");

        for ws in clients.iter_mut() {
            assert_eq!(next_text(ws).await, "7,123456,Saturation,97%");
        }
    }

    #[tokio::test]
    async fn late_clients_get_no_replay() {
        let dispatcher = bind_local().await;
        let url = format!("ws://{}", dispatcher.local_addr());

        let (mut early, _) = connect_async(url.as_str()).await.unwrap();
        wait_for_count(&dispatcher, 1).await;
        dispatcher.output(1, 1, "Alert", "triggered");

        let (mut late, _) = connect_async(url.as_str()).await.unwrap();
        wait_for_count(&dispatcher, 2).await;
        dispatcher.output(1, 2, "Alert", "resolved");

        assert_eq!(next_text(&mut early).await, "1,1,Alert,triggered");
        assert_eq!(next_text(&mut early).await, "1,2,Alert,resolved");
        // The late client's first frame is the second reading
        assert_eq!(next_text(&mut late).await, "1,2,Alert,resolved");
    }

    #[tokio::test]
    async fn disconnect_removes_connection() {
        let dispatcher = bind_local().await;
        let url = format!("ws://{}", dispatcher.local_addr());

        let (mut ws, _) = connect_async(url.as_str()).await.unwrap();
        wait_for_count(&dispatcher, 1).await;

        ws.close(None).await.unwrap();
        wait_for_count(&dispatcher, 0).await;

        dispatcher.output(1, 1, "Alert", "triggered");
    }

    #[tokio::test]
    async fn abrupt_drop_leaves_the_set() {
        let dispatcher = bind_local().await;
        let url = format!("ws://{}", dispatcher.local_addr());

        let (ws, _) = connect_async(url.as_str()).await.unwrap();
        wait_for_count(&dispatcher, 1).await;

        // No close frame: the socket just goes away
        drop(ws);
        for ts in 0..50 {
            dispatcher.output(1, ts, "Saturation", "95%");
            if dispatcher.connection_count() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        wait_for_count(&dispatcher, 0).await;
    }

    #[tokio::test]
    async fn broadcast_survives_concurrent_churn() {
        let dispatcher = Arc::new(bind_local().await);
        let url = format!("ws://{}", dispatcher.local_addr());

        let broadcaster = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                for ts in 0..200 {
                    dispatcher.output(1, ts, "Saturation", "96%");
                    tokio::task::yield_now().await;
                }
            })
        };

        for _ in 0..10 {
            let (mut ws, _) = connect_async(url.as_str()).await.unwrap();
            let _ = ws.close(None).await;
        }

        broadcaster.await.unwrap();
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let dispatcher = bind_local().await;
        let result = BroadcastSocketDispatcher::bind_addr(dispatcher.local_addr()).await;
        assert!(matches!(result, Err(Error::Bind { .. })));
    }
}

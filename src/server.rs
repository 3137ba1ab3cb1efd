//! TCP listener and per-connection request handling.
//!
//! Each accepted connection carries exactly one request/reply exchange and
//! is then closed; handlers are spawned fire-and-forget with no pooling.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::protocol::{self, Request};
use crate::state::ControllerState;

/// A request is read with a single `read` call into this buffer; the
/// protocol has no framing and every command fits in a fraction of it.
const REQUEST_BUFFER: usize = 512;

/// Accepts connections forever, one detached handler task per peer.
///
/// A failed accept is logged and the loop continues; nothing here
/// terminates the process.
pub async fn serve(listener: TcpListener, state: Arc<ControllerState>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    handle_client(stream, peer, &state).await;
                });
            }
            Err(e) => warn!("accept failed: {e}"),
        }
    }
}

/// Reads one request, applies it to the shared state, writes one reply.
///
/// I/O errors abort the exchange; the peer never sees a protocol-level
/// error beyond the unknown-command reply.
async fn handle_client(mut stream: TcpStream, peer: SocketAddr, state: &ControllerState) {
    let mut buf = [0u8; REQUEST_BUFFER];
    let len = match stream.read(&mut buf).await {
        Ok(0) => return,
        Ok(len) => len,
        Err(e) => {
            debug!("read from {peer} failed: {e}");
            return;
        }
    };

    let reply = dispatch(state, Request::parse(&buf[..len])).await;
    if let Err(e) = stream.write_all(reply.as_bytes()).await {
        debug!("reply to {peer} failed: {e}");
    }
}

/// Applies a decoded request against the shared state and renders the
/// reply.
pub async fn dispatch(state: &ControllerState, request: Request) -> String {
    match request {
        Request::Set(target) => protocol::set_reply(state.set_target(target).await),
        Request::Temp(current) => {
            state.set_current(current).await;
            protocol::TEMP_ACK.to_owned()
        }
        Request::Log => {
            let snapshot = state.snapshot().await;
            protocol::log_reply(snapshot.target, snapshot.current, snapshot.lamps, snapshot.fan)
        }
        Request::Unknown => protocol::UNKNOWN_REPLY.to_owned(),
    }
}

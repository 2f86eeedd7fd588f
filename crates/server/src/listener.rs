//! TCP accept loop.
//!
//! Runs on the tokio runtime. Each accepted socket is switched to the
//! non-blocking std form the terminal channel works with, greeted, wrapped in
//! a [`Session`] and sent to the scheduler thread.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc::UnboundedSender, oneshot};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::session::Session;
use crate::term::{prepare_tcp, Vt100};
use crate::types::FlushStatus;

/// Back-off after a failed accept (e.g. descriptor exhaustion)
const ACCEPT_RETRY: Duration = Duration::from_millis(100);

/// Accept clients until the scheduler side of `arrivals` goes away.
///
/// The bound address is reported through `ready_tx` once listening, which
/// lets callers bind port 0.
pub async fn run_listener(
    config: ServerConfig,
    arrivals: UnboundedSender<Session>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let bound = listener.local_addr()?;
    info!(%bound, "telnet server listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!(%err, "accept failed");
                tokio::time::sleep(ACCEPT_RETRY).await;
                continue;
            }
        };

        let session = match greet(stream, peer, config.colors) {
            Ok(session) => session,
            Err(err) => {
                debug!(%peer, %err, "dropping client");
                continue;
            }
        };

        info!(%peer, session = %session.id(), "client connected");
        if arrivals.send(session).is_err() {
            info!("scheduler stopped; closing listener");
            return Ok(());
        }
    }
}

/// Negotiate character mode and ring the bell; fails if the first send does.
fn greet(stream: TcpStream, peer: SocketAddr, colors: bool) -> anyhow::Result<Session> {
    let stream = stream.into_std()?;
    prepare_tcp(&stream)?;

    let mut vt = Vt100::new(stream);
    vt.bell();
    if vt.flush() == FlushStatus::Error {
        bail!("greeting could not be sent");
    }
    Ok(Session::new(vt).with_peer(peer).with_color(colors))
}

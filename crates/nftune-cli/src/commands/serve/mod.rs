//! WebSocket battle server for real-time game clients.
//!
//! This module provides a WebSocket server that accepts battle requests and
//! returns JSON responses. Each connection keeps its own reveal session;
//! battle state itself always comes from the store.
//!
//! ## Protocol
//!
//! Requests are JSON objects with a `type` field next to the action body:
//!
//! - `get_battle`, `rearrange`, `pause`, `flip`, `flip_back`, `reset_reveal`
//!   ```json
//!   {"type": "pause", "battle_instance_id": "btl-0f3c9a2b7e1d4c56"}
//!   ```
//!
//! - `add_song`, `pass_song`
//!   ```json
//!   {"type": "add_song", "battle_instance_id": "btl-0f3c9a2b7e1d4c56", "song_id": "s4"}
//!   ```
//!
//! Actions and `get_battle` answer with the action response body
//! (`{"success": true, "updated_battle_instance": ..., ...}` or
//! `{"success": false, "error": ..., "code": ..., "status": ...}`). Reveal
//! requests answer with the reveal state.

mod handler;
mod session;
mod types;


use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use nftune_service::{BattleService, RandomnessSource};
use std::net::SocketAddr;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

use super::catalog::load_catalog;
use crate::app::{runtime, AppOptions};

pub use handler::{handle_request, process_message};
pub use session::Session;
pub use types::{protocol_error, ErrorResponse, RevealResponse, ServerRequest};

/// Default port for the WebSocket server.
pub const DEFAULT_PORT: u16 = 9147;

/// Run the WebSocket battle server.
///
/// # Arguments
/// * `app` - Global options (`--memory` keeps records in memory only)
/// * `port` - Port to listen on
/// * `catalog` - Catalogue file imported before serving
///
/// # Returns
/// Exit code: 0 on clean shutdown, 1 on error
pub fn run(app: &AppOptions, port: u16, catalog: Option<&str>) -> Result<ExitCode> {
    let service = app.open_service()?;
    if let Some(path) = catalog {
        let catalog = load_catalog(Path::new(path))?;
        service
            .import_catalog(&catalog)
            .with_context(|| format!("Failed to import catalogue: {}", path))?;
    }

    let rt = runtime()?;
    rt.block_on(async move { run_server(Arc::new(service), port).await })
}

/// Run the WebSocket server (async entry point).
async fn run_server<R: RandomnessSource + 'static>(
    service: Arc<BattleService<R>>,
    port: u16,
) -> Result<ExitCode> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    eprintln!("WebSocket battle server listening on ws://{}", addr);
    eprintln!("Press Ctrl+C to shutdown");

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let shutdown_tx = Arc::new(shutdown_tx);

    let shutdown_tx_clone = Arc::clone(&shutdown_tx);
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            eprintln!("\nShutting down...");
            let _ = shutdown_tx_clone.send(());
        }
    });

    serve(listener, service, shutdown_tx).await;
    eprintln!("Server shutdown complete");
    Ok(ExitCode::SUCCESS)
}

/// Accepts connections on `listener` until `shutdown` fires.
pub async fn serve<R: RandomnessSource + 'static>(
    listener: TcpListener,
    service: Arc<BattleService<R>>,
    shutdown: Arc<broadcast::Sender<()>>,
) {
    let mut shutdown_rx = shutdown.subscribe();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        info!(%peer_addr, "new connection");
                        let shutdown_rx = shutdown.subscribe();
                        tokio::spawn(handle_connection(
                            stream,
                            peer_addr,
                            Arc::clone(&service),
                            shutdown_rx,
                        ));
                    }
                    Err(e) => {
                        warn!(error = %e, "accept error");
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                break;
            }
        }
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection<R: RandomnessSource + 'static>(
    stream: TcpStream,
    peer_addr: SocketAddr,
    service: Arc<BattleService<R>>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(%peer_addr, error = %e, "WebSocket handshake failed");
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();
    let mut session = Session::new(service.config().flip_delay());

    loop {
        tokio::select! {
            msg_opt = read.next() => {
                match msg_opt {
                    Some(Ok(msg)) => {
                        if let Some(response) =
                            handler::process_message(&service, &mut session, msg).await
                        {
                            if let Err(e) = write.send(Message::Text(response)).await {
                                warn!(%peer_addr, error = %e, "send error");
                                break;
                            }
                        }
                    }
                    Some(Err(e)) => {
                        warn!(%peer_addr, error = %e, "receive error");
                        break;
                    }
                    None => break,
                }
            }
            _ = shutdown_rx.recv() => {
                let _ = write.send(Message::Close(None)).await;
                break;
            }
        }
    }

    info!(%peer_addr, battle = session.battle_id().unwrap_or("-"), "connection closed");
}

//! Local callback listener for the authorization redirect
//!
//! A single-use HTTP responder that captures the `code` query parameter
//! from the provider's redirect. Lifecycle: `bind` starts serving, exactly
//! one inbound request to the registered route completes the listener, and
//! `shutdown` releases the socket. The captured code crosses from the
//! serving task to the waiting caller over a oneshot channel, so there is
//! no shared mutable state and no polling.
//!
//! `wait_for_code` is the companion wait primitive: it blocks the caller
//! until the code arrives or the wall-clock budget elapses, and guarantees
//! the listener is shut down exactly once on both paths.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::Query;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::constants::CALLBACK_RESPONSE_BODY;
use crate::error::{Error, Result};

/// One-shot HTTP listener owned by a single authorization attempt.
///
/// Serves exactly one GET route. The first request carrying a `code` query
/// parameter wins; later requests still receive the confirmation body but
/// cannot alter the captured value.
pub struct CallbackListener {
    addr: SocketAddr,
    code_rx: oneshot::Receiver<String>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    serve_task: Option<JoinHandle<()>>,
}

impl CallbackListener {
    /// Bind to `host:port` and start serving the given route.
    ///
    /// `route_path` must start with `/`; requests to any other path get a
    /// 404 and leave the captured state untouched.
    pub async fn bind(host: &str, port: u16, route_path: &str) -> Result<Self> {
        let (code_tx, code_rx) = oneshot::channel::<String>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        // The sender sits in a take-once slot: the first request with a
        // code consumes it, every later request finds it empty.
        let slot = Arc::new(Mutex::new(Some(code_tx)));
        let app = Router::new().route(
            route_path,
            get({
                let slot = Arc::clone(&slot);
                move |Query(params): Query<HashMap<String, String>>| {
                    let slot = Arc::clone(&slot);
                    async move {
                        if let Some(code) = params.get("code") {
                            if let Some(tx) = slot.lock().await.take() {
                                debug!("authorization code received");
                                let _ = tx.send(code.clone());
                            }
                        }
                        CALLBACK_RESPONSE_BODY
                    }
                }
            }),
        );

        let listener = TcpListener::bind((host, port))
            .await
            .map_err(|e| Error::Bind(format!("{host}:{port}: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| Error::Bind(format!("{host}:{port}: {e}")))?;
        debug!(%addr, path = route_path, "callback listener bound");

        let serve_task = tokio::spawn(async move {
            // The shutdown future resolves on an explicit shutdown() or
            // when the listener handle is dropped, so the socket is
            // released on every exit path.
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok(Self {
            addr,
            code_rx,
            shutdown_tx: Some(shutdown_tx),
            serve_task: Some(serve_task),
        })
    }

    /// Address the listener is actually bound to (resolves port 0 binds).
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop serving and release the socket.
    ///
    /// Idempotent: a second call is a no-op. Returns only after the serving
    /// task has finished, so the port is bindable again immediately.
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.serve_task.take() {
            let _ = task.await;
            debug!(addr = %self.addr, "callback listener stopped");
        }
    }
}

/// Block until the listener captures a code or the budget elapses.
///
/// Shuts the listener down exactly once before returning, on the success
/// path and the timeout path alike.
pub async fn wait_for_code(mut listener: CallbackListener, budget: Duration) -> Result<String> {
    let outcome = tokio::time::timeout(budget, &mut listener.code_rx).await;
    listener.shutdown().await;

    match outcome {
        Ok(Ok(code)) => Ok(code),
        Ok(Err(_)) => Err(Error::Http(
            "callback listener stopped before a code arrived".into(),
        )),
        Err(_) => Err(Error::Timeout {
            secs: budget.as_secs(),
        }),
    }
}

//! Server lifecycle: bind, accept, spawn, drain.
//!
//! [`Server`] owns the listening socket and spawns one task per accepted
//! connection. [`Server::stop`] flips a watch channel, the accept loop stops
//! taking connections, and every in-flight connection task is awaited before
//! `stop` returns — a failure inside one connection never touches the
//! listener or its siblings.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info, warn};

use pico_http::connection::{ConnectionConfig, HttpConnection};
use pico_http::router::{RouteGroup, RouteTable};

#[derive(Debug, Error)]
pub enum ServerBuildError {
    #[error("address must be set")]
    MissingAddress,
    #[error("routes must be set")]
    MissingRoutes,
    #[error("globals must be set")]
    MissingGlobals,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server already started")]
    AlreadyStarted,
    #[error("server not started")]
    NotStarted,
    #[error("bind failed: {source}")]
    Bind {
        #[from]
        source: io::Error,
    },
}

pub struct ServerBuilder<S> {
    address: Option<String>,
    routes: Option<RouteGroup<S>>,
    globals: Option<S>,
    config: ConnectionConfig,
}

impl<S> ServerBuilder<S>
where
    S: Send + Sync + 'static,
{
    fn new() -> Self {
        Self { address: None, routes: None, globals: None, config: ConnectionConfig::default() }
    }

    /// The address to bind, e.g. `"127.0.0.1:8000"`.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// The finished route group; it is frozen into a table at build time.
    pub fn routes(mut self, routes: RouteGroup<S>) -> Self {
        self.routes = Some(routes);
        self
    }

    /// The read-only globals value handed to every handler.
    pub fn globals(mut self, globals: S) -> Self {
        self.globals = Some(globals);
        self
    }

    pub fn connection_config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Server<S>, ServerBuildError> {
        let address = self.address.ok_or(ServerBuildError::MissingAddress)?;
        let routes = self.routes.ok_or(ServerBuildError::MissingRoutes)?;
        let globals = self.globals.ok_or(ServerBuildError::MissingGlobals)?;
        Ok(Server {
            address,
            routes: Arc::new(routes.into_table()),
            globals: Arc::new(globals),
            config: self.config,
            running: None,
        })
    }
}

pub struct Server<S> {
    address: String,
    routes: Arc<RouteTable<S>>,
    globals: Arc<S>,
    config: ConnectionConfig,
    running: Option<Running>,
}

struct Running {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    accept_task: JoinHandle<()>,
}

impl<S> Server<S>
where
    S: Send + Sync + 'static,
{
    pub fn builder() -> ServerBuilder<S> {
        ServerBuilder::new()
    }

    /// Binds the listener and starts accepting connections in a background
    /// task. Fails with [`ServerError::AlreadyStarted`] when called twice.
    pub async fn start(&mut self) -> Result<SocketAddr, ServerError> {
        if self.running.is_some() {
            return Err(ServerError::AlreadyStarted);
        }

        let listener = TcpListener::bind(self.address.as_str()).await?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "start listening");

        let (shutdown, shutdown_rx) = watch::channel(false);
        let routes = Arc::clone(&self.routes);
        let globals = Arc::clone(&self.globals);
        let config = self.config;
        let accept_task = tokio::spawn(accept_loop(listener, shutdown_rx, routes, globals, config));

        self.running = Some(Running { local_addr, shutdown, accept_task });
        Ok(local_addr)
    }

    /// Stops accepting new connections and waits for the in-flight ones to
    /// drain. Fails with [`ServerError::NotStarted`] when the server is not
    /// running.
    pub async fn stop(&mut self) -> Result<(), ServerError> {
        let running = self.running.take().ok_or(ServerError::NotStarted)?;

        let _ = running.shutdown.send(true);
        if let Err(e) = running.accept_task.await {
            error!(cause = %e, "accept task failed during shutdown");
        }
        info!("server stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// The bound address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|running| running.local_addr)
    }
}

async fn accept_loop<S>(
    listener: TcpListener,
    mut shutdown: watch::Receiver<bool>,
    routes: Arc<RouteTable<S>>,
    globals: Arc<S>,
    config: ConnectionConfig,
) where
    S: Send + Sync + 'static,
{
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(cause = %e, "failed to accept");
                        continue;
                    }
                };

                let routes = Arc::clone(&routes);
                let globals = Arc::clone(&globals);
                connections.spawn(async move {
                    let (reader, writer) = stream.into_split();
                    let connection = HttpConnection::with_config(reader, writer, config).with_peer(peer.to_string());
                    match connection.serve(routes, globals).await {
                        Ok(()) => info!(%peer, "finished serving, connection shutdown"),
                        Err(e) => error!(%peer, cause = %e, "connection failed"),
                    }
                });
            }
        }
    }

    // stop accepting before draining what is already in flight
    drop(listener);
    while connections.join_next().await.is_some() {}
}

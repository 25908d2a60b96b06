use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use hyper::{server::conn::http1, service::service_fn};
use hyper_util::rt::TokioIo;
use tc_db::TrebuchetBackend;
use tokio::{net::TcpListener, sync::Notify};

use super::router::main_router;

#[derive(Debug, Clone)]
pub struct GatewayServerConfig {
    /// Bind on every interface rather than loopback only.
    pub gateway_external: bool,
    pub gateway_port: u16,
}

/// Runs the gateway accept loop until `shutdown` is notified.
///
/// Connections are served as independent tasks; a request holds no state
/// beyond its own store queries, so dropping a connection mid-request
/// simply cancels those queries.
pub async fn start_server(
    backend: Arc<TrebuchetBackend>,
    config: GatewayServerConfig,
    shutdown: Arc<Notify>,
) -> anyhow::Result<()> {
    let listen_addr = if config.gateway_external { Ipv4Addr::UNSPECIFIED } else { Ipv4Addr::LOCALHOST };
    let addr = SocketAddr::new(listen_addr.into(), config.gateway_port);
    let listener =
        TcpListener::bind(addr).await.with_context(|| format!("Binding gateway listener on {addr}"))?;

    tracing::info!("REST gateway listening on {addr}");

    loop {
        tokio::select! {
            Ok((stream, _)) = listener.accept() => {
                let io = TokioIo::new(stream);
                let backend = Arc::clone(&backend);

                tokio::task::spawn(async move {
                    let service = service_fn(move |req| main_router(req, Arc::clone(&backend)));

                    // A failed connection only affects its own client.
                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        tracing::warn!("connection ended with error: {err:?}");
                    }
                });
            },

            _ = shutdown.notified() => break Ok(()),
        }
    }
}

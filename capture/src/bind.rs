use std::io;
use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::warn;

use crate::config::{Http, DEFAULT_PORT};

/// Binds the configured port, or [`DEFAULT_PORT`] when none was configured.
pub async fn bind(http: &Http) -> anyhow::Result<TcpListener> {
    bind_preferring(http, DEFAULT_PORT).await
}

/// Like [`bind`], with `preferred` standing in for [`DEFAULT_PORT`].
/// Only the unconfigured case may fall back to an ephemeral port.
pub async fn bind_preferring(http: &Http, preferred: u16) -> anyhow::Result<TcpListener> {
    match http.port {
        Some(port) => bind_with_fallback(http.host, port, false).await,
        None => bind_with_fallback(http.host, preferred, true).await,
    }
}

/// On `AddrInUse` with `fallback` set, retries once on port 0.
pub async fn bind_with_fallback(
    host: IpAddr,
    port: u16,
    fallback: bool,
) -> anyhow::Result<TcpListener> {
    let addr = SocketAddr::new(host, port);
    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(listener),
        Err(e) if fallback && e.kind() == io::ErrorKind::AddrInUse => {
            warn!("{} is in use, falling back to an ephemeral port", addr);
            let any = SocketAddr::new(host, 0);
            TcpListener::bind(any)
                .await
                .with_context(|| format!("failed to bind {}", any))
        }
        Err(e) => Err(e).with_context(|| format!("failed to bind {}", addr)),
    }
}

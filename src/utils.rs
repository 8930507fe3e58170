use tracing::{debug, error, warn};

pub async fn shutdown_signal() {
    let name = wait_for_stop_signal().await;
    debug!("Received signal: {}", name);
}

#[cfg(unix)]
async fn wait_for_stop_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut terminate), Ok(mut interrupt)) => tokio::select! {
            _ = terminate.recv() => "SIGTERM",
            _ = interrupt.recv() => "SIGINT",
        },
        _ => {
            warn!("cannot install signal handlers, falling back to ctrl-c");
            ctrl_c().await
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_stop_signal() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("cannot listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    "CTRL_C"
}

/// Reads `<name>.toml` (or `path`), then `/etc/framecast/<name>.toml`.
/// Missing files give the defaults; only a file that fails to parse is an error.
pub fn load<T>(name: String, path: Option<String>) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned + std::default::Default,
{
    use std::fs::read_to_string;
    let result = read_to_string(path.unwrap_or(format!("{name}.toml")))
        .or(read_to_string(format!("/etc/framecast/{name}.toml")))
        .unwrap_or("".to_string());
    Ok(toml::from_str(result.as_str())?)
}

/// Network Reachability Module
///
/// A plain TCP connect probe, used at startup to surface an unreachable
/// Kafka broker early as a warning rather than a silent first-publish
/// failure later.
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

pub async fn check_tcp(address: &str, probe_timeout: Duration) -> Result<(), String> {
    match timeout(probe_timeout, TcpStream::connect(address)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(format!("TCP connection to {address} failed: {e}")),
        Err(_) => Err(format!("TCP connection to {address} timed out after {probe_timeout:?}")),
    }
}

//! Free-port discovery.

use crate::error::{ConfigError, Result};
use std::net::{IpAddr, SocketAddr};
use std::ops::RangeInclusive;
use tokio::net::TcpListener;

/// Bind the first free port in `ports` on `host`.
///
/// The listener is returned bound, so nothing can take the port between
/// discovery and serving.
///
/// # Errors
///
/// Returns an error when every port in the range is taken or refused.
pub async fn bind_first_available(host: IpAddr, ports: RangeInclusive<u16>) -> Result<TcpListener> {
    let (start, end) = (*ports.start(), *ports.end());

    if start < 1024 && start != 0 {
        crate::ui::warning(&format!(
            "Port {} is in privileged range, may require root access",
            start
        ));
    }

    for port in ports {
        let addr = SocketAddr::new(host, port);
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                if port != start {
                    tracing::debug!("port {} busy, bound {} instead", start, port);
                }
                return Ok(listener);
            }
            Err(e) => tracing::trace!("cannot bind {}: {}", addr, e),
        }
    }

    Err(ConfigError::InvalidValue {
        field: "port".to_string(),
        value: format!("{}-{}", start, end),
        hint: format!(
            "Ports {}-{} are all in use. Try a different port range.",
            start, end
        ),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[tokio::test]
    async fn test_binds_requested_port_when_free() {
        let probe = match TcpListener::bind((LOCALHOST, 0)).await {
            Ok(listener) => listener,
            Err(err) => {
                eprintln!("Skipping test_binds_requested_port_when_free: {}", err);
                return;
            }
        };
        let port = probe.local_addr().unwrap().port();
        drop(probe);

        let listener = bind_first_available(LOCALHOST, port..=port.saturating_add(10))
            .await
            .expect("should find port");
        assert!(listener.local_addr().unwrap().port() >= port);
    }

    #[tokio::test]
    async fn test_skips_busy_port() {
        let busy = match TcpListener::bind((LOCALHOST, 0)).await {
            Ok(listener) => listener,
            Err(err) => {
                eprintln!("Skipping test_skips_busy_port: {}", err);
                return;
            }
        };
        let port = busy.local_addr().unwrap().port();
        if port == u16::MAX {
            return;
        }

        match bind_first_available(LOCALHOST, port..=port.saturating_add(20)).await {
            Ok(listener) => assert_ne!(listener.local_addr().unwrap().port(), port),
            Err(err) => eprintln!("No free port near {}: {}", port, err),
        }
    }

    #[tokio::test]
    async fn test_exhausted_range_errors() {
        let busy = match TcpListener::bind((LOCALHOST, 0)).await {
            Ok(listener) => listener,
            Err(err) => {
                eprintln!("Skipping test_exhausted_range_errors: {}", err);
                return;
            }
        };
        let port = busy.local_addr().unwrap().port();

        let err = bind_first_available(LOCALHOST, port..=port).await.unwrap_err();
        assert!(err.to_string().contains("are all in use"));
    }
}

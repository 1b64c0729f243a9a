// Server loop module
// Sequential accept loop: one connection is served to completion before the next accept

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::serve_connection;
use crate::config::AppState;
use crate::logger;

/// Accept and serve connections until `shutdown` resolves.
///
/// `shutdown` is only observed between connections; an in-flight request is
/// always completed. The listener is closed when this returns.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => break,

            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        serve_connection(stream, peer_addr, &state).await;
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }
        }
    }

    drop(listener);
    logger::log_debug("Listener closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::bind_listener;
    use std::net::SocketAddr;
    use std::path::Path;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    fn state_for(root: &Path) -> Arc<AppState> {
        let mut config = Config::default();
        config.logging.access_log = false;
        config.performance.connection_timeout = 5;
        Arc::new(AppState::new(config, root.to_path_buf()))
    }

    async fn raw_request(addr: SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[tokio::test]
    async fn test_serves_sequential_requests_then_stops() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>hi</html>").unwrap();

        let listener = bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, state_for(dir.path()), async {
            let _ = rx.await;
        }));

        let ok = raw_request(addr, "GET /index.html HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
        assert!(ok.starts_with("HTTP/1.1 200 OK\r\n"), "{ok}");
        let lower = ok.to_ascii_lowercase();
        assert!(lower.contains("\r\naccess-control-allow-origin: *\r\n"));
        assert!(lower.contains("\r\naccess-control-allow-methods: get, post, options\r\n"));
        assert!(lower.contains("\r\naccess-control-allow-headers: content-type\r\n"));
        assert!(ok.ends_with("\r\n\r\n<html>hi</html>"));

        let missing =
            raw_request(addr, "GET /missing.json HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
        assert!(missing.starts_with("HTTP/1.1 404 Not Found\r\n"), "{missing}");
        assert!(missing.to_ascii_lowercase().contains("access-control-allow-origin: *"));

        let head = raw_request(addr, "HEAD /index.html HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
        assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(head.ends_with("\r\n\r\n"));

        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("serve loop did not stop")
            .unwrap();

        // Listener is closed once the loop returns
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_idle_shutdown_returns_promptly() {
        let dir = tempfile::tempdir().unwrap();
        let listener = bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();

        tokio::time::timeout(
            Duration::from_secs(5),
            serve(listener, state_for(dir.path()), std::future::ready(())),
        )
        .await
        .expect("serve loop did not stop");
    }
}

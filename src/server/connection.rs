// Connection handling module
// Serves one accepted TCP connection to completion

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Serve a single connection inline.
///
/// Keep-alive is off, so the connection carries exactly one request and the
/// caller's accept loop stays sequential. A `connection_timeout` of zero
/// disables the timeout.
pub async fn serve_connection(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) {
    logger::log_debug(&format!("Accepted connection from {peer_addr}"));

    let io = TokioIo::new(stream);
    let timeout_secs = state.config.performance.connection_timeout;

    let mut builder = http1::Builder::new();
    builder.timer(TokioTimer::new()).keep_alive(false);

    let service_state = Arc::clone(state);
    let conn = builder.serve_connection(
        io,
        service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
    );

    if timeout_secs == 0 {
        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }
        return;
    }

    match tokio::time::timeout(Duration::from_secs(timeout_secs), conn).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => logger::log_connection_error(&err),
        Err(_) => {
            logger::log_warning(&format!(
                "Connection from {peer_addr} timed out after {timeout_secs} seconds"
            ));
        }
    }
}

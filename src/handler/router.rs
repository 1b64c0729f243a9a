//! Request entry point
//!
//! Validates the method, dispatches to static file serving, then finalizes
//! every response with CORS and `Server` headers and writes the access log.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, HeaderValue, SERVER};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// URL path, still percent-encoded
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_modified_since: Option<String>,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();
    let method = &parts.method;
    let uri = &parts.uri;
    let is_head = *method == Method::HEAD;

    let response = match *method {
        Method::GET | Method::HEAD => {
            let ctx = RequestContext {
                path: uri.path(),
                query: uri.query(),
                is_head,
                if_modified_since: header_string(&parts.headers, "if-modified-since"),
                if_none_match: header_string(&parts.headers, "if-none-match"),
            };
            static_files::serve_path(&ctx, &state).await
        }
        _ => {
            logger::log_debug(&format!("Unsupported method: {method}"));
            http::build_501_response(method.as_str(), false)
        }
    };

    let response = finalize(response, &state.config.http.server_name);

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            method.to_string(),
            uri.path_and_query()
                .map_or_else(|| uri.path().to_string(), ToString::to_string),
        );
        entry.http_version = version_label(parts.version).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.referer = header_string(&parts.headers, "referer");
        entry.user_agent = header_string(&parts.headers, "user-agent");
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Headers every response carries regardless of status
fn finalize(response: Response<Full<Bytes>>, server_name: &str) -> Response<Full<Bytes>> {
    let mut response = http::apply_cors_headers(response);
    if let Ok(value) = HeaderValue::from_str(server_name) {
        response.headers_mut().insert(SERVER, value);
    }
    response
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

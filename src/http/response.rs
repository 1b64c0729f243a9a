//! HTTP response building module
//!
//! Builders for the statuses the static-file responder emits. CORS and
//! `Server` headers are added later by the request entry point.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::path::html_escape;

/// Short explanation shown on error pages
fn explain(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "Bad request syntax or unsupported method",
        StatusCode::NOT_FOUND => "Nothing matches the given URI",
        StatusCode::METHOD_NOT_ALLOWED => "Specified method is invalid for this resource",
        StatusCode::INTERNAL_SERVER_ERROR => "Server got itself in trouble",
        StatusCode::NOT_IMPLEMENTED => "Server does not support this operation",
        _ => "",
    }
}

fn error_page(status: StatusCode, message: &str) -> String {
    let code = status.as_u16();
    format!(
        r#"<!DOCTYPE HTML>
<html lang="en">
    <head>
        <meta charset="utf-8">
        <title>Error response</title>
    </head>
    <body>
        <h1>Error response</h1>
        <p>Error code: {code}</p>
        <p>Message: {message}.</p>
        <p>Error code explanation: {code} - {explain}.</p>
    </body>
</html>
"#,
        message = html_escape(message),
        explain = explain(status),
    )
}

/// Build an HTML error response. `HEAD` keeps the headers but drops the body.
pub fn build_error_response(
    status: StatusCode,
    message: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let page = error_page(status, message);
    let content_length = page.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(page)
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "text/html;charset=utf-8")
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            fallback(status)
        })
}

/// Build 404 Not Found response
pub fn build_404_response(is_head: bool) -> Response<Full<Bytes>> {
    build_error_response(StatusCode::NOT_FOUND, "File not found", is_head)
}

/// Build 501 response for methods other than GET/HEAD
pub fn build_501_response(method: &str, is_head: bool) -> Response<Full<Bytes>> {
    build_error_response(
        StatusCode::NOT_IMPLEMENTED,
        &format!("Unsupported method ('{method}')"),
        is_head,
    )
}

/// Build 301 redirect to the slash-terminated directory URL
pub fn build_redirect_response(location: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header("Location", location)
        .header("Content-Length", 0)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            fallback(StatusCode::MOVED_PERMANENTLY)
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(last_modified: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header("Last-Modified", last_modified)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            fallback(StatusCode::NOT_MODIFIED)
        })
}

/// Build 200 response for a file read from disk
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    last_modified: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length);
    if let Some(date) = last_modified {
        builder = builder.header("Last-Modified", date);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        fallback(StatusCode::INTERNAL_SERVER_ERROR)
    })
}

/// Build generic HTML response
pub fn build_html_response(content: String, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            fallback(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

fn fallback(status: StatusCode) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = status;
    resp
}

fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

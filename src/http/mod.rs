//! HTTP protocol layer module
//!
//! Protocol helpers shared by the request handler: CORS injection, MIME
//! lookup, path translation, conditional requests and response builders.

pub mod conditional;
pub mod cors;
pub mod mime;
pub mod path;
pub mod response;

// Re-export commonly used items
pub use cors::apply_cors_headers;
pub use path::{translate_path, TranslatedPath};
pub use response::{
    build_304_response, build_404_response, build_501_response, build_error_response,
    build_file_response, build_html_response, build_redirect_response,
};

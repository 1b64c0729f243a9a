//! asset-server
//!
//! Serves the files under its own directory over HTTP on port 8000 and adds
//! permissive CORS headers to every response, so a browser can load local
//! game assets without `file://` same-origin restrictions.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use error::{Result, ServerError};

//! Request handler module
//!
//! Method dispatch, static file serving and the pluggable directory policy.

pub mod listing;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use listing::{DirectoryResponder, IndexOnly, IndexOrListing};
pub use router::handle_request;

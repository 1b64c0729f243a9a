// Application state module
// Immutable state shared by the serve loop and the request handler

use std::path::PathBuf;
use std::sync::Arc;

use super::types::Config;
use crate::handler::listing::{DirectoryResponder, IndexOrListing};

/// Application state
pub struct AppState {
    pub config: Config,
    /// Absolute directory every request path is resolved against
    pub root: PathBuf,
    /// Policy for requests that resolve to a directory
    pub directory_responder: Arc<dyn DirectoryResponder>,
}

impl AppState {
    /// Create state with the default index-or-listing directory policy
    pub fn new(config: Config, root: PathBuf) -> Self {
        Self {
            config,
            root,
            directory_responder: Arc::new(IndexOrListing),
        }
    }

    /// Swap the directory policy
    #[must_use]
    pub fn with_directory_responder(mut self, responder: Arc<dyn DirectoryResponder>) -> Self {
        self.directory_responder = responder;
        self
    }
}

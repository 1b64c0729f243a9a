//! Directory responders
//!
//! Decide what a slash-terminated directory request returns. The request
//! entry point adds CORS headers afterwards, so policies never deal with them.

use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::INDEX_FILES;
use crate::handler::router::RequestContext;
use crate::handler::static_files;
use crate::http::{self, path};
use crate::logger;

/// Policy for requests that resolve to a directory
#[async_trait]
pub trait DirectoryResponder: Send + Sync {
    async fn respond(&self, ctx: &RequestContext<'_>, dir: &Path) -> Response<Full<Bytes>>;
}

/// Serve `index.html`/`index.htm` if present, else an HTML listing
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexOrListing;

/// Serve `index.html`/`index.htm` if present, else 404
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexOnly;

#[async_trait]
impl DirectoryResponder for IndexOrListing {
    async fn respond(&self, ctx: &RequestContext<'_>, dir: &Path) -> Response<Full<Bytes>> {
        if let Some(index) = find_index(dir).await {
            return static_files::serve_file(ctx, &index).await;
        }
        list_directory(ctx, dir).await
    }
}

#[async_trait]
impl DirectoryResponder for IndexOnly {
    async fn respond(&self, ctx: &RequestContext<'_>, dir: &Path) -> Response<Full<Bytes>> {
        match find_index(dir).await {
            Some(index) => static_files::serve_file(ctx, &index).await,
            None => http::build_404_response(ctx.is_head),
        }
    }
}

/// First index file that exists as a regular file
pub async fn find_index(dir: &Path) -> Option<PathBuf> {
    for name in INDEX_FILES {
        let candidate = dir.join(name);
        if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
            return Some(candidate);
        }
    }
    None
}

/// One row of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl ListingEntry {
    fn display_name(&self) -> String {
        if self.is_symlink {
            format!("{}@", self.name)
        } else if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }

    fn link(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Read a directory into listing entries sorted case-insensitively
pub async fn read_entries(dir: &Path) -> std::io::Result<Vec<ListingEntry>> {
    let mut entries = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;

    while let Some(entry) = read_dir.next_entry().await? {
        let full = entry.path();
        let is_symlink = fs::symlink_metadata(&full)
            .await
            .is_ok_and(|m| m.file_type().is_symlink());
        // Follows symlinks, so a link to a directory links with a slash
        let is_dir = fs::metadata(&full).await.is_ok_and(|m| m.is_dir());
        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
            is_symlink,
        });
    }

    entries.sort_by_key(|e| e.name.to_lowercase());
    Ok(entries)
}

/// Render the listing page for `target`, the request target as sent
/// (still percent-encoded, query included)
pub fn render_listing(target: &str, entries: &[ListingEntry]) -> String {
    let title = format!(
        "Directory listing for {}",
        path::html_escape(&path::percent_decode(target))
    );

    let mut html = format!(
        "<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<hr>\n<ul>\n"
    );
    for entry in entries {
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            path::percent_encode(&entry.link()),
            path::html_escape(&entry.display_name()),
        ));
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    html
}

async fn list_directory(ctx: &RequestContext<'_>, dir: &Path) -> Response<Full<Bytes>> {
    match read_entries(dir).await {
        Ok(entries) => {
            let target = match ctx.query {
                Some(query) => format!("{}?{query}", ctx.path),
                None => ctx.path.to_string(),
            };
            http::build_html_response(render_listing(&target, &entries), ctx.is_head)
        }
        Err(e) => {
            logger::log_warning(&format!("Cannot list '{}': {e}", dir.display()));
            http::build_error_response(
                hyper::StatusCode::NOT_FOUND,
                "No permission to list directory",
                ctx.is_head,
            )
        }
    }
}

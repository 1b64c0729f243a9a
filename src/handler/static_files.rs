//! Static file serving module
//!
//! Resolves a request path under the served root and answers with the file,
//! a redirect, the directory responder's output, or 404.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, conditional, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::Path;
use tokio::fs;

/// Serve whatever the request path resolves to under `state.root`
pub async fn serve_path(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let translated = http::translate_path(&state.root, ctx.path);

    let Ok(metadata) = fs::metadata(&translated.fs_path).await else {
        logger::log_debug(&format!("Not found: {}", translated.fs_path.display()));
        return http::build_404_response(ctx.is_head);
    };

    if metadata.is_dir() {
        if !translated.trailing_slash {
            return http::build_redirect_response(&directory_location(ctx));
        }
        return state
            .directory_responder
            .respond(ctx, &translated.fs_path)
            .await;
    }

    // "/game.js/" names a directory that does not exist
    if translated.trailing_slash {
        return http::build_404_response(ctx.is_head);
    }

    serve_file(ctx, &translated.fs_path).await
}

/// Serve a single regular file, honouring `If-Modified-Since`
pub async fn serve_file(ctx: &RequestContext<'_>, file_path: &Path) -> Response<Full<Bytes>> {
    let metadata = match fs::metadata(file_path).await {
        Ok(m) if m.is_file() => m,
        _ => return http::build_404_response(ctx.is_head),
    };

    let modified = metadata.modified().ok();
    let last_modified = modified.map(conditional::format_http_date);

    if let Some(mtime) = modified {
        if conditional::is_not_modified(
            ctx.if_modified_since.as_deref(),
            ctx.if_none_match.as_deref(),
            mtime,
        ) {
            return http::build_304_response(last_modified.as_deref().unwrap_or_default());
        }
    }

    let content = match fs::read(file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            return http::build_404_response(ctx.is_head);
        }
    };

    http::build_file_response(
        Bytes::from(content),
        mime::content_type_for(file_path),
        last_modified.as_deref(),
        ctx.is_head,
    )
}

/// `Location` for a directory requested without its trailing slash
fn directory_location(ctx: &RequestContext<'_>) -> String {
    match ctx.query {
        Some(q) => format!("{}/?{q}", ctx.path),
        None => format!("{}/", ctx.path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use std::fs as stdfs;

    fn ctx<'a>(path: &'a str, query: Option<&'a str>) -> RequestContext<'a> {
        RequestContext {
            path,
            query,
            is_head: false,
            if_modified_since: None,
            if_none_match: None,
        }
    }

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    fn state_for(root: &Path) -> AppState {
        AppState::new(Config::default(), root.to_path_buf())
    }

    #[tokio::test]
    async fn test_binary_file_bytes_identical() {
        let dir = tempfile::tempdir().unwrap();
        let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        stdfs::create_dir(dir.path().join("sprites")).unwrap();
        stdfs::write(dir.path().join("sprites/hero.png"), &data).unwrap();

        let state = state_for(dir.path());
        let resp = serve_path(&ctx("/sprites/hero.png", None), &state).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "image/png");
        assert_eq!(resp.headers()["content-length"], "4096");
        assert!(resp.headers().contains_key("last-modified"));
        assert_eq!(body_bytes(resp).await.as_ref(), data.as_slice());
    }

    #[tokio::test]
    async fn test_directory_without_slash_redirects() {
        let dir = tempfile::tempdir().unwrap();
        stdfs::create_dir(dir.path().join("levels")).unwrap();

        let state = state_for(dir.path());
        let resp = serve_path(&ctx("/levels", Some("v=3")), &state).await;
        assert_eq!(resp.status(), 301);
        assert_eq!(resp.headers()["location"], "/levels/?v=3");
    }

    #[tokio::test]
    async fn test_file_with_trailing_slash_is_404() {
        let dir = tempfile::tempdir().unwrap();
        stdfs::write(dir.path().join("game.js"), "x").unwrap();

        let state = state_for(dir.path());
        let resp = serve_path(&ctx("/game.js/", None), &state).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_traversal_stays_inside_root() {
        let outer = tempfile::tempdir().unwrap();
        stdfs::write(outer.path().join("secret.txt"), "secret").unwrap();
        let root = outer.path().join("public");
        stdfs::create_dir(&root).unwrap();

        let state = state_for(&root);
        let resp = serve_path(&ctx("/../secret.txt", None), &state).await;
        assert_eq!(resp.status(), 404);
        let resp = serve_path(&ctx("/%2e%2e/secret.txt", None), &state).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_if_modified_since_yields_304() {
        let dir = tempfile::tempdir().unwrap();
        stdfs::write(dir.path().join("main.js"), "let x = 1;").unwrap();
        let state = state_for(dir.path());

        let first = serve_path(&ctx("/main.js", None), &state).await;
        let stamp = first.headers()["last-modified"].to_str().unwrap().to_string();

        let mut conditional = ctx("/main.js", None);
        conditional.if_modified_since = Some(stamp.clone());
        let resp = serve_path(&conditional, &state).await;
        assert_eq!(resp.status(), 304);
        assert_eq!(resp.headers()["last-modified"], stamp.as_str());
        assert!(body_bytes(resp).await.is_empty());

        conditional.if_modified_since = Some("Thu, 01 Jan 1970 00:00:00 GMT".to_string());
        let resp = serve_path(&conditional, &state).await;
        assert_eq!(resp.status(), 200);
    }
}

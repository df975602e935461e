//! Bundled web frontend.
//!
//! Serves `web/dist` compiled into the binary with file-server semantics:
//! `index.html` for directory paths, a redirect to the trailing-slash form
//! for directories requested without one, 404 for everything else.
//! Paths are percent-decoded before lookup.

use axum::body::Body;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "web/dist/"]
struct WebAssets;

const INDEX: &str = "index.html";

/// Fallback handler for every path not claimed by the API.
pub async fn serve_asset(method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
    }

    let Ok(path) = percent_decode_str(uri.path()).decode_utf8() else {
        return not_found();
    };
    if path.split('/').any(|segment| segment == "..") {
        return not_found();
    }

    let relative = path.trim_start_matches('/');
    if relative.is_empty() || relative.ends_with('/') {
        return serve_file(&format!("{}{}", relative, INDEX));
    }

    if WebAssets::get(relative).is_none() && WebAssets::get(&format!("{}/{}", relative, INDEX)).is_some() {
        return Response::builder()
            .status(StatusCode::MOVED_PERMANENTLY)
            .header(header::LOCATION, format!("{}/", uri.path()))
            .body(Body::empty())
            .unwrap_or_else(|_| not_found());
    }

    serve_file(relative)
}

fn serve_file(path: &str) -> Response {
    match WebAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                Body::from(content.data),
            )
                .into_response()
        }
        None => not_found(),
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 page not found").into_response()
}

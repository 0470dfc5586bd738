use axum::{
    body::Body,
    extract::Path,
    http::{StatusCode, header},
    response::IntoResponse,
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "assets"]
struct Assets;

/// The report page. Served whether or not credentials are configured.
pub async fn serve_index() -> impl IntoResponse {
    match Assets::get("index.html") {
        Some(content) => {
            let mime_header = header::HeaderValue::from_static("text/html; charset=utf-8");
            ([(header::CONTENT_TYPE, mime_header)], Body::from(content.data)).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn serve_static(Path(path): Path<String>) -> impl IntoResponse {
    match Assets::get(&path) {
        Some(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            let mime_header = header::HeaderValue::from_str(mime.as_ref())
                .unwrap_or_else(|_| header::HeaderValue::from_static("application/octet-stream"));
            ([(header::CONTENT_TYPE, mime_header)], Body::from(content.data)).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

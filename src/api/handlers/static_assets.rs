//! HTTP handlers for static asset serving.

use axum::{
    body::Body,
    extract::Path,
    http::{Response, StatusCode},
    response::IntoResponse,
};
use tracing::{debug, instrument};

use crate::static_assets;

/// Serve the fixed favicon
#[instrument]
pub async fn favicon() -> impl IntoResponse {
    serve("favicon.ico")
}

/// Serve an embedded asset under `/public/*`, with the prefix already stripped by routing
#[instrument]
pub async fn serve_public_asset(Path(asset_path): Path<String>) -> impl IntoResponse {
    serve(asset_path.trim_start_matches('/'))
}

fn serve(asset_path: &str) -> Response<Body> {
    if let Some(content) = static_assets::Assets::get(asset_path) {
        let mime = mime_guess::from_path(asset_path).first_or_octet_stream();

        return Response::builder()
            .header(axum::http::header::CONTENT_TYPE, mime.as_ref())
            .body(Body::from(content.data.into_owned()))
            .unwrap();
    }

    debug!(asset_path, "Static asset not found");
    Response::builder().status(StatusCode::NOT_FOUND).body(Body::empty()).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, routing::get};
    use axum_test::TestServer;

    fn create_test_router() -> Router {
        Router::new()
            .route("/favicon.ico", get(favicon))
            .route("/public/{*path}", get(serve_public_asset))
    }

    #[tokio::test]
    async fn test_serve_favicon() {
        let app = create_test_router();
        let server = TestServer::new(app).unwrap();

        let response = server.get("/favicon.ico").await;

        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").map(|v| v.to_str().unwrap()),
            Some("image/x-icon")
        );
        assert!(!response.as_bytes().is_empty());
    }

    #[tokio::test]
    async fn test_serve_public_css() {
        let app = create_test_router();
        let server = TestServer::new(app).unwrap();

        let response = server.get("/public/style.css").await;

        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").map(|v| v.to_str().unwrap()),
            Some("text/css")
        );
    }

    #[tokio::test]
    async fn test_unknown_asset_is_404() {
        let app = create_test_router();
        let server = TestServer::new(app).unwrap();

        let response = server.get("/public/no-such-file.js").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}

//! HTTP front end.
//!
//! | Path | Handler |
//! |------|---------|
//! | `GET /api/health` | [`health::check`](crate::health::check) as JSON |
//! | `GET <file>.<ext>` | static file from the public directory, if present |
//! | `GET` anything else | route table navigation rendered as HTML |
//!
//! Page responses carry the navigation outcome's status: 200 for declared
//! routes, 404 for the catch-all, 500 for the error view. `?reload=1`
//! clears a memoized module failure before navigating.

use std::io;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::health::{self, HealthProbe, HEALTH_HEADERS};
use crate::pages::layout::render_document;
use crate::pages::ErrorView;
use crate::routes::SiteRouter;

/// Path of the health-check endpoint.
pub const HEALTH_PATH: &str = "/api/health";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    router: SiteRouter,
    probe: Arc<dyn HealthProbe>,
    site_name: String,
    public_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(router: SiteRouter, probe: Arc<dyn HealthProbe>, site_name: impl Into<String>) -> Self {
        Self {
            router,
            probe,
            site_name: site_name.into(),
            public_dir: None,
        }
    }

    /// Serve files from `dir` for paths with a file extension.
    pub fn with_public_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.public_dir = Some(dir.into());
        self
    }

    pub fn router(&self) -> &SiteRouter {
        &self.router
    }
}

/// Build the axum application.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health_handler))
        .fallback(page_handler)
        .with_state(Arc::new(state))
}

/// Bind a listener; port 0 picks a free port.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve until `shutdown` is cancelled, then drain in-flight requests.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Listening");
    }

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(ServerError::Serve)?;

    info!("Server stopped");
    Ok(())
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Response {
    let result = health::check(state.probe.as_ref());
    let status = StatusCode::from_u16(result.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut response = (status, result.body.to_string()).into_response();
    let headers = response.headers_mut();
    for (name, value) in HEALTH_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    response
}

async fn page_handler(State(state): State<Arc<AppState>>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET, HEAD")]).into_response();
    }

    let path = uri.path();
    if let Some(response) = static_file(&state, path).await {
        return response;
    }

    if wants_reload(uri.query()) {
        let id = state.router.table().resolve(path).id();
        if state.router.reload(id) {
            info!(route = %id, "Cleared failed module on reload");
        }
    }

    let outcome = state.router.navigate(path).await;
    let nav = state.router.nav_links(outcome.route());
    let html = render_document(&state.site_name, &nav, outcome.page());
    let status = StatusCode::from_u16(outcome.status_code()).unwrap_or(StatusCode::OK);

    debug!(path, route = %outcome.route(), status = status.as_u16(), "Rendered page");
    (status, Html(html)).into_response()
}

fn wants_reload(query: Option<&str>) -> bool {
    query
        .unwrap_or_default()
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .any(|(key, value)| key == ErrorView::RELOAD_PARAM && value != "0")
}

async fn static_file(state: &AppState, path: &str) -> Option<Response> {
    let root = state.public_dir.as_ref()?;
    let relative = Path::new(path.trim_start_matches('/'));

    relative.extension()?;
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return None;
    }

    let file = root.join(relative);
    let bytes = tokio::fs::read(&file).await.ok()?;
    debug!(path = %file.display(), bytes = bytes.len(), "Serving static file");

    let mut response = Response::new(Body::from(bytes));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type(relative)),
    );
    Some(response)
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webmanifest" => "application/manifest+json",
        "xml" => "application/xml",
        "gz" => "application/gzip",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "css" => "text/css",
        "js" => "text/javascript",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{ConfiguredProbe, HealthError, HealthInfo};
    use crate::pages::{NotFoundPage, Page};
    use crate::routes::{LoadError, RouteEntry, RouteId, RouteTable};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct DownProbe;

    impl HealthProbe for DownProbe {
        fn report(&self) -> Result<HealthInfo, HealthError> {
            Err(HealthError::Probe("disk full".to_string()))
        }
    }

    fn probe() -> Arc<dyn HealthProbe> {
        Arc::new(ConfiguredProbe::new(HealthInfo {
            environment: "test".to_string(),
            region: "local".to_string(),
            version: "0.0.0".to_string(),
        }))
    }

    fn state(gallery_fails: Arc<AtomicBool>) -> Arc<AppState> {
        let table = RouteTable::new(vec![
            RouteEntry::new(RouteId::Home, "/", "Home", || async {
                Ok::<_, LoadError>(Arc::new(NotFoundPage) as Arc<dyn Page>)
            })
            .exact(),
            RouteEntry::new(RouteId::Gallery, "/gallery", "Gallery", move || {
                let fail = gallery_fails.load(Ordering::SeqCst);
                async move {
                    if fail {
                        Err(LoadError::failed(RouteId::Gallery, "scan failed"))
                    } else {
                        Ok(Arc::new(NotFoundPage) as Arc<dyn Page>)
                    }
                }
            }),
            RouteEntry::new(RouteId::NotFound, "*", "Not Found", || async {
                Ok::<_, LoadError>(Arc::new(NotFoundPage) as Arc<dyn Page>)
            }),
        ])
        .unwrap();
        Arc::new(AppState::new(SiteRouter::new(table), probe(), "Sam"))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn get_page(state: &Arc<AppState>, uri: &str) -> Response {
        page_handler(State(Arc::clone(state)), Method::GET, uri.parse().unwrap()).await
    }

    #[tokio::test]
    async fn test_health_ok_with_headers() {
        let state = state(Arc::new(AtomicBool::new(false)));
        let response = health_handler(State(state)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(response.headers()["pragma"], "no-cache");
        assert_eq!(response.headers()["expires"], "0");

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["environment"], "test");
    }

    #[tokio::test]
    async fn test_health_failure_is_500() {
        let table = RouteTable::new(vec![RouteEntry::new(RouteId::NotFound, "*", "Not Found", || async {
            Ok::<_, LoadError>(Arc::new(NotFoundPage) as Arc<dyn Page>)
        })])
        .unwrap();
        let state = Arc::new(AppState::new(SiteRouter::new(table), Arc::new(DownProbe), "Sam"));

        let response = health_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["content-type"], "application/json");

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "health probe failed: disk full");
    }

    #[tokio::test]
    async fn test_page_status_codes() {
        let state = state(Arc::new(AtomicBool::new(false)));

        assert_eq!(get_page(&state, "/").await.status(), StatusCode::OK);
        assert_eq!(get_page(&state, "/gallery").await.status(), StatusCode::OK);
        assert_eq!(get_page(&state, "/nope").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_failed_module_renders_error_view_until_reload() {
        let fails = Arc::new(AtomicBool::new(true));
        let state = state(Arc::clone(&fails));

        let response = get_page(&state, "/gallery").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = body_text(response).await;
        assert!(html.contains("/gallery?reload=1"));
        assert!(html.contains("Go home"));

        // Memoized: still failing even after the cause is gone
        fails.store(false, Ordering::SeqCst);
        let response = get_page(&state, "/gallery").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = get_page(&state, "/gallery?reload=1").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rejects_non_get() {
        let state = state(Arc::new(AtomicBool::new(false)));
        let response = page_handler(State(state), Method::POST, "/".parse().unwrap()).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_static_files_from_public_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("favicon.ico"), b"ico").unwrap();

        let inner = state(Arc::new(AtomicBool::new(false)));
        let state = Arc::new((*inner).clone().with_public_dir(dir.path()));

        let response = get_page(&state, "/favicon.ico").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/x-icon");
        assert_eq!(body_text(response).await, "ico");

        // Traversal and missing files fall through to routing
        assert_eq!(get_page(&state, "/../secret.txt").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get_page(&state, "/missing.png").await.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_wants_reload() {
        assert!(wants_reload(Some("reload=1")));
        assert!(wants_reload(Some("a=b&reload")));
        assert!(!wants_reload(Some("reload=0")));
        assert!(!wants_reload(Some("reloaded=1")));
        assert!(!wants_reload(None));
    }
}

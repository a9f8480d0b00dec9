use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Form, Router,
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::ServerConfig;
use crate::controller::{FormController, Submission};
use crate::error::AppError;
use crate::models::FormInput;
use crate::page::PageRenderer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<FormController>,
    pub pages: Arc<PageRenderer>,
}

impl AppState {
    pub fn new(controller: FormController) -> Result<Self, AppError> {
        let pages = PageRenderer::new()
            .map_err(|e| AppError::general(format!("Failed to load page template: {e}")))?;
        Ok(Self {
            controller: Arc::new(controller),
            pages: Arc::new(pages),
        })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), self.user_message()).into_response()
    }
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(show_form).post(submit_form))
        .route("/health", get(health))
        .nest("/api", api::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body_bytes))
                .layer(cors),
        )
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn show_form(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&state, &FormInput::default(), None)
}

async fn submit_form(
    State(state): State<AppState>,
    Form(input): Form<FormInput>,
) -> Result<Response, AppError> {
    let submission = state.controller.submit(&input).await;
    let page = render(&state, &input, Some(&submission))?;
    Ok((api::status_for(submission.state), page).into_response())
}

fn render(
    state: &AppState,
    input: &FormInput,
    submission: Option<&Submission>,
) -> Result<Html<String>, AppError> {
    state.pages.render(input, submission).map(Html).map_err(|e| {
        tracing::error!("Failed to render page: {:#}", e);
        AppError::general("Failed to render page")
    })
}

pub async fn run(config: &ServerConfig, state: AppState) -> Result<(), AppError> {
    let app = router(state, config.max_body_bytes);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::general(format!("Invalid listen address: {e}")))?;

    if let Some(tls) = &config.tls {
        return serve_tls(addr, app, tls).await;
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(feature = "tls")]
async fn serve_tls(
    addr: SocketAddr,
    app: Router,
    tls: &crate::config::TlsConfig,
) -> Result<(), AppError> {
    let rustls = axum_server::tls_rustls::RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;
    tracing::info!("Web server running at https://{}", addr);
    axum_server::bind_rustls(addr, rustls)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

#[cfg(not(feature = "tls"))]
async fn serve_tls(
    _addr: SocketAddr,
    _app: Router,
    _tls: &crate::config::TlsConfig,
) -> Result<(), AppError> {
    Err(AppError::general(
        "server.tls is configured but this build lacks the `tls` feature",
    ))
}

///! HTTP surface
///!
///! - `GET  /`              rendered dashboard page
///! - `POST /refresh`       refresh button on the page, redirects back
///! - `GET  /api/dashboard` view model as JSON
///! - `POST /api/refresh`   manual refresh, returns outcome + view
///! - `GET  /health`

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use baja_common::DashboardView;
use crate::module::dashboard::{DashboardController, DashboardRenderer};

pub struct DashboardService {
    controller: Arc<DashboardController>,
    renderer: DashboardRenderer,
}

#[derive(Debug, Serialize)]
struct RefreshResponse {
    outcome: &'static str,
    view: DashboardView,
}

impl DashboardService {
    pub fn new(controller: Arc<DashboardController>, renderer: DashboardRenderer) -> Self {
        Self { controller, renderer }
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/", get(index))
            .route("/refresh", post(refresh_page))
            .route("/api/dashboard", get(dashboard_json))
            .route("/api/refresh", post(refresh_json))
            .route("/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::new(self))
    }

    /// Bind and serve until the process is stopped.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Dashboard listening on http://{}", listener.local_addr()?);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

type AppState = State<Arc<DashboardService>>;

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn index(State(service): AppState) -> Html<String> {
    let view = service.controller.view().await;
    Html(service.renderer.render(&view, chrono::Local::now()))
}

async fn refresh_page(State(service): AppState) -> Redirect {
    let outcome = service.controller.refresh().await;
    tracing::info!("Manual refresh from page: {}", outcome.as_str());
    Redirect::to("/")
}

async fn dashboard_json(State(service): AppState) -> Json<DashboardView> {
    Json(service.controller.view().await)
}

async fn refresh_json(State(service): AppState) -> Json<RefreshResponse> {
    let outcome = service.controller.refresh().await;
    tracing::info!("Manual refresh via API: {}", outcome.as_str());
    Json(RefreshResponse {
        outcome: outcome.as_str(),
        view: service.controller.view().await,
    })
}

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use hyper::Server;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::apis::listing_sources;
use crate::app::gather_use_case::GatherUseCase;
use crate::common::types::Source;

#[derive(Clone)]
pub struct AppState {
    pub gatherer: Arc<GatherUseCase>,
}

impl AppState {
    pub fn new(gatherer: GatherUseCase) -> Self {
        Self {
            gatherer: Arc::new(gatherer),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CityParams {
    pub city: Option<String>,
    pub source: Option<String>,
}

/// Body of every non-2xx response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            detail: detail.into(),
        }),
    )
        .into_response()
}

fn required_city(params: &CityParams) -> Result<String, Response> {
    params.city.clone().ok_or_else(|| {
        error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "missing required query parameter: city",
        )
    })
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "city-events",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn get_events(State(state): State<AppState>, Query(params): Query<CityParams>) -> Response {
    let city = match required_city(&params) {
        Ok(city) => city,
        Err(response) => return response,
    };
    let source = match params.source.as_deref() {
        None => Source::default(),
        Some(raw) => match raw.parse::<Source>() {
            Ok(source) if listing_sources().contains(&source) => source,
            _ => {
                return error_response(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    format!("unsupported source '{raw}'"),
                )
            }
        },
    };

    let span = info_span!(
        "events_request",
        request_id = %Uuid::new_v4(),
        city = %city,
        source = %source
    );
    async move {
        match state.gatherer.gather(&city, source).await {
            Ok(events) => {
                info!("Returning {} events", events.len());
                Json(events).into_response()
            }
            Err(e) => {
                error!(error = %e, "Gathering events failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
    .instrument(span)
    .await
}

async fn get_parks(State(state): State<AppState>, Query(params): Query<CityParams>) -> Response {
    let city = match required_city(&params) {
        Ok(city) => city,
        Err(response) => return response,
    };

    let span = info_span!("parks_request", request_id = %Uuid::new_v4(), city = %city);
    async move { Json(state.gatherer.parks(&city).await).into_response() }
        .instrument(span)
        .await
}

/// Create the HTTP router with all routes
pub fn create_server(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/events", get(get_events))
        .route("/events/", get(get_events))
        .route("/parks", get(get_parks))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Start the HTTP server on the specified port; stops on Ctrl-C.
pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_server(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server running on http://localhost:{port}");
    info!("Events: http://localhost:{port}/events?city=Austin");

    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

// Abridge is an open source text summarization service.
// Copyright (C) 2024 Abridge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! The api module contains the http api.
//! All http requests are handled using axum.

use axum::{body::Body, Router};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::compression::CompressionLayer;

use crate::{config::ApiConfig, models::t5::T5Provider, summarizer::Summarizer};

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    routing::post,
};

mod docs;
mod metrics;
pub mod summarize;

pub struct Counters {
    pub summarize_counter_success: crate::metrics::Counter,
    pub summarize_counter_fail: crate::metrics::Counter,
}

pub struct State {
    pub config: ApiConfig,
    pub summarizer: Arc<Summarizer>,
    pub counters: Counters,
}

/// The demo page. Everything it needs besides the api itself is embedded
/// in the binary.
#[allow(clippy::unused_async)]
pub async fn index() -> impl IntoResponse {
    Html(include_str!("../../../../frontend/index.html"))
}

#[allow(clippy::unused_async)]
pub async fn favicon() -> impl IntoResponse {
    Response::builder()
        .status(StatusCode::OK)
        .body(Body::from(
            include_bytes!("../../../../frontend/static/favicon.ico").to_vec(),
        ))
        .unwrap()
}

fn build_router(state: Arc<State>) -> Router {
    let mut summarize = Router::new()
        .route("/beta/api/summarize", post(summarize::route))
        .layer(cors_layer());

    if let Some(limit) = state.config.max_concurrent_summaries {
        summarize = summarize.layer(ConcurrencyLimitLayer::new(limit));
    }

    Router::new()
        .merge(summarize)
        .route("/", get(index))
        .route("/favicon.ico", get(favicon))
        .layer(CompressionLayer::new())
        .merge(docs::router())
        .nest(
            "/beta",
            Router::new()
                .route("/api/summarize/widget", get(summarize::widget))
                .layer(cors_layer()),
        )
        .with_state(state)
}

pub fn router(config: &ApiConfig, counters: Counters) -> Router {
    let provider = T5Provider::new(&config.summarizer.model_path);
    let summarizer = Arc::new(Summarizer::new(Box::new(provider)));

    let state = Arc::new(State {
        config: config.clone(),
        summarizer,
        counters,
    });

    build_router(state)
}

/// Enables CORS for development where the API and frontend are on
/// different hosts.
fn cors_layer() -> tower_http::cors::CorsLayer {
    #[cfg(feature = "cors")]
    return tower_http::cors::CorsLayer::permissive();
    #[cfg(not(feature = "cors"))]
    tower_http::cors::CorsLayer::new()
}

pub fn metrics_router(registry: crate::metrics::PrometheusRegistry) -> Router {
    Router::new()
        .route("/metrics", get(metrics::route))
        .with_state(Arc::new(registry))
}

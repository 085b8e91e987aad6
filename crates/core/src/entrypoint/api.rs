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

use std::future::IntoFuture;

use anyhow::Result;
use tokio::net::TcpListener;

use crate::{
    api::{metrics_router, router, Counters},
    config::ApiConfig,
    metrics::Label,
};

pub async fn run(config: ApiConfig) -> Result<()> {
    let summarize_counter_success = crate::metrics::Counter::default();
    let summarize_counter_fail = crate::metrics::Counter::default();

    let mut registry = crate::metrics::PrometheusRegistry::default();

    let group = registry
        .new_group(
            "summarize_requests".to_string(),
            Some("Total number of incoming summarize requests.".to_string()),
        )
        .unwrap();

    group.register(
        summarize_counter_success.clone(),
        vec![Label {
            key: "status".to_string(),
            val: "success".to_string(),
        }],
    );
    group.register(
        summarize_counter_fail.clone(),
        vec![Label {
            key: "status".to_string(),
            val: "fail".to_string(),
        }],
    );

    let counters = Counters {
        summarize_counter_success,
        summarize_counter_fail,
    };

    let app = router(&config, counters);
    let metrics_app = metrics_router(registry);

    let addr = config.host;
    tracing::info!("api server listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    let server = axum::serve(listener, app.into_make_service());

    let addr = config.prometheus_host;
    tracing::info!("prometheus exporter listening on {}", addr);
    let metrics_listener = TcpListener::bind(&addr).await?;
    let metrics_server = axum::serve(metrics_listener, metrics_app.into_make_service());

    tokio::try_join!(server.into_future(), metrics_server.into_future())?;

    Ok(())
}

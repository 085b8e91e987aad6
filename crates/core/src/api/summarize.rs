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

use crate::config::defaults;
use http::StatusCode;
use std::sync::Arc;
use utoipa::ToSchema;

use axum::Json;
use axum_macros::debug_handler;

use crate::summarizer::{self, Displayed, SummaryRequest};

use super::State;

use axum::{extract, response::IntoResponse};

/// Default text shown in the demo page so a first-time visitor has
/// something to summarize right away.
pub const SAMPLE_TEXT: &str = "Transformers use self-attention to understand relationships between words. This lets them capture long-range context and generate coherent outputs. They power modern NLP tasks like chatbots, translation, and summarization.";

#[derive(Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(title = "SummarizeQuery", example = json!({"text": "The quick brown fox jumps over the lazy dog.", "maxLength": 60, "minLength": 15}))]
pub struct ApiSummarizeQuery {
    pub text: String,

    #[serde(default = "defaults::Summarize::max_length")]
    pub max_length: usize,

    #[serde(default = "defaults::Summarize::min_length")]
    pub min_length: usize,
}

impl From<ApiSummarizeQuery> for SummaryRequest {
    fn from(query: ApiSummarizeQuery) -> Self {
        SummaryRequest {
            text: query.text,
            max_length: query.max_length,
            min_length: query.min_length,
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ApiSummarizeResult {
    #[serde(rename_all = "camelCase")]
    Summary {
        original_text: String,
        summary_text: String,
    },
    Warning {
        message: String,
    },
    Error {
        message: String,
    },
}

impl From<Displayed> for ApiSummarizeResult {
    fn from(displayed: Displayed) -> Self {
        match displayed {
            Displayed::Summary {
                original_text,
                summary_text,
            } => ApiSummarizeResult::Summary {
                original_text,
                summary_text,
            },
            Displayed::Warning { message } => ApiSummarizeResult::Warning { message },
            Displayed::Error { message } => ApiSummarizeResult::Error { message },
        }
    }
}

#[debug_handler]
#[utoipa::path(
    post,
    path = "/beta/api/summarize",
    request_body(content = ApiSummarizeQuery),
    responses(
        (status = 200, description = "The summary, or a warning or error message to display instead", body = ApiSummarizeResult),
    )
)]
pub async fn route(
    extract::State(state): extract::State<Arc<State>>,
    extract::Json(query): extract::Json<ApiSummarizeQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let request = SummaryRequest::from(query);

    // Generation is compute-bound, keep it off the async runtime.
    let summarizer = Arc::clone(&state.summarizer);
    let displayed = tokio::task::spawn_blocking(move || summarizer::submit(&summarizer, &request))
        .await
        .map_err(|err| {
            tracing::error!("{:?}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    match &displayed {
        Displayed::Summary { .. } => state.counters.summarize_counter_success.inc(),
        Displayed::Error { .. } => state.counters.summarize_counter_fail.inc(),
        Displayed::Warning { .. } => {}
    }

    Ok(Json(ApiSummarizeResult::from(displayed)))
}

#[derive(Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoundedField {
    pub label: String,
    pub min: usize,
    pub max: usize,
    pub default: usize,
    pub step: usize,
}

/// The form contract for the demo page. Served as json so any client
/// renders the exact same widgets.
#[derive(Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(title = "SummarizeWidget")]
pub struct ApiSummarizeWidget {
    pub title: String,
    pub text_label: String,
    pub sample_text: String,
    pub max_length: BoundedField,
    pub min_length: BoundedField,
    pub trigger_label: String,
    pub model: String,
}

impl ApiSummarizeWidget {
    pub fn new() -> Self {
        Self {
            title: "Text Summarizer".to_string(),
            text_label: "Enter Text to Summarize".to_string(),
            sample_text: SAMPLE_TEXT.to_string(),
            max_length: BoundedField {
                label: "Max Summary Length".to_string(),
                min: 10,
                max: 200,
                default: defaults::Summarize::max_length(),
                step: 5,
            },
            min_length: BoundedField {
                label: "Min Summary Length".to_string(),
                min: 5,
                max: 100,
                default: defaults::Summarize::min_length(),
                step: 5,
            },
            trigger_label: "Summarize".to_string(),
            model: "t5-small".to_string(),
        }
    }
}

impl Default for ApiSummarizeWidget {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::unused_async)]
#[debug_handler]
#[utoipa::path(
    get,
    path = "/beta/api/summarize/widget",
    responses(
        (status = 200, description = "Form contract for the summarize widget", body = ApiSummarizeWidget),
    )
)]
pub async fn widget() -> impl IntoResponse {
    Json(ApiSummarizeWidget::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_serialization() {
        let res = ApiSummarizeResult::Summary {
            original_text: "input".to_string(),
            summary_text: "output".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&res).unwrap(),
            serde_json::json!({
                "type": "summary",
                "originalText": "input",
                "summaryText": "output",
            })
        );

        let res = ApiSummarizeResult::Warning {
            message: "msg".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&res).unwrap(),
            serde_json::json!({
                "type": "warning",
                "message": "msg",
            })
        );
    }

    #[test]
    fn query_length_defaults() {
        let query: ApiSummarizeQuery = serde_json::from_str(r#"{"text": "some text"}"#).unwrap();

        assert_eq!(query.max_length, 60);
        assert_eq!(query.min_length, 15);
    }

    #[test]
    fn query_accepts_inverted_bounds() {
        let query: ApiSummarizeQuery =
            serde_json::from_str(r#"{"text": "some text", "maxLength": 10, "minLength": 100}"#)
                .unwrap();

        assert_eq!(query.max_length, 10);
        assert_eq!(query.min_length, 100);
    }
}

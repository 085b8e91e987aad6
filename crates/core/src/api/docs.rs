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

use super::summarize;
use axum::Router;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            summarize::route,
            summarize::widget,
        ),
        components(
            schemas(
                summarize::ApiSummarizeQuery,
                summarize::ApiSummarizeResult,
                summarize::ApiSummarizeWidget,
                summarize::BoundedField,
            ),
        ),
        modifiers(&ApiModifier),
        tags(
            (name = "abridge"),
        )
    )]
struct ApiDoc;

struct ApiModifier;

impl Modify for ApiModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.description = Some(
            "Abridge is an open source text summarization service. The API is totally free while in beta.
The API might also change quite a bit during the beta period, but we will try to keep it as stable as possible. We look forward to see what you will build!

Summaries are generated by a neural model, so always review them before relying on the output.".to_string(),
        );
    }
}

pub fn router<S: Clone + Send + Sync + 'static>() -> impl Into<Router<S>> {
    SwaggerUi::new("/beta/api/docs/swagger")
        .url("/beta/api/docs/openapi.json", ApiDoc::openapi())
        .config(
            utoipa_swagger_ui::Config::default()
                .use_base_layout()
                .default_models_expand_depth(0),
        )
}

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

pub mod defaults;

use std::net::SocketAddr;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct SummarizerConfig {
    /// Directory containing `config.json`, `tokenizer.json` and
    /// `model.safetensors` for the summarization model.
    pub model_path: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "defaults::Api::host")]
    pub host: SocketAddr,

    #[serde(default = "defaults::Api::prometheus_host")]
    pub prometheus_host: SocketAddr,

    pub summarizer: SummarizerConfig,

    #[serde(default = "defaults::Api::max_concurrent_summaries")]
    pub max_concurrent_summaries: Option<usize>,
}

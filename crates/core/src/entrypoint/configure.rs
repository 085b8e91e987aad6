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

use tokio::fs::File;
use tokio::io;
use tokio_stream::StreamExt;
use tracing::{debug, info};

use crate::models::t5::T5Model;
use crate::summarizer::{GenerationConfig, SummarizationModel};
use crate::Result;
use std::fs;
use std::path::Path;

const DATA_PATH: &str = "data";
const MODEL_REPO: &str = "https://huggingface.co/t5-small/resolve/main";

fn download_files() {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(async {
            for name in ["config.json", "tokenizer.json", "model.safetensors"] {
                let path = Path::new(DATA_PATH).join("summarizer").join(name);

                if path.exists() {
                    info!("Skipping {}", name);
                    continue;
                }

                info!("Downloading {}", name);
                let body = reqwest::get(format!("{MODEL_REPO}/{name}")).await.unwrap();

                let progress = body.content_length().map(indicatif::ProgressBar::new);

                let mut file = File::create(path).await.unwrap();
                let mut bytes = body.bytes_stream();

                while let Some(item) = bytes.next().await {
                    let bytes = item.unwrap();
                    if let Some(progress) = &progress {
                        progress.inc(bytes.len() as _);
                    }
                    io::copy(&mut bytes.as_ref(), &mut file).await.unwrap();
                }

                if let Some(progress) = progress {
                    progress.finish_and_clear();
                }
            }
        });
}

fn verify_model() -> Result<()> {
    debug!("Verifying model files");
    let model_path = Path::new(DATA_PATH).join("summarizer");

    let model = T5Model::open(&model_path)?;

    let config = GenerationConfig {
        max_length: 20,
        min_length: 5,
        deterministic: true,
    };
    let summary = model.summarize(
        "Abridge turns long passages of text into short summaries using a pretrained t5-small model.",
        &config,
    )?;

    info!("Model ready: {}", summary);

    Ok(())
}

pub fn run(skip_download: bool) -> Result<()> {
    let p = Path::new(DATA_PATH).join("summarizer");

    if !p.exists() {
        fs::create_dir_all(&p)?;
    }

    if !skip_download {
        download_files();
    }

    verify_model()?;

    Ok(())
}

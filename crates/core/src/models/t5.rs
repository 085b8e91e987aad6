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

use anyhow::anyhow;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::t5;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{
    summarizer::{GenerationConfig, ModelProvider, SummarizationModel},
    Result,
};
use tokenizers::TruncationParams;

/// T5 is trained with task prefixes. Without this prefix the model
/// paraphrases instead of summarizing.
const TASK_PREFIX: &str = "summarize: ";

/// t5-small has a 512 token context. Longer inputs are truncated
/// before encoding.
const TRUNCATE_INPUT: usize = 512;

const REPEAT_PENALTY: f32 = 1.1;
const REPEAT_LAST_N: usize = 64;

pub struct T5Model {
    model: Mutex<t5::T5ForConditionalGeneration>,
    tokenizer: tokenizers::Tokenizer,
    config: t5::Config,
    device: Device,
}

impl T5Model {
    pub fn open<P: AsRef<Path>>(folder: P) -> Result<Self> {
        let device = Device::Cpu;

        let truncation = TruncationParams {
            max_length: TRUNCATE_INPUT,
            ..Default::default()
        };

        let mut tokenizer =
            tokenizers::Tokenizer::from_file(folder.as_ref().join("tokenizer.json"))
                .map_err(|e| anyhow!(e))?;
        tokenizer.with_truncation(Some(truncation));

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(
                &[folder.as_ref().join("model.safetensors")],
                DType::F32,
                &device,
            )?
        };
        let config = std::fs::read_to_string(folder.as_ref().join("config.json"))?;
        let config: t5::Config = serde_json::from_str(&config)?;

        let model = t5::T5ForConditionalGeneration::load(vb, &config)?;

        Ok(Self {
            model: Mutex::new(model),
            tokenizer,
            config,
            device,
        })
    }

    fn generate(&self, text: &str, config: &GenerationConfig) -> Result<String> {
        let input = self
            .tokenizer
            .encode(format!("{TASK_PREFIX}{text}"), true)
            .map_err(|e| anyhow!(e))?;
        let input_ids = Tensor::new(input.get_ids(), &self.device)?.unsqueeze(0)?;

        let mut model = self.model.lock().unwrap_or_else(|e| e.into_inner());
        model.clear_kv_cache();

        let encoder_output = model.encode(&input_ids)?;

        // `do_sample=false` equivalent. With no temperature the
        // processor reduces to argmax and the seed is unused.
        let temperature = if config.deterministic {
            None
        } else {
            Some(0.8)
        };
        let mut logits_processor = LogitsProcessor::new(299792458, temperature, None);

        let start_token = self
            .config
            .decoder_start_token_id
            .unwrap_or(self.config.pad_token_id) as u32;
        let mut output_ids = vec![start_token];

        // The summary gets at most `max_length` tokens. Eos is
        // suppressed for the first `min_length` steps, so the bound
        // from `max_length` wins if the bounds are inverted.
        for index in 0..config.max_length {
            let decoder_ids = if index == 0 || !self.config.use_cache {
                Tensor::new(output_ids.as_slice(), &self.device)?.unsqueeze(0)?
            } else {
                let last_token = *output_ids.last().unwrap_or(&start_token);
                Tensor::new(&[last_token], &self.device)?.unsqueeze(0)?
            };

            let logits = model.decode(&decoder_ids, &encoder_output)?.squeeze(0)?;

            let start_at = output_ids.len().saturating_sub(REPEAT_LAST_N);
            let logits = candle_transformers::utils::apply_repeat_penalty(
                &logits,
                REPEAT_PENALTY,
                &output_ids[start_at..],
            )?;

            let logits = if index < config.min_length {
                let mut logits = logits.to_vec1::<f32>()?;
                logits[self.config.eos_token_id] = f32::NEG_INFINITY;
                Tensor::new(logits.as_slice(), &self.device)?
            } else {
                logits
            };

            let next_token = logits_processor.sample(&logits)?;

            if next_token as usize == self.config.eos_token_id {
                break;
            }

            output_ids.push(next_token);
        }

        let summary = self
            .tokenizer
            .decode(&output_ids, true)
            .map_err(|e| anyhow!(e))?;

        Ok(summary.trim().to_string())
    }
}

impl SummarizationModel for T5Model {
    fn summarize(&self, text: &str, config: &GenerationConfig) -> anyhow::Result<String> {
        self.generate(text, config)
    }
}

/// Opens the t5 weights from a folder on first use. Construction is
/// cheap so an api server can start before the model is downloaded.
pub struct T5Provider {
    path: PathBuf,
}

impl T5Provider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ModelProvider for T5Provider {
    fn load(&self) -> anyhow::Result<Box<dyn SummarizationModel>> {
        Ok(Box::new(T5Model::open(&self.path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // needs the t5-small weights from `abridge configure` in ./data
    #[test]
    #[ignore]
    fn summarizes_with_real_weights() {
        let model = T5Model::open("../../data/summarizer").unwrap();

        let config = GenerationConfig {
            max_length: 60,
            min_length: 15,
            deterministic: true,
        };

        let summary = model
            .summarize(
                "Transformers use self-attention to understand relationships between words. \
                 This lets them capture long-range context and generate coherent outputs. \
                 They power modern NLP tasks like chatbots, translation, and summarization.",
                &config,
            )
            .unwrap();

        assert!(!summary.is_empty());
    }
}

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

use once_cell::sync::OnceCell;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to load summarization model: {0}")]
    ModelLoad(anyhow::Error),

    #[error("Please enter some text to summarize.")]
    EmptyInput,

    #[error("An error occurred during summarization: {0}")]
    Summarization(anyhow::Error),
}

type Result<T> = std::result::Result<T, Error>;

/// Decoding parameters forwarded to the model backend. The bounds are
/// passed through exactly as submitted; whether an inverted pair is
/// satisfiable is up to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    pub max_length: usize,
    pub min_length: usize,
    pub deterministic: bool,
}

/// A ready text-to-summary capability.
pub trait SummarizationModel: Send + Sync {
    fn summarize(&self, text: &str, config: &GenerationConfig) -> anyhow::Result<String>;
}

/// Performs the actual model load. Called at most once per successful
/// load; tests substitute a fake.
pub trait ModelProvider: Send + Sync {
    fn load(&self) -> anyhow::Result<Box<dyn SummarizationModel>>;
}

#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub text: String,
    pub max_length: usize,
    pub min_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub original_text: String,
    pub summary_text: String,
}

/// Shell around a lazily loaded summarization model.
///
/// The model is loaded on the first request and cached for the lifetime
/// of the process. A failed load leaves the cache empty, so the next
/// request triggers a fresh attempt.
pub struct Summarizer {
    provider: Box<dyn ModelProvider>,
    model: OnceCell<Box<dyn SummarizationModel>>,
}

impl Summarizer {
    pub fn new(provider: Box<dyn ModelProvider>) -> Self {
        Self {
            provider,
            model: OnceCell::new(),
        }
    }

    fn model(&self) -> Result<&dyn SummarizationModel> {
        let model = self
            .model
            .get_or_try_init(|| self.provider.load())
            .map_err(Error::ModelLoad)?;

        Ok(model.as_ref())
    }

    pub fn summarize(&self, request: &SummaryRequest) -> Result<Summary> {
        let model = self.model()?;

        let config = GenerationConfig {
            max_length: request.max_length,
            min_length: request.min_length,
            deterministic: true,
        };

        let summary_text = model
            .summarize(&request.text, &config)
            .map_err(Error::Summarization)?;

        Ok(Summary {
            original_text: request.text.clone(),
            summary_text,
        })
    }
}

/// Outcome of a single submit action, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Displayed {
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

/// Runs one submit action. Empty or whitespace-only text resolves to a
/// warning without touching the model; any other failure resolves to an
/// error message. Never panics.
pub fn submit(summarizer: &Summarizer, request: &SummaryRequest) -> Displayed {
    if request.text.trim().is_empty() {
        return Displayed::Warning {
            message: Error::EmptyInput.to_string(),
        };
    }

    match summarizer.summarize(request) {
        Ok(summary) => Displayed::Summary {
            original_text: summary.original_text,
            summary_text: summary.summary_text,
        },
        Err(err) => {
            tracing::error!("Summarization failed: {}", err);
            Displayed::Error {
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use proptest::prelude::*;

    use super::*;

    #[derive(Default, Clone)]
    struct Observed {
        loads: Arc<AtomicUsize>,
        requests: Arc<Mutex<Vec<(String, GenerationConfig)>>>,
    }

    struct FakeModel {
        observed: Observed,
        fail_with: Option<String>,
    }

    impl SummarizationModel for FakeModel {
        fn summarize(&self, text: &str, config: &GenerationConfig) -> anyhow::Result<String> {
            self.observed
                .requests
                .lock()
                .unwrap()
                .push((text.to_string(), config.clone()));

            match &self.fail_with {
                Some(msg) => Err(anyhow::anyhow!("{msg}")),
                None => Ok("a short summary".to_string()),
            }
        }
    }

    struct FakeProvider {
        observed: Observed,
        fail_with: Option<String>,
    }

    impl ModelProvider for FakeProvider {
        fn load(&self) -> anyhow::Result<Box<dyn SummarizationModel>> {
            self.observed.loads.fetch_add(1, Ordering::SeqCst);

            Ok(Box::new(FakeModel {
                observed: self.observed.clone(),
                fail_with: self.fail_with.clone(),
            }))
        }
    }

    fn fake_summarizer(fail_with: Option<String>) -> (Summarizer, Observed) {
        let observed = Observed::default();
        let provider = FakeProvider {
            observed: observed.clone(),
            fail_with,
        };

        (Summarizer::new(Box::new(provider)), observed)
    }

    fn request(text: &str, max_length: usize, min_length: usize) -> SummaryRequest {
        SummaryRequest {
            text: text.to_string(),
            max_length,
            min_length,
        }
    }

    #[test]
    fn summarizes_non_empty_text() {
        let (summarizer, _) = fake_summarizer(None);

        let res = submit(
            &summarizer,
            &request("The quick brown fox jumps over the lazy dog.", 60, 15),
        );

        match res {
            Displayed::Summary {
                original_text,
                summary_text,
            } => {
                assert_eq!(original_text, "The quick brown fox jumps over the lazy dog.");
                assert!(!summary_text.is_empty());
            }
            other => panic!("expected summary, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_warns_without_invoking_model() {
        let (summarizer, observed) = fake_summarizer(None);

        for text in ["", "   ", " \n\t "] {
            let res = submit(&summarizer, &request(text, 60, 15));

            assert_eq!(
                res,
                Displayed::Warning {
                    message: "Please enter some text to summarize.".to_string()
                }
            );
        }

        assert!(observed.requests.lock().unwrap().is_empty());
        assert_eq!(observed.loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn provider_failure_becomes_error() {
        let (summarizer, _) = fake_summarizer(Some("model ran oom".to_string()));

        let res = submit(&summarizer, &request("some text", 60, 15));

        match res {
            Displayed::Error { message } => {
                assert!(message.contains("An error occurred during summarization"));
                assert!(message.contains("oom"));
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn model_loads_once() {
        let (summarizer, observed) = fake_summarizer(None);

        submit(&summarizer, &request("first", 60, 15));
        submit(&summarizer, &request("second", 60, 15));

        assert_eq!(observed.loads.load(Ordering::SeqCst), 1);
        assert_eq!(observed.requests.lock().unwrap().len(), 2);
    }

    struct FlakyProvider {
        observed: Observed,
    }

    impl ModelProvider for FlakyProvider {
        fn load(&self) -> anyhow::Result<Box<dyn SummarizationModel>> {
            let attempt = self.observed.loads.fetch_add(1, Ordering::SeqCst);

            if attempt == 0 {
                anyhow::bail!("weights missing");
            }

            Ok(Box::new(FakeModel {
                observed: self.observed.clone(),
                fail_with: None,
            }))
        }
    }

    #[test]
    fn failed_load_retried_on_next_request() {
        let observed = Observed::default();
        let summarizer = Summarizer::new(Box::new(FlakyProvider {
            observed: observed.clone(),
        }));

        let res = submit(&summarizer, &request("some text", 60, 15));
        match res {
            Displayed::Error { message } => {
                assert!(message.contains("Failed to load summarization model"));
                assert!(message.contains("weights missing"));
            }
            other => panic!("expected error, got {other:?}"),
        }

        let res = submit(&summarizer, &request("some text", 60, 15));
        assert!(matches!(res, Displayed::Summary { .. }));

        assert_eq!(observed.loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn inverted_bounds_pass_through_unmodified() {
        let (summarizer, observed) = fake_summarizer(None);

        submit(&summarizer, &request("some text", 10, 100));

        let requests = observed.requests.lock().unwrap();
        assert_eq!(
            requests[0].1,
            GenerationConfig {
                max_length: 10,
                min_length: 100,
                deterministic: true,
            }
        );
    }

    proptest! {
        #[test]
        fn bounds_forwarded_unmodified(max_length in 10usize..=200, min_length in 5usize..=100) {
            let (summarizer, observed) = fake_summarizer(None);

            submit(&summarizer, &request("some text", max_length, min_length));

            let requests = observed.requests.lock().unwrap();
            prop_assert_eq!(requests[0].1.max_length, max_length);
            prop_assert_eq!(requests[0].1.min_length, min_length);
            prop_assert!(requests[0].1.deterministic);
        }
    }
}

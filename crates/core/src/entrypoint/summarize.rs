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

use crate::models::t5::T5Provider;
use crate::summarizer::{self, Displayed, Summarizer, SummaryRequest};
use crate::Result;

/// Summarizes a single text from the command line. Goes through the
/// same submission path as the http api.
pub fn run(model_path: String, text: String, max_length: usize, min_length: usize) -> Result<()> {
    let summarizer = Summarizer::new(Box::new(T5Provider::new(&model_path)));

    let request = SummaryRequest {
        text,
        max_length,
        min_length,
    };

    match summarizer::submit(&summarizer, &request) {
        Displayed::Summary { summary_text, .. } => println!("{summary_text}"),
        Displayed::Warning { message } => eprintln!("{message}"),
        Displayed::Error { message } => anyhow::bail!(message),
    }

    Ok(())
}

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

use std::net::SocketAddr;

pub struct Api;

impl Api {
    pub fn host() -> SocketAddr {
        "0.0.0.0:3000".parse().unwrap()
    }

    pub fn prometheus_host() -> SocketAddr {
        "0.0.0.0:3001".parse().unwrap()
    }

    pub fn max_concurrent_summaries() -> Option<usize> {
        None
    }
}

pub struct Summarize;

impl Summarize {
    pub fn max_length() -> usize {
        60
    }

    pub fn min_length() -> usize {
        15
    }
}

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

use std::{
    collections::BTreeMap,
    fmt::Display,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{SystemTime, UNIX_EPOCH},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Group already exists")]
    GroupExists,
}

/// Monotonically increasing counter. Clones share the underlying value,
/// so the same counter can be incremented from request handlers and
/// rendered by the exposition endpoint.
#[derive(Default, Clone)]
pub struct Counter(Arc<AtomicU64>);

impl Counter {
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn value(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub enum PrometheusMetric {
    Counter(Counter),
}

impl PrometheusMetric {
    fn prom_type(&self) -> &'static str {
        match self {
            PrometheusMetric::Counter(_) => "counter",
        }
    }

    fn prom_val(&self) -> String {
        match self {
            PrometheusMetric::Counter(counter) => counter.value().to_string(),
        }
    }
}

impl From<Counter> for PrometheusMetric {
    fn from(counter: Counter) -> Self {
        Self::Counter(counter)
    }
}

pub struct Label {
    pub key: String,
    pub val: String,
}

struct LabelledMetric {
    metric: PrometheusMetric,
    labels: Vec<Label>,
}

impl Display for LabelledMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.labels.is_empty() {
            f.write_str("{")?;

            for (i, label) in self.labels.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }

                write!(f, "{}=\"{}\"", label.key, label.val)?;
            }

            f.write_str("}")?;
        }

        write!(f, " {}", self.metric.prom_val())
    }
}

pub struct PrometheusGroup {
    metrics: Vec<LabelledMetric>,
    help: Option<String>,
    forced_timestamp: Option<u128>,
    name: String,
}

impl PrometheusGroup {
    pub fn register<M: Into<PrometheusMetric>>(&mut self, metric: M, labels: Vec<Label>) {
        self.metrics.push(LabelledMetric {
            metric: metric.into(),
            labels,
        });
    }
}

impl Display for PrometheusGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(help) = self.help.as_ref() {
            writeln!(f, "# HELP {} {}", self.name, help)?;
        }

        let timestamp = match self.forced_timestamp {
            Some(timestamp) => timestamp,
            None => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_millis(),
        };

        if let Some(first) = self.metrics.first() {
            write!(f, "# TYPE {} {}", self.name, first.metric.prom_type())?;
        }

        for m in &self.metrics {
            write!(f, "\n{}{} {}", self.name, m, timestamp)?;
        }

        Ok(())
    }
}

/// All registered metric groups, rendered in the Prometheus text format
/// by the `Display` impl.
#[derive(Default)]
pub struct PrometheusRegistry {
    groups: BTreeMap<String, PrometheusGroup>,
}

impl PrometheusRegistry {
    pub fn new_group(
        &mut self,
        name: String,
        help: Option<String>,
    ) -> Result<&mut PrometheusGroup, Error> {
        if self.groups.contains_key(&name) {
            return Err(Error::GroupExists);
        }

        self.groups.insert(
            name.clone(),
            PrometheusGroup {
                metrics: Vec::new(),
                help,
                forced_timestamp: None,
                name: name.clone(),
            },
        );

        Ok(self.groups.get_mut(&name).unwrap())
    }
}

impl Display for PrometheusRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, group) in self.groups.values().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }

            writeln!(f, "{group}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    #[test]
    fn counter() {
        let counter = Counter::default();
        let mut registry = PrometheusRegistry::default();

        let group = registry
            .new_group(
                "test_counter".to_string(),
                Some("Test counter help.".to_string()),
            )
            .unwrap();
        group.register(
            counter.clone(),
            vec![Label {
                key: "test_label".to_string(),
                val: "123".to_string(),
            }],
        );

        let t = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis();

        for group in registry.groups.values_mut() {
            group.forced_timestamp = Some(t);
        }

        let expected = format!(
            r##"# HELP test_counter Test counter help.
# TYPE test_counter counter
test_counter{{test_label="123"}} 0 {t}
"##
        );
        assert_eq!(format!("{registry}"), expected);

        counter.inc();
        counter.inc();

        let expected = format!(
            r##"# HELP test_counter Test counter help.
# TYPE test_counter counter
test_counter{{test_label="123"}} 2 {t}
"##
        );
        assert_eq!(format!("{registry}"), expected);
        assert_eq!(counter.value(), 2);
    }
}

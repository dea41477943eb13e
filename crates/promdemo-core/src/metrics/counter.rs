//! Labeled monotonic counter.
//!
//! The label schema is fixed at construction. Series are keyed by label
//! values in schema order, so callers may pass label pairs in any order.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use super::{validate_label_name, validate_metric_name, MetricFamily, MetricKind, Sample, Value};
use crate::error::{DemoError, Result};

#[derive(Debug)]
pub struct CounterVec {
    name: String,
    help: String,
    label_names: Vec<String>,
    map: DashMap<Vec<String>, AtomicU64>,
}

impl CounterVec {
    /// Declare a counter family. Zero-label counters expose their single series at 0 right away.
    pub fn new(name: &str, help: &str, label_names: &[&str]) -> Result<Self> {
        validate_metric_name(name)?;
        for (i, l) in label_names.iter().enumerate() {
            validate_label_name(l)?;
            if label_names[..i].contains(l) {
                return Err(DemoError::InvalidName(format!("duplicate label {l:?} on {name}")));
            }
        }

        let map = DashMap::new();
        if label_names.is_empty() {
            map.insert(Vec::new(), AtomicU64::new(0));
        }

        Ok(Self {
            name: name.to_string(),
            help: help.to_string(),
            label_names: label_names.iter().map(|s| s.to_string()).collect(),
            map,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) -> Result<()> {
        self.add(labels, 1)
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) -> Result<()> {
        let key = self.key_for(labels)?;
        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
        Ok(())
    }

    /// Current value of one series; `None` if it was never touched.
    pub fn get(&self, labels: &[(&str, &str)]) -> Result<Option<u64>> {
        let key = self.key_for(labels)?;
        Ok(self.map.get(&key).map(|c| c.load(Ordering::Relaxed)))
    }

    /// Snapshot sorted by label values.
    pub fn snapshot(&self) -> MetricFamily {
        let mut rows: Vec<(Vec<String>, u64)> = self.map.iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort();

        let samples = rows.into_iter()
            .map(|(values, v)| Sample {
                labels: self.label_names.iter().cloned().zip(values).collect(),
                value: Value::Int(v),
            })
            .collect();

        MetricFamily {
            name: self.name.clone(),
            help: self.help.clone(),
            kind: MetricKind::Counter,
            samples,
        }
    }

    /// Map caller labels onto schema order, rejecting anything outside the schema.
    fn key_for(&self, labels: &[(&str, &str)]) -> Result<Vec<String>> {
        let mismatch = || DemoError::LabelMismatch {
            metric: self.name.clone(),
            expected: self.label_names.join(","),
            got: labels.iter().map(|(k, _)| *k).collect::<Vec<_>>().join(","),
        };

        if labels.len() != self.label_names.len() {
            return Err(mismatch());
        }
        let mut key = Vec::with_capacity(self.label_names.len());
        for name in &self.label_names {
            let mut found = labels.iter().filter(|(k, _)| *k == name.as_str());
            match (found.next(), found.next()) {
                (Some((_, v)), None) => key.push(v.to_string()),
                _ => return Err(mismatch()),
            }
        }
        Ok(key)
    }
}

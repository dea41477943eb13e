//! Process-wide metrics registry.
//!
//! An explicitly owned instance (no global singleton): the server builds one
//! at startup and shares it through its application state, and every test
//! builds its own. Counter families and collectors are keyed by name; render
//! emits families sorted by name so a scrape is deterministic within a process.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{
    exposition, validate_label_name, validate_metric_name, Collector, CounterVec, MetricFamily,
    ProcessCollector,
};
use crate::error::{DemoError, Result};

#[derive(Default)]
pub struct Registry {
    counters: DashMap<String, Arc<CounterVec>>,
    collectors: DashMap<String, Arc<dyn Collector>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a counter family with a fixed label schema and return its handle.
    ///
    /// Names already emitted by a registered collector are refused as well.
    pub fn register_counter(&self, name: &str, help: &str, label_names: &[&str]) -> Result<Arc<CounterVec>> {
        let counter = Arc::new(CounterVec::new(name, help, label_names)?);
        if self.collected_names().contains(name) {
            return Err(DemoError::AlreadyRegistered(format!("metric {name}")));
        }
        match self.counters.entry(name.to_string()) {
            Entry::Occupied(_) => {
                Err(DemoError::AlreadyRegistered(format!("metric {name}")))
            }
            Entry::Vacant(v) => {
                v.insert(Arc::clone(&counter));
                tracing::debug!(metric = %name, labels = ?label_names, "counter registered");
                Ok(counter)
            }
        }
    }

    /// Handle to a registered counter.
    pub fn counter(&self, name: &str) -> Option<Arc<CounterVec>> {
        self.counters.get(name).map(|c| Arc::clone(c.value()))
    }

    /// Add 1 to the series `labels` of counter `name`.
    pub fn increment(&self, name: &str, labels: &[(&str, &str)]) -> Result<()> {
        let counter = self
            .counter(name)
            .ok_or_else(|| DemoError::UnknownMetric(name.to_string()))?;
        counter.inc(labels)
    }

    /// Attach a scrape-time collector. Names must be unique.
    pub fn register_collector(&self, collector: Arc<dyn Collector>) -> Result<()> {
        let name = collector.name().to_string();
        match self.collectors.entry(name) {
            Entry::Occupied(o) => {
                Err(DemoError::AlreadyRegistered(format!("collector {}", o.key())))
            }
            Entry::Vacant(v) => {
                tracing::debug!(collector = %v.key(), "collector registered");
                v.insert(collector);
                Ok(())
            }
        }
    }

    /// Register the default process collector. Calling it again is a no-op.
    pub fn collect_default_process_metrics(&self) -> Result<()> {
        if let Entry::Vacant(v) = self.collectors.entry(ProcessCollector::NAME.to_string()) {
            v.insert(Arc::new(ProcessCollector::new()));
            tracing::debug!(collector = ProcessCollector::NAME, "collector registered");
        }
        Ok(())
    }

    /// Family names the collectors currently emit. Collectors that fail here are
    /// skipped; the same failure surfaces again on the next render.
    fn collected_names(&self) -> HashSet<String> {
        self.collector_handles()
            .iter()
            .filter_map(|c| c.collect().ok())
            .flatten()
            .map(|f| f.name)
            .collect()
    }

    // Clone handles out first so no shard lock is held while collectors run.
    fn collector_handles(&self) -> Vec<Arc<dyn Collector>> {
        self.collectors.iter().map(|c| Arc::clone(c.value())).collect()
    }

    /// Snapshot every family, sorted by metric name.
    ///
    /// Collected families must carry valid names and must not reuse a name
    /// already taken by a counter or another collector.
    pub fn gather(&self) -> Result<Vec<MetricFamily>> {
        let mut families: Vec<MetricFamily> = self.counters.iter()
            .map(|c| c.value().snapshot())
            .collect();
        let mut seen: HashSet<String> = families.iter().map(|f| f.name.clone()).collect();

        for c in self.collector_handles() {
            for family in c.collect()? {
                check_collected(c.name(), &family)?;
                if !seen.insert(family.name.clone()) {
                    return Err(DemoError::AlreadyRegistered(format!(
                        "metric {} (emitted by collector {})",
                        family.name,
                        c.name()
                    )));
                }
                families.push(family);
            }
        }

        families.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(families)
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self) -> Result<String> {
        Ok(exposition::encode(&self.gather()?))
    }
}

fn check_collected(collector: &str, family: &MetricFamily) -> Result<()> {
    let invalid = |e: DemoError| DemoError::Collect {
        collector: collector.to_string(),
        reason: e.to_string(),
    };
    validate_metric_name(&family.name).map_err(invalid)?;
    for s in &family.samples {
        for (k, _) in &s.labels {
            validate_label_name(k).map_err(invalid)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    struct Broken;

    impl Collector for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn collect(&self) -> Result<Vec<MetricFamily>> {
            Err(DemoError::Collect { collector: "broken".into(), reason: "sensor offline".into() })
        }
    }

    #[test]
    fn increment_by_name() {
        let reg = Registry::new();
        reg.register_counter("http_requests_total", "Total number of HTTP requests", &["method"]).unwrap();
        reg.increment("http_requests_total", &[("method", "GET")]).unwrap();
        reg.increment("http_requests_total", &[("method", "GET")]).unwrap();
        let c = reg.counter("http_requests_total").unwrap();
        assert_eq!(c.get(&[("method", "GET")]).unwrap(), Some(2));
    }

    #[test]
    fn unknown_and_duplicate_metrics_are_errors() {
        let reg = Registry::new();
        let err = reg.increment("nope_total", &[]).unwrap_err();
        assert_eq!(err.client_code().as_str(), "NOT_FOUND");

        reg.register_counter("a_total", "a", &[]).unwrap();
        let err = reg.register_counter("a_total", "again", &["x"]).unwrap_err();
        assert_eq!(err.client_code().as_str(), "ALREADY_EXISTS");
    }

    #[test]
    fn render_is_sorted_and_complete() {
        let reg = Registry::new();
        reg.register_counter("zeta_total", "z", &["k"]).unwrap();
        reg.register_counter("alpha_total", "a", &[]).unwrap();
        reg.increment("zeta_total", &[("k", "b")]).unwrap();
        reg.increment("zeta_total", &[("k", "a")]).unwrap();

        let out = reg.render().unwrap();
        assert_eq!(
            out,
            "# HELP alpha_total a\n# TYPE alpha_total counter\nalpha_total 0\n\
             # HELP zeta_total z\n# TYPE zeta_total counter\n\
             zeta_total{k=\"a\"} 1\nzeta_total{k=\"b\"} 1\n"
        );
    }

    #[test]
    fn process_collector_is_idempotent() {
        let reg = Registry::new();
        reg.collect_default_process_metrics().unwrap();
        reg.collect_default_process_metrics().unwrap();
        let out = reg.render().unwrap();
        assert_eq!(out.matches("# TYPE process_start_time_seconds gauge").count(), 1);
    }

    struct Fixed(&'static str, Vec<MetricFamily>);

    impl Collector for Fixed {
        fn name(&self) -> &str {
            self.0
        }
        fn collect(&self) -> Result<Vec<MetricFamily>> {
            Ok(self.1.clone())
        }
    }

    #[test]
    fn counter_cannot_shadow_a_collected_family() {
        let reg = Registry::new();
        reg.collect_default_process_metrics().unwrap();
        let err = reg.register_counter("process_start_time_seconds", "dup", &[]).unwrap_err();
        assert_eq!(err.client_code().as_str(), "ALREADY_EXISTS");

        let out = reg.render().unwrap();
        assert_eq!(out.matches("# TYPE process_start_time_seconds").count(), 1);
    }

    #[test]
    fn collector_reusing_a_counter_name_fails_render() {
        let reg = Registry::new();
        reg.register_counter("jobs_total", "jobs", &[]).unwrap();
        reg.register_collector(Arc::new(Fixed(
            "shadow",
            vec![MetricFamily::gauge("jobs_total", "shadow", 1.0)],
        )))
        .unwrap();
        let err = reg.render().unwrap_err();
        assert_eq!(err.client_code().as_str(), "ALREADY_EXISTS");
    }

    #[test]
    fn two_collectors_emitting_one_family_fail_render() {
        let reg = Registry::new();
        for name in ["a", "b"] {
            reg.register_collector(Arc::new(Fixed(
                name,
                vec![MetricFamily::gauge("queue_depth", "depth", 3.0)],
            )))
            .unwrap();
        }
        let err = reg.render().unwrap_err();
        assert_eq!(err.client_code().as_str(), "ALREADY_EXISTS");
    }

    #[test]
    fn collected_family_with_invalid_name_fails_render() {
        let reg = Registry::new();
        reg.register_collector(Arc::new(Fixed(
            "bad",
            vec![MetricFamily::gauge("has space", "bad", 1.0)],
        )))
        .unwrap();
        let err = reg.render().unwrap_err();
        assert_eq!(err.client_code().as_str(), "COLLECT_FAILED");
        assert!(err.to_string().contains("has space"));
    }

    #[test]
    fn concurrent_process_registration_is_a_no_op() {
        let reg = Arc::new(Registry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&reg);
                std::thread::spawn(move || reg.collect_default_process_metrics())
            })
            .collect();
        for h in handles {
            h.join().unwrap().unwrap();
        }
        assert_eq!(reg.render().unwrap().matches("# TYPE process_uptime_seconds").count(), 1);
    }

    #[test]
    fn collector_failure_fails_render() {
        let reg = Registry::new();
        reg.register_collector(Arc::new(Broken)).unwrap();
        assert!(reg.register_collector(Arc::new(Broken)).is_err());
        let err = reg.render().unwrap_err();
        assert_eq!(err.client_code().as_str(), "COLLECT_FAILED");
    }
}

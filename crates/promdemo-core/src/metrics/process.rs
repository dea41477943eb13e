//! Default process metrics, sampled at scrape time.
//!
//! Start time and uptime are available everywhere. On Linux the collector
//! also reads `/proc/self` for CPU, memory and file descriptor figures; any
//! of those that cannot be read are skipped rather than failing the scrape.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use super::{Collector, MetricFamily};
use crate::error::Result;

pub struct ProcessCollector {
    start_unix: f64,
    started: Instant,
}

impl ProcessCollector {
    pub const NAME: &'static str = "process";

    pub fn new() -> Self {
        let start_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();
        Self { start_unix, started: Instant::now() }
    }
}

impl Default for ProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for ProcessCollector {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn collect(&self) -> Result<Vec<MetricFamily>> {
        let mut out = vec![
            MetricFamily::gauge(
                "process_start_time_seconds",
                "Start time of the process since unix epoch in seconds.",
                self.start_unix.floor(),
            ),
            MetricFamily::gauge(
                "process_uptime_seconds",
                "Time since the process started in seconds.",
                self.started.elapsed().as_secs_f64(),
            ),
        ];

        #[cfg(target_os = "linux")]
        linux::collect(&mut out);

        Ok(out)
    }
}

#[cfg(target_os = "linux")]
mod linux {
    use std::fs;

    use super::MetricFamily;

    /// USER_HZ; fixed at 100 on every mainstream Linux ABI.
    const CLOCK_TICKS_PER_SEC: f64 = 100.0;

    pub(super) fn collect(out: &mut Vec<MetricFamily>) {
        match fs::read_to_string("/proc/self/stat").ok().and_then(|s| cpu_seconds(&s)) {
            Some(secs) => out.push(MetricFamily::counter_f64(
                "process_cpu_seconds_total",
                "Total user and system CPU time spent in seconds.",
                secs,
            )),
            None => tracing::debug!("process_cpu_seconds_total unavailable"),
        }

        match fs::read_to_string("/proc/self/status") {
            Ok(status) => {
                if let Some(rss) = status_kb(&status, "VmRSS:") {
                    out.push(MetricFamily::gauge(
                        "process_resident_memory_bytes",
                        "Resident memory size in bytes.",
                        (rss * 1024) as f64,
                    ));
                }
                if let Some(vsz) = status_kb(&status, "VmSize:") {
                    out.push(MetricFamily::gauge(
                        "process_virtual_memory_bytes",
                        "Virtual memory size in bytes.",
                        (vsz * 1024) as f64,
                    ));
                }
            }
            Err(e) => tracing::debug!(error = %e, "/proc/self/status unavailable"),
        }

        match fs::read_dir("/proc/self/fd") {
            Ok(dir) => out.push(MetricFamily::gauge(
                "process_open_fds",
                "Number of open file descriptors.",
                dir.count() as f64,
            )),
            Err(e) => tracing::debug!(error = %e, "/proc/self/fd unavailable"),
        }

        if let Some(max) = fs::read_to_string("/proc/self/limits").ok().and_then(|s| max_open_files(&s)) {
            out.push(MetricFamily::gauge(
                "process_max_fds",
                "Maximum number of open file descriptors.",
                max,
            ));
        }
    }

    /// utime + stime from `/proc/self/stat`. Fields are counted after the
    /// parenthesised command name, which may itself contain spaces.
    pub(super) fn cpu_seconds(stat: &str) -> Option<f64> {
        let rest = &stat[stat.rfind(')')? + 1..];
        let fields: Vec<&str> = rest.split_whitespace().collect();
        let utime: u64 = fields.get(11)?.parse().ok()?;
        let stime: u64 = fields.get(12)?.parse().ok()?;
        Some((utime + stime) as f64 / CLOCK_TICKS_PER_SEC)
    }

    pub(super) fn status_kb(status: &str, key: &str) -> Option<u64> {
        status
            .lines()
            .find(|l| l.starts_with(key))?
            .split_whitespace()
            .nth(1)?
            .parse()
            .ok()
    }

    pub(super) fn max_open_files(limits: &str) -> Option<f64> {
        let line = limits.lines().find(|l| l.starts_with("Max open files"))?;
        let soft = line.trim_start_matches("Max open files").split_whitespace().next()?;
        match soft {
            "unlimited" => Some(f64::INFINITY),
            n => n.parse().ok(),
        }
    }

}

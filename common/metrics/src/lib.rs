//! A wrapper around the `prometheus` crate that provides a global metrics registry and functions
//! to add and use the following components (more info at
//! [Prometheus docs](https://prometheus.io/docs/concepts/metric_types/)):
//!
//! - `Histogram`: used with `start_timer(..)` and `stop_timer(..)` to record durations.
//! - `IntCounter`: used to represent an ideally ever-growing, never-shrinking integer.
//! - `IntGauge`: used to represent an varying integer (e.g., number of entries in a cache).
//!
//! ## Important
//!
//! Metrics will fail if two items have the same `name`. All metrics must have a unique `name`.
//! Because we use a global registry there is no namespace per crate, it's one big global space.
//!
//! Creating a metric returns a `Result`. Every helper in this crate silently does nothing when
//! given an `Err`, so failing to register a metric never affects the code being measured.
//!
//! ## Example
//!
//! ```rust
//! use metrics::*;
//!
//! lazy_static! {
//!     pub static ref RUN_COUNT: Result<IntCounter> = try_create_int_counter(
//!         "runs_total",
//!         "Total number of runs"
//!     );
//!     pub static ref CURRENT_VALUE: Result<IntGauge> = try_create_int_gauge(
//!         "current_value",
//!         "The current value"
//!     );
//! }
//!
//! fn main() {
//!     inc_counter(&RUN_COUNT);
//!     set_gauge(&CURRENT_VALUE, 42);
//! }
//! ```

use prometheus::{HistogramOpts, Opts};

pub use lazy_static::lazy_static;
pub use prometheus::{
    Encoder, Error, Histogram, HistogramTimer, HistogramVec, IntCounter, IntCounterVec, IntGauge,
    IntGaugeVec, Result, TextEncoder,
};

/// Collect all the metrics for reporting.
pub fn gather() -> Vec<prometheus::proto::MetricFamily> {
    prometheus::gather()
}

/// Attempts to create an `IntCounter`, returning `Err` if the registry does not accept the counter
/// (potentially due to naming conflict).
pub fn try_create_int_counter(name: &str, help: &str) -> Result<IntCounter> {
    let opts = Opts::new(name, help);
    let counter = IntCounter::with_opts(opts)?;
    prometheus::register(Box::new(counter.clone()))?;
    Ok(counter)
}

/// Attempts to create an `IntGauge`, returning `Err` if the registry does not accept the gauge
/// (potentially due to naming conflict).
pub fn try_create_int_gauge(name: &str, help: &str) -> Result<IntGauge> {
    let opts = Opts::new(name, help);
    let gauge = IntGauge::with_opts(opts)?;
    prometheus::register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

/// Attempts to create a `Histogram`, returning `Err` if the registry does not accept the histogram
/// (potentially due to naming conflict).
pub fn try_create_histogram(name: &str, help: &str) -> Result<Histogram> {
    let opts = HistogramOpts::new(name, help);
    let histogram = Histogram::with_opts(opts)?;
    prometheus::register(Box::new(histogram.clone()))?;
    Ok(histogram)
}

/// Attempts to create an `IntCounterVec`, returning `Err` if the registry does not accept the
/// counter (potentially due to naming conflict).
pub fn try_create_int_counter_vec(
    name: &str,
    help: &str,
    label_names: &[&str],
) -> Result<IntCounterVec> {
    let opts = Opts::new(name, help);
    let counter_vec = IntCounterVec::new(opts, label_names)?;
    prometheus::register(Box::new(counter_vec.clone()))?;
    Ok(counter_vec)
}

pub fn inc_counter(counter: &Result<IntCounter>) {
    if let Ok(counter) = counter {
        counter.inc();
    }
}

pub fn inc_counter_by(counter: &Result<IntCounter>, value: u64) {
    if let Ok(counter) = counter {
        counter.inc_by(value);
    }
}

/// Increments the `int_counter_vec` with the given `name`.
pub fn inc_counter_vec(int_counter_vec: &Result<IntCounterVec>, name: &[&str]) {
    if let Ok(counter_vec) = int_counter_vec {
        if let Ok(counter) = counter_vec.get_metric_with_label_values(name) {
            counter.inc();
        }
    }
}

pub fn set_gauge(gauge: &Result<IntGauge>, value: i64) {
    if let Ok(gauge) = gauge {
        gauge.set(value);
    }
}

pub fn start_timer(histogram: &Result<Histogram>) -> Option<HistogramTimer> {
    if let Ok(histogram) = histogram {
        Some(histogram.start_timer())
    } else {
        None
    }
}

pub fn stop_timer(timer: Option<HistogramTimer>) {
    if let Some(t) = timer {
        t.observe_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_registration_is_an_error_not_a_panic() {
        let first = try_create_int_counter("metrics_test_duplicate_total", "first");
        let second = try_create_int_counter("metrics_test_duplicate_total", "second");
        assert!(first.is_ok());
        assert!(second.is_err());

        // helpers on a failed metric are no-ops
        inc_counter(&second);
        inc_counter_by(&first, 3);
        assert_eq!(first.as_ref().map(|c| c.get()).ok(), Some(3));
    }

    #[test]
    fn gauge_and_counter_vec() {
        let gauge = try_create_int_gauge("metrics_test_gauge", "a gauge");
        set_gauge(&gauge, 42);
        assert_eq!(gauge.as_ref().map(|g| g.get()).ok(), Some(42));

        let vec = try_create_int_counter_vec("metrics_test_vec_total", "a vec", &["source"]);
        inc_counter_vec(&vec, &["engine"]);
        inc_counter_vec(&vec, &["engine"]);
        let count = vec
            .as_ref()
            .ok()
            .and_then(|v| v.get_metric_with_label_values(&["engine"]).ok())
            .map(|c| c.get());
        assert_eq!(count, Some(2));
    }
}

//! Prometheus metrics for access evaluations

use prometheus::{Histogram, HistogramOpts, HistogramTimer, IntCounter, Opts, Registry};

const NAMESPACE: &str = "accesscontrol";

/// Evaluation metrics registered in a caller-provided registry
#[derive(Clone)]
pub struct AccessControlMetrics {
    /// Evaluation duration in seconds (histogram)
    pub evaluation_duration: Histogram,

    /// Total evaluations
    pub evaluation_count: IntCounter,
}

impl AccessControlMetrics {
    /// Create the metrics and register them in `registry`
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let evaluation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "access_evaluation_duration_seconds",
                "Duration of access control evaluations",
            )
            .namespace(NAMESPACE)
            .buckets(prometheus::exponential_buckets(0.00001, 4.0, 10)?),
        )?;
        registry.register(Box::new(evaluation_duration.clone()))?;

        let evaluation_count = IntCounter::with_opts(
            Opts::new("access_evaluation_count", "Number of access control evaluations")
                .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(evaluation_count.clone()))?;

        Ok(Self {
            evaluation_duration,
            evaluation_count,
        })
    }

    /// Count an evaluation and time it until the returned timer is dropped
    pub fn start_evaluation(&self) -> HistogramTimer {
        self.evaluation_count.inc();
        self.evaluation_duration.start_timer()
    }
}

impl std::fmt::Debug for AccessControlMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessControlMetrics")
            .field("evaluation_count", &self.evaluation_count.get())
            .field("evaluation_duration_samples", &self.evaluation_duration.get_sample_count())
            .finish()
    }
}

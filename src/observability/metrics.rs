use prometheus::{Encoder, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub lifecycle_transitions_total: IntCounterVec,
    pub transition_latency_seconds: HistogramVec,
    pub active_bookings: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let lifecycle_transitions_total = IntCounterVec::new(
            Opts::new(
                "lifecycle_transitions_total",
                "Lifecycle transitions by event and outcome",
            ),
            &["event", "outcome"],
        )
        .expect("valid lifecycle_transitions_total metric");

        let transition_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "transition_latency_seconds",
                "Latency of lifecycle transition handling in seconds",
            ),
            &["event"],
        )
        .expect("valid transition_latency_seconds metric");

        let active_bookings = IntGauge::new(
            "active_bookings",
            "Open bookings: not yet delivered, cancelled, or retired by forwarding",
        )
        .expect("valid active_bookings metric");

        registry
            .register(Box::new(lifecycle_transitions_total.clone()))
            .expect("register lifecycle_transitions_total");
        registry
            .register(Box::new(transition_latency_seconds.clone()))
            .expect("register transition_latency_seconds");
        registry
            .register(Box::new(active_bookings.clone()))
            .expect("register active_bookings");

        Self {
            registry,
            lifecycle_transitions_total,
            transition_latency_seconds,
            active_bookings,
        }
    }

    pub fn record(&self, event: &str, outcome: &str, elapsed_seconds: f64) {
        self.lifecycle_transitions_total
            .with_label_values(&[event, outcome])
            .inc();
        self.transition_latency_seconds
            .with_label_values(&[event])
            .observe(elapsed_seconds);
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub bucket_claims_total: IntCounterVec,
    pub status_transitions_total: IntCounterVec,
    pub return_transitions_total: IntCounterVec,
    pub rejected_operations_total: IntCounterVec,
    pub orders_in_bucket: IntGauge,
    pub operation_latency_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let bucket_claims_total = IntCounterVec::new(
            Opts::new("bucket_claims_total", "Bucket toggle outcomes"),
            &["outcome"],
        )
        .expect("valid bucket_claims_total metric");

        let status_transitions_total = IntCounterVec::new(
            Opts::new("status_transitions_total", "Applied order status transitions"),
            &["status"],
        )
        .expect("valid status_transitions_total metric");

        let return_transitions_total = IntCounterVec::new(
            Opts::new("return_transitions_total", "Applied return status transitions"),
            &["status"],
        )
        .expect("valid return_transitions_total metric");

        let rejected_operations_total = IntCounterVec::new(
            Opts::new("rejected_operations_total", "Order operations rejected by reason"),
            &["reason"],
        )
        .expect("valid rejected_operations_total metric");

        let orders_in_bucket =
            IntGauge::new("orders_in_bucket", "Orders currently held in a rider bucket")
                .expect("valid orders_in_bucket metric");

        let operation_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "operation_latency_seconds",
                "Latency of order operations in seconds",
            ),
            &["operation"],
        )
        .expect("valid operation_latency_seconds metric");

        registry
            .register(Box::new(bucket_claims_total.clone()))
            .expect("register bucket_claims_total");
        registry
            .register(Box::new(status_transitions_total.clone()))
            .expect("register status_transitions_total");
        registry
            .register(Box::new(return_transitions_total.clone()))
            .expect("register return_transitions_total");
        registry
            .register(Box::new(rejected_operations_total.clone()))
            .expect("register rejected_operations_total");
        registry
            .register(Box::new(orders_in_bucket.clone()))
            .expect("register orders_in_bucket");
        registry
            .register(Box::new(operation_latency_seconds.clone()))
            .expect("register operation_latency_seconds");

        Self {
            registry,
            bucket_claims_total,
            status_transitions_total,
            return_transitions_total,
            rejected_operations_total,
            orders_in_bucket,
            operation_latency_seconds,
        }
    }

    pub fn observe_latency(&self, operation: &str, seconds: f64) {
        self.operation_latency_seconds
            .with_label_values(&[operation])
            .observe(seconds);
    }

    pub fn record_rejection(&self, reason: &str) {
        self.rejected_operations_total
            .with_label_values(&[reason])
            .inc();
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

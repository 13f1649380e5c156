use lazy_static::lazy_static;
use prometheus::{
    register_int_counter_vec, register_int_gauge, Encoder, IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    pub static ref UPSTREAM_FETCHES: IntCounterVec = register_int_counter_vec!(
        "m3u_relay_upstream_fetches_total",
        "Upstream fetches by kind (source, manifest) and outcome (ok, error)",
        &["kind", "outcome"]
    )
    .unwrap();
    pub static ref CHANNELS_SERVED: IntGauge = register_int_gauge!(
        "m3u_relay_channels_served",
        "Number of channels in the most recent /api/channels response"
    )
    .unwrap();
}

pub fn record_fetch(kind: &str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    UPSTREAM_FETCHES.with_label_values(&[kind, outcome]).inc();
}

pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

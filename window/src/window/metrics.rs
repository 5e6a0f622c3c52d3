//! Metrics for [super::Window].

use prometheus_client::{
    metrics::{counter::Counter, gauge::Gauge},
    registry::Registry,
};

#[derive(Default)]
pub struct Metrics {
    /// Refills that extended the window upwards.
    pub fills_up: Counter,
    /// Refills that extended the window downwards.
    pub fills_down: Counter,
    /// Refill requests that found the window already filled.
    pub fills_skipped: Counter,
    /// Records loaded from the store (including resets).
    pub records_loaded: Counter,
    /// Cursor movements that reported starvation.
    pub starvations: Counter,
    /// Logical index one past the highest cached record.
    pub top: Gauge,
    /// Logical index of the lowest cached record.
    pub bottom: Gauge,
}

impl Metrics {
    /// Create and register metrics in the provided registry.
    pub fn init(registry: &mut Registry) -> Self {
        let metrics = Self::default();
        registry.register(
            "fills_up",
            "Refills that extended the window upwards",
            metrics.fills_up.clone(),
        );
        registry.register(
            "fills_down",
            "Refills that extended the window downwards",
            metrics.fills_down.clone(),
        );
        registry.register(
            "fills_skipped",
            "Refill requests that found the window already filled",
            metrics.fills_skipped.clone(),
        );
        registry.register(
            "records_loaded",
            "Records loaded from the store",
            metrics.records_loaded.clone(),
        );
        registry.register(
            "starvations",
            "Cursor movements that reported starvation",
            metrics.starvations.clone(),
        );
        registry.register(
            "window_top",
            "Logical index one past the highest cached record",
            metrics.top.clone(),
        );
        registry.register(
            "window_bottom",
            "Logical index of the lowest cached record",
            metrics.bottom.clone(),
        );
        metrics
    }
}

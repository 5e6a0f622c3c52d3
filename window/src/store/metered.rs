use super::Store;
use crate::{Error, Record};
use prometheus_client::{metrics::counter::Counter, registry::Registry};
use std::sync::Arc;

/// Operation counters of a [Metered] store.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Successful reads (including empty ones).
    pub reads: Counter,
    /// Records returned by successful reads.
    pub records_read: Counter,
    /// Successful seeks.
    pub seeks: Counter,
    /// Successful rewinds.
    pub rewinds: Counter,
}

impl Metrics {
    /// Initialize the `Metrics` struct and register the metrics in the provided registry.
    fn new(registry: &mut Registry) -> Self {
        let metrics = Self::default();
        registry.register(
            "store_reads",
            "Total number of store reads",
            metrics.reads.clone(),
        );
        registry.register(
            "store_records_read",
            "Total number of records returned by store reads",
            metrics.records_read.clone(),
        );
        registry.register(
            "store_seeks",
            "Total number of store seeks",
            metrics.seeks.clone(),
        );
        registry.register(
            "store_rewinds",
            "Total number of store rewinds",
            metrics.rewinds.clone(),
        );
        metrics
    }
}

/// A wrapper around a [Store] implementation that tracks metrics.
pub struct Metered<S> {
    inner: S,
    metrics: Arc<Metrics>,
}

impl<S> Metered<S> {
    /// Wrap `inner`, registering its counters in `registry`.
    pub fn new(inner: S, registry: &mut Registry) -> Self {
        Self {
            inner,
            metrics: Metrics::new(registry).into(),
        }
    }

    /// Shared handle to the counters, still valid once the store is moved into a
    /// [crate::Window].
    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Release the wrapped store.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<T: Record, S: Store<T>> Store<T> for Metered<S> {
    fn rewind(&mut self) -> Result<(), Error> {
        self.inner.rewind()?;
        self.metrics.rewinds.inc();
        Ok(())
    }

    fn read(&mut self, buf: &mut [T]) -> Result<usize, Error> {
        let count = self.inner.read(buf)?;
        self.metrics.reads.inc();
        self.metrics.records_read.inc_by(count as u64);
        Ok(count)
    }

    fn seek(&mut self, offset: i64) -> Result<(), Error> {
        self.inner.seek(offset)?;
        self.metrics.seeks.inc();
        Ok(())
    }
}

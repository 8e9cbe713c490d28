//! Prometheus counters for the dispatch loop.

use crate::Response;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

fn init_error(e: prometheus::Error) -> String {
    format!("metrics init error: {e}")
}

#[derive(Clone)]
pub struct DispatchMetrics {
    pub commands: IntCounter,
    pub failures: IntCounter,
    pub devices_live: IntGauge,
}

#[derive(Clone)]
pub struct MetricsHub {
    pub registry: Registry,
    pub dispatch: DispatchMetrics,
}

impl MetricsHub {
    pub fn new() -> Result<Self, String> {
        Self::with_registry(Registry::new())
    }

    /// Register the dispatch metrics into an existing registry.
    ///
    /// Fails if the registry already carries a metric with one of these names.
    pub fn with_registry(registry: Registry) -> Result<Self, String> {
        let dispatch = DispatchMetrics {
            commands: IntCounter::new("dispatch_commands_total", "Total commands dispatched")
                .map_err(init_error)?,
            failures: IntCounter::new(
                "dispatch_command_failures_total",
                "Commands answered with a failure response",
            )
            .map_err(init_error)?,
            devices_live: IntGauge::new("dispatch_devices_live", "Live device handles")
                .map_err(init_error)?,
        };
        registry
            .register(Box::new(dispatch.commands.clone()))
            .map_err(init_error)?;
        registry
            .register(Box::new(dispatch.failures.clone()))
            .map_err(init_error)?;
        registry
            .register(Box::new(dispatch.devices_live.clone()))
            .map_err(init_error)?;
        Ok(Self { registry, dispatch })
    }

    /// Count one dispatched command and its outcome.
    pub fn observe(&self, response: &Response) {
        self.dispatch.commands.inc();
        if !response.is_ok() {
            self.dispatch.failures.inc();
        }
    }

    pub fn set_devices_live(&self, count: usize) {
        self.dispatch
            .devices_live
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buf) {
            return format!("error encoding metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

use crate::{CommandRouter, MetricsHub, RawCommand, RawDevice, Response};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use time::OffsetDateTime;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Period of the host loop driving [`Dispatcher::run_cycle`].
    pub cycle_period_ms: u64,
    /// Commands drained per cycle; the rest wait for the next one. Zero is read as one.
    pub max_commands_per_cycle: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            cycle_period_ms: 20,
            max_commands_per_cycle: 64,
        }
    }
}

impl DispatcherConfig {
    pub fn cycle_period(&self) -> Duration {
        Duration::from_millis(self.cycle_period_ms)
    }
}

/// Pending commands, shared between the control plane and the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    inner: Arc<Mutex<VecDeque<RawCommand>>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<RawCommand>> {
        match self.inner.lock() {
            Ok(queue) => queue,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn push(&self, command: RawCommand) {
        self.lock().push_back(command);
    }

    pub fn extend<I: IntoIterator<Item = RawCommand>>(&self, commands: I) {
        self.lock().extend(commands);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove up to `max` commands in arrival order.
    pub fn drain(&self, max: usize) -> Vec<RawCommand> {
        let mut queue = self.lock();
        let n = max.min(queue.len());
        queue.drain(..n).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
    pub device: RawDevice,
    pub kind: u8,
    pub response: Response,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    #[serde(skip)]
    pub started_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    pub outcomes: Vec<CommandOutcome>,
    /// Commands still queued after this cycle.
    pub pending: usize,
}

impl CycleReport {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.response.is_ok()).count()
    }
}

/// Explicitly owned top-level container driven once per host cycle.
///
/// Commands are processed one at a time, in order, and each runs to completion
/// before the next starts.
pub struct Dispatcher {
    router: CommandRouter,
    queue: CommandQueue,
    config: DispatcherConfig,
    metrics: Option<MetricsHub>,
    cycle: u64,
}

impl Dispatcher {
    pub fn new(router: CommandRouter, config: DispatcherConfig) -> Self {
        Self {
            router,
            queue: CommandQueue::new(),
            config,
            metrics: None,
            cycle: 0,
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsHub) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Handle producers push into.
    pub fn queue(&self) -> CommandQueue {
        self.queue.clone()
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    pub fn metrics(&self) -> Option<&MetricsHub> {
        self.metrics.as_ref()
    }

    /// Drain one bounded batch and dispatch it.
    pub fn run_cycle(&mut self) -> CycleReport {
        self.cycle += 1;
        let started_at = OffsetDateTime::now_utc();
        let batch = self.queue.drain(self.config.max_commands_per_cycle.max(1));

        let mut outcomes = Vec::with_capacity(batch.len());
        for command in &batch {
            let response = self.router.dispatch(command);
            if let Some(m) = &self.metrics {
                m.observe(&response);
            }
            outcomes.push(CommandOutcome {
                device: command.device,
                kind: command.kind,
                response,
            });
        }

        if let Some(m) = &self.metrics {
            m.set_devices_live(self.router.device_count());
        }

        let pending = self.queue.len();
        debug!(cycle = self.cycle, handled = outcomes.len(), pending, "cycle complete");
        CycleReport {
            cycle: self.cycle,
            started_at,
            ts: started_at
                .format(&time::format_description::well_known::Rfc3339)
                .ok(),
            outcomes,
            pending,
        }
    }

    /// Run cycles until the queue is empty. Returns one report per cycle.
    pub fn run_until_idle(&mut self) -> Vec<CycleReport> {
        let mut reports = Vec::new();
        while !self.queue.is_empty() {
            reports.push(self.run_cycle());
        }
        reports
    }
}

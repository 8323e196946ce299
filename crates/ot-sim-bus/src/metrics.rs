//! # ot-sim-bus::metrics
//!
//! The metrics aggregator (§4.4): named counters/gauges, mutated by the
//! adapter, periodically snapshotted and pushed as a `Metric` envelope on
//! topic `"HEALTH"`. Grounded on the original `otsim::msgbus::MetricsPusher`
//! (mutex-guarded map, idempotent module-name prefixing, 5-second ticker).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use ot_sim_types::envelope::{Envelope, MetricKind, MetricSample};
use ot_sim_types::topics;

use crate::pusher::Pusher;
use crate::transport::PushTransport;

const DEFAULT_TICK: Duration = Duration::from_secs(5);

struct Metric {
    kind: MetricKind,
    desc: String,
    value: f64,
}

/// Counters and gauges by name, guarded by a single mutex (§5: the metrics
/// table is guarded by a mutex). Metrics not previously `register`ed are
/// silently dropped on mutation, per §4.4.
pub struct MetricsAggregator {
    module: String,
    table: Mutex<HashMap<String, Metric>>,
}

impl MetricsAggregator {
    pub fn new(module: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { module: module.into(), table: Mutex::new(HashMap::new()) })
    }

    pub fn register(&self, kind: MetricKind, name: impl Into<String>, desc: impl Into<String>) {
        let mut t = self.table.lock().expect("metrics lock poisoned");
        t.insert(name.into(), Metric { kind, desc: desc.into(), value: 0.0 });
    }

    pub fn incr(&self, name: &str) {
        self.incr_by(name, 1.0);
    }

    pub fn incr_by(&self, name: &str, n: f64) {
        let mut t = self.table.lock().expect("metrics lock poisoned");
        if let Some(m) = t.get_mut(name) {
            m.value += n;
        }
    }

    pub fn set(&self, name: &str, value: f64) {
        let mut t = self.table.lock().expect("metrics lock poisoned");
        if let Some(m) = t.get_mut(name) {
            m.value = value;
        }
    }

    /// Prefixes `name` with `"<module>_"`, idempotently: a name already
    /// carrying that prefix is left untouched.
    fn prefixed(&self, name: &str) -> String {
        let prefix = format!("{}_", self.module);
        if name.starts_with(&prefix) {
            name.to_string()
        } else {
            format!("{prefix}{name}")
        }
    }

    fn snapshot_envelope(&self) -> Envelope {
        let t = self.table.lock().expect("metrics lock poisoned");
        let metrics = t
            .iter()
            .map(|(name, m)| MetricSample {
                kind: m.kind,
                name: self.prefixed(name),
                desc: m.desc.clone(),
                value: m.value,
            })
            .collect();
        Envelope::metric(self.module.clone(), metrics)
    }

    /// Spawns the background ticker thread that snapshots and pushes a
    /// `Metric` envelope on `"HEALTH"` every `period` (default 5 s).
    pub fn start_ticker<T: PushTransport + 'static>(
        self: &Arc<Self>,
        pusher: Arc<Pusher<T>>,
        period: Option<Duration>,
    ) -> MetricsTickerHandle {
        let period = period.unwrap_or(DEFAULT_TICK);
        let running = Arc::new(AtomicBool::new(true));
        let running_thread = running.clone();
        let this = self.clone();

        let join = std::thread::Builder::new()
            .name(format!("ot-sim-metrics-{}", self.module))
            .spawn(move || {
                while running_thread.load(Ordering::Acquire) {
                    std::thread::sleep(period);
                    if !running_thread.load(Ordering::Acquire) {
                        break;
                    }
                    let env = this.snapshot_envelope();
                    if let Err(err) = pusher.push(topics::HEALTH, &env) {
                        tracing::warn!(error = %err, "failed to push metrics snapshot");
                    }
                }
            })
            .expect("failed to spawn metrics ticker thread");

        MetricsTickerHandle { running, join: Some(join) }
    }
}

pub struct MetricsTickerHandle {
    running: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl MetricsTickerHandle {
    pub fn stop(mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_metric_mutation_is_silently_dropped() {
        let agg = MetricsAggregator::new("dnp3-A");
        agg.incr("no.such.metric");
        let env = agg.snapshot_envelope();
        match env.contents {
            ot_sim_types::envelope::Contents::Metric(m) => assert!(m.metrics.is_empty()),
            _ => panic!("wrong kind"),
        }
    }

    #[test]
    fn register_then_incr_then_snapshot() {
        let agg = MetricsAggregator::new("dnp3-A");
        agg.register(MetricKind::Counter, "bus.drops", "dropped envelopes");
        agg.incr("bus.drops");
        agg.incr_by("bus.drops", 2.0);
        let env = agg.snapshot_envelope();
        match env.contents {
            ot_sim_types::envelope::Contents::Metric(m) => {
                let sample = m.metrics.iter().find(|s| s.name == "dnp3-A_bus.drops").unwrap();
                assert_eq!(sample.value, 3.0);
            }
            _ => panic!("wrong kind"),
        }
    }

    #[test]
    fn prefixing_is_idempotent() {
        let agg = MetricsAggregator::new("dnp3-A");
        agg.register(MetricKind::Gauge, "dnp3-A_already_prefixed", "");
        let env = agg.snapshot_envelope();
        match env.contents {
            ot_sim_types::envelope::Contents::Metric(m) => {
                assert_eq!(m.metrics[0].name, "dnp3-A_already_prefixed");
            }
            _ => panic!("wrong kind"),
        }
    }
}

// Metric collection: one snapshot per tick, retained in a bounded history.

use std::collections::VecDeque;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::config::{NetworkConfig, ProbeConfig};
use crate::models::Snapshot;
use crate::probes::NetworkProbes;

/// Fixed-capacity ring buffer of snapshots, oldest evicted first.
#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    capacity: usize,
    snapshots: VecDeque<Snapshot>,
}

impl SnapshotHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            snapshots: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.back()
    }

    /// Up to `limit` most recent snapshots, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<Snapshot> {
        let skip = self.snapshots.len().saturating_sub(limit);
        self.snapshots.iter().skip(skip).cloned().collect()
    }
}

pub struct MetricCollector {
    probes: NetworkProbes,
    network: NetworkConfig,
    ping_count: u32,
    // Held for the whole collection: one cycle in flight keeps insertion order.
    collecting: Mutex<()>,
    history: Mutex<SnapshotHistory>,
}

impl MetricCollector {
    pub fn new(
        probes: NetworkProbes,
        network: NetworkConfig,
        probe_config: &ProbeConfig,
        history_capacity: usize,
    ) -> Self {
        Self {
            probes,
            network,
            ping_count: probe_config.ping_count,
            collecting: Mutex::new(()),
            history: Mutex::new(SnapshotHistory::new(history_capacity)),
        }
    }

    /// Run every snapshot probe concurrently and record the result. Probe failures are
    /// already folded into their records, so this cannot fail.
    #[instrument(skip(self), fields(interface = %self.network.interface, operation = "collect"))]
    pub async fn collect(&self) -> Snapshot {
        let _collecting = self.collecting.lock().await;
        let timestamp = Utc::now();
        let interface = self.network.interface.as_str();

        let (ping, dns, signal, link, gateway) = tokio::join!(
            self.probes.ping(&self.network.ping_target, self.ping_count),
            self.probes.dns_lookup(&self.network.dns_domain, None),
            self.probes.signal(interface),
            self.probes.interface_status(interface),
            self.probes.gateway(interface),
        );

        let snapshot = Snapshot {
            timestamp,
            ping,
            dns,
            signal,
            interface: link,
            gateway,
        };
        let retained = {
            let mut history = self.history.lock().await;
            history.push(snapshot.clone());
            history.len()
        };
        debug!(retained, "snapshot recorded");
        snapshot
    }

    pub async fn history(&self, limit: usize) -> Vec<Snapshot> {
        self.history.lock().await.recent(limit)
    }

    pub async fn latest(&self) -> Option<Snapshot> {
        self.history.lock().await.latest().cloned()
    }

    pub fn probes(&self) -> &NetworkProbes {
        &self.probes
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::*;

    fn snapshot(ms: f64) -> Snapshot {
        Snapshot {
            timestamp: Utc::now(),
            ping: PingResult {
                target: "8.8.8.8".into(),
                success: true,
                error: None,
                latency_ms: Some(ms),
                min_rtt_ms: None,
                max_rtt_ms: None,
                packet_loss: Some(0.0),
            },
            dns: DnsLookupResult::failed("google.com", None, "skipped"),
            signal: SignalReading::failed("wlan0", "skipped"),
            interface: InterfaceStatus::failed("wlan0", "skipped"),
            gateway: GatewayInfo::failed("skipped"),
        }
    }

    #[test]
    fn history_evicts_oldest() {
        let mut h = SnapshotHistory::new(3);
        for ms in [1.0, 2.0, 3.0, 4.0] {
            h.push(snapshot(ms));
        }
        assert_eq!(h.len(), 3);
        let kept: Vec<_> = h.recent(10).iter().map(|s| s.ping.latency_ms).collect();
        assert_eq!(kept, vec![Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(h.latest().and_then(|s| s.ping.latency_ms), Some(4.0));
    }

    #[test]
    fn recent_returns_newest_tail() {
        let mut h = SnapshotHistory::new(5);
        for ms in [1.0, 2.0, 3.0] {
            h.push(snapshot(ms));
        }
        let tail: Vec<_> = h.recent(2).iter().map(|s| s.ping.latency_ms).collect();
        assert_eq!(tail, vec![Some(2.0), Some(3.0)]);
        assert!(SnapshotHistory::new(0).capacity() >= 1);
    }
}

// Metric collection against a scripted runner

mod common;

use common::*;
use netsentinel::collector::MetricCollector;
use netsentinel::error::ProbeError;
use netsentinel::probes::{CommandOutput, NetworkProbes};
use std::sync::Arc;
use std::time::Duration;

fn collector(runner: FakeRunner, history_capacity: usize) -> (MetricCollector, Arc<FakeRunner>) {
    let config = test_app_config();
    let runner = Arc::new(runner);
    let probes = NetworkProbes::new(runner.clone(), config.probes.clone());
    (
        MetricCollector::new(probes, config.network, &config.probes, history_capacity),
        runner,
    )
}

#[tokio::test]
async fn test_collect_runs_every_snapshot_probe() {
    let (collector, runner) = collector(healthy_network(3.0, 20.0, -55), 5);
    let snapshot = collector.collect().await;

    assert!(snapshot.ping.success);
    assert_eq!(snapshot.ping.target, "8.8.8.8");
    assert_eq!(snapshot.ping.latency_ms, Some(20.0));
    assert!(snapshot.dns.success);
    assert_eq!(snapshot.dns.latency_ms, Some(25.0));
    assert_eq!(snapshot.signal.signal_dbm, Some(-55));
    assert!(snapshot.interface.up);
    assert_eq!(snapshot.gateway_ip(), Some(GATEWAY));

    // Snapshot DNS goes to the system resolver, not the gateway.
    assert!(runner.called("dig google.com"));
    assert!(!runner.called("dig @192.168.1.1"));
    assert!(runner.called("ping -c 3 8.8.8.8"));
}

#[tokio::test]
async fn test_failing_probe_does_not_affect_the_others() {
    let runner = FakeRunner::new()
        .on(
            "iwconfig wlan0",
            Scripted::Fail(ProbeError::Timeout { after_ms: 5000 }),
        )
        .ok("ip route show default", route_output(GATEWAY, "wlan0"))
        .ok("ip link show wlan0", ip_link_output("wlan0", true))
        .ok(
            "dig google.com",
            dig_output("google.com", "142.250.72.14", 25, "127.0.0.53"),
        )
        .ok("ping 8.8.8.8", ping_output("8.8.8.8", 20.0));
    let (collector, _) = collector(runner, 5);
    let snapshot = collector.collect().await;

    assert!(!snapshot.signal.success);
    assert_eq!(snapshot.signal.error.as_deref(), Some("timed out after 5000ms"));
    assert_eq!(snapshot.signal.signal_dbm, None);
    assert!(snapshot.ping.success);
    assert!(snapshot.dns.success);
    assert!(snapshot.interface.success);
    assert!(snapshot.gateway.success);
}

#[tokio::test]
async fn test_missing_tools_yield_failed_records() {
    let (collector, _) = collector(FakeRunner::new(), 5);
    let snapshot = collector.collect().await;

    assert!(!snapshot.ping.success);
    assert!(snapshot.ping.latency_ms.is_none());
    assert!(!snapshot.dns.success);
    assert!(!snapshot.signal.success);
    assert!(!snapshot.interface.success);
    assert!(!snapshot.interface.up);
    assert!(!snapshot.gateway.success);
    assert!(
        snapshot
            .ping
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("failed to spawn ping"))
    );
}

#[tokio::test]
async fn test_unreachable_target_is_a_failed_ping() {
    let runner = FakeRunner::new().on("ping 8.8.8.8", Scripted::Output(ping_unreachable("8.8.8.8")));
    let (collector, _) = collector(runner, 5);
    let snapshot = collector.collect().await;
    assert!(!snapshot.ping.success);
    assert!(snapshot.ping.packet_loss.is_none());
}

#[tokio::test]
async fn test_missing_device_reads_as_down() {
    let runner = FakeRunner::new()
        .on(
            "ip link show wlan0",
            Scripted::Output(CommandOutput {
                stdout: String::new(),
                stderr: "Device \"wlan0\" does not exist.\n".into(),
                exit_code: Some(1),
            }),
        )
        .merge(healthy_network(3.0, 20.0, -55));
    let (collector, _) = collector(runner, 5);
    let snapshot = collector.collect().await;
    assert!(snapshot.interface.success);
    assert!(!snapshot.interface.up);
    assert!(snapshot.interface.counters.is_none());
}

#[tokio::test]
async fn test_history_is_bounded_and_ordered() {
    let (collector, _) = collector(healthy_network(3.0, 20.0, -55), 3);
    let mut stamps = Vec::new();
    for _ in 0..5 {
        stamps.push(collector.collect().await.timestamp);
    }

    let history = collector.history(10).await;
    assert_eq!(history.len(), 3);
    let kept: Vec<_> = history.iter().map(|s| s.timestamp).collect();
    assert_eq!(kept, stamps[2..]);
    assert_eq!(collector.history(1).await.len(), 1);
    assert_eq!(
        collector.latest().await.map(|s| s.timestamp),
        stamps.last().copied()
    );
}

#[tokio::test]
async fn test_empty_history_before_first_collection() {
    let (collector, _) = collector(healthy_network(3.0, 20.0, -55), 3);
    assert!(collector.history(10).await.is_empty());
    assert!(collector.latest().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_history_readable_while_collecting() {
    let runner = FakeRunner::new()
        .on(
            "ping 8.8.8.8",
            Scripted::Delayed(
                Duration::from_secs(3),
                CommandOutput::ok(ping_output("8.8.8.8", 20.0)),
            ),
        )
        .merge(healthy_network(3.0, 20.0, -55));
    let (collector, _) = collector(runner, 5);
    let collector = Arc::new(collector);

    let in_flight = tokio::spawn({
        let collector = collector.clone();
        async move { collector.collect().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    let history = tokio::time::timeout(Duration::from_secs(1), collector.history(10))
        .await
        .expect("history not blocked by collection");
    assert!(history.is_empty());

    let snapshot = in_flight.await.unwrap();
    assert_eq!(collector.latest().await.map(|s| s.timestamp), Some(snapshot.timestamp));
}

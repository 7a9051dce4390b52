// Threshold-based health classification of a snapshot.

use crate::config::Thresholds;
use crate::models::*;

/// Every rule is evaluated; critical findings become issues, the rest warnings.
/// Any issue makes the status Unhealthy regardless of warnings.
pub fn classify(snapshot: &Snapshot, thresholds: &Thresholds) -> HealthAssessment {
    let findings: Vec<HealthIssue> = [
        ping_findings(&snapshot.ping, thresholds),
        dns_findings(&snapshot.dns, thresholds),
        signal_findings(&snapshot.signal, thresholds),
        interface_findings(&snapshot.interface),
    ]
    .into_iter()
    .flatten()
    .collect();

    let (issues, warnings): (Vec<_>, Vec<_>) = findings
        .into_iter()
        .partition(|f| f.severity == Severity::Critical);

    let status = if !issues.is_empty() {
        Status::Unhealthy
    } else if !warnings.is_empty() {
        Status::Degraded
    } else {
        Status::Healthy
    };

    HealthAssessment {
        timestamp: snapshot.timestamp,
        status,
        issues,
        warnings,
        metrics: snapshot.clone(),
    }
}

fn ping_findings(ping: &PingResult, t: &Thresholds) -> Vec<HealthIssue> {
    if !ping.success {
        let reason = ping.error.as_deref().unwrap_or("no reply");
        return vec![HealthIssue::critical(
            IssueKind::Connectivity,
            format!("Cannot reach {}: {}", ping.target, reason),
        )];
    }
    let mut found = Vec::new();
    if let Some(latency) = ping.latency_ms
        && latency > t.max_latency_ms
    {
        found.push(HealthIssue::warning(
            IssueKind::Latency,
            format!(
                "High latency: {latency}ms (threshold: {}ms)",
                t.max_latency_ms
            ),
            latency,
        ));
    }
    if let Some(loss) = ping.packet_loss
        && loss > t.max_packet_loss
    {
        found.push(HealthIssue::warning(
            IssueKind::PacketLoss,
            format!(
                "High packet loss: {loss}% (threshold: {}%)",
                t.max_packet_loss
            ),
            loss,
        ));
    }
    found
}

fn dns_findings(dns: &DnsLookupResult, t: &Thresholds) -> Vec<HealthIssue> {
    if !dns.success {
        let reason = dns.error.as_deref().unwrap_or("no answer");
        return vec![HealthIssue::critical(
            IssueKind::Dns,
            format!("DNS resolution failed for {}: {}", dns.domain, reason),
        )];
    }
    match dns.latency_ms {
        Some(ms) if ms > t.dns_slow_ms => vec![HealthIssue::warning(
            IssueKind::Dns,
            format!("Slow DNS resolution: {ms}ms (threshold: {}ms)", t.dns_slow_ms),
            ms,
        )],
        _ => vec![],
    }
}

// A failed signal probe (wired link, no wireless tools) is not a weak signal.
fn signal_findings(signal: &SignalReading, t: &Thresholds) -> Vec<HealthIssue> {
    match signal.signal_dbm {
        Some(dbm) if signal.success && dbm < t.min_signal_dbm => vec![HealthIssue::warning(
            IssueKind::Signal,
            format!(
                "Weak WiFi signal: {dbm}dBm ({})",
                SignalQuality::from_dbm(dbm)
            ),
            f64::from(dbm),
        )],
        _ => vec![],
    }
}

// Only a positively observed down state counts; an unreadable link is unknown.
fn interface_findings(link: &InterfaceStatus) -> Vec<HealthIssue> {
    if link.success && !link.up {
        vec![HealthIssue::critical(
            IssueKind::Interface,
            format!("Network interface {} is down", link.interface),
        )]
    } else {
        vec![]
    }
}

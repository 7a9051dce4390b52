// Rule-based root-cause diagnosis.
//
// A fixed-order decision tree over derived quantities (router latency, internet
// latency, signal, DNS latency). The first matching branch wins; evidence and
// recommendations are appended in evaluation order. Pure: the same inputs always
// yield the same Diagnosis.

use std::net::IpAddr;

use serde::Serialize;

use crate::models::*;

const ROUTER_HIGH_MS: f64 = 100.0;
const ROUTER_FAST_MS: f64 = 50.0;
const ROUTER_MODERATE_CEILING_MS: f64 = 150.0;
const INTERNET_SLOW_MS: f64 = 200.0;
const INTERNET_HEALTHY_MS: f64 = 100.0;
const SIGNAL_WEAK_DBM: i32 = -70;
const DNS_SLOW_MS: f64 = 1000.0;
const CONGESTED_NETWORK_COUNT: usize = 20;

/// Quantities the decision tree runs on. `None` means not measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub router_latency: Option<f64>,
    pub internet_latency: Option<f64>,
    pub signal_dbm: Option<i32>,
    pub dns_latency: Option<f64>,
    pub packet_loss: Option<f64>,
}

impl DerivedMetrics {
    pub fn derive(snapshot: &Snapshot, tools: &ToolResultSet) -> Self {
        let pings = &tools.ping_multiple.results;
        let gateway = snapshot
            .gateway_ip()
            .or(tools.ping_multiple.gateway.as_deref());
        let router_idx = router_index(pings, gateway);

        let router_latency = router_idx
            .and_then(|i| pings.get(i))
            .filter(|p| p.success)
            .and_then(|p| p.latency_ms);

        let internet: Vec<f64> = pings
            .iter()
            .enumerate()
            .filter(|(i, p)| Some(*i) != router_idx && p.success)
            .filter_map(|(_, p)| p.latency_ms)
            .collect();
        let internet_latency =
            (!internet.is_empty()).then(|| internet.iter().sum::<f64>() / internet.len() as f64);

        let dns_latency = [&snapshot.dns, &tools.dns_check]
            .into_iter()
            .find(|d| d.success)
            .and_then(|d| d.latency_ms);

        Self {
            router_latency,
            internet_latency,
            signal_dbm: snapshot.signal_dbm(),
            dns_latency,
            // No replies at all is total loss, not an unmeasured figure.
            packet_loss: if snapshot.ping.success {
                snapshot.ping.packet_loss
            } else {
                Some(100.0)
            },
        }
    }
}

/// The router is the ping whose target is the resolved default gateway. Without a
/// known gateway, the first private-range address (or the placeholder target used
/// when no gateway could be found) stands in.
fn router_index(pings: &[PingResult], gateway: Option<&str>) -> Option<usize> {
    if let Some(gw) = gateway
        && let Some(i) = pings.iter().position(|p| p.target == gw)
    {
        return Some(i);
    }
    pings.iter().position(|p| {
        p.target == crate::probes::ROUTER_TARGET || is_private_address(&p.target)
    })
}

fn is_private_address(target: &str) -> bool {
    match target.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.is_private() || v4.is_link_local(),
        Ok(IpAddr::V6(v6)) => v6.is_unique_local() || v6.is_unicast_link_local(),
        Err(_) => false,
    }
}

struct Finding {
    primary_issue: PrimaryIssue,
    root_cause: String,
    confidence: Confidence,
}

pub fn diagnose(snapshot: &Snapshot, status: Status, tools: &ToolResultSet) -> Diagnosis {
    let m = DerivedMetrics::derive(snapshot, tools);
    let mut evidence: Vec<String> = Vec::new();
    let mut recommendations: Vec<String> = Vec::new();

    let finding = match m.router_latency {
        Some(router) if router > ROUTER_HIGH_MS => {
            evidence.push(format!(
                "Router latency: {router}ms (threshold: {ROUTER_FAST_MS}ms)"
            ));
            match m.signal_dbm {
                Some(dbm) if dbm < SIGNAL_WEAK_DBM => {
                    evidence.push(format!("WiFi signal is weak: {dbm}dBm"));
                    recommendations.extend(strings(&[
                        "Move closer to WiFi router",
                        "Switch to 5GHz band if available",
                        "Check for WiFi interference",
                    ]));
                }
                _ => recommendations.extend(strings(&[
                    "Check router CPU/memory usage",
                    "Restart router",
                    "Reduce number of connected devices",
                ])),
            }
            Some(Finding {
                primary_issue: PrimaryIssue::HighLocalNetworkLatency,
                root_cause: format!(
                    "Router latency is high ({router}ms), indicating local network congestion or WiFi issues"
                ),
                confidence: Confidence::High,
            })
        }
        Some(router)
            if router < ROUTER_FAST_MS
                && m.internet_latency.is_some_and(|i| i > INTERNET_SLOW_MS) =>
        {
            let internet = m.internet_latency.unwrap_or_default();
            evidence.push(format!("Router: {router}ms (fast)"));
            evidence.push(format!("Internet: {internet:.0}ms (slow)"));
            recommendations.extend(strings(&[
                "Contact ISP about latency issues",
                "Check if other users on network experiencing same issue",
                "Try wired connection to rule out WiFi",
            ]));
            Some(Finding {
                primary_issue: PrimaryIssue::HighExternalLatency,
                root_cause: format!(
                    "Router is responsive ({router}ms) but external hosts are slow ({internet:.0}ms avg), indicating ISP or internet routing issues"
                ),
                confidence: Confidence::High,
            })
        }
        Some(router) if (ROUTER_FAST_MS..ROUTER_MODERATE_CEILING_MS).contains(&router) => {
            evidence.push(format!("Router: {router}ms (moderate)"));
            evidence.push(match m.signal_dbm {
                Some(dbm) => format!("Signal: {dbm}dBm"),
                None => "Signal: unknown".to_string(),
            });
            if tools.wifi_scan.success && tools.wifi_scan.networks_found > CONGESTED_NETWORK_COUNT {
                evidence.push(format!(
                    "{} WiFi networks detected (congested environment)",
                    tools.wifi_scan.networks_found
                ));
                recommendations.push("Switch to less congested WiFi channel".to_string());
            }
            recommendations.extend(strings(&[
                "Improve WiFi signal strength",
                "Switch to 5GHz band",
                "Move closer to router",
            ]));
            Some(Finding {
                primary_issue: PrimaryIssue::ModerateNetworkDegradation,
                root_cause: "Moderate latency across local and external hosts, likely WiFi signal quality or interference".to_string(),
                confidence: Confidence::Medium,
            })
        }
        _ => None,
    };

    // Applied whichever branch matched.
    if let Some(dns) = m.dns_latency
        && dns > DNS_SLOW_MS
    {
        evidence.push(format!("DNS resolution is slow: {dns}ms"));
        recommendations.push("Change DNS servers to 8.8.8.8 or 1.1.1.1".to_string());
    }
    if let Some(dbm) = m.signal_dbm {
        evidence.push(format!(
            "WiFi signal: {dbm}dBm ({})",
            SignalQuality::from_dbm(dbm)
        ));
        if dbm < SIGNAL_WEAK_DBM {
            recommendations.insert(
                0,
                "PRIORITY: Improve WiFi signal (move closer to router)".to_string(),
            );
        }
    }
    supporting_evidence(tools, &mut evidence);

    let finding = finding.unwrap_or_else(|| {
        if is_within_healthy_bounds(&m) {
            // Healthy replaces every earlier recommendation, slow DNS included; the
            // evidence keeps the observation.
            recommendations = vec!["No action needed - network is healthy".to_string()];
            Finding {
                primary_issue: PrimaryIssue::NetworkHealthy,
                root_cause: format!(
                    "Network is performing well - router {}ms, internet {:.0}ms, signal {}",
                    m.router_latency.unwrap_or_default(),
                    m.internet_latency.unwrap_or_default(),
                    m.signal_dbm
                        .map(|d| format!("{d}dBm"))
                        .unwrap_or_else(|| "unknown".to_string()),
                ),
                confidence: Confidence::High,
            }
        } else {
            recommendations.push("Monitor network performance over time".to_string());
            if status == Status::Healthy {
                Finding {
                    primary_issue: PrimaryIssue::NetworkStatusUnclear,
                    root_cause: "Not enough diagnostic data to determine network health"
                        .to_string(),
                    confidence: Confidence::Low,
                }
            } else {
                Finding {
                    primary_issue: PrimaryIssue::NetworkDegradation,
                    root_cause: "Network performance is degraded, but specific cause unclear from available data".to_string(),
                    confidence: Confidence::Low,
                }
            }
        }
    });

    Diagnosis {
        timestamp: tools.collected_at,
        alert_status: status,
        primary_issue: finding.primary_issue,
        root_cause: finding.root_cause,
        confidence: finding.confidence,
        evidence,
        recommendations,
        diagnostic_data: tools.clone(),
        network_health_score: None,
        score_explanation: None,
    }
}

// Unknown signal counts as healthy (wired links); unmeasured latency does not.
fn is_within_healthy_bounds(m: &DerivedMetrics) -> bool {
    m.router_latency.is_some_and(|r| r < ROUTER_FAST_MS)
        && m.internet_latency.is_some_and(|i| i < INTERNET_HEALTHY_MS)
        && m.signal_dbm.is_none_or(|s| s > SIGNAL_WEAK_DBM)
}

/// Observations from the deeper tools that do not steer the decision tree.
fn supporting_evidence(tools: &ToolResultSet, evidence: &mut Vec<String>) {
    if tools.arp_table.success {
        let incomplete = tools.arp_table.incomplete_count();
        if incomplete > 0 {
            evidence.push(format!(
                "{incomplete} of {} ARP entries incomplete (hosts not responding)",
                tools.arp_table.total_devices
            ));
        }
    }
    if tools.traceroute.success {
        let silent = tools.traceroute.hops.iter().filter(|h| h.is_timeout()).count();
        if silent > 0 {
            evidence.push(format!(
                "Traceroute: {silent} of {} hops did not respond",
                tools.traceroute.total_hops
            ));
        }
    }
    if tools.wifi_scan.success
        && let Some(sharing) = tools.wifi_scan.networks_sharing_current_channel()
        && sharing > 0
        && let Some(channel) = tools.wifi_scan.current_channel
    {
        evidence.push(format!(
            "{sharing} other WiFi networks share channel {channel}"
        ));
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

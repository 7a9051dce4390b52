// Probe result records.
// A failed probe has `success: false`, an error, and no numeric fields: zero latency
// and "unmeasured" must stay distinguishable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Host label recorded for a traceroute hop that did not answer.
pub const TIMEOUT_HOST: &str = "timeout";

/// Summary statistics extracted from ping output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingStats {
    pub transmitted: u32,
    pub received: u32,
    pub packet_loss: f64,
    pub min_rtt_ms: Option<f64>,
    pub avg_rtt_ms: Option<f64>,
    pub max_rtt_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingResult {
    pub target: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency_ms: Option<f64>,
    #[serde(default)]
    pub min_rtt_ms: Option<f64>,
    #[serde(default)]
    pub max_rtt_ms: Option<f64>,
    pub packet_loss: Option<f64>,
}

impl PingResult {
    pub fn failed(target: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            success: false,
            error: Some(error.into()),
            latency_ms: None,
            min_rtt_ms: None,
            max_rtt_ms: None,
            packet_loss: None,
        }
    }

    /// Successful only when at least one reply came back with a round-trip time.
    pub fn from_stats(target: impl Into<String>, stats: &PingStats) -> Self {
        let target = target.into();
        match stats.avg_rtt_ms {
            Some(avg) if stats.received > 0 => Self {
                target,
                success: true,
                error: None,
                latency_ms: Some(round2(avg)),
                min_rtt_ms: stats.min_rtt_ms.map(round2),
                max_rtt_ms: stats.max_rtt_ms.map(round2),
                packet_loss: Some(stats.packet_loss.clamp(0.0, 100.0)),
            },
            _ if stats.received > 0 => {
                Self::failed(target, "replies carried no round-trip times")
            }
            _ => Self::failed(
                target,
                format!(
                    "no replies ({} transmitted, {}% packet loss)",
                    stats.transmitted, stats.packet_loss
                ),
            ),
        }
    }
}

/// Ping fan-out used by the diagnostic stage (router + public targets).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPingResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Resolved default gateway, if one was known when the router was pinged.
    pub gateway: Option<String>,
    pub results: Vec<PingResult>,
}

impl MultiPingResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            gateway: None,
            results: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsLookupResult {
    pub domain: String,
    /// Server queried; `None` means the system resolver.
    pub server: Option<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency_ms: Option<f64>,
    pub resolved_ip: Option<String>,
}

impl DnsLookupResult {
    pub fn failed(
        domain: impl Into<String>,
        server: Option<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            server,
            success: false,
            error: Some(error.into()),
            latency_ms: None,
            resolved_ip: None,
        }
    }
}

/// Five-tier WiFi signal label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalQuality {
    #[serde(rename = "excellent")]
    Excellent,
    #[serde(rename = "good")]
    Good,
    #[serde(rename = "fair")]
    Fair,
    #[serde(rename = "weak")]
    Weak,
    #[serde(rename = "very weak")]
    VeryWeak,
}

impl SignalQuality {
    pub fn from_dbm(dbm: i32) -> Self {
        match dbm {
            d if d >= -50 => SignalQuality::Excellent,
            d if d >= -60 => SignalQuality::Good,
            d if d >= -70 => SignalQuality::Fair,
            d if d >= -80 => SignalQuality::Weak,
            _ => SignalQuality::VeryWeak,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SignalQuality::Excellent => "excellent",
            SignalQuality::Good => "good",
            SignalQuality::Fair => "fair",
            SignalQuality::Weak => "weak",
            SignalQuality::VeryWeak => "very weak",
        }
    }
}

impl std::fmt::Display for SignalQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReading {
    pub interface: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub signal_dbm: Option<i32>,
    pub quality: Option<SignalQuality>,
    #[serde(default)]
    pub essid: Option<String>,
    /// Driver link quality, e.g. "52/70".
    #[serde(default)]
    pub link_quality: Option<String>,
    #[serde(default)]
    pub frequency_ghz: Option<f64>,
    #[serde(default)]
    pub channel: Option<u32>,
}

impl SignalReading {
    pub fn failed(interface: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            success: false,
            error: Some(error.into()),
            signal_dbm: None,
            quality: None,
            essid: None,
            link_quality: None,
            frequency_ghz: None,
            channel: None,
        }
    }
}

/// Cumulative interface counters since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceCounters {
    pub bytes_recv: u64,
    pub bytes_sent: u64,
    pub packets_recv: u64,
    pub packets_sent: u64,
    pub errors_in: u64,
    pub errors_out: u64,
    pub drops_in: u64,
    pub drops_out: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceStatus {
    pub interface: String,
    pub up: bool,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Present only when the interface is up.
    #[serde(default)]
    pub counters: Option<InterfaceCounters>,
}

impl InterfaceStatus {
    pub fn failed(interface: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            up: false,
            success: false,
            error: Some(error.into()),
            counters: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayInfo {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub gateway_ip: Option<String>,
    pub interface: Option<String>,
}

impl GatewayInfo {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            gateway_ip: None,
            interface: None,
        }
    }
}

/// One neighbour-table row. `mac: None` is an unresolved ("incomplete") entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArpEntry {
    pub ip: String,
    pub mac: Option<String>,
    pub interface: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArpTable {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub entries: Vec<ArpEntry>,
    pub total_devices: usize,
}

impl ArpTable {
    pub fn from_entries(entries: Vec<ArpEntry>) -> Self {
        Self {
            success: true,
            error: None,
            total_devices: entries.len(),
            entries,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            entries: vec![],
            total_devices: 0,
        }
    }

    pub fn incomplete_count(&self) -> usize {
        self.entries.iter().filter(|e| e.mac.is_none()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracerouteHop {
    pub hop: u32,
    /// Hostname or address as printed, or [`TIMEOUT_HOST`].
    pub host: String,
    /// Address in parentheses when traceroute printed a hostname.
    #[serde(default)]
    pub address: Option<String>,
    pub latency_ms: Option<f64>,
}

impl TracerouteHop {
    pub fn is_timeout(&self) -> bool {
        self.host == TIMEOUT_HOST
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracerouteResult {
    pub target: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub hops: Vec<TracerouteHop>,
    pub total_hops: usize,
}

impl TracerouteResult {
    pub fn from_hops(target: impl Into<String>, hops: Vec<TracerouteHop>) -> Self {
        Self {
            target: target.into(),
            success: true,
            error: None,
            total_hops: hops.len(),
            hops,
        }
    }

    pub fn failed(target: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            success: false,
            error: Some(error.into()),
            hops: vec![],
            total_hops: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiNetwork {
    /// `None` for hidden networks.
    pub ssid: Option<String>,
    pub channel: Option<u32>,
    pub signal_dbm: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WifiScan {
    pub interface: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub networks_found: usize,
    pub networks: Vec<WifiNetwork>,
    /// channel -> number of networks seen on it
    pub channel_congestion: BTreeMap<u32, usize>,
    /// Up to two channels, busiest first.
    pub most_congested: Vec<u32>,
    /// Channel the monitored interface is associated on, if known.
    #[serde(default)]
    pub current_channel: Option<u32>,
}

impl WifiScan {
    pub fn failed(interface: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            success: false,
            error: Some(error.into()),
            networks_found: 0,
            networks: vec![],
            channel_congestion: BTreeMap::new(),
            most_congested: vec![],
            current_channel: None,
        }
    }

    /// Networks sharing the channel we are associated on (excluding ourselves).
    pub fn networks_sharing_current_channel(&self) -> Option<usize> {
        let channel = self.current_channel?;
        let count = self.channel_congestion.get(&channel).copied().unwrap_or(0);
        Some(count.saturating_sub(1))
    }
}

/// Every probe output the system knows, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "probe", rename_all = "snake_case")]
pub enum ProbeResult {
    Ping(PingResult),
    MultiPing(MultiPingResult),
    DnsLookup(DnsLookupResult),
    Signal(SignalReading),
    Interface(InterfaceStatus),
    Gateway(GatewayInfo),
    ArpTable(ArpTable),
    Traceroute(TracerouteResult),
    WifiScan(WifiScan),
}

impl ProbeResult {
    pub fn success(&self) -> bool {
        match self {
            ProbeResult::Ping(r) => r.success,
            ProbeResult::MultiPing(r) => r.success,
            ProbeResult::DnsLookup(r) => r.success,
            ProbeResult::Signal(r) => r.success,
            ProbeResult::Interface(r) => r.success,
            ProbeResult::Gateway(r) => r.success,
            ProbeResult::ArpTable(r) => r.success,
            ProbeResult::Traceroute(r) => r.success,
            ProbeResult::WifiScan(r) => r.success,
        }
    }

    pub fn error(&self) -> Option<&str> {
        let error = match self {
            ProbeResult::Ping(r) => &r.error,
            ProbeResult::MultiPing(r) => &r.error,
            ProbeResult::DnsLookup(r) => &r.error,
            ProbeResult::Signal(r) => &r.error,
            ProbeResult::Interface(r) => &r.error,
            ProbeResult::Gateway(r) => &r.error,
            ProbeResult::ArpTable(r) => &r.error,
            ProbeResult::Traceroute(r) => &r.error,
            ProbeResult::WifiScan(r) => &r.error,
        };
        error.as_deref()
    }
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

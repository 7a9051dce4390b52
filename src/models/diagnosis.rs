// Diagnostic tool results and the diagnosis produced from them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    ArpTable, DnsLookupResult, MultiPingResult, ProbeResult, Status, TracerouteResult, WifiScan,
};

/// The deeper probes run when triage is triggered, in their fixed run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticTool {
    PingMultiple,
    Traceroute,
    WifiScan,
    DnsCheck,
    ArpTable,
}

impl DiagnosticTool {
    pub const ORDER: [DiagnosticTool; 5] = [
        DiagnosticTool::PingMultiple,
        DiagnosticTool::Traceroute,
        DiagnosticTool::WifiScan,
        DiagnosticTool::DnsCheck,
        DiagnosticTool::ArpTable,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DiagnosticTool::PingMultiple => "ping_multiple",
            DiagnosticTool::Traceroute => "traceroute",
            DiagnosticTool::WifiScan => "wifi_scan",
            DiagnosticTool::DnsCheck => "dns_check",
            DiagnosticTool::ArpTable => "arp_table",
        }
    }

    /// Failed result of the right shape for this tool.
    pub fn failed(self, error: &str) -> ProbeResult {
        match self {
            DiagnosticTool::PingMultiple => ProbeResult::MultiPing(MultiPingResult::failed(error)),
            DiagnosticTool::Traceroute => {
                ProbeResult::Traceroute(TracerouteResult::failed(String::new(), error))
            }
            DiagnosticTool::WifiScan => ProbeResult::WifiScan(WifiScan::failed(String::new(), error)),
            DiagnosticTool::DnsCheck => {
                ProbeResult::DnsLookup(DnsLookupResult::failed(String::new(), None, error))
            }
            DiagnosticTool::ArpTable => ProbeResult::ArpTable(ArpTable::failed(error)),
        }
    }
}

/// Probe name -> structured output. Each entry succeeds or fails on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultSet {
    pub collected_at: DateTime<Utc>,
    pub ping_multiple: MultiPingResult,
    pub traceroute: TracerouteResult,
    pub wifi_scan: WifiScan,
    pub dns_check: DnsLookupResult,
    pub arp_table: ArpTable,
}

impl ToolResultSet {
    /// Every tool marked failed with the same reason.
    pub fn unavailable(collected_at: DateTime<Utc>, reason: &str) -> Self {
        Self {
            collected_at,
            ping_multiple: MultiPingResult::failed(reason),
            traceroute: TracerouteResult::failed(String::new(), reason),
            wifi_scan: WifiScan::failed(String::new(), reason),
            dns_check: DnsLookupResult::failed(String::new(), None, reason),
            arp_table: ArpTable::failed(reason),
        }
    }

    /// Slot a tool's result into its entry. A result of the wrong shape is recorded
    /// as a failure for that tool rather than dropped.
    pub fn insert(&mut self, tool: DiagnosticTool, result: ProbeResult) {
        match (tool, result) {
            (DiagnosticTool::PingMultiple, ProbeResult::MultiPing(r)) => self.ping_multiple = r,
            (DiagnosticTool::Traceroute, ProbeResult::Traceroute(r)) => self.traceroute = r,
            (DiagnosticTool::WifiScan, ProbeResult::WifiScan(r)) => self.wifi_scan = r,
            (DiagnosticTool::DnsCheck, ProbeResult::DnsLookup(r)) => self.dns_check = r,
            (DiagnosticTool::ArpTable, ProbeResult::ArpTable(r)) => self.arp_table = r,
            (tool, other) => {
                let reason = format!("unexpected {} result", probe_label(&other));
                self.insert(tool, tool.failed(&reason));
            }
        }
    }

    pub fn get(&self, tool: DiagnosticTool) -> ProbeResult {
        match tool {
            DiagnosticTool::PingMultiple => ProbeResult::MultiPing(self.ping_multiple.clone()),
            DiagnosticTool::Traceroute => ProbeResult::Traceroute(self.traceroute.clone()),
            DiagnosticTool::WifiScan => ProbeResult::WifiScan(self.wifi_scan.clone()),
            DiagnosticTool::DnsCheck => ProbeResult::DnsLookup(self.dns_check.clone()),
            DiagnosticTool::ArpTable => ProbeResult::ArpTable(self.arp_table.clone()),
        }
    }

    pub fn failed_tools(&self) -> Vec<DiagnosticTool> {
        DiagnosticTool::ORDER
            .into_iter()
            .filter(|t| !self.get(*t).success())
            .collect()
    }
}

fn probe_label(result: &ProbeResult) -> &'static str {
    match result {
        ProbeResult::Ping(_) => "ping",
        ProbeResult::MultiPing(_) => "multi-ping",
        ProbeResult::DnsLookup(_) => "dns",
        ProbeResult::Signal(_) => "signal",
        ProbeResult::Interface(_) => "interface",
        ProbeResult::Gateway(_) => "gateway",
        ProbeResult::ArpTable(_) => "arp",
        ProbeResult::Traceroute(_) => "traceroute",
        ProbeResult::WifiScan(_) => "wifi scan",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryIssue {
    HighLocalNetworkLatency,
    HighExternalLatency,
    ModerateNetworkDegradation,
    NetworkHealthy,
    NetworkStatusUnclear,
    NetworkDegradation,
}

impl PrimaryIssue {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimaryIssue::HighLocalNetworkLatency => "high_local_network_latency",
            PrimaryIssue::HighExternalLatency => "high_external_latency",
            PrimaryIssue::ModerateNetworkDegradation => "moderate_network_degradation",
            PrimaryIssue::NetworkHealthy => "network_healthy",
            PrimaryIssue::NetworkStatusUnclear => "network_status_unclear",
            PrimaryIssue::NetworkDegradation => "network_degradation",
        }
    }
}

impl std::fmt::Display for PrimaryIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Root-cause conclusion. Evidence and recommendations are in evaluation order,
/// most load-bearing first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub timestamp: DateTime<Utc>,
    pub alert_status: Status,
    pub primary_issue: PrimaryIssue,
    pub root_cause: String,
    pub confidence: Confidence,
    pub evidence: Vec<String>,
    pub recommendations: Vec<String>,
    pub diagnostic_data: ToolResultSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_health_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_explanation: Option<String>,
}

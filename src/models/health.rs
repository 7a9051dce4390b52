// Snapshot and health classification models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DnsLookupResult, GatewayInfo, InterfaceStatus, PingResult, SignalReading};

/// One metric-collection pass. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub ping: PingResult,
    pub dns: DnsLookupResult,
    pub signal: SignalReading,
    pub interface: InterfaceStatus,
    pub gateway: GatewayInfo,
}

impl Snapshot {
    /// Signal strength, only when the signal probe succeeded.
    pub fn signal_dbm(&self) -> Option<i32> {
        self.signal.signal_dbm.filter(|_| self.signal.success)
    }

    pub fn gateway_ip(&self) -> Option<&str> {
        self.gateway
            .gateway_ip
            .as_deref()
            .filter(|_| self.gateway.success)
    }
}

/// Coarse health; serializes lowercase (e.g. "degraded").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Healthy,
    Degraded,
    Unhealthy,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Healthy => "healthy",
            Status::Degraded => "degraded",
            Status::Unhealthy => "unhealthy",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Connectivity,
    Dns,
    Interface,
    Latency,
    PacketLoss,
    Signal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
}

/// A classifier finding. Critical findings are issues, the rest are warnings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthIssue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl HealthIssue {
    pub fn critical(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Critical,
            message: message.into(),
            value: None,
        }
    }

    pub fn warning(kind: IssueKind, message: impl Into<String>, value: f64) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            message: message.into(),
            value: Some(value),
        }
    }
}

/// Status paired with the snapshot that produced it (the alert handed to the diagnoser).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthAssessment {
    pub timestamp: DateTime<Utc>,
    pub status: Status,
    pub issues: Vec<HealthIssue>,
    pub warnings: Vec<HealthIssue>,
    pub metrics: Snapshot,
}

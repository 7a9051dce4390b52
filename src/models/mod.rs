// Domain models: probe records, snapshots, health and diagnosis

mod diagnosis;
mod health;
mod probe;

pub use diagnosis::{Confidence, Diagnosis, DiagnosticTool, PrimaryIssue, ToolResultSet};
pub use health::{HealthAssessment, HealthIssue, IssueKind, Severity, Snapshot, Status};
pub(crate) use probe::round2;
pub use probe::{
    ArpEntry, ArpTable, DnsLookupResult, GatewayInfo, InterfaceCounters, InterfaceStatus,
    MultiPingResult, PingResult, PingStats, ProbeResult, SignalQuality, SignalReading,
    TIMEOUT_HOST, TracerouteHop, TracerouteResult, WifiNetwork, WifiScan,
};

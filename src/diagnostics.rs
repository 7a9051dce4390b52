// Deeper probes run when triage is triggered.

use chrono::Utc;
use futures_util::StreamExt;
use futures_util::stream;
use tracing::{info, instrument, warn};

use crate::config::NetworkConfig;
use crate::error::ProbeError;
use crate::models::{DiagnosticTool, ProbeResult, ToolResultSet};
use crate::probes::NetworkProbes;

pub struct DiagnosticRunner {
    probes: NetworkProbes,
    network: NetworkConfig,
}

impl DiagnosticRunner {
    pub fn new(probes: NetworkProbes, network: NetworkConfig) -> Self {
        Self { probes, network }
    }

    /// Run every diagnostic tool for `interface`, resolving the gateway first.
    pub async fn run(&self, interface: &str) -> ToolResultSet {
        self.run_with(interface, None, None).await
    }

    /// Run every diagnostic tool. `gateway` and `current_channel` are reused from the
    /// triggering snapshot when known.
    ///
    /// Tools run concurrently (bounded by `max_concurrent_probes`) but results are
    /// assembled in the fixed tool order. Anything still running when the cycle budget
    /// expires is dropped, which kills its process, and recorded as cancelled.
    #[instrument(skip(self), fields(operation = "diagnostics"))]
    pub async fn run_with(
        &self,
        interface: &str,
        gateway: Option<&str>,
        current_channel: Option<u32>,
    ) -> ToolResultSet {
        let collected_at = Utc::now();
        let config = self.probes.config();
        let deadline = tokio::time::Instant::now() + config.cycle_budget();
        let cancelled = ProbeError::Cancelled.to_string();

        let gateway = match gateway {
            Some(gw) => Some(gw.to_string()),
            None => tokio::time::timeout_at(deadline, self.probes.gateway(interface))
                .await
                .ok()
                .and_then(|info| info.gateway_ip),
        };

        let results: Vec<(DiagnosticTool, ProbeResult)> = stream::iter(DiagnosticTool::ORDER)
            .map(|tool| {
                let gateway = gateway.as_deref();
                let cancelled = cancelled.as_str();
                async move {
                    let run = self.run_tool(tool, interface, gateway, current_channel);
                    let result = match tokio::time::timeout_at(deadline, run).await {
                        Ok(result) => result,
                        Err(_) => {
                            warn!(tool = tool.name(), "diagnostic probe cancelled");
                            tool.failed(cancelled)
                        }
                    };
                    (tool, result)
                }
            })
            .buffered(config.max_concurrent_probes.max(1))
            .collect()
            .await;

        let mut set = ToolResultSet::unavailable(collected_at, "not run");
        for (tool, result) in results {
            set.insert(tool, result);
        }

        let failed: Vec<&str> = set.failed_tools().into_iter().map(|t| t.name()).collect();
        info!(
            failed = failed.len(),
            failed_tools = ?failed,
            gateway = gateway.as_deref().unwrap_or("none"),
            "diagnostics complete"
        );
        set
    }

    async fn run_tool(
        &self,
        tool: DiagnosticTool,
        interface: &str,
        gateway: Option<&str>,
        current_channel: Option<u32>,
    ) -> ProbeResult {
        match tool {
            DiagnosticTool::PingMultiple => ProbeResult::MultiPing(
                self.probes
                    .ping_multiple(gateway, &self.network.public_targets)
                    .await,
            ),
            DiagnosticTool::Traceroute => ProbeResult::Traceroute(
                self.probes
                    .traceroute(
                        &self.network.traceroute_target,
                        self.network.traceroute_max_hops,
                    )
                    .await,
            ),
            DiagnosticTool::WifiScan => ProbeResult::WifiScan(
                self.probes.wifi_scan(interface, current_channel).await,
            ),
            // Latency of the local resolver (the router) rather than the system default.
            DiagnosticTool::DnsCheck => ProbeResult::DnsLookup(
                self.probes
                    .dns_lookup(&self.network.dns_domain, gateway)
                    .await,
            ),
            DiagnosticTool::ArpTable => ProbeResult::ArpTable(self.probes.arp_table().await),
        }
    }
}

// Network probes: one external tool call each, folded into a success/error record.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, instrument, warn};

use super::{CommandRunner, ProbeCommand};
use crate::config::ProbeConfig;
use crate::error::{ParseError, ProbeError};
use crate::models::*;
use crate::parsers;

/// Target label used when the router could not be pinged for lack of a gateway.
pub const ROUTER_TARGET: &str = "router";

#[derive(Clone)]
pub struct NetworkProbes {
    runner: Arc<dyn CommandRunner>,
    config: ProbeConfig,
}

impl NetworkProbes {
    pub fn new(runner: Arc<dyn CommandRunner>, config: ProbeConfig) -> Self {
        Self { runner, config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Run a command and return whatever text it printed. Tools that exit non-zero
    /// (ping with total loss, `ip` on a missing device) still print something worth
    /// parsing; only a silent failure is an error.
    async fn exec(&self, command: ProbeCommand) -> Result<String, ProbeError> {
        let output = self.runner.run(&command).await?;
        if !output.stdout.trim().is_empty() {
            return Ok(output.stdout);
        }
        if output.success() {
            return Ok(output.stdout);
        }
        if !output.stderr.trim().is_empty() {
            return Ok(output.stderr);
        }
        Err(ProbeError::Exit {
            code: output.exit_code.unwrap_or(-1),
            stderr: output.stderr,
        })
    }

    fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.config.command_timeout_secs)
    }

    #[instrument(skip(self), fields(probe = "ping", operation = "ping"))]
    pub async fn ping(&self, target: &str, count: u32) -> PingResult {
        let command = ProbeCommand::new(
            "ping",
            [
                "-c".to_string(),
                count.to_string(),
                "-W".to_string(),
                self.config.ping_timeout_secs.to_string(),
                target.to_string(),
            ],
            self.config.ping_command_timeout(count),
        );
        match self.exec(command).await {
            Ok(output) => match parsers::parse_ping(&output) {
                Ok(stats) => PingResult::from_stats(target, &stats),
                Err(e) => {
                    debug!(error = %e, target, "ping output not understood");
                    PingResult::failed(target, unparseable("ping", &e))
                }
            },
            Err(e) => {
                warn!(error = %e, target, operation = "ping", "probe failed");
                PingResult::failed(target, e.to_string())
            }
        }
    }

    /// Resolve `domain` with dig; `server: None` uses the system resolver.
    #[instrument(skip(self), fields(probe = "dns", operation = "dns_lookup"))]
    pub async fn dns_lookup(&self, domain: &str, server: Option<&str>) -> DnsLookupResult {
        let mut args = vec![
            "+tries=1".to_string(),
            format!("+time={}", self.config.dns_timeout_secs),
        ];
        if let Some(server) = server {
            args.push(format!("@{server}"));
        }
        args.push(domain.to_string());
        args.push("A".to_string());
        let command = ProbeCommand::new(
            "dig",
            args,
            Duration::from_secs(self.config.dns_timeout_secs + 1),
        );
        let server_label = server.map(str::to_string);
        match self.exec(command).await {
            Ok(output) => parsers::parse_dig(domain, server, &output).unwrap_or_else(|e| {
                debug!(error = %e, domain, "dig output rejected");
                DnsLookupResult::failed(domain, server_label, e.to_string())
            }),
            Err(e) => {
                warn!(error = %e, domain, operation = "dns_lookup", "probe failed");
                DnsLookupResult::failed(domain, server_label, e.to_string())
            }
        }
    }

    #[instrument(skip(self), fields(probe = "signal", operation = "signal"))]
    pub async fn signal(&self, interface: &str) -> SignalReading {
        let command = ProbeCommand::new("iwconfig", [interface], self.command_timeout());
        match self.exec(command).await {
            Ok(output) => parsers::parse_iwconfig(interface, &output).unwrap_or_else(|e| {
                debug!(error = %e, interface, "no signal reading");
                SignalReading::failed(interface, e.to_string())
            }),
            Err(e) => {
                warn!(error = %e, interface, operation = "signal", "probe failed");
                SignalReading::failed(interface, e.to_string())
            }
        }
    }

    #[instrument(skip(self), fields(probe = "interface", operation = "interface_status"))]
    pub async fn interface_status(&self, interface: &str) -> InterfaceStatus {
        let command = ProbeCommand::new(
            "ip",
            ["-s", "link", "show", interface],
            self.command_timeout(),
        );
        match self.exec(command).await {
            Ok(output) => parsers::parse_ip_link(interface, &output).unwrap_or_else(|e| {
                debug!(error = %e, interface, "link status not understood");
                InterfaceStatus::failed(interface, e.to_string())
            }),
            Err(e) => {
                warn!(error = %e, interface, operation = "interface_status", "probe failed");
                InterfaceStatus::failed(interface, e.to_string())
            }
        }
    }

    #[instrument(skip(self), fields(probe = "gateway", operation = "gateway"))]
    pub async fn gateway(&self, interface: &str) -> GatewayInfo {
        let command = ProbeCommand::new(
            "ip",
            ["route", "show", "default"],
            self.command_timeout(),
        );
        match self.exec(command).await {
            Ok(output) => parsers::parse_default_route(&output, interface).unwrap_or_else(|e| {
                debug!(error = %e, "no default gateway");
                GatewayInfo::failed(e.to_string())
            }),
            Err(e) => {
                warn!(error = %e, operation = "gateway", "probe failed");
                GatewayInfo::failed(e.to_string())
            }
        }
    }

    /// Ping the router (when a gateway is known) and every public target concurrently.
    /// Results keep the router first, then `targets` in order.
    #[instrument(skip(self, targets), fields(probe = "ping_multiple", operation = "ping_multiple"))]
    pub async fn ping_multiple(&self, gateway: Option<&str>, targets: &[String]) -> MultiPingResult {
        let count = self.config.diagnostic_ping_count;
        let router = async {
            match gateway {
                Some(gw) => self.ping(gw, count).await,
                None => PingResult::failed(ROUTER_TARGET, "No default gateway found"),
            }
        };
        let public = join_all(targets.iter().map(|t| self.ping(t, count)));
        let (router, public) = tokio::join!(router, public);

        let mut results = Vec::with_capacity(targets.len() + 1);
        results.push(router);
        results.extend(public);
        let success = results.iter().any(|r| r.success);
        MultiPingResult {
            success,
            error: (!success).then(|| "no target answered".to_string()),
            gateway: gateway.map(str::to_string),
            results,
        }
    }

    #[instrument(skip(self), fields(probe = "traceroute", operation = "traceroute"))]
    pub async fn traceroute(&self, target: &str, max_hops: u32) -> TracerouteResult {
        let command = ProbeCommand::new(
            "traceroute",
            [
                "-m".to_string(),
                max_hops.to_string(),
                "-w".to_string(),
                "2".to_string(),
                "-q".to_string(),
                "1".to_string(),
                target.to_string(),
            ],
            Duration::from_secs(self.config.traceroute_timeout_secs),
        );
        match self.exec(command).await {
            Ok(output) => match parsers::parse_traceroute(&output) {
                Ok(hops) => TracerouteResult::from_hops(target, hops),
                Err(e) => {
                    debug!(error = %e, target, "traceroute output not understood");
                    TracerouteResult::failed(target, unparseable("traceroute", &e))
                }
            },
            Err(e) => {
                warn!(error = %e, target, operation = "traceroute", "probe failed");
                TracerouteResult::failed(target, e.to_string())
            }
        }
    }

    /// Channel scan. `current_channel` is where the monitored interface is associated.
    #[instrument(skip(self), fields(probe = "wifi_scan", operation = "wifi_scan"))]
    pub async fn wifi_scan(&self, interface: &str, current_channel: Option<u32>) -> WifiScan {
        let command = ProbeCommand::new(
            "iwlist",
            [interface, "scan"],
            Duration::from_secs(self.config.wifi_scan_timeout_secs),
        );
        match self.exec(command).await {
            Ok(output) => match parsers::parse_wifi_scan(&output) {
                Ok(networks) => parsers::summarize_scan(interface, networks, current_channel),
                Err(e) => {
                    debug!(error = %e, interface, "scan output rejected");
                    WifiScan::failed(interface, e.to_string())
                }
            },
            Err(e) => {
                warn!(error = %e, interface, operation = "wifi_scan", "probe failed");
                WifiScan::failed(interface, e.to_string())
            }
        }
    }

    #[instrument(skip(self), fields(probe = "arp", operation = "arp_table"))]
    pub async fn arp_table(&self) -> ArpTable {
        let command = ProbeCommand::new("arp", ["-n"], self.command_timeout());
        match self.exec(command).await {
            Ok(output) => match parsers::parse_arp(&output) {
                Ok(entries) => ArpTable::from_entries(entries),
                Err(e) => {
                    debug!(error = %e, "arp output not understood");
                    ArpTable::failed(unparseable("arp", &e))
                }
            },
            Err(e) => {
                warn!(error = %e, operation = "arp_table", "probe failed");
                ArpTable::failed(e.to_string())
            }
        }
    }
}

fn unparseable(tool: &str, e: &ParseError) -> String {
    format!("unparseable {tool} output: {e}")
}

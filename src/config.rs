use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub network: NetworkConfig,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub probes: ProbeConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8085,
            host: "0.0.0.0".into(),
        }
    }
}

/// What to probe. `interface` has no default: running without one is a startup error.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub interface: String,
    #[serde(default = "default_ping_target")]
    pub ping_target: String,
    #[serde(default = "default_dns_domain")]
    pub dns_domain: String,
    /// Public hosts pinged alongside the router during diagnosis.
    #[serde(default = "default_public_targets")]
    pub public_targets: Vec<String>,
    #[serde(default = "default_ping_target")]
    pub traceroute_target: String,
    #[serde(default = "default_traceroute_max_hops")]
    pub traceroute_max_hops: u32,
}

fn default_ping_target() -> String {
    "8.8.8.8".into()
}

fn default_dns_domain() -> String {
    "google.com".into()
}

fn default_public_targets() -> Vec<String> {
    vec!["8.8.8.8".into(), "1.1.1.1".into()]
}

fn default_traceroute_max_hops() -> u32 {
    15
}

/// Health classifier limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub max_latency_ms: f64,
    /// Percent.
    pub max_packet_loss: f64,
    pub min_signal_dbm: i32,
    /// DNS answers slower than this raise a warning.
    pub dns_slow_ms: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_latency_ms: 200.0,
            max_packet_loss: 20.0,
            min_signal_dbm: -80,
            dns_slow_ms: 5000.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub ping_count: u32,
    /// Per-reply wait passed to `ping -W`.
    pub ping_timeout_secs: u64,
    pub dns_timeout_secs: u64,
    /// Signal, interface, gateway and ARP commands.
    pub command_timeout_secs: u64,
    pub diagnostic_ping_count: u32,
    pub traceroute_timeout_secs: u64,
    pub wifi_scan_timeout_secs: u64,
    /// Wall-clock budget for the whole diagnostic stage; probes still running are cancelled.
    pub cycle_budget_secs: u64,
    pub max_concurrent_probes: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ping_count: 3,
            ping_timeout_secs: 2,
            dns_timeout_secs: 2,
            command_timeout_secs: 5,
            diagnostic_ping_count: 5,
            traceroute_timeout_secs: 30,
            wifi_scan_timeout_secs: 10,
            cycle_budget_secs: 60,
            max_concurrent_probes: 3,
        }
    }
}

impl ProbeConfig {
    /// Whole-command timeout for a ping run of `count` packets.
    pub fn ping_command_timeout(&self, count: u32) -> Duration {
        Duration::from_secs(self.ping_timeout_secs * u64::from(count.max(1)) + 2)
    }

    pub fn cycle_budget(&self) -> Duration {
        Duration::from_secs(self.cycle_budget_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub check_interval_secs: u64,
    /// Snapshots retained for trend display.
    pub history_capacity: usize,
    pub stats_log_interval_secs: u64,
    /// Assessments buffered for /ws/status (slow clients may lag).
    pub broadcast_capacity: usize,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 30,
            history_capacity: 100,
            stats_log_interval_secs: 300,
            broadcast_capacity: 16,
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.network.interface.trim().is_empty(),
            "network.interface must be non-empty"
        );
        anyhow::ensure!(
            !self.network.ping_target.trim().is_empty(),
            "network.ping_target must be non-empty"
        );
        anyhow::ensure!(
            !self.network.dns_domain.trim().is_empty(),
            "network.dns_domain must be non-empty"
        );
        anyhow::ensure!(
            self.network.traceroute_max_hops > 0,
            "network.traceroute_max_hops must be > 0, got {}",
            self.network.traceroute_max_hops
        );
        anyhow::ensure!(
            self.thresholds.max_latency_ms > 0.0,
            "thresholds.max_latency_ms must be > 0, got {}",
            self.thresholds.max_latency_ms
        );
        anyhow::ensure!(
            (0.0..=100.0).contains(&self.thresholds.max_packet_loss),
            "thresholds.max_packet_loss must be within 0..=100, got {}",
            self.thresholds.max_packet_loss
        );
        anyhow::ensure!(
            self.thresholds.min_signal_dbm < 0,
            "thresholds.min_signal_dbm must be negative, got {}",
            self.thresholds.min_signal_dbm
        );
        anyhow::ensure!(
            self.probes.ping_count > 0,
            "probes.ping_count must be > 0, got {}",
            self.probes.ping_count
        );
        anyhow::ensure!(
            self.probes.diagnostic_ping_count > 0,
            "probes.diagnostic_ping_count must be > 0, got {}",
            self.probes.diagnostic_ping_count
        );
        anyhow::ensure!(
            self.probes.ping_timeout_secs > 0,
            "probes.ping_timeout_secs must be > 0, got {}",
            self.probes.ping_timeout_secs
        );
        anyhow::ensure!(
            self.probes.dns_timeout_secs > 0,
            "probes.dns_timeout_secs must be > 0, got {}",
            self.probes.dns_timeout_secs
        );
        anyhow::ensure!(
            self.probes.command_timeout_secs > 0,
            "probes.command_timeout_secs must be > 0, got {}",
            self.probes.command_timeout_secs
        );
        anyhow::ensure!(
            self.probes.cycle_budget_secs > 0,
            "probes.cycle_budget_secs must be > 0, got {}",
            self.probes.cycle_budget_secs
        );
        anyhow::ensure!(
            self.probes.max_concurrent_probes > 0,
            "probes.max_concurrent_probes must be > 0, got {}",
            self.probes.max_concurrent_probes
        );
        anyhow::ensure!(
            self.monitoring.check_interval_secs > 0,
            "monitoring.check_interval_secs must be > 0, got {}",
            self.monitoring.check_interval_secs
        );
        anyhow::ensure!(
            self.monitoring.history_capacity > 0,
            "monitoring.history_capacity must be > 0, got {}",
            self.monitoring.history_capacity
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.monitoring.broadcast_capacity > 0,
            "monitoring.broadcast_capacity must be > 0, got {}",
            self.monitoring.broadcast_capacity
        );
        Ok(())
    }
}

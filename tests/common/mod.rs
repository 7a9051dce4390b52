// Shared test helpers: a scripted command runner, canned tool output, and fixtures.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use netsentinel::config::AppConfig;
use netsentinel::error::ProbeError;
use netsentinel::models::*;
use netsentinel::probes::{CommandOutput, CommandRunner, ProbeCommand};
use std::sync::Mutex;
use std::time::Duration;

pub const GATEWAY: &str = "192.168.1.1";

pub const TEST_CONFIG: &str = r#"
[server]
port = 8085
host = "127.0.0.1"

[network]
interface = "wlan0"
ping_target = "8.8.8.8"
dns_domain = "google.com"
public_targets = ["8.8.8.8", "1.1.1.1"]
traceroute_target = "8.8.8.8"

[probes]
cycle_budget_secs = 60
max_concurrent_probes = 3

[monitoring]
check_interval_secs = 30
history_capacity = 5
stats_log_interval_secs = 300
broadcast_capacity = 8
"#;

pub fn test_app_config() -> AppConfig {
    AppConfig::load_from_str(TEST_CONFIG).unwrap()
}

#[derive(Debug, Clone)]
pub enum Scripted {
    Output(CommandOutput),
    Fail(ProbeError),
    /// Sleep (tokio time) before answering.
    Delayed(Duration, CommandOutput),
}

/// Answers commands from a script. A rule matches when every token of its pattern
/// appears in the command line; the first matching rule wins. Unscripted commands
/// fail as if the binary were missing.
#[derive(Default)]
pub struct FakeRunner {
    rules: Mutex<Vec<(Vec<String>, Scripted)>>,
    calls: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, pattern: &str, response: Scripted) -> Self {
        let tokens = pattern.split_whitespace().map(str::to_string).collect();
        self.rules.lock().unwrap().push((tokens, response));
        self
    }

    pub fn ok(self, pattern: &str, stdout: impl Into<String>) -> Self {
        self.on(pattern, Scripted::Output(CommandOutput::ok(stdout)))
    }

    /// Append `other`'s rules after ours, so ours take precedence.
    pub fn merge(self, other: FakeRunner) -> Self {
        let rules = other.rules.into_inner().unwrap();
        self.rules.lock().unwrap().extend(rules);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, pattern: &str) -> bool {
        self.calls()
            .iter()
            .any(|c| pattern.split_whitespace().all(|t| c.split_whitespace().any(|a| a == t)))
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, command: &ProbeCommand) -> Result<CommandOutput, ProbeError> {
        let line = command.command_line();
        self.calls.lock().unwrap().push(line.clone());
        let response = {
            let rules = self.rules.lock().unwrap();
            let words: Vec<&str> = line.split_whitespace().collect();
            rules
                .iter()
                .find(|(tokens, _)| tokens.iter().all(|t| words.contains(&t.as_str())))
                .map(|(_, r)| r.clone())
        };
        match response {
            Some(Scripted::Output(out)) => Ok(out),
            Some(Scripted::Fail(e)) => Err(e),
            Some(Scripted::Delayed(delay, out)) => {
                tokio::time::sleep(delay).await;
                Ok(out)
            }
            None => Err(ProbeError::Spawn {
                program: command.program.clone(),
                reason: "No such file or directory (os error 2)".into(),
            }),
        }
    }
}

// --- canned tool output ---

pub fn ping_output(target: &str, avg_ms: f64) -> String {
    format!(
        "PING {target} ({target}) 56(84) bytes of data.\n\
         64 bytes from {target}: icmp_seq=1 ttl=117 time={avg_ms} ms\n\
         64 bytes from {target}: icmp_seq=2 ttl=117 time={avg_ms} ms\n\
         64 bytes from {target}: icmp_seq=3 ttl=117 time={avg_ms} ms\n\
         \n\
         --- {target} ping statistics ---\n\
         3 packets transmitted, 3 received, 0% packet loss, time 2003ms\n\
         rtt min/avg/max/mdev = {avg_ms}/{avg_ms}/{avg_ms}/0.000 ms\n"
    )
}

pub fn ping_unreachable(target: &str) -> CommandOutput {
    CommandOutput {
        stdout: format!(
            "PING {target} ({target}) 56(84) bytes of data.\n\n\
             --- {target} ping statistics ---\n\
             3 packets transmitted, 0 received, 100% packet loss, time 2040ms\n"
        ),
        stderr: String::new(),
        exit_code: Some(1),
    }
}

pub fn dig_output(domain: &str, ip: &str, ms: u32, server: &str) -> String {
    format!(
        "; <<>> DiG 9.18.24 <<>> +tries=1 +time=2 {domain} A\n\
         ;; Got answer:\n\
         ;; ->>HEADER<<- opcode: QUERY, status: NOERROR, id: 1337\n\
         ;; flags: qr rd ra; QUERY: 1, ANSWER: 1, AUTHORITY: 0, ADDITIONAL: 1\n\
         \n\
         ;; ANSWER SECTION:\n\
         {domain}.\t\t300\tIN\tA\t{ip}\n\
         \n\
         ;; Query time: {ms} msec\n\
         ;; SERVER: {server}#53({server}) (UDP)\n"
    )
}

pub fn iwconfig_output(interface: &str, dbm: i32) -> String {
    format!(
        "{interface}     IEEE 802.11  ESSID:\"HomeNet\"\n\
         \x20         Mode:Managed  Frequency:2.437 GHz  Access Point: AA:BB:CC:00:00:01\n\
         \x20         Link Quality=50/70  Signal level={dbm} dBm\n"
    )
}

pub fn ip_link_output(interface: &str, up: bool) -> String {
    let (flags, state) = if up {
        ("BROADCAST,MULTICAST,UP,LOWER_UP", "UP")
    } else {
        ("NO-CARRIER,BROADCAST,MULTICAST,UP", "DOWN")
    };
    format!(
        "3: {interface}: <{flags}> mtu 1500 qdisc fq_codel state {state} mode DORMANT group default qlen 1000\n\
         \x20   link/ether b8:27:eb:12:34:56 brd ff:ff:ff:ff:ff:ff\n\
         \x20   RX:  bytes packets errors dropped  missed   mcast\n\
         \x20     5000000    4000      0       2       0       0\n\
         \x20   TX:  bytes packets errors dropped carrier collsns\n\
         \x20     1000000    3000      0       0       0       0\n"
    )
}

pub fn route_output(gateway: &str, interface: &str) -> String {
    format!("default via {gateway} dev {interface} proto dhcp metric 600\n")
}

pub fn traceroute_output() -> String {
    "traceroute to 8.8.8.8 (8.8.8.8), 15 hops max, 60 byte packets\n\
     \x201  router.lan (192.168.1.1)  2.811 ms\n\
     \x202  *\n\
     \x203  dns.google (8.8.8.8)  18.204 ms\n"
        .to_string()
}

/// `count` networks, all on channel 6 except every third on channel 11.
pub fn iwlist_output(interface: &str, count: usize) -> String {
    let mut out = format!("{interface}     Scan completed :\n");
    for i in 0..count {
        let channel = if i % 3 == 2 { 11 } else { 6 };
        out.push_str(&format!(
            "          Cell {:02} - Address: AA:BB:CC:00:00:{:02X}\n\
             \x20                   Channel:{channel}\n\
             \x20                   Quality=40/70  Signal level=-{} dBm\n\
             \x20                   ESSID:\"Net{i}\"\n",
            i + 1,
            i,
            60 + (i % 20)
        ));
    }
    out
}

pub fn arp_output() -> String {
    "Address                  HWtype  HWaddress           Flags Mask            Iface\n\
     192.168.1.1              ether   aa:bb:cc:dd:ee:01   C                     wlan0\n\
     192.168.1.23                     (incomplete)                              wlan0\n"
        .to_string()
}

/// Every probe scripted with a healthy answer. Router and public latencies as given.
pub fn healthy_network(router_ms: f64, internet_ms: f64, signal_dbm: i32) -> FakeRunner {
    FakeRunner::new()
        .ok("ip route show default", route_output(GATEWAY, "wlan0"))
        .ok("ip link show wlan0", ip_link_output("wlan0", true))
        .ok("iwconfig wlan0", iwconfig_output("wlan0", signal_dbm))
        .ok("iwlist wlan0 scan", iwlist_output("wlan0", 4))
        .ok("arp -n", arp_output())
        .ok("traceroute 8.8.8.8", traceroute_output())
        .ok(
            "dig @192.168.1.1 google.com",
            dig_output("google.com", "142.250.72.14", 12, GATEWAY),
        )
        .ok(
            "dig google.com",
            dig_output("google.com", "142.250.72.14", 25, "127.0.0.53"),
        )
        .ok(&format!("ping {GATEWAY}"), ping_output(GATEWAY, router_ms))
        .ok("ping 8.8.8.8", ping_output("8.8.8.8", internet_ms))
        .ok("ping 1.1.1.1", ping_output("1.1.1.1", internet_ms))
}

// --- direct model fixtures ---

pub fn fixed_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap()
}

pub fn ping_ok(target: &str, latency_ms: f64) -> PingResult {
    PingResult {
        target: target.into(),
        success: true,
        error: None,
        latency_ms: Some(latency_ms),
        min_rtt_ms: Some(latency_ms),
        max_rtt_ms: Some(latency_ms),
        packet_loss: Some(0.0),
    }
}

pub fn signal_reading(dbm: i32) -> SignalReading {
    SignalReading {
        interface: "wlan0".into(),
        success: true,
        error: None,
        signal_dbm: Some(dbm),
        quality: Some(SignalQuality::from_dbm(dbm)),
        essid: Some("HomeNet".into()),
        link_quality: None,
        frequency_ghz: Some(2.437),
        channel: Some(6),
    }
}

pub fn dns_ok(latency_ms: f64) -> DnsLookupResult {
    DnsLookupResult {
        domain: "google.com".into(),
        server: None,
        success: true,
        error: None,
        latency_ms: Some(latency_ms),
        resolved_ip: Some("142.250.72.14".into()),
    }
}

/// Healthy snapshot: 20ms ping, 25ms DNS, -55dBm, link up, gateway known.
pub fn healthy_snapshot() -> Snapshot {
    Snapshot {
        timestamp: fixed_time(),
        ping: ping_ok("8.8.8.8", 20.0),
        dns: dns_ok(25.0),
        signal: signal_reading(-55),
        interface: InterfaceStatus {
            interface: "wlan0".into(),
            up: true,
            success: true,
            error: None,
            counters: Some(InterfaceCounters::default()),
        },
        gateway: GatewayInfo {
            success: true,
            error: None,
            gateway_ip: Some(GATEWAY.into()),
            interface: Some("wlan0".into()),
        },
    }
}

/// Diagnostic results with a router ping and two public pings.
pub fn tool_results(router_ms: f64, internet_ms: f64) -> ToolResultSet {
    let mut set = ToolResultSet::unavailable(fixed_time(), "not run");
    set.ping_multiple = MultiPingResult {
        success: true,
        error: None,
        gateway: Some(GATEWAY.into()),
        results: vec![
            ping_ok(GATEWAY, router_ms),
            ping_ok("8.8.8.8", internet_ms),
            ping_ok("1.1.1.1", internet_ms),
        ],
    };
    set
}

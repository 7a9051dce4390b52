// Wireless tool output: `iwlist <if> scan` cells and `iwconfig <if>` link status.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::error::ParseError;
use crate::models::{SignalQuality, SignalReading, WifiNetwork, WifiScan};

fn signal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Signal level[=:]\s*(-?\d+)\s*dBm").unwrap())
}

fn link_quality_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:Link )?Quality[=:](\d+/\d+)").unwrap())
}

fn frequency_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Frequency[=:]\s*([\d.]+)\s*GHz").unwrap())
}

fn essid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"ESSID:"([^"]*)""#).unwrap())
}

/// Split scan output into cells. Output with no cells is an empty scan, not a failure,
/// unless the driver refused to scan.
pub fn parse_wifi_scan(output: &str) -> Result<Vec<WifiNetwork>, ParseError> {
    if output.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    if !output.contains("Cell ") {
        let lowered = output.to_lowercase();
        if lowered.contains("doesn't support scanning")
            || lowered.contains("not permitted")
            || lowered.contains("no such device")
        {
            let first = output.lines().next().unwrap_or_default().trim();
            return Err(ParseError::Rejected(first.to_string()));
        }
        return Ok(vec![]);
    }

    let mut networks = Vec::new();
    let mut current: Option<WifiNetwork> = None;
    for line in output.lines() {
        let line = line.trim();
        if line.starts_with("Cell ") && line.contains("Address") {
            if let Some(done) = current.take() {
                networks.push(done);
            }
            current = Some(WifiNetwork {
                ssid: None,
                channel: None,
                signal_dbm: None,
            });
            continue;
        }
        let Some(network) = current.as_mut() else {
            continue;
        };
        if let Some(channel) = line.strip_prefix("Channel:") {
            network.channel = channel.trim().parse().ok().or(network.channel);
        } else if line.starts_with("Frequency:") && network.channel.is_none() {
            network.channel = line
                .split("(Channel ")
                .nth(1)
                .and_then(|rest| rest.trim_end_matches(')').trim().parse().ok());
        }
        if let Some(c) = signal_re().captures(line) {
            network.signal_dbm = c[1].parse().ok();
        }
        if let Some(c) = essid_re().captures(line) {
            network.ssid = Some(c[1].to_string()).filter(|s| !s.is_empty());
        }
    }
    if let Some(done) = current {
        networks.push(done);
    }
    Ok(networks)
}

/// channel -> number of networks on it
pub fn channel_congestion(networks: &[WifiNetwork]) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for channel in networks.iter().filter_map(|n| n.channel) {
        *counts.entry(channel).or_insert(0) += 1;
    }
    counts
}

/// Busiest channels first; ties go to the lower channel number.
pub fn most_congested(congestion: &BTreeMap<u32, usize>, n: usize) -> Vec<u32> {
    let mut ranked: Vec<(u32, usize)> = congestion.iter().map(|(c, n)| (*c, *n)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.into_iter().take(n).map(|(c, _)| c).collect()
}

pub fn summarize_scan(
    interface: &str,
    networks: Vec<WifiNetwork>,
    current_channel: Option<u32>,
) -> WifiScan {
    let congestion = channel_congestion(&networks);
    WifiScan {
        interface: interface.to_string(),
        success: true,
        error: None,
        networks_found: networks.len(),
        most_congested: most_congested(&congestion, 2),
        channel_congestion: congestion,
        networks,
        current_channel,
    }
}

/// Parse `iwconfig <interface>`. Missing signal level (not associated, no wireless
/// extensions) is a parse failure.
pub fn parse_iwconfig(interface: &str, output: &str) -> Result<SignalReading, ParseError> {
    if output.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    if output.contains("no wireless extensions") {
        return Err(ParseError::Rejected(format!(
            "{interface} has no wireless extensions"
        )));
    }
    let signal_dbm: i32 = signal_re()
        .captures(output)
        .and_then(|c| c[1].parse().ok())
        .ok_or(ParseError::Missing("signal level"))?;

    let frequency_ghz: Option<f64> = frequency_re()
        .captures(output)
        .and_then(|c| c[1].parse().ok());

    Ok(SignalReading {
        interface: interface.to_string(),
        success: true,
        error: None,
        signal_dbm: Some(signal_dbm),
        quality: Some(SignalQuality::from_dbm(signal_dbm)),
        essid: essid_re()
            .captures(output)
            .map(|c| c[1].to_string())
            .filter(|s| !s.is_empty()),
        link_quality: link_quality_re().captures(output).map(|c| c[1].to_string()),
        frequency_ghz,
        channel: frequency_ghz.and_then(channel_from_ghz),
    })
}

/// 2.4 GHz and 5 GHz band channel numbering.
pub fn channel_from_ghz(ghz: f64) -> Option<u32> {
    let mhz = (ghz * 1000.0).round() as u32;
    match mhz {
        2484 => Some(14),
        2412..=2472 => Some((mhz - 2407) / 5),
        5160..=5885 => Some((mhz - 5000) / 5),
        _ => None,
    }
}

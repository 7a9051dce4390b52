// iproute2 output: `ip -s link show <if>` and `ip route show default`.

use crate::error::ParseError;
use crate::models::{GatewayInfo, InterfaceCounters, InterfaceStatus};

pub fn parse_ip_link(interface: &str, output: &str) -> Result<InterfaceStatus, ParseError> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    // A missing device is an observation: the link is down.
    if trimmed.contains("does not exist") {
        return Ok(InterfaceStatus {
            interface: interface.to_string(),
            up: false,
            success: true,
            error: None,
            counters: None,
        });
    }

    let header = output
        .lines()
        .find(|l| l.contains('<') && l.contains('>'))
        .ok_or(ParseError::Missing("link header"))?;
    let flags: Vec<&str> = header
        .split_once('<')
        .and_then(|(_, rest)| rest.split_once('>'))
        .map(|(flags, _)| flags.split(',').collect())
        .unwrap_or_default();
    let tokens: Vec<&str> = header.split_whitespace().collect();
    let state = tokens
        .iter()
        .position(|t| *t == "state")
        .and_then(|i| tokens.get(i + 1))
        .copied();

    let lower_up = flags.contains(&"LOWER_UP");
    let up = match state {
        Some("UP") => true,
        Some("UNKNOWN") | None => flags.contains(&"UP") && lower_up,
        Some(_) => false,
    };

    let counters = if up { parse_counters(output) } else { None };
    Ok(InterfaceStatus {
        interface: interface.to_string(),
        up,
        success: true,
        error: None,
        counters,
    })
}

/// RX/TX blocks: a header row naming columns, followed by a row of numbers.
fn parse_counters(output: &str) -> Option<InterfaceCounters> {
    let lines: Vec<&str> = output.lines().map(str::trim).collect();
    let mut counters = InterfaceCounters::default();
    let mut seen = false;
    for (i, line) in lines.iter().enumerate() {
        let (is_rx, columns) = if let Some(rest) = line.strip_prefix("RX:") {
            (true, rest)
        } else if let Some(rest) = line.strip_prefix("TX:") {
            (false, rest)
        } else {
            continue;
        };
        let Some(values) = lines.get(i + 1) else {
            continue;
        };
        let columns: Vec<&str> = columns.split_whitespace().collect();
        let values: Vec<u64> = values
            .split_whitespace()
            .map_while(|v| v.parse().ok())
            .collect();
        let column = |name: &str| -> u64 {
            columns
                .iter()
                .position(|c| *c == name)
                .and_then(|idx| values.get(idx))
                .copied()
                .unwrap_or(0)
        };
        if values.is_empty() {
            continue;
        }
        seen = true;
        if is_rx {
            counters.bytes_recv = column("bytes");
            counters.packets_recv = column("packets");
            counters.errors_in = column("errors");
            counters.drops_in = column("dropped");
        } else {
            counters.bytes_sent = column("bytes");
            counters.packets_sent = column("packets");
            counters.errors_out = column("errors");
            counters.drops_out = column("dropped");
        }
    }
    seen.then_some(counters)
}

/// Default route gateway. A route on `preferred_interface` wins over the first one listed.
pub fn parse_default_route(
    output: &str,
    preferred_interface: &str,
) -> Result<GatewayInfo, ParseError> {
    if output.trim().is_empty() {
        return Err(ParseError::Missing("default route"));
    }
    let routes: Vec<(String, Option<String>)> = output
        .lines()
        .filter(|l| l.trim_start().starts_with("default"))
        .filter_map(|l| {
            let tokens: Vec<&str> = l.split_whitespace().collect();
            let after = |key: &str| {
                tokens
                    .iter()
                    .position(|t| *t == key)
                    .and_then(|i| tokens.get(i + 1))
                    .map(|t| t.to_string())
            };
            Some((after("via")?, after("dev")))
        })
        .collect();

    let (gateway_ip, interface) = routes
        .iter()
        .find(|(_, dev)| dev.as_deref() == Some(preferred_interface))
        .or_else(|| routes.first())
        .cloned()
        .ok_or(ParseError::Missing("default gateway"))?;

    Ok(GatewayInfo {
        success: true,
        error: None,
        gateway_ip: Some(gateway_ip),
        interface,
    })
}

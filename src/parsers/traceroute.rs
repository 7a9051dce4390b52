// traceroute output -> ordered hop list. Unanswered hops are kept as "timeout".

use std::collections::BTreeMap;

use crate::error::ParseError;
use crate::models::{TIMEOUT_HOST, TracerouteHop, round2};

pub fn parse_traceroute(output: &str) -> Result<Vec<TracerouteHop>, ParseError> {
    if output.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    // BTreeMap keeps hops ascending; the first line seen for a hop number wins.
    let mut hops: BTreeMap<u32, TracerouteHop> = BTreeMap::new();
    for line in output.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((first, rest)) = tokens.split_first() else {
            continue;
        };
        let Ok(hop) = first.parse::<u32>() else {
            continue;
        };
        hops.entry(hop).or_insert_with(|| parse_hop(hop, rest));
    }

    if hops.is_empty() {
        return Err(ParseError::Missing("hops"));
    }
    Ok(hops.into_values().collect())
}

fn parse_hop(hop: u32, tokens: &[&str]) -> TracerouteHop {
    let mut host: Option<String> = None;
    let mut address: Option<String> = None;
    let mut latency_ms: Option<f64> = None;

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        let followed_by_ms = tokens.get(i + 1).is_some_and(|t| *t == "ms");
        if let Some(ms) = latency_token(token, followed_by_ms) {
            if latency_ms.is_none() {
                latency_ms = Some(round2(ms));
            }
            i += if followed_by_ms { 2 } else { 1 };
            continue;
        }
        if token == "*" || token.starts_with('!') {
            i += 1;
            continue;
        }
        if let Some(inner) = token.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            if address.is_none() {
                address = Some(inner.to_string());
            }
        } else if host.is_none() {
            host = Some(token.to_string());
        }
        i += 1;
    }

    match host {
        Some(host) => TracerouteHop {
            hop,
            host,
            address,
            latency_ms,
        },
        None => TracerouteHop {
            hop,
            host: TIMEOUT_HOST.to_string(),
            address: None,
            latency_ms: None,
        },
    }
}

/// "12.3" followed by "ms", or a fused "12.3ms".
fn latency_token(token: &str, followed_by_ms: bool) -> Option<f64> {
    if followed_by_ms {
        return token.parse().ok();
    }
    token.strip_suffix("ms")?.parse().ok()
}

// dig output -> DNS lookup result

use regex::Regex;
use std::sync::OnceLock;

use crate::error::ParseError;
use crate::models::DnsLookupResult;

fn status_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"status: ([A-Z]+)").unwrap())
}

fn query_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r";; Query time: (\d+) (msec|usec)").unwrap())
}

fn server_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r";; SERVER: ([^#\s]+)").unwrap())
}

pub fn parse_dig(
    domain: &str,
    server: Option<&str>,
    output: &str,
) -> Result<DnsLookupResult, ParseError> {
    if output.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    if output.contains("connection timed out") || output.contains("no servers could be reached")
    {
        return Err(ParseError::Rejected(
            "connection timed out; no servers could be reached".into(),
        ));
    }

    let status = status_re()
        .captures(output)
        .map(|c| c[1].to_string())
        .ok_or(ParseError::Missing("response status"))?;
    if status != "NOERROR" {
        return Err(ParseError::Rejected(format!("resolver answered {status}")));
    }

    let latency_ms = query_time_re()
        .captures(output)
        .and_then(|c| {
            let value: f64 = c[1].parse().ok()?;
            Some(if &c[2] == "usec" { value / 1000.0 } else { value })
        })
        .ok_or(ParseError::Missing("query time"))?;

    let resolved_ip = first_a_record(output)
        .ok_or_else(|| ParseError::Rejected(format!("no A record for {domain}")))?;

    let server = server_re()
        .captures(output)
        .map(|c| c[1].to_string())
        .or_else(|| server.map(str::to_string));

    Ok(DnsLookupResult {
        domain: domain.to_string(),
        server,
        success: true,
        error: None,
        latency_ms: Some(latency_ms),
        resolved_ip: Some(resolved_ip),
    })
}

/// First `A` record in the ANSWER SECTION (CNAME chains come before it).
fn first_a_record(output: &str) -> Option<String> {
    output
        .lines()
        .skip_while(|l| !l.contains("ANSWER SECTION"))
        .skip(1)
        .take_while(|l| !l.trim().is_empty())
        .find_map(|l| {
            let tokens: Vec<&str> = l.split_whitespace().collect();
            match tokens.as_slice() {
                [_, _, "IN", "A", ip, ..] => Some(ip.to_string()),
                _ => None,
            }
        })
}

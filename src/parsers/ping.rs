// ping output (iputils, BusyBox, BSD) -> PingStats

use regex::Regex;
use std::sync::OnceLock;

use crate::error::ParseError;
use crate::models::PingStats;

fn summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(\d+) packets transmitted, (\d+) (?:packets )?received,.*?([\d.]+)% packet loss",
        )
        .unwrap()
    })
}

fn rtt_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:rtt|round-trip) min/avg/max(?:/\w+)? = ([\d.]+)/([\d.]+)/([\d.]+)")
            .unwrap()
    })
}

fn reply_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:icmp_seq|seq)=(\d+).*?time[=<]([\d.]+) ?ms").unwrap())
}

/// Parse one ping run. A run with zero replies still parses (packet loss 100%);
/// turning that into `success: false` is the caller's job via `PingResult::from_stats`.
pub fn parse_ping(output: &str) -> Result<PingStats, ParseError> {
    if output.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let replies: Vec<(u32, f64)> = reply_re()
        .captures_iter(output)
        .filter_map(|c| Some((c[1].parse().ok()?, c[2].parse().ok()?)))
        .collect();

    let rtt = rtt_re().captures(output).and_then(|c| {
        Some((
            c[1].parse::<f64>().ok()?,
            c[2].parse::<f64>().ok()?,
            c[3].parse::<f64>().ok()?,
        ))
    });

    let (transmitted, received, packet_loss) = match summary_re().captures(output) {
        Some(c) => {
            let transmitted: u32 = parse_field("transmitted", &c[1])?;
            let received: u32 = parse_field("received", &c[2])?;
            let loss: f64 = parse_field("packet loss", &c[3])?;
            (transmitted, received, loss.clamp(0.0, 100.0))
        }
        // Truncated output: fall back to the reply lines we did see.
        None if !replies.is_empty() => {
            let received = replies.len() as u32;
            let transmitted = replies
                .iter()
                .map(|(seq, _)| *seq)
                .max()
                .unwrap_or(received)
                .max(received);
            let loss = 100.0 * f64::from(transmitted - received) / f64::from(transmitted);
            (transmitted, received, loss)
        }
        None => return Err(ParseError::Missing("packet statistics")),
    };

    let (min_rtt_ms, avg_rtt_ms, max_rtt_ms) = match rtt {
        Some((min, avg, max)) => (Some(min), Some(avg), Some(max)),
        None if !replies.is_empty() => {
            let times: Vec<f64> = replies.iter().map(|(_, t)| *t).collect();
            let min = times.iter().copied().fold(f64::INFINITY, f64::min);
            let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let avg = times.iter().sum::<f64>() / times.len() as f64;
            (Some(min), Some(avg), Some(max))
        }
        None => (None, None, None),
    };

    Ok(PingStats {
        transmitted,
        received,
        packet_loss,
        min_rtt_ms,
        avg_rtt_ms,
        max_rtt_ms,
    })
}

fn parse_field<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::Invalid {
        field,
        value: value.to_string(),
    })
}

// Pure parsers for external tool output. No I/O: text in, record or ParseError out.
// Malformed lines are skipped; only output with nothing usable is an error.

mod arp;
mod dns;
mod link;
mod ping;
mod traceroute;
mod wifi;

pub use arp::parse_arp;
pub use dns::parse_dig;
pub use link::{parse_default_route, parse_ip_link};
pub use ping::parse_ping;
pub use traceroute::parse_traceroute;
pub use wifi::{
    channel_congestion, channel_from_ghz, most_congested, parse_iwconfig, parse_wifi_scan,
    summarize_scan,
};

// Neighbour table parsing: Linux `arp -n` tables and BSD-style `arp -a` lines.
// Incomplete entries are kept with `mac: None`.

use std::net::IpAddr;

use crate::error::ParseError;
use crate::models::ArpEntry;

pub fn parse_arp(output: &str) -> Result<Vec<ArpEntry>, ParseError> {
    if output.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(output.lines().filter_map(parse_line).collect())
}

fn parse_line(line: &str) -> Option<ArpEntry> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.contains(&"at") {
        parse_bsd_line(&tokens)
    } else {
        parse_table_line(&tokens)
    }
}

/// `192.168.1.1  ether  aa:bb:cc:dd:ee:ff  C  wlan0`
/// `192.168.1.23         (incomplete)          wlan0`
fn parse_table_line(tokens: &[&str]) -> Option<ArpEntry> {
    let ip = tokens.first()?;
    ip.parse::<IpAddr>().ok()?;
    if tokens.len() < 2 {
        return None;
    }
    let mac = tokens[1..]
        .iter()
        .find(|t| is_mac(t))
        .map(|t| t.to_lowercase());
    let incomplete = tokens.iter().any(|t| is_incomplete(t));
    if mac.is_none() && !incomplete {
        return None;
    }
    let interface = tokens
        .last()
        .filter(|t| tokens.len() >= 3 && !is_mac(t) && !is_incomplete(t) && t.len() > 1)
        .map(|t| t.to_string());
    Some(ArpEntry {
        ip: ip.to_string(),
        mac,
        interface,
    })
}

/// `? (192.168.1.1) at aa:bb:cc:dd:ee:ff [ether] on wlan0`
fn parse_bsd_line(tokens: &[&str]) -> Option<ArpEntry> {
    let ip = tokens
        .iter()
        .find_map(|t| t.strip_prefix('(').and_then(|t| t.strip_suffix(')')))?;
    ip.parse::<IpAddr>().ok()?;
    let at = tokens.iter().position(|t| *t == "at")?;
    let mac = tokens
        .get(at + 1)
        .filter(|t| is_mac(t))
        .map(|t| t.to_lowercase());
    let interface = tokens
        .iter()
        .position(|t| *t == "on")
        .and_then(|i| tokens.get(i + 1))
        .map(|t| t.to_string());
    Some(ArpEntry {
        ip: ip.to_string(),
        mac,
        interface,
    })
}

fn is_incomplete(token: &str) -> bool {
    matches!(token, "(incomplete)" | "<incomplete>" | "incomplete")
}

fn is_mac(token: &str) -> bool {
    let parts: Vec<&str> = token.split(':').collect();
    parts.len() == 6
        && parts
            .iter()
            .all(|p| (1..=2).contains(&p.len()) && p.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINUX_ARP: &str = "\
Address                  HWtype  HWaddress           Flags Mask            Iface
192.168.1.1              ether   a4:2b:b0:11:22:33   C                     wlan0
192.168.1.23                     (incomplete)                              wlan0
192.168.1.40             ether   B8:27:EB:AA:BB:CC   C                     eth0
";

    #[test]
    fn linux_table_keeps_incomplete_entries() {
        let entries = parse_arp(LINUX_ARP).unwrap();
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].ip, "192.168.1.1");
        assert_eq!(entries[0].mac.as_deref(), Some("a4:2b:b0:11:22:33"));
        assert_eq!(entries[0].interface.as_deref(), Some("wlan0"));

        assert_eq!(entries[1].ip, "192.168.1.23");
        assert_eq!(entries[1].mac, None);
        assert_eq!(entries[1].interface.as_deref(), Some("wlan0"));

        assert_eq!(entries[2].mac.as_deref(), Some("b8:27:eb:aa:bb:cc"));
    }

    #[test]
    fn bsd_lines() {
        let out = "\
? (192.168.1.1) at a4:2b:b0:11:22:33 on en0 ifscope [ethernet]
? (192.168.1.77) at (incomplete) on en0 ifscope [ethernet]
";
        let entries = parse_arp(out).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].interface.as_deref(), Some("en0"));
        assert_eq!(entries[1].ip, "192.168.1.77");
        assert_eq!(entries[1].mac, None);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let out = "Address HWtype HWaddress Flags Mask Iface\nnot-an-ip ether aa:bb:cc:dd:ee:ff C eth0\n10.0.0.5\n";
        assert!(parse_arp(out).unwrap().is_empty());
        assert_eq!(parse_arp(""), Err(ParseError::Empty));
    }
}

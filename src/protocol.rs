/// Well-known ports and IP protocol numbers the dashboard names explicitly.
const PROTOCOL_NAMES: [(u32, &str); 22] = [
    (1, "ICMP"),
    (6, "TCP"),
    (7, "UDP"),
    (17, "UDP"),
    (20, "FTP Data"),
    (21, "FTP Control"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (53, "DNS"),
    (67, "DHCP"),
    (68, "DHCP"),
    (69, "TFTP"),
    (80, "HTTP"),
    (110, "POP3"),
    (123, "NTP"),
    (143, "IMAP"),
    (161, "SNMP"),
    (162, "SNMP"),
    (443, "HTTPS"),
    (3389, "RDP"),
    (8080, "HTTP Proxy"),
];

pub fn protocol_name(port: u32) -> Option<&'static str> {
    PROTOCOL_NAMES
        .binary_search_by_key(&port, |(p, _)| *p)
        .ok()
        .map(|idx| PROTOCOL_NAMES[idx].1)
}

/// Display label for a port: `"<Name> (<port>)"` when known, `"Port <n>"` otherwise.
pub fn protocol_label(port: u32) -> String {
    match protocol_name(port) {
        Some(name) => format!("{name} ({port})"),
        None => format!("Port {port}"),
    }
}

/// Leading unsigned integer of a key such as `"443"` or `" 80/tcp"`.
pub fn parse_port(raw: &str) -> Option<u32> {
    let trimmed = raw.trim_start();
    let digits: &str = {
        let end = trimmed
            .char_indices()
            .find(|(_, ch)| !ch.is_ascii_digit())
            .map(|(idx, _)| idx)
            .unwrap_or(trimmed.len());
        &trimmed[..end]
    };
    digits.parse::<u32>().ok()
}

/// Label for a raw protocol key as it arrives on the wire.
pub fn protocol_label_for_key(raw: &str) -> String {
    match parse_port(raw) {
        Some(port) => protocol_label(port),
        None => format!("Port {}", raw.trim()),
    }
}

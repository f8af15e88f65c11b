use std::net::IpAddr;

pub fn parse_ip_literal(input: &str) -> Option<IpAddr> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<IpAddr>().ok()
}

/// Splits a comma-separated batch into trimmed, non-empty entries.
pub fn split_batch(input: &str) -> impl Iterator<Item = &str> {
    input.split(',').map(str::trim).filter(|s| !s.is_empty())
}

use crate::common::net::parse_ip_literal;
use chrono::{DateTime, Local};
use std::cmp::Ordering;
use std::fmt;
use std::net::IpAddr;
use std::time::SystemTime;

/// A validated IP literal. Keyed and displayed in its canonical form, so
/// `2001:DB8::1` and `2001:db8::1` name the same address.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Address(IpAddr);

impl Address {
    pub fn parse(input: &str) -> Option<Self> {
        parse_ip_literal(input).map(Self)
    }

    pub fn ip(&self) -> IpAddr {
        self.0
    }

    /// File-name friendly form (IPv6 colons replaced).
    pub fn file_stem(&self) -> String {
        self.to_string().replace(':', "_")
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        Self(ip)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display order of the address list: shorter literals first, then
/// lexicographic within equal length.
pub fn display_order(a: &Address, b: &Address) -> Ordering {
    let (a, b) = (a.to_string(), b.to_string());
    a.len().cmp(&b.len()).then_with(|| a.cmp(&b))
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ProbeMode {
    Ping,
    Traceroute,
}

impl ProbeMode {
    pub fn label(self) -> &'static str {
        match self {
            ProbeMode::Ping => "Ping",
            ProbeMode::Traceroute => "Traceroute",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            ProbeMode::Ping => "ping",
            ProbeMode::Traceroute => "traceroute",
        }
    }
}

impl fmt::Display for ProbeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-address probe settings. Zero means "platform default" for
/// `timeout` and `size` and "run until stopped" for `requests`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProbeConfig {
    pub requests: u32,
    pub timeout: u32,
    pub size: u32,
    /// Expected round-trip time in milliseconds.
    pub threshold: u64,
    pub backup: bool,
    pub last_started: Option<SystemTime>,
}

impl ProbeConfig {
    pub fn started_label(&self) -> String {
        match self.last_started {
            Some(ts) => DateTime::<Local>::from(ts).format("%H:%M:%S").to_string(),
            None => "n/a".to_string(),
        }
    }
}

impl fmt::Display for ProbeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "backup   : {}\ntimeout  : {}\nstarted  : {}\nrequests : {}\npkts size: {}\nthreshold: {}",
            self.backup,
            self.timeout,
            self.started_label(),
            self.requests,
            self.size,
            self.threshold
        )
    }
}

use crate::config::{Address, ProbeMode};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ProbeRequest {
    pub address: Address,
    pub mode: ProbeMode,
}

impl ProbeRequest {
    pub fn new(address: Address, mode: ProbeMode) -> Self {
        Self { address, mode }
    }

    pub fn title(&self) -> String {
        format!(" {} [{}] Outputs ", self.mode.label(), self.address)
    }
}

/// Monotonic probe session number. Every message a session publishes
/// carries it so consumers can discard output of superseded sessions.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SessionId(pub u64);

impl SessionId {
    pub fn next(self) -> Self {
        SessionId(self.0 + 1)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of classifying one line of ping output.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineClass {
    /// Banner or summary noise.
    Ignore,
    /// A line reporting a lost or failed request.
    Failure,
    /// A successful reply with its round-trip time in milliseconds.
    Reply(u64),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    pub fn classify(self, line: &str) -> LineClass {
        match self {
            Platform::Unix => classify_unix_line(line),
            Platform::Windows => classify_windows_line(line),
        }
    }
}

/// `64 bytes from 127.0.0.1: icmp_seq=1 ttl=64 time=0.041 ms`
pub fn classify_unix_line(line: &str) -> LineClass {
    if let Some(rtt) = extract_time(line, &["time="]) {
        return rtt;
    }

    if line.starts_with("PING")
        || line.starts_with("---")
        || line.starts_with("rtt")
        || line.contains('%')
    {
        return LineClass::Ignore;
    }

    LineClass::Failure
}

/// `Reply from 8.8.8.8: bytes=32 time=116ms TTL=56`
/// `Reply from 127.0.0.1: bytes=32 time<1ms TTL=128`
pub fn classify_windows_line(line: &str) -> LineClass {
    if let Some(rtt) = extract_time(line, &["time=", "time<"]) {
        return rtt;
    }

    const IGNORED: [&str; 5] = ["Pinging", "Ping", "Packets", "Approximate", "Minimum"];
    if IGNORED.iter().any(|prefix| line.starts_with(prefix)) {
        return LineClass::Ignore;
    }

    LineClass::Failure
}

// The token must not open the line; the value runs up to the next "ms".
fn extract_time(line: &str, tokens: &[&str]) -> Option<LineClass> {
    let (start, token) = tokens
        .iter()
        .filter_map(|token| line.find(token).map(|idx| (idx, *token)))
        .find(|(idx, _)| *idx > 0)?;
    let rest = &line[start + token.len()..];
    let end = rest.find("ms")?;
    match rest[..end].trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Some(LineClass::Reply(value as u64)),
        _ => {
            tracing::debug!(line, "unreadable round-trip time");
            Some(LineClass::Ignore)
        }
    }
}

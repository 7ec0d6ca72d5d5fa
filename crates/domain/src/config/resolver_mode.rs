use crate::dns_protocol::DnsProtocol;
use std::fmt;
use std::str::FromStr;

/// Where the engine sends its queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverMode {
    /// A single explicit forwarder.
    Forward(DnsProtocol),
    /// The nameservers listed in `/etc/resolv.conf`.
    System,
    /// The engine configuration's upstreams, or the built-in public list.
    BuiltIn,
}

impl ResolverMode {
    /// Maps the `--resolver` flag: absent or empty means the system
    /// resolver, `none` means built-in defaults, anything else must be an
    /// address.
    pub fn from_flag(value: Option<&str>) -> Result<Self, String> {
        match value.map(str::trim) {
            None | Some("") => Ok(ResolverMode::System),
            Some(v) => v.parse(),
        }
    }
}

impl Default for ResolverMode {
    fn default() -> Self {
        ResolverMode::System
    }
}

impl FromStr for ResolverMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(ResolverMode::System);
        }
        if s.eq_ignore_ascii_case("none") {
            return Ok(ResolverMode::BuiltIn);
        }
        s.parse::<DnsProtocol>()
            .map(ResolverMode::Forward)
            .map_err(|e| format!("Error setting forward address: {}", e))
    }
}

impl fmt::Display for ResolverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverMode::Forward(protocol) => write!(f, "forward {}", protocol),
            ResolverMode::System => write!(f, "system"),
            ResolverMode::BuiltIn => write!(f, "built-in"),
        }
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

pub const IPPROTO_ICMP: i32 = 1;
pub const IPPROTO_TCP: i32 = 6;
pub const IPPROTO_UDP: i32 = 17;
pub const IPPROTO_ICMPV6: i32 = 58;

/// Protocol name, as displayed in a packet description
///
/// Only TCP and UDP are identified. Every other protocol number falls into
/// `Other`, which is displayed as `ICMP` to keep the legacy output format,
/// even when the protocol is not ICMP at all. Use [`Protocol::is_icmp`] to
/// test for real ICMP traffic.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    Tcp,
    Udp,
    /// Unclassified protocol (raw protocol number)
    Other(i32),
}

impl Protocol {
    /// Classify a protocol number
    pub fn from_number(proto: i32) -> Protocol {
        match proto {
            IPPROTO_TCP => Protocol::Tcp,
            IPPROTO_UDP => Protocol::Udp,
            n => Protocol::Other(n),
        }
    }

    /// Get the protocol number back
    pub fn number(self) -> i32 {
        match self {
            Protocol::Tcp => IPPROTO_TCP,
            Protocol::Udp => IPPROTO_UDP,
            Protocol::Other(n) => n,
        }
    }

    /// Test if protocol number is ICMP or ICMPv6
    pub fn is_icmp(self) -> bool {
        matches!(self, Protocol::Other(IPPROTO_ICMP) | Protocol::Other(IPPROTO_ICMPV6))
    }
}

impl From<i32> for Protocol {
    fn from(proto: i32) -> Self {
        Protocol::from_number(proto)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Other(_) => "ICMP",
        };
        f.write_str(s)
    }
}

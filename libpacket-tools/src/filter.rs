use crate::error::Error;
use crate::packet::Packet;
use crate::protocol::Protocol;
use std::net::IpAddr;

/// Verdict emitted by a Filter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    /// Packet must be dropped
    Drop,
}

impl Verdict {
    fn of_match(matched: bool, exclude: bool) -> Verdict {
        if matched ^ exclude {
            Verdict::Accept
        } else {
            Verdict::Drop
        }
    }
}

pub trait Filter {
    fn filter(&self, packet: &Packet) -> Verdict;
}

/// Apply filters in order, stopping at the first `Drop`
pub fn apply_filters(filters: &[Box<dyn Filter>], packet: &Packet) -> Verdict {
    if filters.iter().all(|f| f.filter(packet) == Verdict::Accept) {
        Verdict::Accept
    } else {
        Verdict::Drop
    }
}

/// Split an optional leading `!` (exclusion)
fn split_exclude(s: &str) -> (bool, &str) {
    match s.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, s),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ProtocolMatch {
    Tcp,
    Udp,
    /// Anything but TCP and UDP
    Other,
    Number(i32),
}

/// Select packets by protocol
///
/// Examples:
///   `tcp,udp` to keep TCP and UDP packets
///   `other` (or `icmp`) to keep everything displayed as ICMP
///   `47` to keep packets with this protocol number
pub struct ProtocolFilter {
    protocols: Vec<ProtocolMatch>,
}

impl ProtocolFilter {
    pub fn of_string(s: &str) -> Result<ProtocolFilter, Error> {
        let protocols = s
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| match item.to_ascii_lowercase().as_str() {
                "tcp" => Ok(ProtocolMatch::Tcp),
                "udp" => Ok(ProtocolMatch::Udp),
                "icmp" | "other" => Ok(ProtocolMatch::Other),
                n => n
                    .parse::<i32>()
                    .map(ProtocolMatch::Number)
                    .map_err(|_| Error::InvalidFilter(format!("unknown protocol '{}'", item))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        if protocols.is_empty() {
            return Err(Error::InvalidFilter("empty protocol list".to_owned()));
        }
        Ok(ProtocolFilter { protocols })
    }
}

impl Filter for ProtocolFilter {
    fn filter(&self, packet: &Packet) -> Verdict {
        let proto = packet.protocol_name();
        let matched = self.protocols.iter().any(|m| match m {
            ProtocolMatch::Tcp => proto == Protocol::Tcp,
            ProtocolMatch::Udp => proto == Protocol::Udp,
            ProtocolMatch::Other => matches!(proto, Protocol::Other(_)),
            ProtocolMatch::Number(n) => packet.protocol() == *n,
        });
        Verdict::of_match(matched, false)
    }
}

/// Select packets owned by one application
///
/// Examples:
///   `10023` to keep packets of this uid
///   `!0` to drop packets of uid 0
pub struct UidFilter {
    uid: i32,
    exclude: bool,
}

impl UidFilter {
    pub fn of_string(s: &str) -> Result<UidFilter, Error> {
        let (exclude, uid_str) = split_exclude(s.trim());
        let uid = uid_str
            .parse()
            .map_err(|_| Error::InvalidFilter(format!("invalid uid '{}'", s)))?;
        Ok(UidFilter { uid, exclude })
    }
}

impl Filter for UidFilter {
    fn filter(&self, packet: &Packet) -> Verdict {
        Verdict::of_match(packet.uid() == self.uid, self.exclude)
    }
}

/// Select packets matching this IP address either as source or destination
///
/// Packets with an address that cannot be parsed never match.
///
/// Examples:
///   `10.9.0.2` to select packets matching this address
///   `!10.9.0.2` to select packets not matching this address
pub struct AddressFilter {
    ip: IpAddr,
    exclude: bool,
}

impl AddressFilter {
    pub fn of_string(s: &str) -> Result<AddressFilter, Error> {
        let (exclude, ip_str) = split_exclude(s.trim());
        let ip = ip_str
            .parse()
            .map_err(|_| Error::InvalidFilter(format!("invalid IP address '{}'", s)))?;
        Ok(AddressFilter { ip, exclude })
    }
}

impl Filter for AddressFilter {
    fn filter(&self, packet: &Packet) -> Verdict {
        let is_ip = |addr: &str| addr.parse::<IpAddr>().map_or(false, |ip| ip == self.ip);
        let matched = is_ip(packet.saddr()) || is_ip(packet.daddr());
        Verdict::of_match(matched, self.exclude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{IPPROTO_ICMP, IPPROTO_TCP, IPPROTO_UDP};

    fn packet(protocol: i32, saddr: &str, daddr: &str, uid: i32) -> Packet {
        Packet::new(0, 4, protocol, "", saddr, 1, daddr, 2, "", uid)
    }

    #[test]
    fn protocol_filter() {
        let f = ProtocolFilter::of_string("tcp, UDP").unwrap();
        assert_eq!(f.filter(&packet(IPPROTO_TCP, "a", "b", 0)), Verdict::Accept);
        assert_eq!(f.filter(&packet(IPPROTO_UDP, "a", "b", 0)), Verdict::Accept);
        assert_eq!(f.filter(&packet(IPPROTO_ICMP, "a", "b", 0)), Verdict::Drop);

        let f = ProtocolFilter::of_string("other").unwrap();
        assert_eq!(f.filter(&packet(IPPROTO_ICMP, "a", "b", 0)), Verdict::Accept);
        assert_eq!(f.filter(&packet(47, "a", "b", 0)), Verdict::Accept);
        assert_eq!(f.filter(&packet(IPPROTO_TCP, "a", "b", 0)), Verdict::Drop);

        let f = ProtocolFilter::of_string("47").unwrap();
        assert_eq!(f.filter(&packet(47, "a", "b", 0)), Verdict::Accept);
        assert_eq!(f.filter(&packet(IPPROTO_ICMP, "a", "b", 0)), Verdict::Drop);

        assert!(ProtocolFilter::of_string("sctp").is_err());
        assert!(ProtocolFilter::of_string(",").is_err());
    }

    #[test]
    fn uid_filter() {
        let f = UidFilter::of_string("10023").unwrap();
        assert_eq!(f.filter(&packet(6, "a", "b", 10023)), Verdict::Accept);
        assert_eq!(f.filter(&packet(6, "a", "b", 0)), Verdict::Drop);
        let f = UidFilter::of_string("!-1").unwrap();
        assert_eq!(f.filter(&packet(6, "a", "b", -1)), Verdict::Drop);
        assert_eq!(f.filter(&packet(6, "a", "b", 0)), Verdict::Accept);
        assert!(UidFilter::of_string("root").is_err());
    }

    #[test]
    fn address_filter() {
        let f = AddressFilter::of_string("10.9.0.2").unwrap();
        assert_eq!(f.filter(&packet(6, "10.9.0.2", "1.1.1.1", 0)), Verdict::Accept);
        assert_eq!(f.filter(&packet(6, "1.1.1.1", "10.9.0.2", 0)), Verdict::Accept);
        assert_eq!(f.filter(&packet(6, "1.1.1.1", "garbage", 0)), Verdict::Drop);
        let f = AddressFilter::of_string("!::1").unwrap();
        assert_eq!(f.filter(&packet(58, "0:0::1", "::2", 0)), Verdict::Drop);
        assert_eq!(f.filter(&packet(58, "::3", "::2", 0)), Verdict::Accept);
    }

    #[test]
    fn filters_in_order() {
        let filters: Vec<Box<dyn Filter>> = vec![
            Box::new(ProtocolFilter::of_string("tcp").unwrap()),
            Box::new(UidFilter::of_string("1000").unwrap()),
        ];
        assert_eq!(apply_filters(&filters, &packet(6, "a", "b", 1000)), Verdict::Accept);
        assert_eq!(apply_filters(&filters, &packet(6, "a", "b", 1001)), Verdict::Drop);
        assert_eq!(apply_filters(&filters, &packet(17, "a", "b", 1000)), Verdict::Drop);
        assert_eq!(apply_filters(&[], &packet(17, "a", "b", 1000)), Verdict::Accept);
    }
}

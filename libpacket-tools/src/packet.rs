use crate::error::Error;
use crate::protocol::Protocol;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Text displayed instead of an empty `flags` or `data` field
pub const PLACEHOLDER: &str = "_";

/// Description of one observed network packet
///
/// All fields are already decoded by the producer (capture or dissection
/// code). No consistency between fields is enforced: any value is stored
/// and displayed as-is. See [`Packet::validate`] for optional checks.
///
/// The `Display` implementation gives the canonical one-line rendering:
///
/// ```
/// use libpacket_tools::Packet;
/// let p = Packet::new(1000, 4, 6, "SYN", "10.0.0.1", 443, "8.8.8.8", 5000, "", 1000);
/// assert_eq!(
///     p.to_string(),
///     "Packet {\"time\": 1000, \"version\": IP4, \"protocol\": TCP, \"flags\": SYN, \
///      \"saddr\": 10.0.0.1, \"sport\": 443, \"daddr\": 8.8.8.8, \"dport\": 5000, \
///      \"data\": _, \"uid\": 1000 }"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Packet {
    time: i64,
    version: i32,
    protocol: i32,
    flags: String,
    saddr: String,
    sport: i32,
    daddr: String,
    dport: i32,
    data: String,
    uid: i32,
}

impl Packet {
    #[allow(clippy::too_many_arguments)]
    pub fn new<S1, S2, S3, S4>(
        time: i64,
        version: i32,
        protocol: i32,
        flags: S1,
        saddr: S2,
        sport: i32,
        daddr: S3,
        dport: i32,
        data: S4,
        uid: i32,
    ) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
        S4: Into<String>,
    {
        Packet {
            time,
            version,
            protocol,
            flags: flags.into(),
            saddr: saddr.into(),
            sport,
            daddr: daddr.into(),
            dport,
            data: data.into(),
            uid,
        }
    }

    pub fn builder() -> PacketBuilder {
        PacketBuilder::default()
    }

    #[inline]
    pub fn time(&self) -> i64 {
        self.time
    }
    #[inline]
    pub fn version(&self) -> i32 {
        self.version
    }
    /// Raw protocol number
    #[inline]
    pub fn protocol(&self) -> i32 {
        self.protocol
    }
    #[inline]
    pub fn protocol_name(&self) -> Protocol {
        Protocol::from_number(self.protocol)
    }
    #[inline]
    pub fn flags(&self) -> &str {
        &self.flags
    }
    #[inline]
    pub fn saddr(&self) -> &str {
        &self.saddr
    }
    #[inline]
    pub fn sport(&self) -> i32 {
        self.sport
    }
    #[inline]
    pub fn daddr(&self) -> &str {
        &self.daddr
    }
    #[inline]
    pub fn dport(&self) -> i32 {
        self.dport
    }
    #[inline]
    pub fn data(&self) -> &str {
        &self.data
    }
    /// Owning application identifier. Negative values are not interpreted.
    #[inline]
    pub fn uid(&self) -> i32 {
        self.uid
    }

    /// Canonical one-line rendering (same as `to_string()`)
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Check that fields are consistent: IP version is 4 or 6, ports fit in
    /// 16 bits, and both addresses belong to the declared IP version.
    ///
    /// This is never called on construction, a `Packet` accepts any value.
    pub fn validate(&self) -> Result<(), Error> {
        if self.version != 4 && self.version != 6 {
            return Err(Error::InvalidVersion(self.version));
        }
        check_port(self.sport)?;
        check_port(self.dport)?;
        check_addr(self.version, &self.saddr)?;
        check_addr(self.version, &self.daddr)?;
        Ok(())
    }
}

pub(crate) fn check_port(port: i32) -> Result<u16, Error> {
    u16::try_from(port).map_err(|_| Error::InvalidPort(port))
}

pub(crate) fn parse_addr(addr: &str) -> Result<IpAddr, Error> {
    addr.parse()
        .map_err(|_| Error::InvalidAddress(addr.to_owned()))
}

fn check_addr(version: i32, addr: &str) -> Result<(), Error> {
    let ip = parse_addr(addr)?;
    let matched = match ip {
        IpAddr::V4(_) => version == 4,
        IpAddr::V6(_) => version == 6,
    };
    if matched {
        Ok(())
    } else {
        Err(Error::VersionMismatch {
            version,
            addr: addr.to_owned(),
        })
    }
}

/// An empty value is displayed as `_`
#[inline]
fn or_placeholder(s: &str) -> &str {
    if s.is_empty() {
        PLACEHOLDER
    } else {
        s
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Packet {{\"time\": {}, \"version\": IP{}, \"protocol\": {}, \"flags\": {}, \
             \"saddr\": {}, \"sport\": {}, \"daddr\": {}, \"dport\": {}, \"data\": {}, \
             \"uid\": {} }}",
            self.time,
            self.version,
            self.protocol_name(),
            or_placeholder(&self.flags),
            self.saddr,
            self.sport,
            self.daddr,
            self.dport,
            or_placeholder(&self.data),
            self.uid
        )
    }
}

/// Builder for `Packet`. Every field must be set explicitly.
#[derive(Clone, Debug, Default)]
pub struct PacketBuilder {
    time: Option<i64>,
    version: Option<i32>,
    protocol: Option<i32>,
    flags: Option<String>,
    saddr: Option<String>,
    sport: Option<i32>,
    daddr: Option<String>,
    dport: Option<i32>,
    data: Option<String>,
    uid: Option<i32>,
}

impl PacketBuilder {
    pub fn time(mut self, time: i64) -> Self {
        self.time = Some(time);
        self
    }
    pub fn version(mut self, version: i32) -> Self {
        self.version = Some(version);
        self
    }
    pub fn protocol(mut self, protocol: i32) -> Self {
        self.protocol = Some(protocol);
        self
    }
    pub fn flags<S: Into<String>>(mut self, flags: S) -> Self {
        self.flags = Some(flags.into());
        self
    }
    pub fn saddr<S: Into<String>>(mut self, saddr: S) -> Self {
        self.saddr = Some(saddr.into());
        self
    }
    pub fn sport(mut self, sport: i32) -> Self {
        self.sport = Some(sport);
        self
    }
    pub fn daddr<S: Into<String>>(mut self, daddr: S) -> Self {
        self.daddr = Some(daddr.into());
        self
    }
    pub fn dport(mut self, dport: i32) -> Self {
        self.dport = Some(dport);
        self
    }
    pub fn data<S: Into<String>>(mut self, data: S) -> Self {
        self.data = Some(data.into());
        self
    }
    pub fn uid(mut self, uid: i32) -> Self {
        self.uid = Some(uid);
        self
    }

    /// Build the `Packet`. Fails only if a field was never set.
    pub fn build(self) -> Result<Packet, Error> {
        Ok(Packet {
            time: self.time.ok_or(Error::MissingField("time"))?,
            version: self.version.ok_or(Error::MissingField("version"))?,
            protocol: self.protocol.ok_or(Error::MissingField("protocol"))?,
            flags: self.flags.ok_or(Error::MissingField("flags"))?,
            saddr: self.saddr.ok_or(Error::MissingField("saddr"))?,
            sport: self.sport.ok_or(Error::MissingField("sport"))?,
            daddr: self.daddr.ok_or(Error::MissingField("daddr"))?,
            dport: self.dport.ok_or(Error::MissingField("dport"))?,
            data: self.data.ok_or(Error::MissingField("data"))?,
            uid: self.uid.ok_or(Error::MissingField("uid"))?,
        })
    }
}

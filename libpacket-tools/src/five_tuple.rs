use crate::error::Error;
use crate::packet::{check_port, parse_addr, Packet};
use serde::Serialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

/// Network 5-tuple, parsed from the textual fields of a `Packet`
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct FiveTuple {
    /// Protocol number (e.g 6 for TCP)
    pub proto: i32,
    pub src: IpAddr,
    pub dst: IpAddr,
    pub src_port: u16,
    pub dst_port: u16,
}

pub trait ToFiveTuple {
    fn get_five_tuple(&self) -> Result<FiveTuple, Error>;
}

impl FiveTuple {
    pub fn get_reverse(&self) -> FiveTuple {
        FiveTuple {
            proto: self.proto,
            src: self.dst,
            dst: self.src,
            src_port: self.dst_port,
            dst_port: self.src_port,
        }
    }
}

impl Default for FiveTuple {
    fn default() -> Self {
        FiveTuple {
            proto: 0,
            src: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            dst: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            src_port: 0,
            dst_port: 0,
        }
    }
}

fn fmt_endpoint(f: &mut fmt::Formatter, ip: &IpAddr, port: u16) -> fmt::Result {
    match ip {
        IpAddr::V4(ip) => write!(f, "{}:{}", ip, port),
        IpAddr::V6(ip) => write!(f, "[{}]:{}", ip, port),
    }
}

impl fmt::Display for FiveTuple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_endpoint(f, &self.src, self.src_port)?;
        f.write_str(" -> ")?;
        fmt_endpoint(f, &self.dst, self.dst_port)?;
        write!(f, " [{}]", self.proto)
    }
}

impl ToFiveTuple for Packet {
    fn get_five_tuple(&self) -> Result<FiveTuple, Error> {
        Ok(FiveTuple {
            proto: self.protocol(),
            src: parse_addr(self.saddr())?,
            dst: parse_addr(self.daddr())?,
            src_port: check_port(self.sport())?,
            dst_port: check_port(self.dport())?,
        })
    }
}

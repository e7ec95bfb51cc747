//! Count packets per protocol class and per owning application

use crate::analyzer::PacketAnalyzer;
use crate::context::ParseContext;
use crate::error::Error;
use crate::packet::Packet;
use crate::protocol::Protocol;
use serde_json::{json, Value};
use std::collections::BTreeMap;

#[derive(Default, Debug)]
pub struct ProtocolStats {
    pub total_packets: usize,
    pub tcp_packets: usize,
    pub udp_packets: usize,
    /// Packets with protocol ICMP or ICMPv6
    pub icmp_packets: usize,
    /// Packets with any other protocol
    pub other_packets: usize,
    pub uids: BTreeMap<i32, usize>,
}

impl ProtocolStats {
    pub fn add(&mut self, packet: &Packet) {
        self.total_packets += 1;
        match packet.protocol_name() {
            Protocol::Tcp => self.tcp_packets += 1,
            Protocol::Udp => self.udp_packets += 1,
            p if p.is_icmp() => self.icmp_packets += 1,
            Protocol::Other(_) => self.other_packets += 1,
        }
        *self.uids.entry(packet.uid()).or_insert(0) += 1;
    }

    pub fn get_results_json(&self) -> Value {
        let uids: Vec<_> = self
            .uids
            .iter()
            .map(|(uid, count)| json!({ "uid": uid, "num_packets": count }))
            .collect();
        json!({
            "total_packets": self.total_packets,
            "tcp": self.tcp_packets,
            "udp": self.udp_packets,
            "icmp": self.icmp_packets,
            "other": self.other_packets,
            "uids": uids,
        })
    }
}

impl PacketAnalyzer for ProtocolStats {
    fn handle_packet(&mut self, packet: &Packet, _ctx: &ParseContext) -> Result<(), Error> {
        self.add(packet);
        Ok(())
    }

    fn teardown(&mut self) {
        info!("ProtocolStats: total packets {}", self.total_packets);
        info!(
            "ProtocolStats: TCP {} UDP {} ICMP {} other {}",
            self.tcp_packets, self.udp_packets, self.icmp_packets, self.other_packets
        );
        info!("ProtocolStats: {} distinct uids", self.uids.len());
    }
}

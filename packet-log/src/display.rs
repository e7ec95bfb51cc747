use libpacket_tools::stats::ProtocolStats;
use libpacket_tools::{Error, Packet, PacketAnalyzer, PacketWriter, ParseContext};
use std::io::Write;

/// Main analyzer of packet-log: write packets, optionally check and count them
pub struct PacketLog<W: Write> {
    writer: PacketWriter<W>,
    stats: Option<ProtocolStats>,
    validate: bool,
    num_invalid: usize,
}

impl<W: Write> PacketLog<W> {
    pub fn new(writer: PacketWriter<W>, with_stats: bool, validate: bool) -> Self {
        PacketLog {
            writer,
            stats: if with_stats {
                Some(ProtocolStats::default())
            } else {
                None
            },
            validate,
            num_invalid: 0,
        }
    }

    pub fn stats(&self) -> Option<&ProtocolStats> {
        self.stats.as_ref()
    }

    pub fn num_written(&self) -> usize {
        self.writer.count()
    }

    pub fn num_invalid(&self) -> usize {
        self.num_invalid
    }
}

impl<W: Write> PacketAnalyzer for PacketLog<W> {
    fn handle_packet(&mut self, packet: &Packet, ctx: &ParseContext) -> Result<(), Error> {
        if self.validate {
            if let Err(e) = packet.validate() {
                warn!("line {}: {}", ctx.line_index, e);
                self.num_invalid += 1;
            }
        }
        if let Some(stats) = self.stats.as_mut() {
            stats.add(packet);
        }
        self.writer.handle_packet(packet, ctx)
    }

    fn teardown(&mut self) {
        self.writer.teardown();
        if let Some(stats) = self.stats.as_mut() {
            stats.teardown();
        }
    }
}

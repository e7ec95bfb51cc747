use crate::analyzer::PacketAnalyzer;
use crate::context::ParseContext;
use crate::error::Error;
use crate::packet::Packet;
use std::io::{self, Write};

/// Output format for `PacketWriter`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Canonical packet description
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl OutputFormat {
    pub fn of_string(s: &str) -> Result<OutputFormat, Error> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(Error::Config(format!(
                "invalid output format: {s} not among text|json"
            ))),
        }
    }
}

/// Analyzer writing one line per packet
pub struct PacketWriter<W: Write> {
    w: W,
    format: OutputFormat,
    count: usize,
}

impl<W: Write> PacketWriter<W> {
    pub fn new(w: W, format: OutputFormat) -> Self {
        PacketWriter { w, format, count: 0 }
    }

    pub fn write_packet(&mut self, packet: &Packet) -> Result<(), Error> {
        match self.format {
            OutputFormat::Text => writeln!(self.w, "{}", packet)?,
            OutputFormat::Json => {
                let s = serde_json::to_string(packet).map_err(io::Error::from)?;
                writeln!(self.w, "{}", s)?;
            }
        }
        self.count += 1;
        Ok(())
    }

    /// Number of lines written
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn into_inner(self) -> W {
        self.w
    }
}

impl<W: Write> PacketAnalyzer for PacketWriter<W> {
    fn handle_packet(&mut self, packet: &Packet, _ctx: &ParseContext) -> Result<(), Error> {
        self.write_packet(packet)
    }

    fn teardown(&mut self) {
        if let Err(e) = self.w.flush() {
            warn!("could not flush output: {}", e);
        }
    }
}

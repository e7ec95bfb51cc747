use crate::context::ParseContext;
use crate::error::Error;
use crate::packet::Packet;

/// Common trait for consumers of packet descriptions
pub trait PacketAnalyzer {
    /// Initialization function, called before reading input (optional)
    fn init(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Callback function for every accepted `Packet`
    fn handle_packet(&mut self, packet: &Packet, ctx: &ParseContext) -> Result<(), Error>;

    /// Teardown function, called after reading input (optional)
    fn teardown(&mut self) {}
}

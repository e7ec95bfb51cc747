/// Packet input parsing context
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    /// Line number of the current packet in input (1-based)
    pub line_index: usize,
    /// Index of current packet in input, including skipped and filtered packets (1-based)
    pub packet_index: usize,
    /// Timestamp of first packet seen
    pub first_packet_time: Option<i64>,
    /// Time of current packet, relative to the first one
    pub rel_time: i64,
    /// Number of lines that could not be decoded
    pub invalid_lines: usize,
}

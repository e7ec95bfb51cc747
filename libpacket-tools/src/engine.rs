use crate::analyzer::PacketAnalyzer;
use crate::config::Config;
use crate::context::ParseContext;
use crate::error::Error;
use crate::filter::{apply_filters, Filter, Verdict};
use crate::packet::Packet;
use std::io::{BufRead, BufReader, Read};

/// Packet description engine
///
/// `PacketEngine` reads packet descriptions (one JSON object per line) from any
/// reader, applies filters, and calls a `PacketAnalyzer` for every accepted `Packet`.
///
/// Empty lines and lines starting with `#` are ignored.
///
/// Configuration keys:
///   - `skip_index`: number of packets to skip (default: 0)
///   - `max_packets`: stop after this number of packets was handled (default: no limit)
///   - `strict`: if true, a line that cannot be decoded is a fatal error. Otherwise it is
///     logged and ignored (default: false)
///
/// ## example
///
/// ```
/// use libpacket_tools::{Config, Error, Packet, PacketAnalyzer, PacketEngine, ParseContext};
/// #[derive(Default)]
/// pub struct ExampleAnalyzer {
///     packet_count: usize,
/// }
///
/// impl PacketAnalyzer for ExampleAnalyzer {
///     fn handle_packet(&mut self, _packet: &Packet, _ctx: &ParseContext) -> Result<(), Error> {
///         self.packet_count += 1;
///         Ok(())
///     }
/// }
///
/// let config = Config::default();
/// let mut engine = PacketEngine::new(ExampleAnalyzer::default(), &config);
///
/// // `engine.run()` can take any `mut Read` as input
/// // Here, we use a slice as an example
/// let mut input = r#"{"time":1,"version":4,"protocol":17,"flags":"","saddr":"10.0.0.1","sport":53,"daddr":"10.0.0.2","dport":5353,"data":"","uid":0}"#.as_bytes();
/// engine.run(&mut input).unwrap();
/// assert_eq!(engine.analyzer().packet_count, 1);
/// ```
pub struct PacketEngine<A: PacketAnalyzer> {
    analyzer: A,
    filters: Vec<Box<dyn Filter>>,
    ctx: ParseContext,
    skip_index: usize,
    max_packets: Option<usize>,
    strict: bool,
}

impl<A: PacketAnalyzer> PacketEngine<A> {
    /// Build a new PacketEngine, taking ownership of the input PacketAnalyzer
    pub fn new(analyzer: A, config: &Config) -> Self {
        let skip_index = config.get_usize("skip_index").unwrap_or(0);
        let max_packets = config.get_usize("max_packets");
        let strict = config.get_bool("strict").unwrap_or(false);
        PacketEngine {
            analyzer,
            filters: Vec::new(),
            ctx: ParseContext::default(),
            skip_index,
            max_packets,
            strict,
        }
    }

    /// Set the filters to apply before the analyzer is called
    pub fn with_filters(mut self, filters: Vec<Box<dyn Filter>>) -> Self {
        self.filters = filters;
        self
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    pub fn analyzer_mut(&mut self) -> &mut A {
        &mut self.analyzer
    }

    pub fn into_analyzer(self) -> A {
        self.analyzer
    }

    /// Context of the last run
    pub fn context(&self) -> &ParseContext {
        &self.ctx
    }

    /// Main function: given a reader, read all packet descriptions and call analyzer for each Packet
    pub fn run(&mut self, reader: &mut dyn Read) -> Result<(), Error> {
        self.ctx = ParseContext::default();
        self.analyzer.init()?;
        let res = self.run_lines(reader);
        self.analyzer.teardown();
        debug!(
            "{} lines read, {} packets, {} invalid lines",
            self.ctx.line_index, self.ctx.packet_index, self.ctx.invalid_lines
        );
        res
    }

    fn run_lines(&mut self, reader: &mut dyn Read) -> Result<(), Error> {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        let mut handled = 0;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            self.ctx.line_index += 1;
            // lines are not required to be valid UTF-8, decoding checks it
            let line = trim_bytes(&buf);
            if line.is_empty() || line.starts_with(b"#") {
                continue;
            }
            let packet: Packet = match serde_json::from_slice(line) {
                Ok(p) => p,
                Err(source) if self.strict => {
                    return Err(Error::Json {
                        line: self.ctx.line_index,
                        source,
                    });
                }
                Err(e) => {
                    warn!("line {}: could not decode packet: {}", self.ctx.line_index, e);
                    self.ctx.invalid_lines += 1;
                    continue;
                }
            };
            self.ctx.packet_index += 1;
            if self.ctx.packet_index <= self.skip_index {
                continue;
            }
            if apply_filters(&self.filters, &packet) == Verdict::Drop {
                trace!("packet {} dropped by filters", self.ctx.packet_index);
                continue;
            }
            if self.max_packets.map_or(false, |max| handled >= max) {
                debug!("reached max_packets ({})", handled);
                break;
            }
            let first_time = *self.ctx.first_packet_time.get_or_insert(packet.time());
            // producers do not guarantee monotonic time
            self.ctx.rel_time = packet.time().wrapping_sub(first_time);
            trace!("packet {}: {}", self.ctx.packet_index, packet);
            self.analyzer.handle_packet(&packet, &self.ctx)?;
            handled += 1;
        }
        Ok(())
    }
}

fn trim_bytes(mut s: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = s {
        if !first.is_ascii_whitespace() {
            break;
        }
        s = rest;
    }
    while let [rest @ .., last] = s {
        if !last.is_ascii_whitespace() {
            break;
        }
        s = rest;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ProtocolFilter;

    #[derive(Default)]
    struct Collect {
        packets: Vec<(Packet, ParseContext)>,
        init: bool,
        teardown: bool,
    }

    impl PacketAnalyzer for Collect {
        fn init(&mut self) -> Result<(), Error> {
            self.init = true;
            Ok(())
        }
        fn handle_packet(&mut self, packet: &Packet, ctx: &ParseContext) -> Result<(), Error> {
            self.packets.push((packet.clone(), ctx.clone()));
            Ok(())
        }
        fn teardown(&mut self) {
            self.teardown = true;
        }
    }

    const INPUT: &str = r#"# capture sample
{"time":1000,"version":4,"protocol":6,"flags":"SYN","saddr":"10.0.0.1","sport":443,"daddr":"8.8.8.8","dport":5000,"data":"","uid":1000}

{"time":1500,"version":4,"protocol":17,"flags":"","saddr":"10.0.0.1","sport":53,"daddr":"8.8.8.8","dport":5353,"data":"","uid":0}
not a packet
{"time":900,"version":6,"protocol":58,"flags":"","saddr":"::1","sport":0,"daddr":"::2","dport":0,"data":"ping","uid":-1}
"#;

    fn run(config: &Config) -> Result<PacketEngine<Collect>, Error> {
        let mut engine = PacketEngine::new(Collect::default(), config);
        engine.run(&mut INPUT.as_bytes())?;
        Ok(engine)
    }

    #[test]
    fn engine_reads_packets() {
        let engine = run(&Config::default()).expect("lenient run");
        let a = engine.analyzer();
        assert!(a.init && a.teardown);
        assert_eq!(a.packets.len(), 3);
        let (p, ctx) = &a.packets[0];
        assert_eq!(p.protocol(), 6);
        assert_eq!(ctx.line_index, 2);
        assert_eq!(ctx.rel_time, 0);
        let (_, ctx) = &a.packets[1];
        assert_eq!(ctx.rel_time, 500);
        let (p, ctx) = &a.packets[2];
        assert_eq!(p.data(), "ping");
        assert_eq!(ctx.rel_time, -100);
        assert_eq!(ctx.packet_index, 3);
        assert_eq!(engine.context().invalid_lines, 1);
        assert_eq!(engine.context().line_index, 6);
    }

    #[test]
    fn engine_strict() {
        let mut config = Config::default();
        config.set("strict", true);
        match run(&config) {
            Err(Error::Json { line, .. }) => assert_eq!(line, 5),
            _ => panic!("strict mode should fail on line 5"),
        }
    }

    #[test]
    fn engine_skip_and_max() {
        let mut config = Config::default();
        config.set("skip_index", 1);
        config.set("max_packets", 1);
        let engine = run(&config).expect("lenient run");
        let packets = &engine.analyzer().packets;
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].0.protocol(), 17);
        assert_eq!(packets[0].1.packet_index, 2);
        // first delivered packet is the time reference
        assert_eq!(packets[0].1.rel_time, 0);
    }

    #[test]
    fn engine_filters() {
        let filters: Vec<Box<dyn Filter>> =
            vec![Box::new(ProtocolFilter::of_string("other").unwrap())];
        let mut engine =
            PacketEngine::new(Collect::default(), &Config::default()).with_filters(filters);
        engine.run(&mut INPUT.as_bytes()).expect("lenient run");
        let a = engine.into_analyzer();
        assert_eq!(a.packets.len(), 1);
        assert_eq!(a.packets[0].0.version(), 6);
    }

    #[test]
    fn engine_analyzer_error() {
        struct Fail;
        impl PacketAnalyzer for Fail {
            fn handle_packet(&mut self, _: &Packet, _: &ParseContext) -> Result<(), Error> {
                Err(Error::Generic("analyzer failure"))
            }
        }
        let mut engine = PacketEngine::new(Fail, &Config::default());
        assert!(matches!(
            engine.run(&mut INPUT.as_bytes()),
            Err(Error::Generic("analyzer failure"))
        ));
    }

    #[test]
    fn engine_max_packets_zero() {
        let mut config = Config::default();
        config.set("max_packets", 0);
        let engine = run(&config).expect("lenient run");
        assert!(engine.analyzer().packets.is_empty());
        assert!(engine.analyzer().teardown);
    }

    #[test]
    fn engine_invalid_utf8_line() {
        let mut input = INPUT.as_bytes().to_vec();
        input.extend_from_slice(b"\xff\xfe garbage\n");
        input.extend_from_slice(INPUT.lines().nth(3).unwrap().as_bytes());
        input.push(b'\n');

        let mut engine = PacketEngine::new(Collect::default(), &Config::default());
        engine.run(&mut input.as_slice()).expect("lenient run");
        assert_eq!(engine.analyzer().packets.len(), 4);
        assert_eq!(engine.context().invalid_lines, 2);
        assert_eq!(engine.context().line_index, 8);

        let mut config = Config::default();
        config.set("strict", true);
        let mut engine = PacketEngine::new(Collect::default(), &config);
        let input = b"\xff\xfe garbage\n";
        match engine.run(&mut input.as_slice()) {
            Err(Error::Json { line, .. }) => assert_eq!(line, 1),
            _ => panic!("invalid UTF-8 should be a decoding error in strict mode"),
        }
    }

    #[test]
    fn trim_lines() {
        assert_eq!(trim_bytes(b"  {}\r\n"), b"{}");
        assert_eq!(trim_bytes(b"\n"), b"");
        assert_eq!(trim_bytes(b""), b"");
    }
}

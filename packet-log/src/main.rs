#![warn(clippy::all)]

#[macro_use]
extern crate log;

use clap::{crate_version, Parser};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use libpacket_tools::filter::{AddressFilter, ProtocolFilter, UidFilter};
use libpacket_tools::{Config, Filter, OutputFormat, PacketEngine, PacketWriter};

mod display;
use display::PacketLog;

/// Network packet description tool
///
/// Reads packet descriptions (one JSON object per line) and writes them in
/// canonical form.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<String>,

    /// Output format: text or json (default: text)
    #[arg(short, long)]
    format: Option<String>,

    /// Keep only these protocols (comma-separated: tcp, udp, other, or numbers)
    #[arg(short, long)]
    protocols: Option<String>,

    /// Keep only this uid (prefix with ! to exclude it)
    #[arg(short, long, allow_hyphen_values = true)]
    uid: Option<String>,

    /// Keep only packets from or to this IP address (prefix with ! to exclude it)
    #[arg(short, long)]
    address: Option<String>,

    /// Number of packets to skip
    #[arg(short, long)]
    skip: Option<u32>,

    /// Maximum number of packets to write
    #[arg(short = 'n', long)]
    max_packets: Option<u32>,

    /// Fail on the first line that cannot be decoded
    #[arg(long)]
    strict: bool,

    /// Check packet fields and warn on inconsistencies
    #[arg(long)]
    validate: bool,

    /// Print packet statistics (JSON) after the run
    #[arg(long)]
    stats: bool,

    /// Input file (default: standard input)
    #[arg(default_value = "-")]
    input: String,
}

fn to_io_error(e: libpacket_tools::Error) -> io::Error {
    match e {
        libpacket_tools::Error::Io(e) => e,
        e => io::Error::new(io::ErrorKind::Other, e),
    }
}

fn load_config(config: &mut Config, filename: &str) -> Result<(), io::Error> {
    debug!("Loading configuration {filename}");
    let path = Path::new(&filename);
    let file = File::open(path).map_err(|e| {
        error!("Could not open config file '{}'", filename);
        e
    })?;
    config.load_config(file).map_err(to_io_error)
}

fn build_filters(args: &Args) -> Result<Vec<Box<dyn Filter>>, libpacket_tools::Error> {
    let mut filters: Vec<Box<dyn Filter>> = Vec::new();
    if let Some(s) = args.protocols.as_ref() {
        debug!("adding protocol filter: {s}");
        filters.push(Box::new(ProtocolFilter::of_string(s)?));
    }
    if let Some(s) = args.uid.as_ref() {
        debug!("adding uid filter: {s}");
        filters.push(Box::new(UidFilter::of_string(s)?));
    }
    if let Some(s) = args.address.as_ref() {
        debug!("adding address filter: {s}");
        filters.push(Box::new(AddressFilter::of_string(s)?));
    }
    Ok(filters)
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_env("PACKET_LOG_LOG")
        .unwrap_or_else(|_| EnvFilter::from_default_env().add_directive(Level::WARN.into()));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .compact()
        .init();
    info!("packet-log {}", crate_version!());

    // load config
    let mut config = Config::default();
    if let Some(filename) = args.config.as_ref() {
        load_config(&mut config, filename)?;
    }
    // override config options from command-line arguments
    if let Some(format) = args.format.as_ref() {
        config.set("output_format", format.as_str());
    }
    if let Some(skip) = args.skip {
        config.set("skip_index", i64::from(skip));
    }
    if let Some(max) = args.max_packets {
        config.set("max_packets", i64::from(max));
    }
    if args.strict {
        config.set("strict", true);
    }

    let format = OutputFormat::of_string(config.get("output_format").unwrap_or("text"))
        .map_err(to_io_error)?;
    let filters = build_filters(&args).map_err(to_io_error)?;

    let mut input_reader: Box<dyn io::Read> = if args.input == "-" {
        Box::new(io::stdin())
    } else {
        let path = Path::new(&args.input);
        let file = File::open(path).map_err(|e| {
            error!("Could not open input file '{}'", args.input);
            e
        })?;
        Box::new(file)
    };

    let writer = PacketWriter::new(BufWriter::new(io::stdout().lock()), format);
    let analyzer = PacketLog::new(writer, args.stats, args.validate);
    let mut engine = PacketEngine::new(analyzer, &config).with_filters(filters);
    engine.run(&mut input_reader).map_err(to_io_error)?;

    let ctx = engine.context();
    if ctx.invalid_lines > 0 {
        warn!("{} lines could not be decoded", ctx.invalid_lines);
    }
    let log = engine.analyzer();
    if log.num_invalid() > 0 {
        warn!("{} packets failed validation", log.num_invalid());
    }
    info!("{} packets written", log.num_written());
    if let Some(stats) = log.stats() {
        let s = serde_json::to_string_pretty(&stats.get_results_json())
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        println!("{s}");
    }

    info!("packet-log: done");
    Ok(())
}

//! Packet description library
//!
//! A [`Packet`] describes one observed network packet (addresses, ports,
//! protocol, flags, payload excerpt and owning application), as decoded by a
//! capture component. Its `Display` implementation is the canonical one-line
//! rendering used for logs and diagnostics.
//!
//! The [`PacketEngine`] reads packet descriptions from JSON lines and feeds
//! them to a [`PacketAnalyzer`], optionally through a list of [`Filter`]s.

#[macro_use]
extern crate log;

mod analyzer;
mod config;
mod context;
mod engine;
mod error;
mod five_tuple;
pub mod filter;
mod packet;
mod protocol;
pub mod stats;
mod writer;

pub use analyzer::*;
pub use config::Config;
pub use context::*;
pub use engine::*;
pub use error::*;
pub use filter::{Filter, Verdict};
pub use five_tuple::*;
pub use packet::*;
pub use protocol::*;
pub use writer::*;

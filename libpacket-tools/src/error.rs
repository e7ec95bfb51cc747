use std::convert::From;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Generic(&'static str),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// A descriptor line could not be decoded (input only)
    #[error("invalid packet at line {line}: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A field was not set when building a `Packet`
    #[error("missing packet field: {0}")]
    MissingField(&'static str),
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),
    #[error("invalid port: {0}")]
    InvalidPort(i32),
    #[error("invalid IP version: {0}")]
    InvalidVersion(i32),
    /// Address family does not match the declared IP version
    #[error("address {addr} is not an IPv{version} address")]
    VersionMismatch { version: i32, addr: String },
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

impl From<&'static str> for Error {
    fn from(s: &'static str) -> Self {
        Error::Generic(s)
    }
}

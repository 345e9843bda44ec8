//! Typed failures shared across the workspace.
//!
//! Every store-level failure carries enough context for the user to locate
//! and fix the problem by hand: malformed-entry errors name both the store
//! file and the offending entry key.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WolError>;

#[derive(Error, Debug)]
pub enum WolError {
    #[error("invalid MAC address {0}")]
    InvalidMac(String),

    #[error("invalid IPv4 address {0}")]
    InvalidIp(String),

    #[error("invalid port {0}")]
    InvalidPort(String),

    /// The store file exists but is not a JSON object with a `names` object.
    #[error("{} is malformed", path.display())]
    MalformedStore { path: PathBuf },

    /// A specific saved entry fails field validation.
    #[error("`{name}` entry in {} is malformed: {problem}", path.display())]
    MalformedEntry {
        path: PathBuf,
        name: String,
        problem: EntryProblem,
    },

    #[error("unable to save {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("name {0} not found")]
    NameNotFound(String),
}

/// What exactly is wrong with a stored entry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryProblem {
    #[error("not a record object")]
    Record,
    #[error("mac address is missing or malformed")]
    Mac,
    #[error("ip address is malformed")]
    Ip,
    #[error("port is malformed")]
    Port,
}

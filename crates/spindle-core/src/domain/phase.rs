use serde::{Deserialize, Serialize};
use std::fmt;

/// Which I/O step a request is waiting for.
///
/// Only consulted by the I/O-in-worker actor model; I/O-external dispatch
/// ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Socket is readable; the worker should read then process.
    #[default]
    Read,

    /// Response is ready; the worker should write it out.
    Write,
}

impl Phase {
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            Phase::Read => 0,
            Phase::Write => 1,
        }
    }

    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Phase::Read,
            _ => Phase::Write,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Read => f.write_str("read"),
            Phase::Write => f.write_str("write"),
        }
    }
}

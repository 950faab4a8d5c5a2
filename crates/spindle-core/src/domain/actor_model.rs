use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Runtime selector for the dispatch strategy.
///
/// `IoInWorker` maps to [`IoInWorker`](crate::impls::IoInWorker) and
/// `IoExternal` to [`IoExternal`](crate::impls::IoExternal). Use the unit
/// strategies directly when the mode is known at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActorModel {
    /// I/O already happened elsewhere; workers only run business logic.
    #[default]
    IoExternal,

    /// Workers perform the read/write themselves before processing.
    IoInWorker,
}

impl ActorModel {
    pub fn as_str(self) -> &'static str {
        match self {
            ActorModel::IoExternal => "io-external",
            ActorModel::IoInWorker => "io-in-worker",
        }
    }
}

impl fmt::Display for ActorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the kebab-case names plus the legacy numeric flags
/// (`0` = io-external, `1` = io-in-worker).
impl FromStr for ActorModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "io-external" | "0" => Ok(ActorModel::IoExternal),
            "io-in-worker" | "1" => Ok(ActorModel::IoInWorker),
            other => Err(format!(
                "unknown actor model '{other}' (expected io-external or io-in-worker)"
            )),
        }
    }
}

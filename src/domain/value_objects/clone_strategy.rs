use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an existing working copy is brought up to date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloneStrategy {
    /// Discard local changes (`git reset --hard`) then `git pull`
    Reset,
    /// `git pull`
    Pull,
    /// `git fetch`, leaving the working tree untouched
    Fetch,
}

impl Default for CloneStrategy {
    fn default() -> Self {
        Self::Reset
    }
}

impl fmt::Display for CloneStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CloneStrategy {
    type Err = CloneStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reset" => Ok(CloneStrategy::Reset),
            "pull" => Ok(CloneStrategy::Pull),
            "fetch" => Ok(CloneStrategy::Fetch),
            _ => Err(CloneStrategyError(s.to_string())),
        }
    }
}

impl CloneStrategy {
    /// Lowercase name used in configuration and results
    pub fn as_str(&self) -> &'static str {
        match self {
            CloneStrategy::Reset => "reset",
            CloneStrategy::Pull => "pull",
            CloneStrategy::Fetch => "fetch",
        }
    }

    /// Whether the strategy rewrites the working tree
    pub fn touches_working_tree(&self) -> bool {
        !matches!(self, CloneStrategy::Fetch)
    }
}

/// Unknown strategy name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneStrategyError(pub String);

impl fmt::Display for CloneStrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid clone strategy '{}'. Supported strategies are: reset, pull, fetch",
            self.0
        )
    }
}

impl std::error::Error for CloneStrategyError {}

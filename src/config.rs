use serde::Deserialize;

use crate::node::Strategy;

/// Construction options for a [`Codec`](crate::Codec).
///
/// Every field has a default, so a partial document deserializes fine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How the two lightest nodes are found on each merge round.
    pub strategy: Strategy,
}

impl Config {
    pub fn with_strategy(strategy: Strategy) -> Self {
        Self { strategy }
    }
}

use crate::error::SlotParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One of the dialect's numbered variable slots, `VALUE_0` through `VALUE_9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariableSlot(u8);

impl VariableSlot {
    pub const COUNT: u8 = 10;
    const PREFIX: &'static str = "VALUE_";

    /// Returns `None` when `index` is outside `0..COUNT`.
    pub fn new(index: u8) -> Option<Self> {
        (index < Self::COUNT).then_some(Self(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Every slot in ascending order.
    pub fn all() -> impl Iterator<Item = VariableSlot> {
        (0..Self::COUNT).map(VariableSlot)
    }
}

impl fmt::Display for VariableSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

impl FromStr for VariableSlot {
    type Err = SlotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(Self::PREFIX)
            .filter(|digits| digits.len() == 1)
            .and_then(|digits| digits.parse::<u8>().ok())
            .and_then(VariableSlot::new)
            .ok_or_else(|| SlotParseError(s.to_string()))
    }
}

impl Serialize for VariableSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VariableSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

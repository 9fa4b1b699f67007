use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A TestRail case reference, rendered the way TestRail shows it (`C123`).
#[derive(Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
#[serde(transparent)]
pub struct CaseId(u64);

impl CaseId {
    pub fn new(value: u64) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for CaseId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "C{}", self.0)
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome code reported by the auth endpoint or the downstream server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultCode(pub u16);

impl ResultCode {
    pub const SUCCESS: Self = Self(0);

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl From<u16> for ResultCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

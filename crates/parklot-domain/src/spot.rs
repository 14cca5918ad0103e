//! Parking spot status.

use serde::{Deserialize, Serialize};

/// Occupancy of a single parking spot.
///
/// Storage format: one-letter code (`"A"` = Available, `"O"` = Occupied).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotStatus {
    Available,
    Occupied,
}

impl SpotStatus {
    pub const AVAILABLE_CODE: &'static str = "A";
    pub const OCCUPIED_CODE: &'static str = "O";

    /// Convert from the stored code. Returns `None` for unknown codes.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            Self::AVAILABLE_CODE => Some(Self::Available),
            Self::OCCUPIED_CODE => Some(Self::Occupied),
            _ => None,
        }
    }

    /// Convert to the stored code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Available => Self::AVAILABLE_CODE,
            Self::Occupied => Self::OCCUPIED_CODE,
        }
    }

    pub fn is_available(self) -> bool {
        self == Self::Available
    }
}

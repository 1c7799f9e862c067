//! OHLCV price rows and trade direction.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Direction of a signal. `Flat` means no trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    Short,
    #[default]
    Flat,
    Long,
}

impl Side {
    /// -1.0, 0.0 or 1.0; multiplies a raw return into the favorable direction.
    pub fn sign(self) -> f64 {
        match self {
            Side::Short => -1.0,
            Side::Flat => 0.0,
            Side::Long => 1.0,
        }
    }

    pub fn is_flat(self) -> bool {
        self == Side::Flat
    }

    pub fn as_i8(self) -> i8 {
        match self {
            Side::Short => -1,
            Side::Flat => 0,
            Side::Long => 1,
        }
    }
}

impl TryFrom<i64> for Side {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Side::Short),
            0 => Ok(Side::Flat),
            1 => Ok(Side::Long),
            other => Err(format!("side must be -1, 0 or 1, got {other}")),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Side::Short => "short",
            Side::Flat => "flat",
            Side::Long => "long",
        })
    }
}

/// Externally produced direction for one price timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub timestamp: NaiveDateTime,
    pub side: Side,
}

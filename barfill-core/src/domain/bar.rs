//! Bar: the fundamental market data unit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLC ordering violations reported by [`Bar::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BarError {
    #[error("high ({high}) must be >= low ({low})")]
    HighBelowLow { high: Decimal, low: Decimal },

    #[error("high ({high}) must be >= open ({open})")]
    HighBelowOpen { high: Decimal, open: Decimal },

    #[error("high ({high}) must be >= close ({close})")]
    HighBelowClose { high: Decimal, close: Decimal },

    #[error("low ({low}) must be <= open ({open})")]
    LowAboveOpen { low: Decimal, open: Decimal },

    #[error("low ({low}) must be <= close ({close})")]
    LowAboveClose { low: Decimal, close: Decimal },
}

/// OHLCV bar for one period.
///
/// The engine assumes `low <= min(open, close) <= max(open, close) <= high`.
/// It never checks this itself; boundary layers call [`Bar::validate`] before
/// a bar reaches `execute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

impl Bar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Check the OHLC ordering, reporting the first broken relation.
    pub fn validate(&self) -> Result<(), BarError> {
        if self.high < self.low {
            return Err(BarError::HighBelowLow {
                high: self.high,
                low: self.low,
            });
        }
        if self.high < self.open {
            return Err(BarError::HighBelowOpen {
                high: self.high,
                open: self.open,
            });
        }
        if self.high < self.close {
            return Err(BarError::HighBelowClose {
                high: self.high,
                close: self.close,
            });
        }
        if self.low > self.open {
            return Err(BarError::LowAboveOpen {
                low: self.low,
                open: self.open,
            });
        }
        if self.low > self.close {
            return Err(BarError::LowAboveClose {
                low: self.low,
                close: self.close,
            });
        }
        Ok(())
    }

    /// Close above open.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}

// 2.0 fees.rs: maker/taker fee pair. rates are fractions of notional,
// negative = rebate. granularity is 0.00001 (0.1 bps).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decimal::is_multiple_of;
use crate::validation::ValidationError;

/// Smallest fee increment.
pub const FEE_QUANTUM: Decimal = dec!(0.00001);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingFees {
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
}

impl TradingFees {
    pub fn new(maker_fee: Decimal, taker_fee: Decimal) -> Self {
        Self {
            maker_fee,
            taker_fee,
        }
    }

    pub fn zero() -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO)
    }

    // worst case an order could be charged
    pub fn max_fee(&self) -> Decimal {
        self.maker_fee.max(self.taker_fee)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fee("maker_fee", self.maker_fee)?;
        validate_fee("taker_fee", self.taker_fee)?;
        Ok(())
    }
}

// 2.1: a single rate must sit in (-1, 1) on the 0.00001 grid.
pub fn validate_fee(field: &'static str, fee: Decimal) -> Result<(), ValidationError> {
    let reason = if fee <= Decimal::NEGATIVE_ONE {
        Some(format!("fee cannot be less than or equal to -1, {fee}"))
    } else if fee >= Decimal::ONE {
        Some(format!("fee cannot be greater or equal to 1, {fee}"))
    } else if !is_multiple_of(fee, FEE_QUANTUM) {
        Some(format!("fee can only have up to 0.1 bps precision, {fee}"))
    } else {
        None
    };

    match reason {
        Some(reason) => {
            debug!(field, %fee, %reason, "fee rejected");
            Err(ValidationError::new(field, reason))
        }
        None => Ok(()),
    }
}

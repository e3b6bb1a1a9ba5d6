//! Market validation.
//!
//! A market is checked against an ordered table of named rules: first the
//! general rules every market must satisfy, then the table for its market
//! type. The first violated rule is reported. Ordering is part of the
//! contract since callers surface the first specific reason to proposers.

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::decimal::{checked_mul_exact, is_integer, is_multiple_of};
use crate::market::{merge, Market, MarketParams};
use crate::types::MarketType;

pub const MAX_MARKET_NAME_LENGTH: usize = 128;
pub const MAX_MARKET_DISPLAY_NAME_LENGTH: usize = 128;

// the venue ceiling is 10^30, which sits above Decimal::MAX (~7.9 * 10^28).
// the representable range is the effective bound.
pub const MAX_LOT_SIZE: Decimal = Decimal::MAX;
pub const MAX_TICK_SIZE: Decimal = Decimal::MAX;

/// Upper bound for mark and last-price bands, in bps.
pub const MAX_PRICE_BAND: u32 = 20_000;
/// Liquidation ticket must cover at least min_quantity / 1000.
pub const LIQUIDATION_TICKET_MULTIPLIER: Decimal = dec!(1000);
pub const MIN_LIQUIDATION_ORDER_DURATION: Duration = Duration::from_secs(30);
/// 9999-12-31T23:59:59Z + 1s
pub const MAX_EXPIRY_UNIX_SECS: i64 = 253_402_300_800;

/// A rejected field and why.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

enum Reason {
    Fixed(&'static str),
    Describe(fn(&Market) -> String),
}

struct Rule {
    name: &'static str,
    field: &'static str,
    violated: fn(&Market) -> bool,
    reason: Reason,
}

impl Rule {
    fn error(&self, market: &Market) -> ValidationError {
        let reason = match &self.reason {
            Reason::Fixed(s) => (*s).to_string(),
            Reason::Describe(f) => f(market),
        };
        ValidationError::new(self.field, reason)
    }
}

fn name_charset_ok(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/'))
}

fn display_name_charset_ok(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ' '))
}

fn band_out_of_range(band: u32) -> bool {
    band == 0 || band > MAX_PRICE_BAND
}

const GENERAL_RULES: &[Rule] = &[
    Rule {
        name: "name_present",
        field: "name",
        violated: |m| m.name.is_empty(),
        reason: Reason::Fixed("name must not be empty"),
    },
    Rule {
        name: "name_charset",
        field: "name",
        violated: |m| !name_charset_ok(&m.name),
        reason: Reason::Fixed("name must contain only a-z, A-Z, 0-9, _, '.' or '/'"),
    },
    Rule {
        name: "name_length",
        field: "name",
        violated: |m| m.name.len() > MAX_MARKET_NAME_LENGTH,
        reason: Reason::Describe(|_| {
            format!("name must be equal or less than {MAX_MARKET_NAME_LENGTH} in length")
        }),
    },
    Rule {
        name: "display_name_present",
        field: "display_name",
        violated: |m| m.display_name.is_empty(),
        reason: Reason::Fixed("display_name must not be empty"),
    },
    Rule {
        name: "display_name_charset",
        field: "display_name",
        violated: |m| !display_name_charset_ok(&m.display_name),
        reason: Reason::Fixed("display_name must contain only a-z, A-Z, 0-9, _, space, or '.'"),
    },
    Rule {
        name: "display_name_length",
        field: "display_name",
        violated: |m| m.display_name.len() > MAX_MARKET_DISPLAY_NAME_LENGTH,
        reason: Reason::Describe(|_| {
            format!(
                "display_name must be equal or less than {MAX_MARKET_DISPLAY_NAME_LENGTH} in length"
            )
        }),
    },
    Rule {
        name: "description_present",
        field: "description",
        violated: |m| m.description.is_empty(),
        reason: Reason::Fixed("description must not be empty"),
    },
    Rule {
        name: "base_present",
        field: "base",
        violated: |m| m.base.is_empty(),
        reason: Reason::Fixed("base must not be empty"),
    },
    Rule {
        name: "quote_present",
        field: "quote",
        violated: |m| m.quote.is_empty(),
        reason: Reason::Fixed("quote must not be empty"),
    },
    Rule {
        name: "lot_size_positive",
        field: "lot_size",
        violated: |m| m.lot_size <= Decimal::ZERO,
        reason: Reason::Fixed("lot_size must be more than zero"),
    },
    Rule {
        name: "lot_size_bounded",
        field: "lot_size",
        violated: |m| m.lot_size > MAX_LOT_SIZE,
        reason: Reason::Fixed("lot_size is too large"),
    },
    Rule {
        name: "tick_size_positive",
        field: "tick_size",
        violated: |m| m.tick_size <= Decimal::ZERO,
        reason: Reason::Fixed("tick_size must be positive"),
    },
    // a product that overflows or would need rounding cannot be checked,
    // so it is rejected too
    Rule {
        name: "tick_lot_product_integral",
        field: "tick_size",
        violated: |m| match checked_mul_exact(m.tick_size, m.lot_size) {
            Some(product) => !is_integer(product),
            None => true,
        },
        reason: Reason::Fixed("tick_size * lot_size must be an integer"),
    },
    Rule {
        name: "tick_size_bounded",
        field: "tick_size",
        violated: |m| m.tick_size > MAX_TICK_SIZE,
        reason: Reason::Fixed("tick_size is too large"),
    },
    Rule {
        name: "min_quantity_positive",
        field: "min_quantity",
        violated: |m| m.min_quantity <= Decimal::ZERO,
        reason: Reason::Fixed("min_quantity must be positive"),
    },
    Rule {
        name: "min_quantity_covers_lot",
        field: "min_quantity",
        violated: |m| m.min_quantity < m.lot_size,
        reason: Reason::Fixed("min_quantity must be greater or equal to lot_size"),
    },
    Rule {
        name: "min_quantity_lot_aligned",
        field: "min_quantity",
        violated: |m| !is_multiple_of(m.min_quantity, m.lot_size),
        reason: Reason::Describe(|m| {
            format!(
                "min_quantity: {} is not divisible by lot_size: {}",
                m.min_quantity, m.lot_size
            )
        }),
    },
];

const SPOT_RULES: &[Rule] = &[
    Rule {
        name: "spot_risk_step_size_zero",
        field: "risk_step_size",
        violated: |m| !m.risk_step_size.is_zero(),
        reason: Reason::Fixed("risk_step_size for spot markets must be zero"),
    },
    Rule {
        name: "spot_initial_margin_base_one",
        field: "initial_margin_base",
        violated: |m| m.initial_margin_base != Decimal::ONE,
        reason: Reason::Fixed("initial_margin_base for spot markets must be 100%"),
    },
    Rule {
        name: "spot_initial_margin_step_zero",
        field: "initial_margin_step",
        violated: |m| !m.initial_margin_step.is_zero(),
        reason: Reason::Fixed("initial_margin_step for spot markets must be zero"),
    },
    Rule {
        name: "spot_maintenance_margin_ratio_zero",
        field: "maintenance_margin_ratio",
        violated: |m| !m.maintenance_margin_ratio.is_zero(),
        reason: Reason::Fixed("maintenance_margin_ratio for spot markets must be zero"),
    },
    Rule {
        name: "spot_liquidation_ticket_zero",
        field: "max_liquidation_order_ticket",
        violated: |m| !m.max_liquidation_order_ticket.is_zero(),
        reason: Reason::Fixed("max_liquidation_order_ticket for spot markets must be zero"),
    },
    Rule {
        name: "spot_impact_size_zero",
        field: "impact_size",
        violated: |m| !m.impact_size.is_zero(),
        reason: Reason::Fixed("impact_size for spot markets must be zero"),
    },
    Rule {
        name: "spot_mark_price_band_zero",
        field: "mark_price_band",
        violated: |m| m.mark_price_band != 0,
        reason: Reason::Fixed("mark_price_band for spot markets must be zero"),
    },
    Rule {
        name: "spot_last_price_protected_band_zero",
        field: "last_price_protected_band",
        violated: |m| m.last_price_protected_band != 0,
        reason: Reason::Fixed("last_price_protected_band for spot markets must be zero"),
    },
    Rule {
        name: "spot_index_oracle_empty",
        field: "index_oracle_id",
        violated: |m| !m.index_oracle_id.is_empty(),
        reason: Reason::Fixed("index_oracle_id for spot markets must be empty"),
    },
    Rule {
        name: "spot_no_expiry",
        field: "expiry_time",
        violated: |m| m.expiry_time.unix_secs() != 0,
        reason: Reason::Fixed("expiry_time for spot markets must be zero"),
    },
    Rule {
        name: "spot_liquidation_duration_zero",
        field: "max_liquidation_order_duration",
        violated: |m| !m.max_liquidation_order_duration.is_zero(),
        reason: Reason::Fixed("max_liquidation_order_duration for spot markets must be zero"),
    },
];

const FUTURES_RULES: &[Rule] = &[
    Rule {
        name: "futures_initial_margin_base_positive",
        field: "initial_margin_base",
        violated: |m| m.initial_margin_base <= Decimal::ZERO,
        reason: Reason::Fixed("initial_margin_base for futures markets must be positive"),
    },
    Rule {
        name: "futures_maintenance_margin_ratio_range",
        field: "maintenance_margin_ratio",
        violated: |m| {
            m.maintenance_margin_ratio <= Decimal::ZERO
                || m.maintenance_margin_ratio >= Decimal::ONE
        },
        reason: Reason::Fixed("maintenance_margin_ratio for futures markets must between zero and one"),
    },
    Rule {
        name: "futures_risk_step_size_non_negative",
        field: "risk_step_size",
        violated: |m| m.risk_step_size < Decimal::ZERO,
        reason: Reason::Fixed("risk_step_size must not be negative"),
    },
    Rule {
        name: "futures_initial_margin_step_non_negative",
        field: "initial_margin_step",
        violated: |m| m.initial_margin_step < Decimal::ZERO,
        reason: Reason::Fixed("initial_margin_step must not be negative"),
    },
    Rule {
        name: "futures_risk_steps_co_zero",
        field: "risk_step_size",
        violated: |m| m.risk_step_size.is_zero() != m.initial_margin_step.is_zero(),
        reason: Reason::Fixed(
            "risk_step_size and initial_margin_step must be either both zero or both not zero",
        ),
    },
    // an overflowing product is far above any representable min_quantity
    Rule {
        name: "futures_liquidation_ticket_covers_min_quantity",
        field: "max_liquidation_order_ticket",
        violated: |m| {
            match m
                .max_liquidation_order_ticket
                .checked_mul(LIQUIDATION_TICKET_MULTIPLIER)
            {
                Some(scaled) => scaled < m.min_quantity,
                None => m.max_liquidation_order_ticket < Decimal::ZERO,
            }
        },
        reason: Reason::Fixed("max_liquidation_order_ticket must be at least 1/1000 of min_quantity"),
    },
    Rule {
        name: "futures_impact_size_positive",
        field: "impact_size",
        violated: |m| m.impact_size <= Decimal::ZERO,
        reason: Reason::Fixed("impact_size for futures markets must be positive"),
    },
    Rule {
        name: "futures_mark_price_band_range",
        field: "mark_price_band",
        violated: |m| band_out_of_range(m.mark_price_band),
        reason: Reason::Describe(|_| {
            format!("mark_price_band for futures markets must be between 0 and {MAX_PRICE_BAND}")
        }),
    },
    Rule {
        name: "futures_last_price_protected_band_range",
        field: "last_price_protected_band",
        violated: |m| band_out_of_range(m.last_price_protected_band),
        reason: Reason::Describe(|_| {
            format!("last_price_protected_band must be between 0 and {MAX_PRICE_BAND}")
        }),
    },
    Rule {
        name: "futures_index_oracle_present",
        field: "index_oracle_id",
        violated: |m| m.index_oracle_id.is_empty(),
        reason: Reason::Fixed("index_oracle_id (empty) is required for futures markets"),
    },
    Rule {
        name: "futures_liquidation_duration_floor",
        field: "max_liquidation_order_duration",
        violated: |m| m.max_liquidation_order_duration < MIN_LIQUIDATION_ORDER_DURATION,
        reason: Reason::Fixed("max_liquidation_order_duration must be at least 30 seconds"),
    },
    Rule {
        name: "futures_expiry_before_year_10000",
        field: "expiry_time",
        violated: |m| m.expiry_time.unix_secs() >= MAX_EXPIRY_UNIX_SECS,
        reason: Reason::Describe(|_| {
            format!("market expiry time's unix must be less than {MAX_EXPIRY_UNIX_SECS}")
        }),
    },
];

fn rules_for(market_type: MarketType) -> &'static [Rule] {
    match market_type {
        MarketType::Spot => SPOT_RULES,
        MarketType::Futures => FUTURES_RULES,
    }
}

/// Checks `market` against the general rules, then its type's rules.
/// Returns the first violation.
pub fn validate(market: &Market) -> Result<(), ValidationError> {
    let rules = GENERAL_RULES.iter().chain(rules_for(market.market_type));
    for rule in rules {
        if (rule.violated)(market) {
            let err = rule.error(market);
            debug!(
                market = %market.name,
                rule = rule.name,
                field = err.field,
                reason = %err.reason,
                "market rejected"
            );
            return Err(err);
        }
    }
    Ok(())
}

/// Merges `patch` onto `market` and validates the result. The stored
/// market is left alone; the caller commits the returned value.
pub fn validate_update(market: &Market, patch: &MarketParams) -> Result<Market, ValidationError> {
    let merged = merge(market, patch);
    validate(&merged)?;
    Ok(merged)
}

impl Market {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(self)
    }
}

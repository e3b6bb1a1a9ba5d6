// 7.0 params.rs: venue-wide defaults in one place. sizing, margins, fees, bands.
// 7.1 every field has its own validator; validate() runs them in declaration order.
// the liquidation duration floor here (3s) is a venue floor, separate from the
// 30s per-market floor enforced in validation.rs.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::fees::{validate_fee, TradingFees};
use crate::types::MarketType;
use crate::validation::{ValidationError, MAX_LOT_SIZE, MAX_PRICE_BAND, MAX_TICK_SIZE};

pub const MIN_DEFAULT_LIQUIDATION_ORDER_DURATION: Duration = Duration::from_secs(3);

// Venue parameter set. usd-denominated defaults are converted per market
// by the listing flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub default_lot_size_usd: Decimal,
    // relative to a base price of $1, i.e. the minimum spread
    pub default_tick_size_usd: Decimal,
    pub default_min_quantity_usd: Decimal,
    pub default_risk_step_size_usd: Decimal,
    pub default_initial_margin_base: Decimal,
    pub default_initial_margin_step: Decimal,
    pub default_max_liquidation_order_ticket_usd: Decimal,
    pub default_spot_maker_fee: Decimal,
    pub default_futures_maker_fee: Decimal,
    pub default_spot_taker_fee: Decimal,
    pub default_futures_taker_fee: Decimal,
    pub default_maintenance_margin_ratio: Decimal,
    pub default_max_liquidation_order_duration: Duration,
    pub default_impact_size_usd: Decimal,
    pub default_mark_price_band: u32,
    pub default_last_price_protected_band: u32,
    pub max_active_markets: u32,
    pub default_trading_bandwidth: u32,
    // yearly multiple, 175.20 = 2% hourly
    pub funding_rate_band: Decimal,
    pub default_lp_spot_maker_fee: Decimal,
    pub default_lp_spot_taker_fee: Decimal,
    pub default_lp_futures_maker_fee: Decimal,
    pub default_lp_futures_taker_fee: Decimal,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            default_lot_size_usd: dec!(1),
            default_tick_size_usd: dec!(0.001),
            default_min_quantity_usd: dec!(1),
            default_risk_step_size_usd: dec!(100000),
            default_initial_margin_base: dec!(0.2),
            default_initial_margin_step: dec!(0.0001),
            default_max_liquidation_order_ticket_usd: dec!(100000),
            default_spot_maker_fee: dec!(-0.001),
            default_futures_maker_fee: dec!(-0.0002),
            default_spot_taker_fee: dec!(0.002),
            default_futures_taker_fee: dec!(0.0005),
            default_maintenance_margin_ratio: dec!(0.7),
            default_max_liquidation_order_duration: Duration::from_secs(60),
            default_impact_size_usd: dec!(100000), // approx 1 btc
            default_mark_price_band: 100,
            default_last_price_protected_band: 200,
            max_active_markets: 300,
            default_trading_bandwidth: 300,
            funding_rate_band: dec!(175.20),
            default_lp_spot_maker_fee: Decimal::ZERO,
            default_lp_spot_taker_fee: Decimal::ZERO,
            default_lp_futures_maker_fee: Decimal::ZERO,
            default_lp_futures_taker_fee: Decimal::ZERO,
        }
    }
}

impl Params {
    // testnet: no maker fees, tighter market count
    pub fn testnet() -> Self {
        Self {
            default_spot_maker_fee: Decimal::ZERO,
            default_futures_maker_fee: Decimal::ZERO,
            max_active_markets: 50,
            ..Self::default()
        }
    }

    // mainnet with conservative margins: 4x max leverage, wider liquidation window
    pub fn mainnet_conservative() -> Self {
        Self {
            default_initial_margin_base: dec!(0.25),
            default_initial_margin_step: dec!(0.0002),
            default_max_liquidation_order_duration: Duration::from_secs(120),
            default_mark_price_band: 50,
            ..Self::default()
        }
    }

    /// Runs every field validator in declaration order; first failure wins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.check_fields().inspect_err(|err| {
            debug!(field = err.field, reason = %err.reason, "params rejected");
        })
    }

    fn check_fields(&self) -> Result<(), ValidationError> {
        validate_lot_size(self.default_lot_size_usd)?;
        validate_tick_size(self.default_tick_size_usd)?;
        validate_min_quantity(self.default_min_quantity_usd)?;
        validate_fee("default_spot_maker_fee", self.default_spot_maker_fee)?;
        validate_fee("default_futures_maker_fee", self.default_futures_maker_fee)?;
        validate_fee("default_spot_taker_fee", self.default_spot_taker_fee)?;
        validate_fee("default_futures_taker_fee", self.default_futures_taker_fee)?;
        non_negative("default_risk_step_size_usd", self.default_risk_step_size_usd)?;
        non_negative("default_initial_margin_base", self.default_initial_margin_base)?;
        non_negative("default_initial_margin_step", self.default_initial_margin_step)?;
        validate_maintenance_margin_ratio(self.default_maintenance_margin_ratio)?;
        validate_liquidation_order_duration(self.default_max_liquidation_order_duration)?;
        price_band("default_mark_price_band", self.default_mark_price_band)?;
        price_band(
            "default_last_price_protected_band",
            self.default_last_price_protected_band,
        )?;
        non_zero("max_active_markets", self.max_active_markets)?;
        non_zero("default_trading_bandwidth", self.default_trading_bandwidth)?;
        non_negative("funding_rate_band", self.funding_rate_band)?;
        lp_maker_fee("default_lp_spot_maker_fee", self.default_lp_spot_maker_fee)?;
        lp_taker_fee("default_lp_spot_taker_fee", self.default_lp_spot_taker_fee)?;
        lp_maker_fee("default_lp_futures_maker_fee", self.default_lp_futures_maker_fee)?;
        lp_taker_fee("default_lp_futures_taker_fee", self.default_lp_futures_taker_fee)?;
        Ok(())
    }

    pub fn default_trading_fees(&self, market_type: MarketType) -> TradingFees {
        match market_type {
            MarketType::Spot => {
                TradingFees::new(self.default_spot_maker_fee, self.default_spot_taker_fee)
            }
            MarketType::Futures => {
                TradingFees::new(self.default_futures_maker_fee, self.default_futures_taker_fee)
            }
        }
    }

    // fees charged to the liquidity pool's own orders
    pub fn default_pool_trading_fees(&self, market_type: MarketType) -> TradingFees {
        match market_type {
            MarketType::Spot => TradingFees::new(
                self.default_lp_spot_maker_fee,
                self.default_lp_spot_taker_fee,
            ),
            MarketType::Futures => TradingFees::new(
                self.default_lp_futures_maker_fee,
                self.default_lp_futures_taker_fee,
            ),
        }
    }
}

fn invalid(field: &'static str, reason: String) -> Result<(), ValidationError> {
    Err(ValidationError::new(field, reason))
}

fn validate_lot_size(lot_size: Decimal) -> Result<(), ValidationError> {
    const FIELD: &str = "default_lot_size_usd";
    if lot_size <= Decimal::ZERO {
        return invalid(FIELD, format!("lot_size must be more than zero: {lot_size}"));
    }
    if lot_size > MAX_LOT_SIZE {
        return invalid(FIELD, format!("lot_size is too large: {lot_size}"));
    }
    Ok(())
}

fn validate_tick_size(tick_size: Decimal) -> Result<(), ValidationError> {
    const FIELD: &str = "default_tick_size_usd";
    if tick_size <= Decimal::ZERO {
        return invalid(FIELD, format!("tick_size must be positive, {tick_size}"));
    }
    if tick_size > MAX_TICK_SIZE {
        return invalid(FIELD, format!("tick_size is too large, {tick_size}"));
    }
    Ok(())
}

fn validate_min_quantity(min_quantity: Decimal) -> Result<(), ValidationError> {
    if min_quantity <= Decimal::ZERO {
        return invalid(
            "default_min_quantity_usd",
            format!("min_quantity must be positive, {min_quantity}"),
        );
    }
    Ok(())
}

fn non_negative(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return invalid(field, format!("{field} must not be negative, {value}"));
    }
    Ok(())
}

fn validate_maintenance_margin_ratio(ratio: Decimal) -> Result<(), ValidationError> {
    if ratio <= Decimal::ZERO || ratio >= Decimal::ONE {
        return invalid(
            "default_maintenance_margin_ratio",
            format!("maintenance_margin_ratio must between zero and one, {ratio}"),
        );
    }
    Ok(())
}

fn validate_liquidation_order_duration(duration: Duration) -> Result<(), ValidationError> {
    if duration < MIN_DEFAULT_LIQUIDATION_ORDER_DURATION {
        return invalid(
            "default_max_liquidation_order_duration",
            format!("max_liquidation_order_duration must be at least 3 seconds, {duration:?}"),
        );
    }
    Ok(())
}

fn price_band(field: &'static str, band: u32) -> Result<(), ValidationError> {
    if band == 0 || band > MAX_PRICE_BAND {
        return invalid(
            field,
            format!("{field} must be between 0 and {MAX_PRICE_BAND}, {band}"),
        );
    }
    Ok(())
}

fn non_zero(field: &'static str, value: u32) -> Result<(), ValidationError> {
    if value == 0 {
        return invalid(field, format!("{field} must be greater than 0, {value}"));
    }
    Ok(())
}

fn lp_maker_fee(field: &'static str, fee: Decimal) -> Result<(), ValidationError> {
    if fee > Decimal::ZERO {
        return invalid(field, format!("maker fee should not be positive: {fee}"));
    }
    Ok(())
}

fn lp_taker_fee(field: &'static str, fee: Decimal) -> Result<(), ValidationError> {
    if !fee.is_zero() {
        return invalid(field, format!("taker fee should only be zero: {fee}"));
    }
    Ok(())
}

// Environment presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Testnet,
    Mainnet,
}

impl Environment {
    pub fn params(&self) -> Params {
        match self {
            Environment::Development => Params::default(),
            Environment::Testnet => Params::testnet(),
            Environment::Mainnet => Params::mainnet_conservative(),
        }
    }
}

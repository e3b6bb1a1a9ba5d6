//! Market definition and sparse updates.
//!
//! A market is a single trading pair with its pricing, sizing and margining
//! parameters. Markets are replaced wholesale on update: governance sends a
//! [`MarketParams`] patch, it is merged onto the stored market, and the
//! result is re-validated before it is committed.

use crate::types::{MarketType, Timestamp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Full market definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    /// Unique id, e.g. "btc_z29"
    pub name: String,
    /// Human label, e.g. "BTC PERP"
    pub display_name: String,
    pub description: String,
    pub market_type: MarketType,
    /// Base denom (what is traded)
    pub base: String,
    /// Quote denom (what prices and margin are in)
    pub quote: String,
    pub base_precision: i64,
    pub quote_precision: i64,
    /// Minimum size increment
    pub lot_size: Decimal,
    /// Minimum price increment
    pub tick_size: Decimal,
    pub min_quantity: Decimal,
    pub is_active: bool,
    /// Position size per margin tier. Zero disables tiering.
    pub risk_step_size: Decimal,
    pub initial_margin_base: Decimal,
    /// Extra initial margin per full risk step
    pub initial_margin_step: Decimal,
    pub maintenance_margin_ratio: Decimal,
    pub max_liquidation_order_ticket: Decimal,
    pub max_liquidation_order_duration: Duration,
    pub impact_size: Decimal,
    pub mark_price_band: u32,
    pub last_price_protected_band: u32,
    pub index_oracle_id: String,
    /// Unix 0 means no expiry (spot, perpetual futures)
    pub expiry_time: Timestamp,
    pub is_settled: bool,
}

impl Market {
    /// A stock ETH/USDC spot market.
    pub fn eth_usdc_spot() -> Self {
        Self {
            name: "eth_usdc".to_string(),
            display_name: "ETH_USDC".to_string(),
            description: "ETH/USDC Spot Market".to_string(),
            market_type: MarketType::Spot,
            base: "eth".to_string(),
            quote: "usdc".to_string(),
            base_precision: 18,
            quote_precision: 6,
            lot_size: dec!(100),
            tick_size: dec!(0.01),
            min_quantity: dec!(100),
            is_active: true,
            risk_step_size: Decimal::ZERO,
            initial_margin_base: Decimal::ONE,
            initial_margin_step: Decimal::ZERO,
            maintenance_margin_ratio: Decimal::ZERO,
            max_liquidation_order_ticket: Decimal::ZERO,
            max_liquidation_order_duration: Duration::ZERO,
            impact_size: Decimal::ZERO,
            mark_price_band: 0,
            last_price_protected_band: 0,
            index_oracle_id: String::new(),
            expiry_time: Timestamp::ZERO,
            is_settled: false,
        }
    }

    /// A stock BTC perpetual futures market.
    pub fn btc_perp() -> Self {
        Self {
            name: "btc_perp.usdc".to_string(),
            display_name: "BTC PERP".to_string(),
            description: "BTC/USDC Perpetual Futures".to_string(),
            market_type: MarketType::Futures,
            base: "btc".to_string(),
            quote: "usdc".to_string(),
            base_precision: 8,
            quote_precision: 6,
            lot_size: dec!(1000),
            tick_size: dec!(0.1),
            min_quantity: dec!(10000),
            is_active: true,
            risk_step_size: dec!(100000),
            initial_margin_base: dec!(0.2),
            initial_margin_step: dec!(0.0001),
            maintenance_margin_ratio: dec!(0.7),
            max_liquidation_order_ticket: dec!(100000),
            max_liquidation_order_duration: Duration::from_secs(60),
            impact_size: dec!(100000),
            mark_price_band: 100,
            last_price_protected_band: 200,
            index_oracle_id: "BTC_USD_INDEX".to_string(),
            expiry_time: Timestamp::ZERO,
            is_settled: false,
        }
    }

    /// quote_precision - base_precision
    pub fn precision_difference(&self) -> i64 {
        self.quote_precision - self.base_precision
    }

    pub fn is_futures(&self) -> bool {
        self.market_type == MarketType::Futures
    }

    pub fn is_spot(&self) -> bool {
        self.market_type == MarketType::Spot
    }

    pub fn is_perpetual_futures(&self) -> bool {
        self.is_futures() && self.expiry_time.unix_secs() == 0
    }

    /// Membership by name.
    pub fn is_in_markets(&self, markets: &[Market]) -> bool {
        markets.iter().any(|m| m.name == self.name)
    }

    /// Overwrites every field the patch sets. `name` is never touched.
    pub fn apply(&mut self, patch: &MarketParams) {
        if let Some(v) = &patch.display_name {
            self.display_name = v.clone();
        }
        if let Some(v) = &patch.description {
            self.description = v.clone();
        }
        if let Some(v) = patch.market_type {
            self.market_type = v;
        }
        if let Some(v) = &patch.base {
            self.base = v.clone();
        }
        if let Some(v) = &patch.quote {
            self.quote = v.clone();
        }
        if let Some(v) = patch.base_precision {
            self.base_precision = v;
        }
        if let Some(v) = patch.quote_precision {
            self.quote_precision = v;
        }
        if let Some(v) = patch.lot_size {
            self.lot_size = v;
        }
        if let Some(v) = patch.tick_size {
            self.tick_size = v;
        }
        if let Some(v) = patch.min_quantity {
            self.min_quantity = v;
        }
        if let Some(v) = patch.is_active {
            self.is_active = v;
        }
        if let Some(v) = patch.risk_step_size {
            self.risk_step_size = v;
        }
        if let Some(v) = patch.initial_margin_base {
            self.initial_margin_base = v;
        }
        if let Some(v) = patch.initial_margin_step {
            self.initial_margin_step = v;
        }
        if let Some(v) = patch.maintenance_margin_ratio {
            self.maintenance_margin_ratio = v;
        }
        if let Some(v) = patch.max_liquidation_order_ticket {
            self.max_liquidation_order_ticket = v;
        }
        if let Some(v) = patch.max_liquidation_order_duration {
            self.max_liquidation_order_duration = v;
        }
        if let Some(v) = patch.impact_size {
            self.impact_size = v;
        }
        if let Some(v) = patch.mark_price_band {
            self.mark_price_band = v;
        }
        if let Some(v) = patch.last_price_protected_band {
            self.last_price_protected_band = v;
        }
        if let Some(v) = &patch.index_oracle_id {
            self.index_oracle_id = v.clone();
        }
        if let Some(v) = patch.expiry_time {
            self.expiry_time = v;
        }
        if let Some(v) = patch.is_settled {
            self.is_settled = v;
        }
    }
}

/// Sparse market update. `None` leaves the field as it is.
///
/// `name` is carried so a proposal can address a market, but it is never
/// written by [`merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketParams {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub market_type: Option<MarketType>,
    pub base: Option<String>,
    pub quote: Option<String>,
    pub base_precision: Option<i64>,
    pub quote_precision: Option<i64>,
    pub lot_size: Option<Decimal>,
    pub tick_size: Option<Decimal>,
    pub min_quantity: Option<Decimal>,
    pub is_active: Option<bool>,
    pub risk_step_size: Option<Decimal>,
    pub initial_margin_base: Option<Decimal>,
    pub initial_margin_step: Option<Decimal>,
    pub maintenance_margin_ratio: Option<Decimal>,
    pub max_liquidation_order_ticket: Option<Decimal>,
    pub max_liquidation_order_duration: Option<Duration>,
    pub impact_size: Option<Decimal>,
    pub mark_price_band: Option<u32>,
    pub last_price_protected_band: Option<u32>,
    pub index_oracle_id: Option<String>,
    pub expiry_time: Option<Timestamp>,
    pub is_settled: Option<bool>,
}

impl MarketParams {
    /// Patch addressing `name` with nothing else set.
    pub fn for_market(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        let addressed_only = MarketParams {
            name: self.name.clone(),
            ..Self::default()
        };
        *self == addressed_only
    }
}

/// Returns `market` with `patch` applied. Does not validate; callers must
/// run [`crate::validation::validate`] on the result before committing it.
pub fn merge(market: &Market, patch: &MarketParams) -> Market {
    let mut merged = market.clone();
    merged.apply(patch);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        let spot = Market::eth_usdc_spot();
        assert!(spot.is_spot());
        assert!(!spot.is_perpetual_futures());

        let perp = Market::btc_perp();
        assert!(perp.is_futures());
        assert!(perp.is_perpetual_futures());
    }

    #[test]
    fn dated_futures_not_perpetual() {
        let mut market = Market::btc_perp();
        market.expiry_time = Timestamp::from_unix_secs(1_800_000_000);
        assert!(!market.is_perpetual_futures());
    }

    #[test]
    fn precision_difference() {
        let spot = Market::eth_usdc_spot();
        assert_eq!(spot.precision_difference(), -12);
    }

    #[test]
    fn membership_by_name() {
        let spot = Market::eth_usdc_spot();
        let perp = Market::btc_perp();

        let mut renamed_copy = perp.clone();
        renamed_copy.display_name = "Other".to_string();

        assert!(perp.is_in_markets(&[spot.clone(), renamed_copy]));
        assert!(!perp.is_in_markets(&[spot]));
        assert!(!perp.is_in_markets(&[]));
    }

    #[test]
    fn merge_overwrites_set_fields_only() {
        let market = Market::btc_perp();
        let patch = MarketParams {
            tick_size: Some(dec!(0.5)),
            mark_price_band: Some(300),
            index_oracle_id: Some("BTC_USD_V2".to_string()),
            ..MarketParams::default()
        };

        let merged = merge(&market, &patch);
        assert_eq!(merged.tick_size, dec!(0.5));
        assert_eq!(merged.mark_price_band, 300);
        assert_eq!(merged.index_oracle_id, "BTC_USD_V2");

        assert_eq!(merged.lot_size, market.lot_size);
        assert_eq!(merged.description, market.description);
        assert_eq!(merged.expiry_time, market.expiry_time);
    }

    #[test]
    fn merge_never_renames() {
        let market = Market::btc_perp();
        let patch = MarketParams {
            name: Some("hijacked".to_string()),
            display_name: Some("New Label".to_string()),
            ..MarketParams::default()
        };

        let merged = merge(&market, &patch);
        assert_eq!(merged.name, market.name);
        assert_eq!(merged.display_name, "New Label");
    }

    #[test]
    fn empty_patch_is_identity() {
        let market = Market::eth_usdc_spot();
        let patch = MarketParams::for_market(market.name.clone());
        assert!(patch.is_empty());
        assert_eq!(merge(&market, &patch), market);
    }

    #[test]
    fn merge_can_deactivate_and_settle() {
        let mut market = Market::btc_perp();
        market.apply(&MarketParams {
            is_active: Some(false),
            is_settled: Some(true),
            ..MarketParams::default()
        });
        assert!(!market.is_active);
        assert!(market.is_settled);
    }
}

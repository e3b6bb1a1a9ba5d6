//! Margin requirements for a market.
//!
//! Initial margin (IM) is a fraction of notional required to open a
//! position. It grows stepwise with position size: every full
//! `risk_step_size` adds `initial_margin_step` on top of
//! `initial_margin_base`. Maintenance margin (MM) is IM scaled by
//! `maintenance_margin_ratio`.
//!
//! Fee margin is the extra quote collateral an order reserves to cover the
//! worst fee it could be charged.
//!
//! Every function here assumes the market already passed validation.

use crate::decimal::{checked_mul_exact, floor_div, truncate_dp};
use crate::fees::TradingFees;
use crate::market::Market;
use crate::types::{Amount, MarketType};
use rust_decimal::Decimal;
use tracing::trace;

/// Decimal places kept by [`max_leverage`].
pub const LEVERAGE_DP: u32 = 18;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarginError {
    #[error("{operation} is not applicable to {market_type} markets")]
    NotApplicable {
        operation: &'static str,
        market_type: MarketType,
    },

    #[error("{operation} overflowed the fixed-point range")]
    Overflow { operation: &'static str },
}

/// IM and MM fractions for one position size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarginRequirement {
    pub risk_step: Decimal,
    pub initial: Decimal,
    pub maintenance: Decimal,
}

fn require_futures(market: &Market, operation: &'static str) -> Result<(), MarginError> {
    if market.market_type == MarketType::Futures {
        Ok(())
    } else {
        Err(MarginError::NotApplicable {
            operation,
            market_type: market.market_type,
        })
    }
}

fn overflow(operation: &'static str) -> MarginError {
    MarginError::Overflow { operation }
}

/// `1 / initial_margin_base`, truncated to [`LEVERAGE_DP`] places.
/// 0.2 → 5x, spot (base 1) → 1x.
pub fn max_leverage(market: &Market) -> Result<Decimal, MarginError> {
    let leverage = Decimal::ONE
        .checked_div(market.initial_margin_base)
        .ok_or_else(|| overflow("max_leverage"))?;
    Ok(truncate_dp(leverage, LEVERAGE_DP))
}

/// Number of full risk steps `size` covers. Zero when the market has no tiers.
pub fn risk_step(market: &Market, size: Decimal) -> Result<Decimal, MarginError> {
    if market.risk_step_size.is_zero() {
        return Ok(Decimal::ZERO);
    }
    floor_div(size.abs(), market.risk_step_size).ok_or_else(|| overflow("risk_step"))
}

/// IM = initial_margin_base + floor(|size| / risk_step_size) * initial_margin_step
pub fn required_initial_margin(market: &Market, size: Decimal) -> Result<Decimal, MarginError> {
    let step = risk_step(market, size)?;
    let im = market
        .initial_margin_step
        .checked_mul(step)
        .and_then(|extra| market.initial_margin_base.checked_add(extra))
        .ok_or_else(|| overflow("required_initial_margin"))?;

    trace!(market = %market.name, %size, %step, %im, "initial margin");
    Ok(im)
}

/// MM = IM * maintenance_margin_ratio
pub fn required_maintenance_margin(market: &Market, size: Decimal) -> Result<Decimal, MarginError> {
    let im = required_initial_margin(market, size)?;
    im.checked_mul(market.maintenance_margin_ratio)
        .ok_or_else(|| overflow("required_maintenance_margin"))
}

pub fn margin_requirement(market: &Market, size: Decimal) -> Result<MarginRequirement, MarginError> {
    let risk_step = risk_step(market, size)?;
    let initial = required_initial_margin(market, size)?;
    let maintenance = required_maintenance_margin(market, size)?;
    Ok(MarginRequirement {
        risk_step,
        initial,
        maintenance,
    })
}

/// Quote collateral reserved for fees on an order of `quantity` at `price`.
///
/// Always priced at the larger of the two rates since an edited order can
/// end up either maker or taker. Rounded up. When both rates are rebates
/// the result is zero rather than negative.
///
/// Futures only: spot fees come out of the received amount.
pub fn fee_margin(
    market: &Market,
    quantity: Decimal,
    price: Decimal,
    fees: &TradingFees,
) -> Result<Amount, MarginError> {
    require_futures(market, "fee_margin")?;

    let max_fee = fees.max_fee();
    let exact = checked_mul_exact(quantity, max_fee).and_then(|a| checked_mul_exact(a, price));
    let amount = match exact {
        Some(fee) => fee.ceil(),
        None => {
            let rounded = quantity
                .checked_mul(max_fee)
                .and_then(|a| a.checked_mul(price))
                .ok_or_else(|| overflow("fee_margin"))?;
            let negative = (quantity < Decimal::ZERO)
                ^ (max_fee < Decimal::ZERO)
                ^ (price < Decimal::ZERO);
            // the dropped digits may hold a fraction, so a positive fee is
            // bumped past the next whole unit
            if negative {
                rounded.ceil()
            } else {
                rounded
                    .floor()
                    .checked_add(Decimal::ONE)
                    .ok_or_else(|| overflow("fee_margin"))?
            }
        }
    }
    .max(Decimal::ZERO);

    trace!(market = %market.name, %quantity, %price, %max_fee, %amount, "fee margin");
    Ok(Amount::new(market.quote.clone(), amount))
}

/// Largest size still inside risk step `step`: (step + 1) * risk_step_size - lot_size.
/// With a 10 btc step and 0.001 lot, step 0 → 9.999.
pub fn max_size_for_step(market: &Market, step: u64) -> Result<Decimal, MarginError> {
    require_futures(market, "max_size_for_step")?;
    Decimal::from(step)
        .checked_add(Decimal::ONE)
        .and_then(|s| s.checked_mul(market.risk_step_size))
        .and_then(|s| s.checked_sub(market.lot_size))
        .ok_or_else(|| overflow("max_size_for_step"))
}

/// Smallest size inside risk step `step`: step * risk_step_size + lot_size.
/// With a 10 btc step and 0.001 lot, step 0 → 0.001.
pub fn min_size_for_step(market: &Market, step: u64) -> Result<Decimal, MarginError> {
    require_futures(market, "min_size_for_step")?;
    Decimal::from(step)
        .checked_mul(market.risk_step_size)
        .and_then(|s| s.checked_add(market.lot_size))
        .ok_or_else(|| overflow("min_size_for_step"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn futures() -> Market {
        let mut market = Market::btc_perp();
        market.initial_margin_base = dec!(0.2);
        market.initial_margin_step = dec!(0.0001);
        market.risk_step_size = dec!(100000);
        market.maintenance_margin_ratio = dec!(0.7);
        market
    }

    #[test]
    fn max_leverage_is_inverse_of_base() {
        assert_eq!(max_leverage(&futures()).unwrap(), dec!(5));
        assert_eq!(max_leverage(&Market::eth_usdc_spot()).unwrap(), dec!(1));
    }

    #[test]
    fn max_leverage_truncates() {
        let mut market = futures();
        market.initial_margin_base = dec!(0.3);
        assert_eq!(
            max_leverage(&market).unwrap(),
            dec!(3.333333333333333333)
        );
    }

    #[test]
    fn initial_margin_steps() {
        let market = futures();
        assert_eq!(required_initial_margin(&market, dec!(0)).unwrap(), dec!(0.2));
        assert_eq!(required_initial_margin(&market, dec!(99999)).unwrap(), dec!(0.2));
        assert_eq!(required_initial_margin(&market, dec!(100000)).unwrap(), dec!(0.2001));
        assert_eq!(required_initial_margin(&market, dec!(250000)).unwrap(), dec!(0.2002));
    }

    #[test]
    fn initial_margin_uses_absolute_size() {
        let market = futures();
        assert_eq!(
            required_initial_margin(&market, dec!(-250000)).unwrap(),
            required_initial_margin(&market, dec!(250000)).unwrap()
        );
    }

    #[test]
    fn initial_margin_just_below_step_boundary() {
        let mut market = futures();
        market.risk_step_size = dec!(3);
        // |size| / 3 is 2.99..97, which rounds to 3 at 28 significant digits
        let size = dec!(8.9999999999999999999999999999);
        assert_eq!(risk_step(&market, size).unwrap(), dec!(2));
        assert_eq!(required_initial_margin(&market, size).unwrap(), dec!(0.2002));
        assert_eq!(required_initial_margin(&market, -size).unwrap(), dec!(0.2002));
        assert_eq!(required_initial_margin(&market, dec!(9)).unwrap(), dec!(0.2003));
    }

    #[test]
    fn initial_margin_without_tiers() {
        let mut market = futures();
        market.risk_step_size = Decimal::ZERO;
        market.initial_margin_step = Decimal::ZERO;
        assert_eq!(required_initial_margin(&market, dec!(1_000_000_000)).unwrap(), dec!(0.2));
    }

    #[test]
    fn spot_initial_margin_is_full() {
        let spot = Market::eth_usdc_spot();
        assert_eq!(required_initial_margin(&spot, dec!(123456)).unwrap(), Decimal::ONE);
    }

    #[test]
    fn maintenance_margin_scales_initial() {
        let market = futures();
        // 0.2002 * 0.7
        assert_eq!(
            required_maintenance_margin(&market, dec!(250000)).unwrap(),
            dec!(0.14014)
        );
    }

    #[test]
    fn requirement_bundle() {
        let req = margin_requirement(&futures(), dec!(-310000)).unwrap();
        assert_eq!(req.risk_step, dec!(3));
        assert_eq!(req.initial, dec!(0.2003));
        assert_eq!(req.maintenance, dec!(0.14021));
    }

    #[test]
    fn initial_margin_overflow_is_an_error() {
        let mut market = futures();
        market.risk_step_size = dec!(0.0000000000000000000000000001);
        market.initial_margin_step = Decimal::MAX;
        let err = required_initial_margin(&market, dec!(1000)).unwrap_err();
        assert!(matches!(err, MarginError::Overflow { .. }));
    }

    #[test]
    fn fee_margin_worst_case_rate() {
        let fees = TradingFees::new(dec!(-0.0002), dec!(0.0005));
        let margin = fee_margin(&futures(), dec!(10), dec!(50000), &fees).unwrap();
        assert_eq!(margin.amount, dec!(250));
        assert_eq!(margin.denom, "usdc");
    }

    #[test]
    fn fee_margin_rounds_up() {
        let fees = TradingFees::new(dec!(0.0001), dec!(0.0003));
        // 3 * 0.0003 * 1001.1 = 0.900990
        let margin = fee_margin(&futures(), dec!(3), dec!(1001.1), &fees).unwrap();
        assert_eq!(margin.amount, dec!(1));
    }

    #[test]
    fn fee_margin_below_precision_still_rounds_up() {
        // exact fee is 1e-30, which rounds to 0 at 28 places
        let fees = TradingFees::new(Decimal::ZERO, dec!(0.00001));
        let margin = fee_margin(
            &futures(),
            dec!(0.0000000001),
            dec!(0.000000000000001),
            &fees,
        )
        .unwrap();
        assert_eq!(margin.amount, dec!(1));
    }

    #[test]
    fn fee_margin_below_precision_rebate_is_zero() {
        let fees = TradingFees::new(dec!(-0.00002), dec!(-0.00001));
        let margin = fee_margin(
            &futures(),
            dec!(0.0000000001),
            dec!(0.000000000000001),
            &fees,
        )
        .unwrap();
        assert!(margin.is_zero());
    }

    #[test]
    fn fee_margin_rebates_clamp_to_zero() {
        let fees = TradingFees::new(dec!(-0.0002), dec!(-0.0001));
        let margin = fee_margin(&futures(), dec!(10), dec!(50000), &fees).unwrap();
        assert!(margin.is_zero());
    }

    #[test]
    fn fee_margin_spot_not_applicable() {
        let fees = TradingFees::new(dec!(-0.001), dec!(0.002));
        let err = fee_margin(&Market::eth_usdc_spot(), dec!(1), dec!(1), &fees).unwrap_err();
        assert_eq!(
            err,
            MarginError::NotApplicable {
                operation: "fee_margin",
                market_type: MarketType::Spot,
            }
        );
        assert_eq!(err.to_string(), "fee_margin is not applicable to spot markets");
    }

    #[test]
    fn step_bounds() {
        let mut market = futures();
        market.risk_step_size = dec!(10);
        market.lot_size = dec!(0.001);

        assert_eq!(min_size_for_step(&market, 0).unwrap(), dec!(0.001));
        assert_eq!(max_size_for_step(&market, 0).unwrap(), dec!(9.999));
        assert_eq!(min_size_for_step(&market, 1).unwrap(), dec!(10.001));
        assert_eq!(max_size_for_step(&market, 1).unwrap(), dec!(19.999));
    }

    #[test]
    fn step_bounds_spot_not_applicable() {
        let spot = Market::eth_usdc_spot();
        assert!(matches!(
            min_size_for_step(&spot, 0),
            Err(MarginError::NotApplicable { .. })
        ));
        assert!(matches!(
            max_size_for_step(&spot, 0),
            Err(MarginError::NotApplicable { .. })
        ));
    }
}

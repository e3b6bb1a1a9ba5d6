//! Market engine walkthrough.
//!
//! Lists a spot and a futures market, pushes a governance update through
//! merge + validation, and prints margin figures for a few position sizes.

use chrono::Utc;
use market_core::*;
use rust_decimal_macros::dec;
use tracing::Level;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    println!("Market Engine Walkthrough\n");

    scenario_1_listing();
    scenario_2_rejected_update();
    scenario_3_margin_tiers();
    scenario_4_fee_margin();
    scenario_5_expiry();

    println!("\nAll scenarios completed.");
}

fn report(label: &str, result: Result<(), ValidationError>) {
    match result {
        Ok(()) => println!("  {label}: accepted"),
        Err(e) => println!("  {label}: rejected ({e})"),
    }
}

/// Validate the stock markets and the venue parameters.
fn scenario_1_listing() {
    println!("Scenario 1: Listing\n");

    let params = Environment::Development.params();
    report("venue params", params.validate());
    report("eth_usdc spot", Market::eth_usdc_spot().validate());
    report("btc perp", Market::btc_perp().validate());
    println!();
}

/// A spot market cannot carry a mark price band.
fn scenario_2_rejected_update() {
    println!("Scenario 2: Governance Update\n");

    let spot = Market::eth_usdc_spot();
    let patch = MarketParams {
        mark_price_band: Some(5),
        ..MarketParams::for_market(spot.name.clone())
    };
    report("mark_price_band = 5", validate_update(&spot, &patch).map(|_| ()));

    let patch = MarketParams {
        description: Some("ETH/USDC Spot (relisted)".to_string()),
        ..MarketParams::for_market(spot.name.clone())
    };
    report("new description", validate_update(&spot, &patch).map(|_| ()));
    println!();
}

fn scenario_3_margin_tiers() {
    println!("Scenario 3: Margin Tiers\n");

    let perp = Market::btc_perp();
    match max_leverage(&perp) {
        Ok(lev) => println!("  max leverage: {lev}x"),
        Err(e) => println!("  max leverage: {e}"),
    }

    for size in [dec!(10000), dec!(250000), dec!(-250000), dec!(1_000_000)] {
        match margin_requirement(&perp, size) {
            Ok(req) => println!(
                "  size {size}: step {} IM {} MM {}",
                req.risk_step, req.initial, req.maintenance
            ),
            Err(e) => println!("  size {size}: {e}"),
        }
    }

    for step in 0..3u64 {
        if let (Ok(lo), Ok(hi)) = (min_size_for_step(&perp, step), max_size_for_step(&perp, step)) {
            println!("  step {step}: sizes {lo} ..= {hi}");
        }
    }
    println!();
}

fn scenario_4_fee_margin() {
    println!("Scenario 4: Fee Margin\n");

    let params = Params::default();
    let perp = Market::btc_perp();
    let fees = params.default_trading_fees(perp.market_type);

    match fee_margin(&perp, dec!(10), dec!(50000), &fees) {
        Ok(amount) => println!("  10 @ 50000, fees {fees:?}: reserve {amount}"),
        Err(e) => println!("  futures fee margin: {e}"),
    }

    let spot = Market::eth_usdc_spot();
    if let Err(e) = fee_margin(&spot, dec!(10), dec!(2500), &fees) {
        println!("  spot fee margin: {e}");
    }
    println!();
}

fn scenario_5_expiry() {
    println!("Scenario 5: Expiry\n");

    let now = Timestamp::from_datetime(Utc::now());
    let mut dated = Market::btc_perp();
    dated.name = "btc_expired".to_string();
    dated.expiry_time = Timestamp::from_unix_secs(now.unix_secs() - 3600);

    let markets = vec![Market::eth_usdc_spot(), Market::btc_perp(), dated];
    let live: Vec<_> = filter_before_expiry(&markets, now)
        .into_iter()
        .map(|m| m.name)
        .collect();
    let to_settle: Vec<_> = filter_to_settle(&markets, now)
        .into_iter()
        .map(|m| m.name)
        .collect();

    println!("  now: {now}");
    println!("  live: {live:?}");
    println!("  to settle: {to_settle:?}");
}

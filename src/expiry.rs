// 4.0 expiry.rs: market lifetime against an explicit block time.
// spot and perpetual markets never expire. dated futures expire at expiry_time
// and are settled once afterwards.

use crate::market::Market;
use crate::types::Timestamp;

pub fn is_before_expiry(market: &Market, now: Timestamp) -> bool {
    if !market.is_futures() {
        return true;
    }
    if market.is_perpetual_futures() {
        return true;
    }
    now < market.expiry_time
}

/// Open for trading: flagged active and not yet expired.
pub fn is_market_active(market: &Market, now: Timestamp) -> bool {
    market.is_active && is_before_expiry(market, now)
}

pub fn filter_before_expiry(markets: &[Market], now: Timestamp) -> Vec<Market> {
    markets
        .iter()
        .filter(|m| is_before_expiry(m, now))
        .cloned()
        .collect()
}

// 4.1: expired and not yet settled
pub fn filter_to_settle(markets: &[Market], now: Timestamp) -> Vec<Market> {
    markets
        .iter()
        .filter(|m| !is_before_expiry(m, now) && !m.is_settled)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated(name: &str, expiry_secs: i64) -> Market {
        let mut market = Market::btc_perp();
        market.name = name.to_string();
        market.expiry_time = Timestamp::from_unix_secs(expiry_secs);
        market
    }

    #[test]
    fn spot_and_perp_never_expire() {
        let far_future = Timestamp::from_unix_secs(200_000_000_000);
        assert!(is_before_expiry(&Market::eth_usdc_spot(), far_future));
        assert!(is_before_expiry(&Market::btc_perp(), far_future));
    }

    #[test]
    fn dated_futures_expire_at_expiry_time() {
        let market = dated("btc_z29", 1_000);
        assert!(is_before_expiry(&market, Timestamp::from_millis(999_999)));
        assert!(!is_before_expiry(&market, Timestamp::from_unix_secs(1_000)));
        assert!(!is_before_expiry(&market, Timestamp::from_unix_secs(1_001)));
    }

    #[test]
    fn active_requires_flag_and_time() {
        let mut market = dated("btc_z29", 1_000);
        assert!(is_market_active(&market, Timestamp::from_unix_secs(10)));
        assert!(!is_market_active(&market, Timestamp::from_unix_secs(2_000)));

        market.is_active = false;
        assert!(!is_market_active(&market, Timestamp::from_unix_secs(10)));
    }

    #[test]
    fn filters_preserve_order() {
        let now = Timestamp::from_unix_secs(5_000);
        let mut settled = dated("settled", 1_000);
        settled.is_settled = true;

        let markets = vec![
            dated("expired_a", 1_000),
            Market::eth_usdc_spot(),
            dated("live", 9_000),
            settled,
            dated("expired_b", 4_999),
            Market::btc_perp(),
        ];

        let live: Vec<String> = filter_before_expiry(&markets, now)
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(live, vec!["eth_usdc", "live", "btc_perp.usdc"]);

        let to_settle: Vec<String> = filter_to_settle(&markets, now)
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(to_settle, vec!["expired_a", "expired_b"]);
    }

    #[test]
    fn filters_on_empty_input() {
        assert!(filter_before_expiry(&[], Timestamp::ZERO).is_empty());
        assert!(filter_to_settle(&[], Timestamp::ZERO).is_empty());
    }
}

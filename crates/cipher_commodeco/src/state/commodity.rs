//! Commodity State
//!
//! Listings are public: the contract keeps prices as 18-decimal fixed point.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

const WEI_DECIMALS: u32 = 18;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommodityInfo {
    pub symbol: String,
    pub name: String,
    /// Current price in dollars
    pub price: f64,
    pub is_active: bool,
}

/// 18-decimal fixed point to dollars
pub fn price_from_wei(wei: U256) -> f64 {
    let unit = U256::from(10u64).pow(U256::from(WEI_DECIMALS));
    let whole = u128::try_from(wei / unit).unwrap_or(u128::MAX);
    let frac = u128::try_from(wei % unit).unwrap_or_default();
    whole as f64 + frac as f64 / 1e18
}

/// Dollars to 18-decimal fixed point, at cent precision
///
/// Returns `None` for negative or non-finite prices.
pub fn price_to_wei(dollars: f64) -> Option<U256> {
    if !dollars.is_finite() || dollars < 0.0 {
        return None;
    }
    let cents = (dollars * 100.0).round() as u128;
    Some(U256::from(cents) * U256::from(10u64).pow(U256::from(WEI_DECIMALS - 2)))
}

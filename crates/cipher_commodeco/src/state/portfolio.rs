//! Portfolio State
//!
//! Aggregate trader metrics travel the same encrypted channel as orders.
//! Four fields go in; the contract keeps three of them per trader.

use serde::{Deserialize, Serialize};

use super::order::{dollars_to_cents, narrow, EncryptedBundle};
use crate::error::Result;

pub const PORTFOLIO_FIELD_COUNT: usize = 4;

/// Handles the contract stores per trader (the user id is not kept)
pub const STORED_PORTFOLIO_FIELD_COUNT: usize = 3;

pub const PORTFOLIO_FIELDS: [&str; PORTFOLIO_FIELD_COUNT] =
    ["totalValueCents", "totalPnlCents", "tradeCount", "userId"];

pub const STORED_PORTFOLIO_FIELDS: [&str; STORED_PORTFOLIO_FIELD_COUNT] =
    ["totalValueCents", "totalPnlCents", "tradeCount"];

/// Portfolio metrics in dollars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRequest {
    pub total_value: f64,
    pub total_pnl: f64,
    pub trade_count: u64,
    pub user_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioPlaintext {
    pub total_value_cents: u64,
    pub total_pnl_cents: u64,
    pub trade_count: u64,
    pub user_id: u64,
}

impl PortfolioPlaintext {
    /// A negative PnL has no unsigned encoding and is rejected
    pub fn from_request(request: &PortfolioRequest) -> Result<Self> {
        Ok(Self {
            total_value_cents: dollars_to_cents("totalValueCents", request.total_value)?,
            total_pnl_cents: dollars_to_cents("totalPnlCents", request.total_pnl)?,
            trade_count: request.trade_count,
            user_id: request.user_id,
        })
    }

    pub fn field_values(&self) -> Result<[u32; PORTFOLIO_FIELD_COUNT]> {
        Ok([
            narrow(PORTFOLIO_FIELDS[0], self.total_value_cents)?,
            narrow(PORTFOLIO_FIELDS[1], self.total_pnl_cents)?,
            narrow(PORTFOLIO_FIELDS[2], self.trade_count)?,
            narrow(PORTFOLIO_FIELDS[3], self.user_id)?,
        ])
    }
}

pub type EncryptedPortfolioBundle = EncryptedBundle<PORTFOLIO_FIELD_COUNT>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecryptedPortfolio {
    pub total_value: f64,
    pub total_pnl: f64,
    pub trade_count: u32,
    pub success: bool,
}

impl DecryptedPortfolio {
    pub fn placeholder() -> Self {
        Self {
            total_value: 0.0,
            total_pnl: 0.0,
            trade_count: 0,
            success: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TradingError;

    #[test]
    fn test_request_to_fields() {
        let plain = PortfolioPlaintext::from_request(&PortfolioRequest {
            total_value: 12_500.75,
            total_pnl: 310.2,
            trade_count: 14,
            user_id: 3,
        })
        .unwrap();
        assert_eq!(plain.field_values().unwrap(), [1_250_075, 31_020, 14, 3]);
    }

    #[test]
    fn test_negative_pnl_is_rejected() {
        let err = PortfolioPlaintext::from_request(&PortfolioRequest {
            total_value: 10.0,
            total_pnl: -4.5,
            trade_count: 1,
            user_id: 1,
        })
        .unwrap_err();
        assert!(matches!(
            err,
            TradingError::FieldOutOfRange { field: "totalPnlCents", .. }
        ));
    }

    #[test]
    fn test_wide_user_id_is_rejected() {
        let plain = PortfolioPlaintext {
            total_value_cents: 0,
            total_pnl_cents: 0,
            trade_count: 0,
            user_id: u64::MAX,
        };
        assert!(matches!(
            plain.field_values(),
            Err(TradingError::FieldOutOfRange { field: "userId", .. })
        ));
    }
}

//! Portfolio Encryption and Decryption
//!
//! Same mechanics as orders. The update carries four fields, the contract
//! keeps three of them:
//!
//! ```text
//! encrypt: totalValueCents, totalPnlCents, tradeCount, userId
//! stored:  totalValueCents, totalPnlCents, tradeCount
//! ```
//!
//! Only the trader can decrypt their own portfolio.

use alloy_primitives::{Address, B256};
use tracing::{debug, info};

use super::session::{clear_u32, encrypt_fields, DecryptionContext};
use crate::error::{require, Result, TradingError};
use crate::service::{ClearValues, EncryptionService, HandleContractPair};
use crate::state::{
    DecryptOutcome, DecryptedPortfolio, EncryptedPortfolioBundle, PortfolioPlaintext, PRICE_SCALE,
    STORED_PORTFOLIO_FIELDS, STORED_PORTFOLIO_FIELD_COUNT,
};

pub type PortfolioDecryption<'a> = DecryptionContext<'a>;

pub async fn encrypt_portfolio(
    service: &dyn EncryptionService,
    contract_address: Address,
    account_address: Address,
    portfolio: &PortfolioPlaintext,
) -> Result<EncryptedPortfolioBundle> {
    info!(account = %account_address, "🚀 Starting FHE portfolio encryption");
    let values = portfolio.field_values()?;
    let bundle = encrypt_fields(service, contract_address, account_address, values).await?;
    info!("✅ Portfolio encrypted");
    Ok(bundle)
}

impl DecryptionContext<'_> {
    pub async fn decrypt_portfolio(
        &self,
        trader: Address,
    ) -> Result<DecryptOutcome<DecryptedPortfolio>> {
        info!(trader = %trader, "🚀 Starting portfolio decryption process");
        require!(
            trader == self.account,
            TradingError::NotPortfolioOwner {
                account: self.account,
                trader,
            }
        );

        let handles = self.book.portfolio_encrypted_data(trader).await?;
        let pairs = self.handle_pairs(handles.as_array());
        require!(
            !pairs.is_empty(),
            TradingError::NoEncryptedData {
                record: format!("portfolio of {trader}"),
            }
        );
        debug!(handles = pairs.len(), "📊 Portfolio handles loaded");

        let result = self.recover_portfolio(handles.as_array(), &pairs).await;
        self.settle(result, DecryptedPortfolio::placeholder)
    }

    async fn recover_portfolio(
        &self,
        handles: &[B256; STORED_PORTFOLIO_FIELD_COUNT],
        pairs: &[HandleContractPair],
    ) -> Result<DecryptedPortfolio> {
        let auth = self.authorize().await?;
        let values = self.decrypt(pairs, &auth).await?;
        let portfolio = parse_portfolio(handles, &values)?;
        info!("🎉 Portfolio decrypted");
        Ok(portfolio)
    }
}

fn parse_portfolio(
    handles: &[B256; STORED_PORTFOLIO_FIELD_COUNT],
    values: &ClearValues,
) -> Result<DecryptedPortfolio> {
    let [value_cents, pnl_cents, trade_count] = [0usize, 1, 2]
        .map(|i| clear_u32(values, &handles[i], STORED_PORTFOLIO_FIELDS[i]));
    Ok(DecryptedPortfolio {
        total_value: f64::from(value_cents?) / PRICE_SCALE,
        total_pnl: f64::from(pnl_cents?) / PRICE_SCALE,
        trade_count: trade_count?,
        success: true,
    })
}

// ============================================================================
// TESTS
// ============================================================================

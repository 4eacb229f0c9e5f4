//! Trading Client
//!
//! The entry point a front end talks to. Wires the shared encryption service,
//! the trading contract and the connected wallet together:
//!
//! ```text
//! submit_order ──▶ encrypt_order ──▶ placeOrder ──▶ OrderReceipt
//! decrypt_order_by_id ──▶ getOrderEncryptedData ──▶ decrypt_order
//! load_commodities ──▶ getAllCommoditySymbols ──▶ getCommodityInfo × N
//! ```

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use futures::future::join_all;
use tracing::{error, info, warn};

use crate::codec::is_unset;
use crate::contract::{CommodecoContract, ContractTransport, EncryptedOrderHandles, OrderBook, OrderReceipt};
use crate::error::{Result, TradingError};
use crate::pipeline::{encrypt_order, encrypt_portfolio, DecryptionContext};
use crate::service::{EncryptionServiceManager, ServiceBootstrap, ServiceHandle};
use crate::state::{
    price_to_wei, ClientConfig, CommodityInfo, DecryptOutcome, DecryptedOrder, DecryptedPortfolio,
    EncryptedOrderBundle, OrderPlaintext, OrderRequest, OrderType, PortfolioPlaintext,
    PortfolioRequest,
};
use crate::wallet::WalletSigner;

pub struct CommodecoClient<T> {
    config: ClientConfig,
    manager: Arc<EncryptionServiceManager>,
    contract: CommodecoContract<T>,
    signer: Arc<dyn WalletSigner>,
}

impl<T: ContractTransport> CommodecoClient<T> {
    pub fn new(
        config: ClientConfig,
        bootstrap: Arc<dyn ServiceBootstrap>,
        transport: T,
        signer: Arc<dyn WalletSigner>,
    ) -> Self {
        let manager = Arc::new(EncryptionServiceManager::new(&config, bootstrap));
        Self::with_manager(config, manager, transport, signer)
    }

    /// Build a client on an existing manager, so several clients share one
    /// service instance
    pub fn with_manager(
        config: ClientConfig,
        manager: Arc<EncryptionServiceManager>,
        transport: T,
        signer: Arc<dyn WalletSigner>,
    ) -> Self {
        let contract = CommodecoContract::new(config.contract_address, transport);
        Self {
            config,
            manager,
            contract,
            signer,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn manager(&self) -> &Arc<EncryptionServiceManager> {
        &self.manager
    }

    pub fn contract(&self) -> &CommodecoContract<T> {
        &self.contract
    }

    /// Connected account
    pub fn account(&self) -> Address {
        self.signer.address()
    }

    fn decryption<'a>(&'a self, service: &'a ServiceHandle) -> DecryptionContext<'a> {
        DecryptionContext {
            service: service.as_ref(),
            book: &self.contract,
            signer: self.signer.as_ref(),
            account: self.account(),
            validity_days: self.config.authorization_validity_days,
            fallback: self.config.decrypt_fallback,
        }
    }

    // ------------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------------

    /// Encrypt an order and write it to the contract
    pub async fn submit_order(&self, request: &OrderRequest) -> Result<OrderReceipt> {
        let order = OrderPlaintext::from_request(request)?;
        let service = self.manager.get_instance().await?;
        let bundle = encrypt_order(
            service.as_ref(),
            self.contract.address(),
            self.account(),
            &order,
        )
        .await?;

        let receipt = self
            .contract
            .place_order(&request.commodity_symbol, request.order_type, &bundle)
            .await?;
        info!(
            tx = %receipt.transaction_hash,
            symbol = %request.commodity_symbol,
            "✅ Encrypted order submitted"
        );
        Ok(receipt)
    }

    pub async fn decrypt_order(
        &self,
        order_id: u64,
        handles: &EncryptedOrderHandles,
    ) -> Result<DecryptOutcome<DecryptedOrder>> {
        let service = self.manager.get_instance().await?;
        self.decryption(&service).decrypt_order(order_id, handles).await
    }

    /// Fetch the order's stored handles, then decrypt them
    pub async fn decrypt_order_by_id(&self, order_id: u64) -> Result<DecryptOutcome<DecryptedOrder>> {
        let handles = self.contract.order_encrypted_data(order_id).await?;
        self.decrypt_order(order_id, &handles).await
    }

    pub async fn order_count(&self) -> Result<U256> {
        Ok(self.contract.order_count().await?)
    }

    // ------------------------------------------------------------------------
    // Portfolio
    // ------------------------------------------------------------------------

    pub async fn update_portfolio(&self, request: &PortfolioRequest) -> Result<B256> {
        let portfolio = PortfolioPlaintext::from_request(request)?;
        let service = self.manager.get_instance().await?;
        let bundle = encrypt_portfolio(
            service.as_ref(),
            self.contract.address(),
            self.account(),
            &portfolio,
        )
        .await?;
        Ok(self.contract.update_portfolio(&bundle).await?)
    }

    /// Decrypt the connected account's portfolio
    pub async fn decrypt_portfolio(&self) -> Result<DecryptOutcome<DecryptedPortfolio>> {
        let service = self.manager.get_instance().await?;
        self.decryption(&service)
            .decrypt_portfolio(self.account())
            .await
    }

    // ------------------------------------------------------------------------
    // Market data
    // ------------------------------------------------------------------------

    /// All listed commodities; entries that fail to load are skipped
    pub async fn load_commodities(&self) -> Result<Vec<CommodityInfo>> {
        let symbols = self.contract.all_commodity_symbols().await?;
        info!(count = symbols.len(), "📊 Loading commodities");

        let lookups = join_all(symbols.iter().map(|s| self.contract.commodity_info(s))).await;
        let mut commodities = Vec::with_capacity(symbols.len());
        for (symbol, lookup) in symbols.iter().zip(lookups) {
            match lookup {
                Ok(info) => commodities.push(info),
                Err(e) => warn!(symbol = %symbol, error = %e, "⚠️ Skipping commodity"),
            }
        }
        Ok(commodities)
    }

    /// List a commodity; the symbol is stored uppercased
    pub async fn create_commodity(
        &self,
        symbol: &str,
        name: &str,
        price: f64,
        total_supply: u64,
    ) -> Result<B256> {
        let initial_price =
            price_to_wei(price).ok_or_else(|| TradingError::out_of_range("initialPrice", price))?;
        let symbol = symbol.to_uppercase();
        let tx = self
            .contract
            .create_commodity(&symbol, name, initial_price, total_supply)
            .await?;
        info!(symbol = %symbol, tx = %tx, "✅ Commodity created");
        Ok(tx)
    }

    // ------------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------------

    /// Encrypt a fixed sample order for `account` and report whether the
    /// service produced a complete bundle
    pub async fn self_test(&self, account: Address) -> bool {
        match self.sample_bundle(account).await {
            Ok(bundle) => {
                let complete = bundle.handles.iter().all(|h| !is_unset(h)) && !bundle.proof.is_empty();
                info!(complete, "🧪 Encryption self test finished");
                complete
            }
            Err(e) => {
                error!(error = %e, "❌ Encryption self test failed");
                false
            }
        }
    }

    async fn sample_bundle(&self, account: Address) -> Result<EncryptedOrderBundle> {
        let order = OrderPlaintext::from_request(&OrderRequest {
            order_id: 1,
            order_type: OrderType::Buy,
            quantity: 100,
            price: 50.25,
            commodity_symbol: "GOLD".into(),
        })?;
        let service = self.manager.get_instance().await?;
        encrypt_order(service.as_ref(), self.contract.address(), account, &order).await
    }
}

// ============================================================================
// TESTS
// ============================================================================

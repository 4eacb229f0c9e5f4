//! Trading Contract Client
//!
//! Typed reads and writes over an abstract transport. The transport owns
//! RPC, gas and nonce handling; this layer only encodes calls and validates
//! what comes back.

use alloy_primitives::{Address, Bytes, Log, B256, U256};
use alloy_sol_types::{SolCall, SolEvent};
use async_trait::async_trait;
use tracing::{debug, warn};

use super::abi::{
    createCommodityCall, getAllCommoditySymbolsCall, getCommodityInfoCall,
    getOrderCountCall, getOrderEncryptedDataCall, getOrderHeaderCall,
    getPortfolioEncryptedDataCall, placeOrderCall, updatePortfolioCall, OrderPlaced,
};
use super::records::{EncryptedOrderHandles, EncryptedPortfolioHandles, OrderHeader, OrderReceipt};
use crate::error::{BackendError, ContractError};
use crate::state::{CommodityInfo, EncryptedOrderBundle, EncryptedPortfolioBundle, OrderType};

/// Mined transaction as reported by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub logs: Vec<Log>,
}

/// Raw access to the chain
#[async_trait]
pub trait ContractTransport: Send + Sync {
    /// `eth_call` against `to`
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, BackendError>;

    /// Sign, send and wait for the receipt
    async fn send_transaction(
        &self,
        to: Address,
        input: Bytes,
    ) -> Result<TransactionReceipt, BackendError>;
}

/// Reads the decryption pipelines depend on
#[async_trait]
pub trait OrderBook: Send + Sync {
    fn address(&self) -> Address;

    async fn order_header(&self, order_id: u64) -> Result<OrderHeader, ContractError>;

    async fn order_encrypted_data(
        &self,
        order_id: u64,
    ) -> Result<EncryptedOrderHandles, ContractError>;

    async fn portfolio_encrypted_data(
        &self,
        trader: Address,
    ) -> Result<EncryptedPortfolioHandles, ContractError>;
}

pub struct CommodecoContract<T> {
    address: Address,
    transport: T,
}

impl<T: ContractTransport> CommodecoContract<T> {
    pub fn new(address: Address, transport: T) -> Self {
        Self { address, transport }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return, ContractError> {
        let output = self
            .transport
            .call(self.address, call.abi_encode().into())
            .await
            .map_err(|source| ContractError::Call {
                method: C::SIGNATURE,
                source,
            })?;
        C::abi_decode_returns(&output, true).map_err(|e| ContractError::MalformedResponse {
            method: C::SIGNATURE,
            reason: e.to_string(),
        })
    }

    async fn write<C: SolCall>(&self, call: C) -> Result<TransactionReceipt, ContractError> {
        let receipt = self
            .transport
            .send_transaction(self.address, call.abi_encode().into())
            .await
            .map_err(|source| ContractError::Call {
                method: C::SIGNATURE,
                source,
            })?;
        debug!(tx = %receipt.transaction_hash, method = C::SIGNATURE, "📤 Transaction confirmed");
        Ok(receipt)
    }

    pub async fn all_commodity_symbols(&self) -> Result<Vec<String>, ContractError> {
        Ok(self.read(getAllCommoditySymbolsCall {}).await?.symbols)
    }

    pub async fn commodity_info(&self, symbol: &str) -> Result<CommodityInfo, ContractError> {
        let raw = self
            .read(getCommodityInfoCall {
                commodity: symbol.to_string(),
            })
            .await?;
        CommodityInfo::from_return(getCommodityInfoCall::SIGNATURE, symbol, raw)
    }

    pub async fn order_count(&self) -> Result<U256, ContractError> {
        Ok(self.read(getOrderCountCall {}).await?.count)
    }

    /// Write an encrypted order and pick its id out of the `OrderPlaced` event
    pub async fn place_order(
        &self,
        symbol: &str,
        order_type: OrderType,
        bundle: &EncryptedOrderBundle,
    ) -> Result<OrderReceipt, ContractError> {
        let receipt = self
            .write(placeOrderCall {
                symbol: symbol.to_string(),
                // 1 or 2
                orderType: order_type.code() as u8,
                encryptedFields: bundle.handles,
                inputProof: bundle.proof.clone(),
            })
            .await?;

        let order_id = self.order_placed_id(&receipt.logs);
        if order_id.is_none() {
            warn!(tx = %receipt.transaction_hash, "⚠️ No OrderPlaced event in receipt");
        }
        Ok(OrderReceipt {
            transaction_hash: receipt.transaction_hash,
            order_id,
        })
    }

    /// Listing writes carry no encrypted fields, so the proof is empty
    pub async fn create_commodity(
        &self,
        symbol: &str,
        name: &str,
        initial_price: U256,
        total_supply: u64,
    ) -> Result<B256, ContractError> {
        let receipt = self
            .write(createCommodityCall {
                symbol: symbol.to_string(),
                name: name.to_string(),
                initialPrice: initial_price,
                totalSupply: U256::from(total_supply),
                inputProof: Bytes::new(),
            })
            .await?;
        Ok(receipt.transaction_hash)
    }

    pub async fn update_portfolio(
        &self,
        bundle: &EncryptedPortfolioBundle,
    ) -> Result<B256, ContractError> {
        let receipt = self
            .write(updatePortfolioCall {
                encryptedFields: bundle.handles,
                inputProof: bundle.proof.clone(),
            })
            .await?;
        Ok(receipt.transaction_hash)
    }

    fn order_placed_id(&self, logs: &[Log]) -> Option<U256> {
        logs.iter()
            .filter(|log| log.address == self.address)
            .find_map(|log| OrderPlaced::decode_log_data(&log.data, true).ok())
            .map(|event| event.orderId)
    }
}

#[async_trait]
impl<T: ContractTransport> OrderBook for CommodecoContract<T> {
    fn address(&self) -> Address {
        self.address
    }

    async fn order_header(&self, order_id: u64) -> Result<OrderHeader, ContractError> {
        let raw = self
            .read(getOrderHeaderCall {
                orderId: U256::from(order_id),
            })
            .await?;
        OrderHeader::from_return(getOrderHeaderCall::SIGNATURE, order_id, raw)
    }

    async fn order_encrypted_data(
        &self,
        order_id: u64,
    ) -> Result<EncryptedOrderHandles, ContractError> {
        let raw = self
            .read(getOrderEncryptedDataCall {
                orderId: U256::from(order_id),
            })
            .await?;
        Ok(EncryptedOrderHandles::from(raw.handles))
    }

    async fn portfolio_encrypted_data(
        &self,
        trader: Address,
    ) -> Result<EncryptedPortfolioHandles, ContractError> {
        let raw = self
            .read(getPortfolioEncryptedDataCall { trader })
            .await?;
        Ok(EncryptedPortfolioHandles::from(raw.handles))
    }
}

// ============================================================================
// TESTS
// ============================================================================

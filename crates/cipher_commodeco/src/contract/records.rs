//! Typed records for contract data
//!
//! Raw call results are checked here, once, on the way in. Nothing past this
//! module indexes into loosely shaped tuples.

use alloy_primitives::{Address, B256, U256};

use super::abi::{getCommodityInfoReturn, getOrderHeaderReturn};
use crate::codec::is_unset;
use crate::error::ContractError;
use crate::state::{price_from_wei, CommodityInfo, ORDER_FIELD_COUNT, STORED_PORTFOLIO_FIELD_COUNT};

/// Public part of an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHeader {
    pub creator: Address,
    pub symbol: String,
    /// Unix seconds
    pub timestamp: u64,
}

impl OrderHeader {
    pub(crate) fn from_return(
        method: &'static str,
        order_id: u64,
        raw: getOrderHeaderReturn,
    ) -> Result<Self, ContractError> {
        if raw.creator == Address::ZERO {
            return Err(ContractError::MalformedResponse {
                method,
                reason: format!("order {order_id} does not exist"),
            });
        }
        let timestamp = u64::try_from(raw.timestamp).map_err(|_| ContractError::MalformedResponse {
            method,
            reason: format!("timestamp {} out of range", raw.timestamp),
        })?;
        Ok(Self {
            creator: raw.creator,
            symbol: raw.symbol,
            timestamp,
        })
    }
}

/// Fixed set of ciphertext handles stored for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptedHandles<const N: usize>(pub [B256; N]);

impl<const N: usize> EncryptedHandles<N> {
    /// Accept a dynamically sized handle list of exactly `N` entries
    pub fn from_slice(method: &'static str, handles: &[B256]) -> Result<Self, ContractError> {
        <[B256; N]>::try_from(handles)
            .map(Self)
            .map_err(|_| ContractError::MalformedResponse {
                method,
                reason: format!("expected {N} handles, got {}", handles.len()),
            })
    }

    pub fn as_array(&self) -> &[B256; N] {
        &self.0
    }

    /// True when every slot holds the unset sentinel
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(is_unset)
    }
}

impl<const N: usize> From<[B256; N]> for EncryptedHandles<N> {
    fn from(handles: [B256; N]) -> Self {
        Self(handles)
    }
}

pub type EncryptedOrderHandles = EncryptedHandles<ORDER_FIELD_COUNT>;
pub type EncryptedPortfolioHandles = EncryptedHandles<STORED_PORTFOLIO_FIELD_COUNT>;

impl CommodityInfo {
    pub(crate) fn from_return(
        method: &'static str,
        requested: &str,
        raw: getCommodityInfoReturn,
    ) -> Result<Self, ContractError> {
        if raw.symbol.is_empty() {
            return Err(ContractError::MalformedResponse {
                method,
                reason: format!("unknown commodity {requested}"),
            });
        }
        Ok(Self {
            symbol: raw.symbol,
            name: raw.name,
            price: price_from_wei(raw.price),
            is_active: raw.active,
        })
    }
}

/// Result of an order write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    pub transaction_hash: B256,
    /// Contract-assigned id, when the `OrderPlaced` event was found
    pub order_id: Option<U256>,
}

//! Trading contract ABI
//!
//! Order fields travel as five `bytes32` handles in the positional order
//! orderId, orderType, quantity, priceCents, commoditySymbolCode.

use alloy_sol_types::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface ICipherCommodeco {
        event OrderPlaced(uint256 indexed orderId, address indexed trader, string symbol);

        function placeOrder(
            string symbol,
            uint8 orderType,
            bytes32[5] encryptedFields,
            bytes inputProof
        ) external returns (uint256 orderId);

        function createCommodity(
            string symbol,
            string name,
            uint256 initialPrice,
            uint256 totalSupply,
            bytes inputProof
        ) external;

        function updatePortfolio(bytes32[4] encryptedFields, bytes inputProof) external;

        function getOrderHeader(uint256 orderId)
            external view returns (address creator, string symbol, uint256 timestamp);

        function getOrderEncryptedData(uint256 orderId)
            external view returns (bytes32[5] handles);

        function getPortfolioEncryptedData(address trader)
            external view returns (bytes32[3] handles);

        function getAllCommoditySymbols() external view returns (string[] symbols);

        function getCommodityInfo(string commodity)
            external view returns (string symbol, string name, uint256 price, bool active);

        function getOrderCount() external view returns (uint256 count);
    }
}

pub use ICipherCommodeco::*;

//! Contract bindings for the NFT gateways, the mirrored tokens and the
//! Arbitrum system contracts the workflows use.

#![allow(clippy::too_many_arguments)]

use alloy::primitives::{address, Address};
use alloy::sol;

use crate::types::GasEstimate;

/// Arbitrum `NodeInterface` virtual contract (only reachable via eth_call / eth_estimateGas)
pub const NODE_INTERFACE: Address = address!("00000000000000000000000000000000000000c8");

/// Arbitrum `ArbRetryableTx` precompile
pub const ARB_RETRYABLE_TX: Address = address!("000000000000000000000000000000000000006e");

sol! {
    /// Retryable funding parameters as the gateways take them
    #[derive(Debug, PartialEq, Eq)]
    struct L2GasParams {
        uint256 _maxSubmissionCost;
        uint256 _maxGas;
        uint256 _gasPriceBid;
    }

    /// L1 side of the NFT gateway pair
    #[sol(rpc)]
    contract L1NftGateway {
        function initialize(address counterpartGateway, address inbox) external;

        /// Registered L2 token for an L1 token (zero address if none)
        function l1ToL2Token(address l1Token) external view returns (address);

        function getRegisterL2MessageCallData(address l1Token, address l2Token) external view returns (bytes memory);

        function registerTokenToL2(address l2Token, L2GasParams calldata gasParams, address refundAddress) external payable returns (uint256);

        function getDepositL2MessageCallData(address l1Token, address l2Token, uint256 tokenId, address to) external view returns (bytes memory);

        function deposit(address l1Token, uint256 tokenId, address to, L2GasParams calldata gasParams, address refundAddress) external payable returns (uint256);
    }

    /// L2 side of the NFT gateway pair
    #[sol(rpc)]
    contract L2NftGateway {
        function initialize(address counterpartGateway) external;
    }

    /// L1 ERC721 minted by the bootstrap deposit
    #[sol(rpc)]
    contract L1ArbERC721 {
        function mint(address to) external;

        /// Id the next mint receives
        function tokenId() external view returns (uint256);
    }

    /// Arbitrum delayed inbox
    #[sol(rpc)]
    interface IInbox {
        function calculateRetryableSubmissionFee(uint256 dataLength, uint256 baseFee) external view returns (uint256);

        event InboxMessageDelivered(uint256 indexed messageNum, bytes data);
    }

    /// Arbitrum bridge (emits one MessageDelivered per delayed message)
    interface IBridge {
        event MessageDelivered(
            uint256 indexed messageIndex,
            bytes32 indexed beforeInboxAcc,
            address inbox,
            uint8 kind,
            address sender,
            bytes32 messageDataHash,
            uint256 baseFeeL1,
            uint64 timestamp
        );
    }

    #[sol(rpc)]
    interface NodeInterface {
        function estimateRetryableTicket(
            address sender,
            uint256 deposit,
            address to,
            uint256 l2CallValue,
            address excessFeeRefundAddress,
            address callValueRefundAddress,
            bytes calldata data
        ) external;
    }

    #[sol(rpc)]
    interface ArbRetryableTx {
        /// Reverts with `NoTicketWithID` if the ticket does not exist (redeemed or expired)
        function getTimeout(bytes32 ticketId) external view returns (uint256);

        error NoTicketWithID();

        event RedeemScheduled(
            bytes32 indexed ticketId,
            bytes32 indexed retryTxHash,
            uint64 indexed sequenceNum,
            uint64 donatedGas,
            address gasDonor,
            uint256 maxRefund,
            uint256 submissionFeeRefund
        );
    }
}

impl From<&GasEstimate> for L2GasParams {
    fn from(estimate: &GasEstimate) -> Self {
        Self {
            _maxSubmissionCost: estimate.max_submission_cost,
            _maxGas: estimate.gas_limit,
            _gasPriceBid: estimate.max_fee_per_gas,
        }
    }
}

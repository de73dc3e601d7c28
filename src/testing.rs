//! In-memory chain doubles for workflow tests

use alloy::primitives::{keccak256, Address, Bytes, Log, B256, U256};
use alloy::sol_types::{SolEvent, SolValue};
use async_trait::async_trait;
use eyre::{eyre, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::chain::{
    ChainSide, ContractDeployer, CreationReceipt, FeeOracle, OriginChain, TicketSource,
};
use crate::events::{EventSink, WorkflowEvent};
use crate::evm::contracts::{IBridge, IInbox};
use crate::retryable::{RetryableMessage, SubmitRetryableData, SUBMIT_RETRYABLE_KIND};
use crate::tracker::TrackerConfig;
use crate::types::{DeploymentRecord, GasEstimate, L2CallRequest, OriginReceipt, TicketStatus};

pub const BRIDGE: Address = Address::repeat_byte(0xb1);
pub const INBOX: Address = Address::repeat_byte(0x1b);

pub fn record() -> DeploymentRecord {
    DeploymentRecord {
        l1_token_address: Address::repeat_byte(0x71),
        l2_token_address: Address::repeat_byte(0x72),
        l1_gateway_address: Address::repeat_byte(0x61),
        l2_gateway_address: Address::repeat_byte(0x62),
    }
}

pub fn tracker_config() -> TrackerConfig {
    TrackerConfig {
        poll_interval: Duration::from_millis(1),
        timeout: Duration::from_secs(5),
        inbox: Some(INBOX),
    }
}

pub fn sample_message(number: u64) -> RetryableMessage {
    RetryableMessage {
        message_number: U256::from(number),
        inbox: INBOX,
        sender: Address::repeat_byte(0x51),
        l1_base_fee: U256::from(15_000_000_000u64),
        body: SubmitRetryableData {
            dest: Address::repeat_byte(0x62),
            l2_call_value: U256::ZERO,
            l1_value: U256::from(10_000_000u64),
            max_submission_fee: U256::from(4_000u64),
            excess_fee_refund_address: Address::repeat_byte(0x0e),
            call_value_refund_address: Address::repeat_byte(0x0e),
            gas_limit: U256::from(100_000u64),
            max_fee_per_gas: U256::from(100u64),
            data: Bytes::from(vec![0x01, 0x02, 0x03]),
        },
    }
}

/// Inverse of `SubmitRetryableData::parse`
pub fn encode_retryable_data(body: &SubmitRetryableData) -> Bytes {
    let uint = |value: U256| B256::from(value.to_be_bytes::<32>());
    let words = [
        body.dest.into_word(),
        uint(body.l2_call_value),
        uint(body.l1_value),
        uint(body.max_submission_fee),
        body.excess_fee_refund_address.into_word(),
        body.call_value_refund_address.into_word(),
        uint(body.gas_limit),
        uint(body.max_fee_per_gas),
        uint(U256::from(body.data.len())),
    ];

    let mut raw: Vec<u8> = words.iter().flat_map(|w| w.0).collect();
    raw.extend_from_slice(&body.data);
    Bytes::from(raw)
}

/// The bridge and inbox logs an L1 transaction emits for `message`
pub fn retryable_logs(message: &RetryableMessage, kind: u8) -> Vec<Log> {
    let data = encode_retryable_data(&message.body);
    let delivered = IBridge::MessageDelivered {
        messageIndex: message.message_number,
        beforeInboxAcc: B256::ZERO,
        inbox: message.inbox,
        kind,
        sender: message.sender,
        messageDataHash: keccak256(&data),
        baseFeeL1: message.l1_base_fee,
        timestamp: 1_700_000_000,
    };
    let inbox = IInbox::InboxMessageDelivered {
        messageNum: message.message_number,
        data,
    };

    vec![
        Log {
            address: BRIDGE,
            data: delivered.encode_log_data(),
        },
        Log {
            address: message.inbox,
            data: inbox.encode_log_data(),
        },
    ]
}

// ============================================================================
// Origin chain
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentCall {
    Register {
        l2_token: Address,
        refund: Address,
        value: U256,
    },
    Deposit {
        l1_token: Address,
        token_id: U256,
        recipient: Address,
        value: U256,
    },
    Mint {
        token: Address,
        recipient: Address,
    },
}

#[derive(Debug)]
struct OriginState {
    mapping: Address,
    counter: U256,
    freeze_counter: bool,
    next_message: u64,
    emit_messages: bool,
    revert: Option<&'static str>,
    base_fee_unreachable: bool,
    sent: Vec<SentCall>,
}

#[derive(Debug, Clone)]
pub struct MockOrigin {
    signer: Address,
    state: Arc<Mutex<OriginState>>,
}

impl MockOrigin {
    pub fn new() -> Self {
        Self {
            signer: Address::repeat_byte(0x5e),
            state: Arc::new(Mutex::new(OriginState {
                mapping: Address::ZERO,
                counter: U256::ZERO,
                freeze_counter: false,
                next_message: 100,
                emit_messages: true,
                revert: None,
                base_fee_unreachable: false,
                sent: Vec::new(),
            })),
        }
    }

    fn update(self, f: impl FnOnce(&mut OriginState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn registered(self, l2_token: Address) -> Self {
        self.update(|s| s.mapping = l2_token)
    }

    pub fn with_counter(self, counter: u64) -> Self {
        self.update(|s| s.counter = U256::from(counter))
    }

    /// Mints leave the counter untouched
    pub fn frozen_counter(self) -> Self {
        self.update(|s| s.freeze_counter = true)
    }

    pub fn without_messages(self) -> Self {
        self.update(|s| s.emit_messages = false)
    }

    /// Transactions for `call` are mined with status 0
    pub fn reverting(self, call: &'static str) -> Self {
        self.update(|s| s.revert = Some(call))
    }

    pub fn base_fee_unreachable(self) -> Self {
        self.update(|s| s.base_fee_unreachable = true)
    }

    pub fn transactions(&self) -> Vec<SentCall> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn register_call_data(l1_token: Address, l2_token: Address) -> Bytes {
        let mut data = b"register".to_vec();
        data.extend((l1_token, l2_token).abi_encode());
        Bytes::from(data)
    }

    pub fn deposit_call_data(
        l1_token: Address,
        l2_token: Address,
        token_id: U256,
        recipient: Address,
    ) -> Bytes {
        let mut data = b"deposit".to_vec();
        data.extend((l1_token, l2_token, token_id, recipient).abi_encode());
        Bytes::from(data)
    }

    fn mine(
        &self,
        call: &'static str,
        sent: SentCall,
        message: Option<(Address, &GasEstimate, Address, Bytes)>,
    ) -> OriginReceipt {
        let mut state = self.state.lock().unwrap();
        state.sent.push(sent);
        let nonce = state.sent.len() as u64;
        let success = state.revert != Some(call);

        let mut logs = Vec::new();
        if let (true, true, Some((sender, estimate, refund, data))) =
            (success, state.emit_messages, message)
        {
            let number = state.next_message;
            state.next_message += 1;
            let message = RetryableMessage {
                message_number: U256::from(number),
                inbox: INBOX,
                sender,
                l1_base_fee: U256::from(20u64),
                body: SubmitRetryableData {
                    dest: record().l2_gateway_address,
                    l2_call_value: U256::ZERO,
                    l1_value: estimate.deposit,
                    max_submission_fee: estimate.max_submission_cost,
                    excess_fee_refund_address: refund,
                    call_value_refund_address: refund,
                    gas_limit: estimate.gas_limit,
                    max_fee_per_gas: estimate.max_fee_per_gas,
                    data,
                },
            };
            logs = retryable_logs(&message, SUBMIT_RETRYABLE_KIND);
        }

        OriginReceipt {
            tx_hash: B256::from(U256::from(nonce)),
            block_number: Some(nonce),
            success,
            logs,
        }
    }
}

#[async_trait]
impl OriginChain for MockOrigin {
    fn signer_address(&self) -> Address {
        self.signer
    }

    async fn base_fee(&self) -> Result<U256> {
        if self.state.lock().unwrap().base_fee_unreachable {
            return Err(eyre!("connection refused"));
        }
        Ok(U256::from(20u64))
    }

    async fn l1_to_l2_token(&self, _gateway: Address, _l1_token: Address) -> Result<Address> {
        Ok(self.state.lock().unwrap().mapping)
    }

    async fn register_l2_message_call_data(
        &self,
        _gateway: Address,
        l1_token: Address,
        l2_token: Address,
    ) -> Result<Bytes> {
        Ok(Self::register_call_data(l1_token, l2_token))
    }

    async fn deposit_l2_message_call_data(
        &self,
        _gateway: Address,
        l1_token: Address,
        l2_token: Address,
        token_id: U256,
        recipient: Address,
    ) -> Result<Bytes> {
        Ok(Self::deposit_call_data(l1_token, l2_token, token_id, recipient))
    }

    async fn register_token_to_l2(
        &self,
        gateway: Address,
        l2_token: Address,
        estimate: &GasEstimate,
        refund: Address,
    ) -> Result<OriginReceipt> {
        let data = Self::register_call_data(record().l1_token_address, l2_token);
        let receipt = self.mine(
            "registerTokenToL2",
            SentCall::Register {
                l2_token,
                refund,
                value: estimate.deposit,
            },
            Some((gateway, estimate, refund, data)),
        );
        if receipt.success {
            self.state.lock().unwrap().mapping = l2_token;
        }
        Ok(receipt)
    }

    async fn deposit(
        &self,
        gateway: Address,
        l1_token: Address,
        token_id: U256,
        recipient: Address,
        estimate: &GasEstimate,
        refund: Address,
    ) -> Result<OriginReceipt> {
        let data =
            Self::deposit_call_data(l1_token, record().l2_token_address, token_id, recipient);
        Ok(self.mine(
            "deposit",
            SentCall::Deposit {
                l1_token,
                token_id,
                recipient,
                value: estimate.deposit,
            },
            Some((gateway, estimate, refund, data)),
        ))
    }

    async fn mint(&self, token: Address, recipient: Address) -> Result<OriginReceipt> {
        let receipt = self.mine("mint", SentCall::Mint { token, recipient }, None);
        let mut state = self.state.lock().unwrap();
        if receipt.success && !state.freeze_counter {
            state.counter += U256::from(1u64);
        }
        Ok(receipt)
    }

    async fn token_id_counter(&self, _token: Address) -> Result<U256> {
        Ok(self.state.lock().unwrap().counter)
    }
}

// ============================================================================
// Fees
// ============================================================================

#[derive(Debug, Default, Clone)]
pub struct SeenInputs {
    pub calls: usize,
    pub data_length: Option<usize>,
    pub base_fee: Option<U256>,
    pub sender_deposit: Option<U256>,
    pub request: Option<L2CallRequest>,
}

#[derive(Debug, Clone)]
pub struct MockFees {
    submission_fee: U256,
    gas_price: U256,
    gas_limit: U256,
    fail_gas_limit: bool,
    seen: Arc<Mutex<SeenInputs>>,
}

impl MockFees {
    pub fn new(submission_fee: u64, gas_price: u64, gas_limit: u64) -> Self {
        Self {
            submission_fee: U256::from(submission_fee),
            gas_price: U256::from(gas_price),
            gas_limit: U256::from(gas_limit),
            fail_gas_limit: false,
            seen: Arc::default(),
        }
    }

    pub fn failing_gas_limit(mut self) -> Self {
        self.fail_gas_limit = true;
        self
    }

    pub fn seen(&self) -> SeenInputs {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeeOracle for MockFees {
    async fn submission_fee(&self, data_length: usize, base_fee: U256) -> Result<U256> {
        let mut seen = self.seen.lock().unwrap();
        seen.calls += 1;
        seen.data_length = Some(data_length);
        seen.base_fee = Some(base_fee);
        Ok(self.submission_fee)
    }

    async fn l2_gas_price(&self) -> Result<U256> {
        Ok(self.gas_price)
    }

    async fn retryable_gas_limit(
        &self,
        request: &L2CallRequest,
        sender_deposit: U256,
    ) -> Result<U256> {
        let mut seen = self.seen.lock().unwrap();
        seen.sender_deposit = Some(sender_deposit);
        seen.request = Some(request.clone());
        if self.fail_gas_limit {
            return Err(eyre!("execution reverted"));
        }
        Ok(self.gas_limit)
    }
}

// ============================================================================
// Tickets
// ============================================================================

#[derive(Debug)]
struct TicketState {
    /// Polls answered with "no receipt" before the ticket appears; `None` = never
    polls_before_creation: Option<usize>,
    creation: CreationReceipt,
    redeem: Option<bool>,
    alive: bool,
    unreachable: bool,
    creation_polls: usize,
}

#[derive(Debug, Clone)]
pub struct MockTickets {
    chain_id: u64,
    state: Arc<Mutex<TicketState>>,
}

impl MockTickets {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            state: Arc::new(Mutex::new(TicketState {
                polls_before_creation: Some(0),
                creation: CreationReceipt {
                    success: true,
                    auto_redeem: None,
                },
                redeem: None,
                alive: true,
                unreachable: false,
                creation_polls: 0,
            })),
        }
    }

    /// Appears after one pending poll and is auto-redeemed successfully
    pub fn redeeming(chain_id: u64) -> Self {
        Self::new(chain_id)
            .created_after(
                1,
                CreationReceipt {
                    success: true,
                    auto_redeem: Some(B256::repeat_byte(0xee)),
                },
            )
            .redeem_outcome(Some(true))
    }

    fn update(self, f: impl FnOnce(&mut TicketState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn created_after(self, polls: usize, creation: CreationReceipt) -> Self {
        self.update(|s| {
            s.polls_before_creation = Some(polls);
            s.creation = creation;
        })
    }

    pub fn never_created(self) -> Self {
        self.update(|s| s.polls_before_creation = None)
    }

    pub fn redeem_outcome(self, redeem: Option<bool>) -> Self {
        self.update(|s| s.redeem = redeem)
    }

    pub fn alive(self, alive: bool) -> Self {
        self.update(|s| s.alive = alive)
    }

    pub fn unreachable(self) -> Self {
        self.update(|s| s.unreachable = true)
    }

    pub fn creation_polls(&self) -> usize {
        self.state.lock().unwrap().creation_polls
    }
}

#[async_trait]
impl TicketSource for MockTickets {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    async fn creation_receipt(&self, _ticket_id: B256) -> Result<Option<CreationReceipt>> {
        let mut state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(eyre!("connection refused"));
        }
        state.creation_polls += 1;
        Ok(match state.polls_before_creation {
            Some(polls) if state.creation_polls > polls => Some(state.creation),
            _ => None,
        })
    }

    async fn transaction_succeeded(&self, _tx_hash: B256) -> Result<Option<bool>> {
        Ok(self.state.lock().unwrap().redeem)
    }

    async fn ticket_alive(&self, _ticket_id: B256) -> Result<bool> {
        Ok(self.state.lock().unwrap().alive)
    }
}

// ============================================================================
// Deployment
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployCall {
    Deploy {
        side: ChainSide,
        contract: String,
        constructor_args: Bytes,
        address: Address,
    },
    InitializeL1 {
        gateway: Address,
        l2_gateway: Address,
        inbox: Address,
    },
    InitializeL2 {
        gateway: Address,
        l1_gateway: Address,
    },
}

#[derive(Debug, Clone, Default)]
pub struct MockDeployer {
    calls: Arc<Mutex<Vec<DeployCall>>>,
    fail_on: Option<&'static str>,
}

impl MockDeployer {
    pub fn failing_on(contract: &'static str) -> Self {
        Self {
            fail_on: Some(contract),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<DeployCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContractDeployer for MockDeployer {
    async fn deploy(
        &self,
        side: ChainSide,
        contract: &str,
        constructor_args: Bytes,
    ) -> Result<Address> {
        if self.fail_on == Some(contract) {
            return Err(eyre!("{} deployment reverted", contract));
        }
        let mut calls = self.calls.lock().unwrap();
        let address = Address::repeat_byte(0xc0 + calls.len() as u8);
        calls.push(DeployCall::Deploy {
            side,
            contract: contract.to_string(),
            constructor_args,
            address,
        });
        Ok(address)
    }

    async fn initialize_l1_gateway(
        &self,
        gateway: Address,
        l2_gateway: Address,
        inbox: Address,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(DeployCall::InitializeL1 {
            gateway,
            l2_gateway,
            inbox,
        });
        Ok(())
    }

    async fn initialize_l2_gateway(&self, gateway: Address, l1_gateway: Address) -> Result<()> {
        self.calls.lock().unwrap().push(DeployCall::InitializeL2 {
            gateway,
            l1_gateway,
        });
        Ok(())
    }
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<WorkflowEvent>>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<WorkflowEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn ticket_statuses(&self) -> Vec<TicketStatus> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                WorkflowEvent::TicketStatusChanged { status, .. } => Some(status),
                _ => None,
            })
            .collect()
    }

    pub fn estimates(&self) -> Vec<GasEstimate> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                WorkflowEvent::EstimateComputed { estimate, .. } => Some(estimate),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &WorkflowEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

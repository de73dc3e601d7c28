//! Retryable ticket messages in L1 receipts
//!
//! An L1 transaction that creates a retryable emits a bridge
//! `MessageDelivered` (kind 9) and an inbox `InboxMessageDelivered` carrying
//! the same message number. The pair is enough to recompute the ticket id,
//! which is the hash of the ticket's L2 creation transaction.
//!
//! Any contract can emit logs with these signatures. An inbox event only
//! pairs with a bridge event when it was emitted by the inbox the bridge
//! event names, and callers that know their inbox filter on
//! [`RetryableMessage::inbox`].

use alloy::primitives::{keccak256, Address, Bytes, Log, B256, U256};
use alloy::sol_types::SolEvent;
use alloy_rlp::{Encodable, Header};
use eyre::{eyre, Result};
use tracing::debug;

use crate::evm::contracts::{IBridge, IInbox};

/// `L1MessageType_submitRetryableTx`
pub const SUBMIT_RETRYABLE_KIND: u8 = 9;

/// Transaction type byte of an ArbitrumSubmitRetryableTx
const SUBMIT_RETRYABLE_TX_TYPE: u8 = 0x69;

const WORD: usize = 32;
const HEADER_WORDS: usize = 9;

/// Decoded body of an `InboxMessageDelivered` submit-retryable message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRetryableData {
    pub dest: Address,
    pub l2_call_value: U256,
    pub l1_value: U256,
    pub max_submission_fee: U256,
    pub excess_fee_refund_address: Address,
    pub call_value_refund_address: Address,
    pub gas_limit: U256,
    pub max_fee_per_gas: U256,
    pub data: Bytes,
}

impl SubmitRetryableData {
    /// Parse nine 32-byte words followed by the call data
    pub fn parse(raw: &[u8]) -> Result<Self> {
        if raw.len() < HEADER_WORDS * WORD {
            return Err(eyre!(
                "Retryable message too short: {} bytes, need at least {}",
                raw.len(),
                HEADER_WORDS * WORD
            ));
        }

        let word = |i: usize| U256::from_be_slice(&raw[i * WORD..(i + 1) * WORD]);
        let addr = |i: usize| Address::from_slice(&raw[i * WORD + 12..(i + 1) * WORD]);

        let data_length: usize = word(8)
            .try_into()
            .map_err(|_| eyre!("Retryable call data length does not fit in usize"))?;
        let body = &raw[HEADER_WORDS * WORD..];
        if body.len() < data_length {
            return Err(eyre!(
                "Retryable call data truncated: declared {} bytes, got {}",
                data_length,
                body.len()
            ));
        }

        Ok(Self {
            dest: addr(0),
            l2_call_value: word(1),
            l1_value: word(2),
            max_submission_fee: word(3),
            excess_fee_refund_address: addr(4),
            call_value_refund_address: addr(5),
            gas_limit: word(6),
            max_fee_per_gas: word(7),
            data: Bytes::copy_from_slice(&body[..data_length]),
        })
    }
}

/// One retryable message emitted by an L1 transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryableMessage {
    pub message_number: U256,
    /// Inbox that emitted the message data
    pub inbox: Address,
    /// Sender as recorded by the bridge (already aliased for contracts)
    pub sender: Address,
    pub l1_base_fee: U256,
    pub body: SubmitRetryableData,
}

impl RetryableMessage {
    /// Hash of the L2 transaction that creates this ticket
    pub fn ticket_id(&self, l2_chain_id: u64) -> B256 {
        let body = &self.body;
        let message_number = B256::from(self.message_number.to_be_bytes::<32>());
        let dest = if body.dest.is_zero() {
            Bytes::new()
        } else {
            Bytes::copy_from_slice(body.dest.as_slice())
        };

        let fields: [&dyn Encodable; 13] = [
            &l2_chain_id,
            &message_number,
            &self.sender,
            &self.l1_base_fee,
            &body.l1_value,
            &body.max_fee_per_gas,
            &body.gas_limit,
            &dest,
            &body.l2_call_value,
            &body.call_value_refund_address,
            &body.max_submission_fee,
            &body.excess_fee_refund_address,
            &body.data,
        ];

        let payload_length: usize = fields.iter().map(|f| f.length()).sum();
        let mut encoded = Vec::with_capacity(1 + payload_length + 9);
        encoded.push(SUBMIT_RETRYABLE_TX_TYPE);
        Header {
            list: true,
            payload_length,
        }
        .encode(&mut encoded);
        for field in fields {
            field.encode(&mut encoded);
        }

        keccak256(&encoded)
    }
}

/// Collect all submit-retryable messages from a receipt's logs, in log order
///
/// Unrelated logs, other message kinds and bridge events without a matching
/// inbox event from the inbox they name are skipped.
pub fn messages_from_logs(logs: &[Log]) -> Result<Vec<RetryableMessage>> {
    let mut delivered = Vec::new();
    let mut inbox_data = Vec::new();

    for log in logs {
        match log.topics().first() {
            Some(topic) if *topic == IBridge::MessageDelivered::SIGNATURE_HASH => {
                let event = IBridge::MessageDelivered::decode_log_data(&log.data, true)
                    .map_err(|e| eyre!("Malformed MessageDelivered log: {}", e))?;
                if event.kind == SUBMIT_RETRYABLE_KIND {
                    delivered.push(event);
                } else {
                    debug!(kind = event.kind, "Skipping non-retryable bridge message");
                }
            }
            Some(topic) if *topic == IInbox::InboxMessageDelivered::SIGNATURE_HASH => {
                let event = IInbox::InboxMessageDelivered::decode_log_data(&log.data, true)
                    .map_err(|e| eyre!("Malformed InboxMessageDelivered log: {}", e))?;
                inbox_data.push((log.address, event));
            }
            _ => {}
        }
    }

    let mut messages = Vec::with_capacity(delivered.len());
    for event in delivered {
        let Some((_, inbox)) = inbox_data
            .iter()
            .find(|(emitter, m)| *emitter == event.inbox && m.messageNum == event.messageIndex)
        else {
            debug!(
                message_index = %event.messageIndex,
                inbox = %event.inbox,
                "Bridge message without matching inbox data"
            );
            continue;
        };

        messages.push(RetryableMessage {
            message_number: event.messageIndex,
            inbox: event.inbox,
            sender: event.sender,
            l1_base_fee: event.baseFeeL1,
            body: SubmitRetryableData::parse(&inbox.data)?,
        });
    }

    Ok(messages)
}

/// Tie-break for transactions carrying several messages: the first one wins
pub fn select_message(messages: &[RetryableMessage]) -> Option<&RetryableMessage> {
    messages.first()
}

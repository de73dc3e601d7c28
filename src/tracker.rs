//! Retryable ticket tracker
//!
//! Finds the retryable message in an L1 receipt and polls L2 until the
//! ticket reaches a terminal [`TicketStatus`] or the configured timeout
//! elapses.

use alloy::primitives::{Address, B256};
use eyre::Result;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::chain::TicketSource;
use crate::error::BridgeError;
use crate::events::{EventSink, WorkflowEvent};
use crate::retryable::{messages_from_logs, select_message};
use crate::types::{OriginReceipt, RetryableTicket, TicketStatus, TrackedTicket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub poll_interval: Duration,
    /// Upper bound on the wait for a terminal status
    pub timeout: Duration,
    /// Only messages delivered through this inbox are considered
    pub inbox: Option<Address>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(30 * 60),
            inbox: None,
        }
    }
}

pub struct TicketTracker<S> {
    source: S,
    config: TrackerConfig,
}

impl<S: TicketSource> TicketTracker<S> {
    pub fn new(source: S, config: TrackerConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Identify the ticket created by `receipt`
    ///
    /// Fails with [`BridgeError::NoMessageFound`] if the receipt carries no
    /// retryable message from the configured inbox. With several messages,
    /// the first one is selected.
    pub async fn identify(
        &self,
        receipt: &OriginReceipt,
        sink: &dyn EventSink,
    ) -> Result<RetryableTicket> {
        let mut messages = messages_from_logs(&receipt.logs)?;
        if let Some(inbox) = self.config.inbox {
            messages.retain(|m| m.inbox == inbox);
        }
        let message = select_message(&messages).ok_or(BridgeError::NoMessageFound {
            tx_hash: receipt.tx_hash,
        })?;

        let chain_id = self
            .source
            .chain_id()
            .await
            .map_err(|e| BridgeError::connectivity("L2", "reading chain id", e))?;

        let ticket = RetryableTicket {
            id: message.ticket_id(chain_id),
            message_number: message.message_number,
            origin_tx: receipt.tx_hash,
        };

        sink.emit(&WorkflowEvent::TicketIdentified {
            ticket_id: ticket.id,
            message_number: ticket.message_number,
            candidates: messages.len(),
        });

        Ok(ticket)
    }

    /// Identify the ticket in `receipt` and wait for its terminal status
    pub async fn track(
        &self,
        receipt: &OriginReceipt,
        sink: &dyn EventSink,
    ) -> Result<TrackedTicket> {
        let ticket = self.identify(receipt, sink).await?;
        let status = self.wait_for_status(ticket.id, sink).await?;

        Ok(TrackedTicket { ticket, status })
    }

    /// Poll until the ticket leaves `Pending`
    pub async fn wait_for_status(
        &self,
        ticket_id: B256,
        sink: &dyn EventSink,
    ) -> Result<TicketStatus> {
        let start = Instant::now();
        let mut last: Option<TicketStatus> = None;

        loop {
            let status = self.probe(ticket_id).await?;

            if last != Some(status) {
                sink.emit(&WorkflowEvent::TicketStatusChanged { ticket_id, status });
                last = Some(status);
            }

            if status.is_terminal() {
                return Ok(status);
            }

            if start.elapsed() + self.config.poll_interval > self.config.timeout {
                return Err(BridgeError::TicketTimedOut {
                    ticket_id,
                    waited_secs: start.elapsed().as_secs(),
                }
                .into());
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Current status of the ticket on L2
    pub async fn probe(&self, ticket_id: B256) -> Result<TicketStatus> {
        let creation = self
            .source
            .creation_receipt(ticket_id)
            .await
            .map_err(|e| BridgeError::connectivity("L2", "fetching ticket receipt", e))?;

        let Some(creation) = creation else {
            return Ok(TicketStatus::Pending);
        };

        if !creation.success {
            return Ok(TicketStatus::Failed);
        }

        if let Some(redeem_tx) = creation.auto_redeem {
            let redeemed = self
                .source
                .transaction_succeeded(redeem_tx)
                .await
                .map_err(|e| BridgeError::connectivity("L2", "fetching redeem receipt", e))?;

            match redeemed {
                None => return Ok(TicketStatus::Pending),
                Some(true) => return Ok(TicketStatus::Redeemed),
                Some(false) => {
                    debug!(ticket_id = %ticket_id, redeem_tx = %redeem_tx, "Auto-redeem reverted");
                    return Ok(if self.alive(ticket_id).await? {
                        TicketStatus::Failed
                    } else {
                        TicketStatus::Expired
                    });
                }
            }
        }

        Ok(if self.alive(ticket_id).await? {
            TicketStatus::CreatedPendingExecution
        } else {
            TicketStatus::Expired
        })
    }

    async fn alive(&self, ticket_id: B256) -> Result<bool> {
        let alive = self
            .source
            .ticket_alive(ticket_id)
            .await
            .map_err(|e| BridgeError::connectivity("L2", "reading ticket timeout", e))?;
        Ok(alive)
    }
}

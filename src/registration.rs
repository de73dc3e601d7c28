//! Token registration workflow
//!
//! Registers the L1→L2 token mapping on the L1 gateway once. The gateway is
//! the source of truth: when it already reports a mapping, nothing is sent.

use alloy::primitives::Address;
use eyre::{Result, WrapErr};

use crate::chain::{FeeOracle, OriginChain, TicketSource};
use crate::error::BridgeError;
use crate::estimator::GasEstimator;
use crate::events::{CallKind, EventSink, WorkflowEvent};
use crate::tracker::TicketTracker;
use crate::types::{
    DeploymentRecord, GasEstimate, L2CallRequest, OriginReceipt, RegistrationState,
    TrackedTicket,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The gateway already mapped the token; no transaction was sent
    AlreadyRegistered(Address),
    /// A registration was submitted and its ticket reached a terminal status
    Registered(TrackedTicket),
}

enum Stage {
    CheckMapping,
    Unregistered,
    Estimated(GasEstimate),
    Submitted(OriginReceipt),
    Done(RegistrationOutcome),
}

pub struct RegistrationWorkflow<'a, O, F, S> {
    origin: &'a O,
    estimator: &'a GasEstimator<F>,
    tracker: &'a TicketTracker<S>,
    sink: &'a dyn EventSink,
}

impl<'a, O, F, S> RegistrationWorkflow<'a, O, F, S>
where
    O: OriginChain,
    F: FeeOracle,
    S: TicketSource,
{
    pub fn new(
        origin: &'a O,
        estimator: &'a GasEstimator<F>,
        tracker: &'a TicketTracker<S>,
        sink: &'a dyn EventSink,
    ) -> Self {
        Self {
            origin,
            estimator,
            tracker,
            sink,
        }
    }

    /// Ask the L1 gateway whether the record's L1 token is mapped
    pub async fn check(&self, record: &DeploymentRecord) -> Result<RegistrationState> {
        let l2_token = self
            .origin
            .l1_to_l2_token(record.l1_gateway_address, record.l1_token_address)
            .await
            .map_err(|e| BridgeError::connectivity("L1", "reading token mapping", e))?;

        let state = RegistrationState::from_mapping(l2_token);
        self.sink.emit(&WorkflowEvent::RegistrationChecked {
            l1_token: record.l1_token_address,
            state,
        });

        Ok(state)
    }

    /// Register the mapping unless it exists, then wait for the ticket
    pub async fn run(&self, record: &DeploymentRecord) -> Result<RegistrationOutcome> {
        let refund = self.origin.signer_address();
        let mut stage = Stage::CheckMapping;

        loop {
            stage = match stage {
                Stage::CheckMapping => match self.check(record).await? {
                    RegistrationState::Registered(l2_token) => {
                        Stage::Done(RegistrationOutcome::AlreadyRegistered(l2_token))
                    }
                    RegistrationState::Unregistered => Stage::Unregistered,
                },

                Stage::Unregistered => {
                    let data = self
                        .origin
                        .register_l2_message_call_data(
                            record.l1_gateway_address,
                            record.l1_token_address,
                            record.l2_token_address,
                        )
                        .await
                        .wrap_err("Failed to build registration L2 call data")?;

                    let request = L2CallRequest::gateway_call(record, data, refund);
                    let estimate = self.estimator.estimate_now(self.origin, &request).await?;
                    self.sink.emit(&WorkflowEvent::EstimateComputed {
                        call: CallKind::Registration,
                        estimate,
                    });

                    Stage::Estimated(estimate)
                }

                Stage::Estimated(estimate) => {
                    let receipt = self
                        .origin
                        .register_token_to_l2(
                            record.l1_gateway_address,
                            record.l2_token_address,
                            &estimate,
                            refund,
                        )
                        .await
                        .wrap_err("Failed to submit registerTokenToL2")?
                        .ensure_success("registerTokenToL2")?;
                    self.sink.emit(&WorkflowEvent::TransactionSubmitted {
                        call: CallKind::Registration,
                        tx_hash: receipt.tx_hash,
                    });

                    Stage::Submitted(receipt)
                }

                Stage::Submitted(receipt) => {
                    let tracked = self.tracker.track(&receipt, self.sink).await?;
                    Stage::Done(RegistrationOutcome::Registered(tracked))
                }

                Stage::Done(outcome) => return Ok(outcome),
            };
        }
    }
}

//! Deposit workflow
//!
//! Mints one new token on L1 and bridges it to L2 through the gateway.
//! There is no "already done" check: every run mints and transfers a new
//! token, so re-running after an interrupted deposit produces a second one.

use alloy::primitives::{B256, U256};
use eyre::{Result, WrapErr};

use crate::chain::{FeeOracle, OriginChain, TicketSource};
use crate::error::BridgeError;
use crate::estimator::GasEstimator;
use crate::events::{CallKind, EventSink, WorkflowEvent};
use crate::tracker::TicketTracker;
use crate::types::{DeploymentRecord, GasEstimate, L2CallRequest, OriginReceipt, TrackedTicket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositOutcome {
    pub token_id: U256,
    pub mint_tx: B256,
    pub tracked: TrackedTicket,
}

struct Minted {
    token_id: U256,
    mint_tx: B256,
}

enum Stage {
    Mint,
    Minted(Minted),
    Estimated(Minted, GasEstimate),
    Submitted(Minted, OriginReceipt),
    Done(DepositOutcome),
}

pub struct DepositWorkflow<'a, O, F, S> {
    origin: &'a O,
    estimator: &'a GasEstimator<F>,
    tracker: &'a TicketTracker<S>,
    sink: &'a dyn EventSink,
}

impl<'a, O, F, S> DepositWorkflow<'a, O, F, S>
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

    /// Mint a token to the signer and deposit it to the same address on L2
    pub async fn run(&self, record: &DeploymentRecord) -> Result<DepositOutcome> {
        let signer = self.origin.signer_address();
        let mut stage = Stage::Mint;

        loop {
            stage = match stage {
                Stage::Mint => Stage::Minted(self.mint(record).await?),

                Stage::Minted(minted) => {
                    let data = self
                        .origin
                        .deposit_l2_message_call_data(
                            record.l1_gateway_address,
                            record.l1_token_address,
                            record.l2_token_address,
                            minted.token_id,
                            signer,
                        )
                        .await
                        .wrap_err("Failed to build deposit L2 call data")?;

                    let request = L2CallRequest::gateway_call(record, data, signer);
                    let estimate = self.estimator.estimate_now(self.origin, &request).await?;
                    self.sink.emit(&WorkflowEvent::EstimateComputed {
                        call: CallKind::Deposit,
                        estimate,
                    });

                    Stage::Estimated(minted, estimate)
                }

                Stage::Estimated(minted, estimate) => {
                    let receipt = self
                        .origin
                        .deposit(
                            record.l1_gateway_address,
                            record.l1_token_address,
                            minted.token_id,
                            signer,
                            &estimate,
                            signer,
                        )
                        .await
                        .wrap_err("Failed to submit deposit")?
                        .ensure_success("deposit")?;
                    self.sink.emit(&WorkflowEvent::TransactionSubmitted {
                        call: CallKind::Deposit,
                        tx_hash: receipt.tx_hash,
                    });

                    Stage::Submitted(minted, receipt)
                }

                Stage::Submitted(minted, receipt) => {
                    let tracked = self.tracker.track(&receipt, self.sink).await?;
                    Stage::Done(DepositOutcome {
                        token_id: minted.token_id,
                        mint_tx: minted.mint_tx,
                        tracked,
                    })
                }

                Stage::Done(outcome) => return Ok(outcome),
            };
        }
    }

    /// Mint to the signer; the new id is the counter value just before the mint
    async fn mint(&self, record: &DeploymentRecord) -> Result<Minted> {
        let receipt = self
            .origin
            .mint(record.l1_token_address, self.origin.signer_address())
            .await
            .wrap_err("Failed to mint L1 token")?
            .ensure_success("mint")?;

        let counter = self
            .origin
            .token_id_counter(record.l1_token_address)
            .await
            .map_err(|e| BridgeError::connectivity("L1", "reading token id counter", e))?;
        let token_id = counter
            .checked_sub(U256::from(1u64))
            .ok_or(BridgeError::InvalidTokenCounter)?;

        self.sink.emit(&WorkflowEvent::TokenMinted {
            token_id,
            tx_hash: receipt.tx_hash,
        });

        Ok(Minted {
            token_id,
            mint_tx: receipt.tx_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::EstimatorConfig;
    use crate::testing::{
        record, tracker_config, MockFees, MockOrigin, MockTickets, RecordingSink, SentCall,
    };
    use crate::types::TicketStatus;

    #[tokio::test]
    async fn test_deposit_mints_and_bridges() {
        let origin = MockOrigin::new()
            .registered(record().l2_token_address)
            .with_counter(4);
        let fees = MockFees::new(1, 1, 1);
        let estimator = GasEstimator::new(fees.clone(), EstimatorConfig::default());
        let tracker = TicketTracker::new(MockTickets::redeeming(421613), tracker_config());
        let sink = RecordingSink::default();

        let outcome = DepositWorkflow::new(&origin, &estimator, &tracker, &sink)
            .run(&record())
            .await
            .unwrap();

        assert_eq!(outcome.token_id, U256::from(4u64));
        assert_eq!(outcome.tracked.status, TicketStatus::Redeemed);

        let sent = origin.transactions();
        assert_eq!(sent.len(), 2);
        assert!(matches!(sent[0], SentCall::Mint { .. }));
        assert!(matches!(
            &sent[1],
            SentCall::Deposit { token_id, .. } if *token_id == U256::from(4u64)
        ));

        let request = fees.seen().request.unwrap();
        assert_eq!(
            request.data,
            MockOrigin::deposit_call_data(
                record().l1_token_address,
                record().l2_token_address,
                U256::from(4u64),
                origin.signer_address(),
            )
        );
        assert_eq!(request.to, record().l2_gateway_address);
        assert_eq!(request.from, record().l1_gateway_address);
    }

    #[tokio::test]
    async fn test_deposit_is_not_idempotent() {
        let origin = MockOrigin::new().registered(record().l2_token_address);
        let estimator = GasEstimator::new(MockFees::new(1, 1, 1), EstimatorConfig::default());
        let tracker = TicketTracker::new(MockTickets::redeeming(421613), tracker_config());
        let sink = RecordingSink::default();
        let workflow = DepositWorkflow::new(&origin, &estimator, &tracker, &sink);

        let first = workflow.run(&record()).await.unwrap();
        let second = workflow.run(&record()).await.unwrap();

        assert_ne!(first.token_id, second.token_id);
        assert_ne!(first.tracked.ticket.id, second.tracked.ticket.id);
        assert_eq!(origin.transactions().len(), 4);
    }

    #[tokio::test]
    async fn test_zero_counter_after_mint() {
        let origin = MockOrigin::new().frozen_counter();
        let estimator = GasEstimator::new(MockFees::new(1, 1, 1), EstimatorConfig::default());
        let tracker = TicketTracker::new(MockTickets::redeeming(1), tracker_config());

        let err = DepositWorkflow::new(&origin, &estimator, &tracker, &RecordingSink::default())
            .run(&record())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BridgeError>(),
            Some(BridgeError::InvalidTokenCounter)
        ));
        assert_eq!(origin.transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_reverted_mint_stops_before_deposit() {
        let origin = MockOrigin::new().reverting("mint");
        let estimator = GasEstimator::new(MockFees::new(1, 1, 1), EstimatorConfig::default());
        let tracker = TicketTracker::new(MockTickets::redeeming(1), tracker_config());

        let err = DepositWorkflow::new(&origin, &estimator, &tracker, &RecordingSink::default())
            .run(&record())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BridgeError>(),
            Some(BridgeError::TransactionReverted { call: "mint", .. })
        ));
        assert!(origin
            .transactions()
            .iter()
            .all(|call| matches!(call, SentCall::Mint { .. })));
    }
}

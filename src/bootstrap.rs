//! `register-and-deposit`: load the deployment and run one workflow step
//!
//! If the L1 gateway has no mapping for the token, the registration is
//! submitted and tracked; otherwise a new token is minted and deposited.
//! Each invocation runs exactly one of the two.

use eyre::Result;
use tracing::warn;

use crate::chain::{FeeOracle, OriginChain, TicketSource};
use crate::deposit::{DepositOutcome, DepositWorkflow};
use crate::estimator::GasEstimator;
use crate::events::{EventSink, TracingSink, WorkflowEvent};
use crate::registration::{RegistrationOutcome, RegistrationWorkflow};
use crate::registry::DeploymentLedger;
use crate::tracker::TicketTracker;
use crate::types::TrackedTicket;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Registered(TrackedTicket),
    Deposited(DepositOutcome),
}

impl BootstrapOutcome {
    pub fn tracked(&self) -> &TrackedTicket {
        match self {
            BootstrapOutcome::Registered(tracked) => tracked,
            BootstrapOutcome::Deposited(outcome) => &outcome.tracked,
        }
    }
}

pub struct Bootstrap<O, F, S> {
    origin: O,
    estimator: GasEstimator<F>,
    tracker: TicketTracker<S>,
    sink: Box<dyn EventSink>,
}

impl<O, F, S> Bootstrap<O, F, S>
where
    O: OriginChain,
    F: FeeOracle,
    S: TicketSource,
{
    pub fn new(origin: O, estimator: GasEstimator<F>, tracker: TicketTracker<S>) -> Self {
        Self {
            origin,
            estimator,
            tracker,
            sink: Box::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn registration(&self) -> RegistrationWorkflow<'_, O, F, S> {
        RegistrationWorkflow::new(&self.origin, &self.estimator, &self.tracker, &*self.sink)
    }

    pub fn deposit(&self) -> DepositWorkflow<'_, O, F, S> {
        DepositWorkflow::new(&self.origin, &self.estimator, &self.tracker, &*self.sink)
    }

    /// Load the deployment from `ledger`, then register or deposit
    pub async fn register_and_deposit(
        &self,
        ledger: &dyn DeploymentLedger,
    ) -> Result<BootstrapOutcome> {
        let record = ledger.load()?;
        self.sink.emit(&WorkflowEvent::RegistryLoaded { record });

        match self.registration().run(&record).await? {
            RegistrationOutcome::Registered(tracked) => Ok(BootstrapOutcome::Registered(tracked)),
            RegistrationOutcome::AlreadyRegistered(l2_token) => {
                if l2_token != record.l2_token_address {
                    warn!(
                        gateway_l2_token = %l2_token,
                        recorded_l2_token = %record.l2_token_address,
                        "Gateway maps the token to a different L2 address than the registry"
                    );
                }
                let outcome = self.deposit().run(&record).await?;
                Ok(BootstrapOutcome::Deposited(outcome))
            }
        }
    }
}

//! arb-nft-bridge CLI
//!
//! - `deploy-all`: deploy the gateway pair and both tokens, write deployments.json
//! - `register-and-deposit`: register the token mapping, or if it exists,
//!   mint and bridge one token; then follow the retryable ticket

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use arb_nft_bridge::deploy::deploy_all;
use arb_nft_bridge::estimator::GasEstimator;
use arb_nft_bridge::evm::{AlloyDeployer, AlloyOrigin, AlloyTicketSource, ArbFeeOracle};
use arb_nft_bridge::tracker::TicketTracker;
use arb_nft_bridge::{Bootstrap, BootstrapOutcome, Config, JsonFileLedger};

/// Exit status when the ticket settled in a status other than `Redeemed`
const EXIT_NOT_REDEEMED: i32 = 2;

#[derive(Parser)]
#[command(name = "arb-nft-bridge")]
#[command(about = "Deploy and bootstrap an Arbitrum L1/L2 NFT gateway pair", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path of the .env file to load
    #[arg(long, global = true, default_value = ".env")]
    env_file: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy both gateways and both tokens, then record their addresses
    DeployAll,

    /// Register the L1 token on the gateway, or mint and deposit one token if already registered
    RegisterAndDeposit,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_from_file(&cli.env_file)?;
    info!(
        l1_rpc = %config.l1_rpc_url,
        l2_rpc = %config.l2_rpc_url,
        deployments = %config.deployments_path.display(),
        "Configuration loaded"
    );

    let ledger = JsonFileLedger::new(&config.deployments_path);

    match cli.command {
        Commands::DeployAll => {
            let deployer = AlloyDeployer::new(
                &config.l1_rpc_url,
                &config.l2_rpc_url,
                &config.private_key,
                &config.artifacts_dir,
            )?;
            deploy_all(&deployer, &config.deploy_plan(), &ledger).await?;
        }

        Commands::RegisterAndDeposit => {
            let origin = AlloyOrigin::new(&config.l1_rpc_url, &config.private_key)?;
            let fees = ArbFeeOracle::new(
                &config.l1_rpc_url,
                &config.l2_rpc_url,
                config.inbox_address,
            )?;
            let tickets = AlloyTicketSource::new(&config.l2_rpc_url)?;

            let bootstrap = Bootstrap::new(
                origin,
                GasEstimator::new(fees, config.estimator.clone()),
                TicketTracker::new(tickets, config.tracker.clone()),
            );

            let outcome = bootstrap.register_and_deposit(&ledger).await?;
            let tracked = outcome.tracked();
            match &outcome {
                BootstrapOutcome::Registered(_) => info!(
                    ticket_id = %tracked.ticket.id,
                    status = %tracked.status,
                    "Registration finished; run again to deposit"
                ),
                BootstrapOutcome::Deposited(deposit) => info!(
                    token_id = %deposit.token_id,
                    ticket_id = %tracked.ticket.id,
                    status = %tracked.status,
                    "Deposit finished"
                ),
            }

            if !tracked.status.is_success() {
                warn!(
                    ticket_id = %tracked.ticket.id,
                    status = %tracked.status,
                    "Retryable ticket was not redeemed; it may need a manual redeem"
                );
                std::process::exit(EXIT_NOT_REDEEMED);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

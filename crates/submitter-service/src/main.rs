use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use submitter_config::{ConfigLoader, SubmitterConfig};
use submitter_types::{Address, OrderKind, OrderSide, TimeInForce, U256};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod factory;

#[derive(Parser)]
#[command(name = "order-submitter")]
#[command(about = "Quote, authorize and submit orders to the order processor", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[arg(short, long, value_name = "FILE", default_value = "config/local.toml")]
	config: PathBuf,

	/// Overrides `submitter.log_level`; `RUST_LOG` takes precedence over both
	#[arg(long, env = "SUBMITTER_LOG_LEVEL")]
	log_level: Option<String>,

	/// Emit logs as JSON lines
	#[arg(long)]
	json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Submit an order and wait for confirmation
	Submit(OrderArgs),
	/// Validate an order and fetch its fee quote without signing
	Quote(OrderArgs),
	/// Read the on-chain status of an order
	Status {
		/// Order identifier (decimal or 0x hex)
		order_id: U256,
	},
	/// Validate the configuration file
	Validate,
}

#[derive(Args, Debug, Clone)]
struct OrderArgs {
	/// Asset token symbol from [[assets]] or address
	#[arg(long)]
	asset: String,

	/// Payment token symbol from [[assets]] or address
	#[arg(long)]
	payment: String,

	#[arg(long)]
	side: OrderSide,

	/// Smallest-unit quantity: asset units for sells, payment units for buys
	#[arg(long)]
	quantity: U256,

	#[arg(long, default_value = "market")]
	kind: OrderKind,

	#[arg(long, default_value = "0")]
	limit_price: U256,

	#[arg(long, default_value = "day")]
	tif: TimeInForce,

	/// Defaults to the signing account
	#[arg(long)]
	recipient: Option<Address>,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let config = load_config(&cli).await?;

	let log_level = cli
		.log_level
		.as_deref()
		.unwrap_or(&config.submitter.log_level);
	setup_tracing(log_level, cli.json_logs)?;
	info!("Loaded configuration from: {:?}", cli.config);

	match cli.command {
		Commands::Submit(args) => submit(config, args).await,
		Commands::Quote(args) => quote(config, args).await,
		Commands::Status { order_id } => status(config, order_id).await,
		Commands::Validate => validate(config),
	}
}

async fn load_config(cli: &Cli) -> Result<SubmitterConfig> {
	ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("Failed to load configuration")
}

async fn submit(config: SubmitterConfig, args: OrderArgs) -> Result<()> {
	let components = factory::build_submitter(&config)
		.await
		.context("Failed to build submitter")?;
	let request = factory::order_request(&config, &args, components.signer)?;

	let outcome = components
		.submitter
		.submit(&request)
		.await
		.context("Order submission failed")?;

	info!(
		order_id = %outcome.order.order_id,
		status = %outcome.status,
		"Order submitted successfully"
	);
	println!("{}", serde_json::to_string_pretty(&outcome)?);
	Ok(())
}

async fn quote(config: SubmitterConfig, args: OrderArgs) -> Result<()> {
	let components = factory::build_submitter(&config)
		.await
		.context("Failed to build submitter")?;
	let request = factory::order_request(&config, &args, components.signer)?;

	let preview = components
		.submitter
		.quote(&request)
		.await
		.context("Quote request failed")?;

	println!("{}", serde_json::to_string_pretty(&preview)?);
	Ok(())
}

async fn status(config: SubmitterConfig, order_id: U256) -> Result<()> {
	let parser = factory::build_status_reader(&config).context("Failed to connect to chain")?;

	let status = parser
		.query_status(order_id)
		.await
		.context("Failed to read order status")?;

	println!("{}", status);
	Ok(())
}

fn validate(config: SubmitterConfig) -> Result<()> {
	info!("Configuration is valid");
	info!("Chain ID: {}", config.network.chain_id);
	info!("Order processor: {}", config.network.processor_address);
	info!("Delivery strategy: {:?}", config.delivery.strategy);
	for asset in &config.assets {
		info!("  Asset: {} ({})", asset.symbol, asset.address);
	}
	Ok(())
}

fn setup_tracing(log_level: &str, json: bool) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	let registry = tracing_subscriber::registry().with(env_filter);
	if json {
		registry
			.with(tracing_subscriber::fmt::layer().json())
			.try_init()
	} else {
		registry.with(tracing_subscriber::fmt::layer()).try_init()
	}
	.context("Failed to initialise logging")?;

	Ok(())
}

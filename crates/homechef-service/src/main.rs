//! Main entry point for the homechef order desk service.
//!
//! Loads the configuration, builds the desk with the configured data source,
//! keeps the order board fresh by polling, and optionally serves the HTTP
//! API for listing orders and applying actions.

use clap::Parser;
use homechef_config::Config;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod factory_registry;
mod server;

/// Command-line arguments for the order desk service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Refresh once, print the first page of the default view and exit
	#[arg(long)]
	once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started order desk");

	let config = Config::from_file(&args.config.to_string_lossy()).await?;
	tracing::info!("Loaded configuration [{}]", config.desk.id);

	let desk = factory_registry::build_desk_from_config(config.clone())?;

	if args.once {
		desk.refresh().await?;
		let response = desk.view(&config.view_defaults()).await?;
		println!("{}", serde_json::to_string_pretty(&response)?);
		return Ok(());
	}

	desk.initialize().await?;
	let desk = Arc::new(desk);

	match config.api.clone().filter(|api| api.enabled) {
		Some(api_config) => {
			let api_desk = Arc::clone(&desk);

			tokio::select! {
				result = desk.run() => {
					tracing::info!("Order desk finished");
					result?;
				}
				result = server::start_server(api_config, api_desk) => {
					tracing::info!("API server finished");
					result?;
				}
			}
		},
		None => {
			tracing::info!("Starting order desk without API");
			desk.run().await?;
		},
	}

	tracing::info!("Stopped order desk");
	Ok(())
}

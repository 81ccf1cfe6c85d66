use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use dialroute::config::{Config, Format};
use dialroute::directory::FileDirectory;
use dialroute::telemetry::{init_tracing, TracingConfig};
use dialroute::RoutingService;

#[derive(Parser, Debug)]
#[command(name = "dialroute")]
#[command(author, version, about = "Resolve which outbound voice route a call would use")]
struct Args {
    /// Path to config / directory snapshot file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Subscriber identity placing the call
    #[arg(short, long, required_unless_present = "validate")]
    user: Option<String>,

    /// Dialed number
    #[arg(short, long, required_unless_present = "validate")]
    number: Option<String>,

    /// Validate config and exit
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration first (to get log settings)
    let config = Config::load(&args.config)?;

    init_tracing(&TracingConfig::from(&config.settings))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        "starting dialroute"
    );

    // Validate only mode
    if args.validate {
        info!("configuration is valid");
        return Ok(());
    }

    let (Some(user), Some(number)) = (args.user, args.number) else {
        anyhow::bail!("--user and --number are required");
    };

    let format = Format::from_path(&args.config).unwrap_or(Format::Yaml);
    let directory = FileDirectory::with_format(&args.config, format);
    let service = RoutingService::from_config(Arc::new(directory), &config);

    let resolution = service.resolve_call_routing(&number, &user).await?;

    println!("{}", serde_json::to_string_pretty(&resolution)?);

    Ok(())
}

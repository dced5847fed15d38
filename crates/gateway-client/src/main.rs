use clap::Parser;
use color_eyre::eyre::WrapErr;
use dotenvy::dotenv;
use gateway_client::logging::init_logging;
use gateway_client::probe::run_probe;
use gateway_client::{ConnectionParams, GatewayCliArgs, GatewayClient};
use tracing::info;

/// Checks that an object storage gateway accepts bucket and object operations.
#[derive(Debug, Parser)]
#[command(name = "gateway-probe", version, about)]
struct Cli {
    #[command(flatten)]
    gateway: GatewayCliArgs,

    /// Bucket used for the probe.
    #[arg(env = "GATEWAY_PROBE_BUCKET", long, default_value = "gateway-probe")]
    bucket: String,

    /// Delete the probe bucket once the check is done.
    #[arg(long, default_value_t = false)]
    delete_bucket: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenv().ok();
    init_logging().wrap_err("Failed to initialize logging")?;

    let cli = Cli::parse();
    let params = ConnectionParams::try_from(cli.gateway).wrap_err("Invalid gateway configuration")?;
    let client = GatewayClient::new(params, None).wrap_err("Failed to create gateway client")?;
    info!(endpoint = %client.endpoint(), bucket = %cli.bucket, "Probing object storage gateway");

    let report = run_probe(&client, &cli.bucket, cli.delete_bucket).await.wrap_err("Gateway probe failed")?;

    if !report.round_trip_ok {
        color_eyre::eyre::bail!("object read back from bucket {:?} did not match what was written", report.bucket);
    }
    info!(?report, "Gateway probe succeeded");
    Ok(())
}

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use trigger_runner::{Args, TriggerPlugin};

fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the plugin.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Keeps the `request_get_*` definitions linked so `-rdynamic` exports them.
    std::hint::black_box(missdemeanor::accessors());

    let request = args.request().context("Failed to build request")?;
    debug!(
        method = %args.method,
        uri = %args.uri,
        headers = request.header_count(),
        "built request"
    );

    let plugin = unsafe { TriggerPlugin::load(&args.plugin, &args.symbol) }
        .with_context(|| format!("Failed to load trigger from {}", args.plugin.display()))?;
    info!(plugin = %plugin.path().display(), symbol = %args.symbol, "loaded trigger plugin");

    let status = plugin.invoke(&request);
    if status != 0 {
        bail!("trigger returned status {status}");
    }
    info!(status, "trigger completed");
    Ok(())
}

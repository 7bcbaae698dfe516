#[macro_use]
extern crate tracing;

use std::{net::IpAddr, path::PathBuf, sync::Arc};

use structopt::StructOpt;
use tokio::runtime::Builder;
use tokio::signal;

use albumwall::{display::DisplayController, models::Config};

#[derive(Debug, StructOpt)]
#[structopt(about = "Album wall LED daemon")]
struct Opts {
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u32,
    /// Path to the TOML configuration file, built-in defaults are used if missing
    #[structopt(short, long = "config")]
    config_path: Option<PathBuf>,
    /// Address to bind the HTTP server to
    #[structopt(short, long)]
    bind: Option<IpAddr>,
    /// Port for the HTTP server
    #[structopt(short, long)]
    port: Option<u16>,
    #[structopt(long)]
    dump_config: bool,
}

async fn run(opts: Opts) -> color_eyre::eyre::Result<()> {
    // Load configuration
    let mut config = if let Some(config_path) = opts.config_path.as_deref() {
        Config::load_file(config_path).await?
    } else {
        Config::default()
    };

    if let Some(bind) = opts.bind {
        config.web.bind = bind;
    }

    if let Some(port) = opts.port {
        config.web.port = port;
    }

    config.check()?;

    // Dump configuration if this was asked
    if opts.dump_config {
        print!("{}", config.to_string()?);
        return Ok(());
    }

    let controller = Arc::new(DisplayController::from_config(&config)?);

    // The strip keeps its last frame across restarts, start from a dark wall
    if let Err(error) = controller.refresh().await {
        warn!(%error, "failed to clear the strip");
    }

    let server = albumwall::web::bind(controller.clone(), &config.web).await?;

    tokio::select! {
        _ = server => {}
        _ = signal::ctrl_c() => {
            info!("terminating");
        }
    }

    Ok(())
}

fn install_tracing(opts: &Opts) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let fmt_layer = fmt::layer();

    let filter_layer = EnvFilter::try_from_env("ALBUMWALL_LOG").unwrap_or_else(|_| {
        EnvFilter::new(match opts.verbose {
            0 => "albumwall=warn,albumwalld=warn",
            1 => "albumwall=info,albumwalld=info",
            2 => "albumwall=debug,albumwalld=debug",
            _ => "albumwall=trace,albumwalld=trace",
        })
    });

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init()
}

#[paw::main]
fn main(opts: Opts) -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    install_tracing(&opts)?;

    // Create tokio runtime
    let thd_count = match num_cpus::get() {
        1 => 2,
        other => other.min(4),
    };

    let rt = Builder::new_multi_thread()
        .worker_threads(thd_count)
        .enable_all()
        .build()?;
    rt.block_on(run(opts))
}

use clap::Parser;
use std::sync::Arc;

use sitehost::config::{AppState, Config};
use sitehost::{logger, server};

/// Static-site asset proxy
#[derive(Parser, Debug)]
#[command(name = "sitehost", version, about)]
struct Cli {
    /// Config file path without extension (`config` loads `config.toml`)
    #[arg(short, long, default_value = "config", env = "SITEHOST_CONFIG_FILE")]
    config: String,

    /// Validate the configuration and site directory, then exit
    #[arg(long)]
    check_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config)?;
    logger::init(&cfg.logging);

    if cli.check_config {
        return check_config(cfg);
    }

    // Runtime threads follow server.workers, CPU cores when unset
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::bind_listener(addr, cfg.server.backlog)?;

    logger::log_server_start(&addr, &cfg);
    let state = Arc::new(AppState::from_config(cfg)?);

    server::run_server(listener, state, server::shutdown_signal()).await;
    tracing::info!("Server stopped");
    Ok(())
}

fn check_config(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    println!("Configuration OK");
    println!("  listen:        http://{addr}");
    println!("  mount prefix:  {}", cfg.proxy.mount_prefix);
    println!(
        "  origin:        timeout {}s, connect {}s",
        cfg.proxy.upstream_timeout, cfg.proxy.connect_timeout
    );
    match cfg.directory.backend {
        sitehost::config::DirectoryBackend::File => {
            println!("  directory:     file {}", cfg.directory.manifest.display());
        }
        sitehost::config::DirectoryBackend::Remote => println!(
            "  directory:     remote {}",
            cfg.directory.base_url.as_deref().unwrap_or("-")
        ),
    }

    AppState::from_config(cfg)?;
    println!("Site directory OK");
    Ok(())
}

//! Serve command - run the site and health endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use console::style;
use tokio_util::sync::CancellationToken;
use tracing::info;

use folio::health::ConfiguredProbe;
use folio::pages::SiteContext;
use folio::routes::{site_routes, RouteId, SiteRouter};
use folio::server::{self, AppState, HEALTH_PATH};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the serve command.
pub struct ServeArgs {
    pub bind: Option<String>,
    pub no_log_file: bool,
    pub warm: bool,
}

/// Run the serve command until Ctrl+C.
pub fn run(args: ServeArgs) -> Result<(), CliError> {
    let runner = if args.no_log_file {
        CliRunner::new()?
    } else {
        CliRunner::with_log_file()?
    };
    runner.log_startup("serve");
    let config = runner.config();

    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let addr: SocketAddr = bind
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid bind address '{}'", bind)))?;

    let ctx = SiteContext::from_config(config);
    let router = SiteRouter::new(site_routes(ctx)?);
    let probe = Arc::new(ConfiguredProbe::from_settings(&config.server));
    let state = AppState::new(router.clone(), probe, config.site.name.clone())
        .with_public_dir(config.assets.public_dir.clone());

    let public_dir = config.assets.public_dir.display().to_string();
    let warm = args.warm;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, stopping server...");
        signal.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    runtime.block_on(async move {
        let listener = server::bind(addr).await?;
        let local = listener.local_addr().unwrap_or(addr);

        println!("{} v{}", style("Folio").bold(), folio::VERSION);
        println!();
        println!("  Site:   http://{}", local);
        println!("  Health: http://{}{}", local, HEALTH_PATH);
        println!("  Public: {}", public_dir);
        println!();
        println!("Press Ctrl+C to stop");

        if warm {
            for id in RouteId::all() {
                router.preload(*id);
            }
            info!("Warming all page modules");
        }

        server::serve(listener, state, shutdown).await
    })?;

    println!("Server stopped.");
    Ok(())
}

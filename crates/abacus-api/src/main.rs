use abacus_api::cli::{Cli, Command, eval_command};
use abacus_api::{create_app_with_config, telemetry};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = cli.load_config()?;

    match cli.command() {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            telemetry::init_logging(&config.logging)?;
            info!(version = env!("CARGO_PKG_VERSION"), "Starting Abacus evaluation service");

            let addr = config.bind_address();
            let app = create_app_with_config(config);
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            info!(%addr, "Web server started successfully");
            axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
            info!("Server stopped");
        }
        Command::Eval { expressions } => {
            for line in eval_command(&expressions)? {
                println!("{line}");
            }
        }
        Command::CheckConfig => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}

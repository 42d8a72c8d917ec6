//! Colloquy CLI and REST API entry point.
//!
//! Binary name: `clqy`
//!
//! Parses CLI arguments, initializes database and services, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need app state or tracing
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "clqy", &mut std::io::stdout());
        return Ok(());
    }

    // Verbosity flags pick the fallback filter (RUST_LOG overrides it);
    // `serve --otel` additionally bridges spans to OpenTelemetry.
    let with_otel = matches!(&cli.command, Commands::Serve { otel: true, .. });
    let directive = colloquy_observe::filter_directive(cli.verbose, cli.quiet);
    colloquy_observe::init_tracing(directive, with_otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Initialize application state (config, DB, services)
    let app_state = AppState::init().await?;

    match cli.command {
        Commands::CreateAdmin { email, name } => {
            cli::admin::create_admin(&app_state, &email, &name, cli.json).await?;
        }

        Commands::Status => {
            cli::status::status(&app_state, cli.json).await?;
        }

        Commands::Serve { port, host, .. } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Colloquy API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(app_state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            colloquy_observe::shutdown_tracing();
            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

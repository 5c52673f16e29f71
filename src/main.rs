use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use paygate::config::GatewayConfig;
use paygate::interfaces::bank_simulator::{self, DEFAULT_APPROVAL_RATE};
use paygate::interfaces::batch::process_batch;
use paygate::interfaces::csv::payment_writer::PaymentWriter;
use paygate::interfaces::http;
use paygate::telemetry;
use std::fs::File;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the payment gateway HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
        listen: SocketAddr,

        #[command(flatten)]
        config: GatewayConfig,
    },
    /// Run the simulated bank
    Bank {
        /// Address to listen on
        #[arg(long, env = "BANK_LISTEN_ADDR", default_value = "0.0.0.0:8081")]
        listen: SocketAddr,

        /// Share of requests approved, between 0 and 1
        #[arg(long, default_value_t = DEFAULT_APPROVAL_RATE)]
        approval_rate: f64,
    },
    /// Process payment requests from a CSV file and print the recorded payments
    Batch {
        /// Input payments CSV file
        input: PathBuf,

        #[command(flatten)]
        config: GatewayConfig,
    },
    /// Print a recorded payment as JSON
    Retrieve {
        /// Payment identifier
        id: Uuid,

        #[command(flatten)]
        config: GatewayConfig,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { listen, config } => {
            let orchestrator = Arc::new(config.build_orchestrator().into_diagnostic()?);
            let listener = TcpListener::bind(listen).await.into_diagnostic()?;
            info!(%listen, bank_url = %config.bank_url, "payment gateway listening");
            axum::serve(listener, http::router(orchestrator))
                .with_graceful_shutdown(shutdown_signal())
                .await
                .into_diagnostic()?;
        }
        Command::Bank {
            listen,
            approval_rate,
        } => {
            let listener = TcpListener::bind(listen).await.into_diagnostic()?;
            info!(%listen, approval_rate, "simulated bank listening");
            bank_simulator::serve(listener, approval_rate)
                .await
                .into_diagnostic()?;
        }
        Command::Batch { input, config } => {
            let orchestrator = config.build_orchestrator().into_diagnostic()?;
            let file = File::open(input).into_diagnostic()?;

            let recorded = process_batch(&orchestrator, file).await;

            let stdout = io::stdout();
            PaymentWriter::new(stdout.lock())
                .write_payments(recorded)
                .into_diagnostic()?;
        }
        Command::Retrieve { id, config } => {
            let orchestrator = config.build_orchestrator().into_diagnostic()?;
            let view = orchestrator.retrieve_payment(id).await.into_diagnostic()?;
            println!("{}", serde_json::to_string_pretty(&view).into_diagnostic()?);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

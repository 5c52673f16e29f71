#![allow(dead_code)]

use paygate::config::GatewayConfig;
use paygate::domain::identifier::IdGranularity;
use paygate::interfaces::{bank_simulator, http};
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::NamedTempFile;

pub const HEADER: &str = "card_number,expiry_month,expiry_year,cvv,amount,currency";

/// Starts a simulated bank on its own runtime thread, for tests that drive the binary.
pub fn spawn_bank(approval_rate: f64) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            bank_simulator::serve(listener, approval_rate).await.unwrap();
        });
    });

    bank_url(addr)
}

/// Starts a bank that approves everything and counts the requests it receives.
pub fn spawn_counting_bank() -> (String, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let app = axum::Router::new().route(
        "/simulate_bank",
        axum::routing::post(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { axum::Json(serde_json::json!({ "status": "APPROVED" })) }
        }),
    );

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    (bank_url(addr), calls)
}

/// Starts a simulated bank on the current runtime.
pub async fn spawn_bank_async(approval_rate: f64) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(bank_simulator::serve(listener, approval_rate));
    bank_url(addr)
}

/// A URL on which nothing listens.
pub fn unreachable_bank_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    bank_url(addr)
}

fn bank_url(addr: SocketAddr) -> String {
    format!("http://{addr}/simulate_bank")
}

pub fn gateway_config(bank_url: &str) -> GatewayConfig {
    GatewayConfig {
        bank_url: bank_url.to_string(),
        db_path: None,
        duplicate_window_secs: 3600,
        authorization_timeout_ms: 2000,
        id_granularity: IdGranularity::Nanos,
    }
}

/// Starts the gateway API against `bank_url` and returns its base URL.
pub async fn spawn_gateway(bank_url: &str) -> String {
    let orchestrator = Arc::new(gateway_config(bank_url).build_orchestrator().unwrap());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, http::router(orchestrator)).await });
    format!("http://{addr}")
}

/// Writes a payments CSV with the standard header followed by `rows`.
pub fn payments_csv(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}

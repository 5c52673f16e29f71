use crate::application::duplicate_guard::DuplicateGuard;
use crate::application::orchestrator::PaymentOrchestrator;
use crate::domain::identifier::IdGranularity;
use crate::domain::ports::ClockRef;
use crate::error::{PaymentError, Result};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::http_authorizer::HttpAuthorizer;
use crate::infrastructure::open_store;
use clap::Args;
use reqwest::Url;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BANK_URL: &str = "http://localhost:8081/simulate_bank";

/// Settings the gateway reads once at startup.
#[derive(Args, Debug, Clone)]
pub struct GatewayConfig {
    /// Authorization backend endpoint
    #[arg(long, env = "BANK_SIMULATOR_URL", default_value = DEFAULT_BANK_URL)]
    pub bank_url: String,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "DATABASE_PATH")]
    pub db_path: Option<PathBuf>,

    /// Seconds during which an identical request is rejected as a duplicate
    #[arg(long, env = "DUPLICATE_WINDOW_SECS", default_value_t = 3600)]
    pub duplicate_window_secs: u64,

    /// Deadline for one exchange with the authorization backend
    #[arg(long, env = "AUTHORIZATION_TIMEOUT_MS", default_value_t = 5000)]
    pub authorization_timeout_ms: u64,

    /// Timestamp precision folded into payment identifiers
    #[arg(long, env = "ID_GRANULARITY", value_enum, default_value_t = IdGranularity::Nanos)]
    pub id_granularity: IdGranularity,
}

impl GatewayConfig {
    pub fn duplicate_window(&self) -> Duration {
        Duration::from_secs(self.duplicate_window_secs)
    }

    pub fn authorization_timeout(&self) -> Duration {
        Duration::from_millis(self.authorization_timeout_ms)
    }

    pub fn bank_endpoint(&self) -> Result<Url> {
        Url::parse(&self.bank_url).map_err(|e| {
            PaymentError::ConfigError(format!("invalid bank URL '{}': {e}", self.bank_url))
        })
    }

    /// Wires the orchestrator and its collaborators from these settings.
    pub fn build_orchestrator(&self) -> Result<PaymentOrchestrator> {
        if self.authorization_timeout_ms == 0 {
            return Err(PaymentError::ConfigError(
                "authorization timeout must be greater than zero".to_string(),
            ));
        }

        let clock: ClockRef = Arc::new(SystemClock);
        let authorizer = HttpAuthorizer::new(self.bank_endpoint()?, self.authorization_timeout())?;
        let store = open_store(self.db_path.as_deref())?;

        Ok(PaymentOrchestrator::new(
            DuplicateGuard::new(self.duplicate_window(), clock.clone()),
            Box::new(authorizer),
            store,
            clock,
            self.id_granularity,
        ))
    }
}

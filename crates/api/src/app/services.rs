use std::sync::Arc;

use ledgerly_infra::store::{CustomerStore, InvoiceStore};
use ledgerly_infra::{InMemoryStore, fixtures};

use crate::config::AppConfig;

/// Shared application services: the storage gateways behind the routes.
///
/// Both gateways point at the same backend; they are kept as separate trait
/// objects so handlers depend only on the operations they use.
#[derive(Clone)]
pub struct AppServices {
    customers: Arc<dyn CustomerStore>,
    invoices: Arc<dyn InvoiceStore>,
}

impl AppServices {
    /// In-memory backend (dev/test).
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            customers: store.clone(),
            invoices: store,
        }
    }

    /// Postgres backend.
    #[cfg(feature = "postgres")]
    pub async fn postgres(database_url: &str) -> anyhow::Result<Self> {
        let store = Arc::new(ledgerly_infra::PostgresStore::connect(database_url).await?);
        Ok(Self {
            customers: store.clone(),
            invoices: store,
        })
    }

    pub fn customers(&self) -> &dyn CustomerStore {
        self.customers.as_ref()
    }

    pub fn invoices(&self) -> &dyn InvoiceStore {
        self.invoices.as_ref()
    }
}

/// Choose the storage backend from configuration, seeding fixtures when asked.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    #[cfg(feature = "postgres")]
    if let Some(database_url) = &config.database_url {
        tracing::info!("using postgres storage gateway");
        return AppServices::postgres(database_url).await;
    }

    tracing::info!("using in-memory storage gateway");
    let services = AppServices::in_memory();

    if config.seed_fixtures {
        let summary = fixtures::seed(services.customers(), services.invoices()).await?;
        tracing::info!(
            customers = summary.customers,
            invoices = summary.invoices,
            "fixtures ready"
        );
    }

    Ok(services)
}

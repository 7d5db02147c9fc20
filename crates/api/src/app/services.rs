use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use equipstock_infra::{
    AlertSink, AppConfig, CatalogManager, EquipmentRepository, HttpLocationResolver, InMemoryStore,
    LocationError, LocationResolver, PostgresStore, StockLedger, StockRepository, StoreError,
    TracingAlertSink,
};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to open store: {0}")]
    Store(#[from] StoreError),

    #[error("failed to set up location client: {0}")]
    Location(#[from] LocationError),
}

/// Engines shared by every handler.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogManager,
    pub ledger: StockLedger,
}

impl AppServices {
    pub fn new(
        equipment: Arc<dyn EquipmentRepository>,
        stock: Arc<dyn StockRepository>,
        locations: Arc<dyn LocationResolver>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        let catalog = CatalogManager::new(equipment);
        let ledger = StockLedger::new(catalog.clone(), stock, locations, alerts);
        Self { catalog, ledger }
    }
}

/// Wire stores, the location client and alert delivery from configuration.
///
/// `DATABASE_URL` selects Postgres; without it everything lives in memory.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, BootstrapError> {
    let locations: Arc<dyn LocationResolver> = Arc::new(HttpLocationResolver::new(&config.location)?);
    let alerts: Arc<dyn AlertSink> = Arc::new(TracingAlertSink);

    match &config.database_url {
        Some(url) => {
            let store = Arc::new(PostgresStore::connect(url).await?);
            info!("using postgres stores");
            Ok(AppServices::new(store.clone(), store, locations, alerts))
        }
        None => {
            let store = Arc::new(InMemoryStore::new());
            info!("DATABASE_URL not set; using in-memory stores");
            Ok(AppServices::new(store.clone(), store, locations, alerts))
        }
    }
}

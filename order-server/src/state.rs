//! Application state shared by every handler

use std::sync::Arc;

use crate::BoxError;
use crate::config::Config;
use crate::db::{DataStore, MemoryStore, PgStore};
use crate::live::{Outbox, TopicHub, run_dispatcher};
use crate::orders::OrderEngine;
use crate::seed;
use crate::tables::TableRegistry;

/// Cheap to clone; everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    /// Live topic subscriptions (WebSocket sessions)
    pub hub: TopicHub,
    pub orders: OrderEngine,
    pub tables: TableRegistry,
    /// HS256 secret for staff tokens
    pub jwt_secret: String,
    /// Tenant key for IP literals and dotless hosts
    pub fallback_tenant: String,
}

impl AppState {
    /// Wire services around `store` and start the notification dispatcher.
    ///
    /// Must be called inside a tokio runtime.
    pub fn build(
        store: Arc<dyn DataStore>,
        jwt_secret: impl Into<String>,
        fallback_tenant: impl Into<String>,
    ) -> Self {
        let hub = TopicHub::new();
        let (outbox, rx) = Outbox::channel();
        tokio::spawn(run_dispatcher(rx, hub.clone()));

        Self {
            orders: OrderEngine::new(store.clone(), outbox.clone()),
            tables: TableRegistry::new(store.clone(), outbox),
            store,
            hub,
            jwt_secret: jwt_secret.into(),
            fallback_tenant: fallback_tenant.into(),
        }
    }

    /// PostgreSQL when `DATABASE_URL` is set, in-memory otherwise
    pub async fn from_config(config: &Config) -> Result<Self, BoxError> {
        let store: Arc<dyn DataStore> = match &config.database_url {
            Some(url) => {
                let pg = PgStore::connect(url).await?;
                tracing::info!("Using PostgreSQL store");
                Arc::new(pg)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory store (data is lost on restart)");
                Arc::new(MemoryStore::new())
            }
        };

        let state = Self::build(store, &config.jwt_secret, &config.fallback_tenant);
        if config.seed_demo {
            seed::seed_demo(&state).await?;
        }
        Ok(state)
    }
}

//! Database connection management
//!
//! Wraps a MongoDB client and hands out per-collection stores.

use std::time::Duration;

use bson::doc;
use hire_core::config::DatabaseConfig;
use mongodb::options::ClientOptions;
use mongodb::Client;

use crate::mongo::MongoStore;
use crate::repository::RepositoryResult;

const APP_NAME: &str = "hire-rs";

/// Connected database handle
#[derive(Clone)]
pub struct Database {
    client: Client,
    database: mongodb::Database,
}

impl Database {
    /// Create a client for the configured deployment.
    ///
    /// The driver connects lazily, so an unreachable server is only reported
    /// by the first operation or by [`Database::ping`].
    pub async fn connect(config: &DatabaseConfig) -> RepositoryResult<Self> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some(APP_NAME.to_string());
        options.max_pool_size = Some(config.max_pool_size);
        options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_seconds));
        options.server_selection_timeout = Some(Duration::from_secs(config.connect_timeout_seconds));

        let client = Client::with_options(options)?;
        let database = client.database(&config.name);

        tracing::info!(
            database = %config.name,
            max_pool_size = config.max_pool_size,
            "Database client created"
        );

        Ok(Self { client, database })
    }

    pub fn name(&self) -> &str {
        self.database.name()
    }

    /// Store for one collection
    pub fn store(&self, collection: &str) -> MongoStore {
        MongoStore::new(self.database.collection(collection))
    }

    /// Check if the database is reachable
    pub async fn ping(&self) -> RepositoryResult<()> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    /// Shut the client down
    pub async fn close(self) {
        self.client.shutdown().await;
        tracing::info!("Database client closed");
    }
}

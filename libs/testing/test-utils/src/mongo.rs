//! MongoDB test infrastructure
//!
//! Provides a `TestMongo` helper that starts a MongoDB container for
//! testing. Collections start empty; domain services create their own
//! indexes when a test needs them.

use mongodb::{Client, Database};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::mongo::Mongo;

/// Test MongoDB wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
pub struct TestMongo {
    #[allow(dead_code)]
    container: ContainerAsync<Mongo>,
    pub client: Client,
    db: Database,
}

impl TestMongo {
    /// Start a MongoDB container and connect to a fresh database
    ///
    /// # Example
    ///
    /// ```no_run
    /// use test_utils::TestMongo;
    ///
    /// # async fn example() {
    /// let mongo = TestMongo::new().await;
    /// // Use mongo.database() to create your repositories
    /// # }
    /// ```
    pub async fn new() -> Self {
        // Pin the major version used in production
        let mongo = Mongo::default().with_tag("7");

        let container = mongo
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let host_port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get host port");

        let url = format!("mongodb://127.0.0.1:{}", host_port);

        let client = Client::with_uri_str(&url)
            .await
            .expect("Failed to connect to test MongoDB");

        let db = client.database("catalog_test");

        tracing::info!(port = host_port, "Test MongoDB ready");

        Self {
            container,
            client,
            db,
        }
    }

    /// Handle to the test database
    pub fn database(&self) -> &Database {
        &self.db
    }
}

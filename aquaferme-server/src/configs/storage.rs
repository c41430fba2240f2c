use std::path::Path;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Error, SqlitePool};

use crate::configs::schema::SchemaManager;
use crate::configs::settings::Database;

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(database: Database, schema_manager: SchemaManager) -> Result<Self, Error> {
        // Every connection to an in memory url opens a distinct database
        let max_connections = if database.url.contains(":memory:") { 1 } else { 10 };

        let pool = SqlitePoolOptions::new()
            .min_connections(1) // in memory db might drop connection when 0
            .max_connections(max_connections)
            .connect(&database.url)
            .await?;

        Self::create_schema(&pool, &schema_manager, &database).await?;

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_schema(
        pool: &SqlitePool,
        schema: &SchemaManager,
        database: &Database,
    ) -> Result<(), Error> {
        if database.clean_start {
            // Clean migration history
            sqlx::query("DROP TABLE IF EXISTS _sqlx_migrations")
                .execute(pool)
                .await?;

            for statement in schema.dispose_schema() {
                sqlx::query(&statement).execute(pool).await?;
            }

            tracing::warn!("perform a clean boot: clean and recreate schema");
        }

        for statement in schema.create_schema() {
            sqlx::query(&statement).execute(pool).await?;
        }

        for statement in schema.seed_schema() {
            sqlx::query(&statement).execute(pool).await?;
        }

        if let Some(migration_path) = database.migration_path.clone() {
            let mut pool_connection = pool.acquire().await?;
            let migrator = Migrator::new(Path::new(&migration_path)).await?;
            migrator.run(&mut pool_connection).await?;

            tracing::info!("database migration success");
        }

        Ok(())
    }
}

//! Per-test databases inside one shared PostgreSQL container.

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::{OnceCell, mpsc};
use uuid::Uuid;

use crate::database;

const USER: &str = "bookstore_test";
const PASSWORD: &str = "bookstore_test_password";
const MAINTENANCE_DB: &str = "postgres";

/// Started on first use and shared by every test in the binary.
static CONTAINER: Lazy<OnceCell<ContainerAsync<PostgresImage>>> = Lazy::new(OnceCell::new);

/// Databases queued for dropping once their `TestDb` goes away.
static DROPS: Lazy<OnceCell<mpsc::UnboundedSender<String>>> = Lazy::new(OnceCell::new);

async fn start_container() -> ContainerAsync<PostgresImage> {
    PostgresImage::default()
        .with_user(USER)
        .with_password(PASSWORD)
        .with_db_name(USER)
        .with_env_var("POSTGRES_INITDB_ARGS", "--auth-host=trust")
        .start()
        .await
        .expect("Failed to start PostgreSQL container")
}

async fn start_drop_worker() -> mpsc::UnboundedSender<String> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(name) = receiver.recv().await {
            if let Err(error) = drop_database(&name).await {
                eprintln!("Failed to drop test database '{name}': {error}");
            }
        }
    });

    sender
}

async fn server_url(database: &str) -> Option<String> {
    let container = CONTAINER.get()?;
    let port = container.get_host_port_ipv4(5432).await.ok()?;
    let host =
        std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());

    Some(format!("postgresql://{USER}:{PASSWORD}@{host}:{port}/{database}"))
}

async fn drop_database(name: &str) -> Result<(), sqlx::Error> {
    if !is_generated_name(name) {
        return Ok(());
    }

    let Some(url) = server_url(MAINTENANCE_DB).await else {
        return Ok(());
    };

    let mut conn = PgConnection::connect(&url).await?;

    sqlx::query(&format!("DROP DATABASE IF EXISTS \"{name}\""))
        .execute(&mut conn)
        .await?;

    conn.close().await
}

/// Only names produced by [`generated_name`] are ever interpolated into DDL.
fn is_generated_name(name: &str) -> bool {
    name.strip_prefix("bookstore_test_").is_some_and(|suffix| {
        suffix.len() == 32 && suffix.chars().all(|c| c.is_ascii_hexdigit())
    })
}

fn generated_name() -> String {
    format!("bookstore_test_{}", Uuid::new_v4().simple())
}

/// A freshly migrated database owned by a single test.
///
/// Services commit their own transactions, so isolation comes from every test having a
/// database of its own. The database is dropped in the background when this value is dropped.
#[derive(Debug)]
pub struct TestDb {
    pool: PgPool,
    name: String,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if let Some(sender) = DROPS.get() {
            let _ = sender.send(self.name.clone());
        }
    }
}

impl TestDb {
    pub async fn new() -> Self {
        DROPS.get_or_init(start_drop_worker).await;
        CONTAINER.get_or_init(start_container).await;

        let name = generated_name();

        let admin_url = server_url(MAINTENANCE_DB)
            .await
            .expect("Failed to resolve container address");

        let mut conn = PgConnection::connect(&admin_url)
            .await
            .expect("Failed to connect to maintenance database");

        sqlx::query(&format!("CREATE DATABASE \"{name}\""))
            .execute(&mut conn)
            .await
            .expect("Failed to create test database");

        conn.close()
            .await
            .expect("Failed to close admin connection");

        let url = server_url(&name)
            .await
            .expect("Failed to resolve container address");

        let pool = PgPool::connect(&url)
            .await
            .expect("Failed to create pool for test database");

        database::migrate(&pool)
            .await
            .expect("Failed to run migrations on test database");

        Self { pool, name }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_are_droppable() {
        assert!(is_generated_name(&generated_name()));
    }

    #[test]
    fn foreign_names_are_never_dropped() {
        assert!(!is_generated_name("postgres"));
        assert!(!is_generated_name("bookstore_test"));
        assert!(!is_generated_name("bookstore_test_\"; DROP TABLE books; --"));
    }

    #[tokio::test]
    async fn test_database_is_migrated() {
        let test_db = TestDb::new().await;

        let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(test_db.pool())
            .await
            .expect("Failed to query books table");

        assert_eq!(books, 0);
    }
}

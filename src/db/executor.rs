use std::path::Path;

use diesel::connection::{Connection, SimpleConnection};
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::SqliteConnection;
use dotenv::dotenv;

pub type ConnType = PooledConnection<ConnectionManager<InnerConnType>>;
pub type PoolType = Pool<ConnectionManager<InnerConnType>>;
pub type InnerConnType = SqliteConnection;

const CONNECTION_INIT: &str =
    "PRAGMA synchronous = NORMAL; PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] tokio::task::JoinError),
    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),
    #[error("Diesel error: {0}")]
    DieselError(#[from] diesel::result::Error),
    #[error("Migration error: {0}")]
    MigrationError(#[from] diesel_migrations::RunMigrationsError),
}

#[derive(Clone)]
pub struct DbExecutor {
    pub pool: PoolType,
}

impl DbExecutor {
    pub fn new<S: Into<String>>(database_url: S) -> Result<Self, Error> {
        let database_url = database_url.into();
        log::info!("using database at: {}", database_url);
        let manager = ConnectionManager::new(database_url);
        let pool = Pool::builder().build(manager)?;
        Ok(DbExecutor { pool })
    }

    pub fn from_env() -> Result<Self, Error> {
        dotenv().ok();
        let database_url = std::env::var("ORG_DIRECTORY_DB_URL")
            .unwrap_or_else(|_| "org-directory.db".to_string());
        Self::new(database_url)
    }

    pub fn from_data_dir(data_dir: &Path, name: &str) -> Result<Self, Error> {
        let db = data_dir.join(name).with_extension("db");
        Self::new(db.to_string_lossy().to_string())
    }

    pub fn conn(&self) -> Result<ConnType, Error> {
        let conn = self.pool.get()?;
        conn.batch_execute(CONNECTION_INIT)?;
        Ok(conn)
    }

    pub fn as_dao<'a, T: AsDao<'a>>(&'a self) -> T {
        AsDao::as_dao(&self.pool)
    }

    pub fn apply_migration<
        T: FnOnce(
            &ConnType,
            &mut dyn std::io::Write,
        ) -> Result<(), diesel_migrations::RunMigrationsError>,
    >(
        &self,
        migration: T,
    ) -> anyhow::Result<()> {
        let conn = self.conn()?;
        migration(&conn, &mut std::io::stderr())?;
        Ok(())
    }
}

pub trait AsDao<'a> {
    fn as_dao(pool: &'a PoolType) -> Self;
}

async fn do_with_connection<R, Error, F>(pool: &PoolType, f: F) -> Result<R, Error>
where
    R: Send + 'static,
    Error: Send
        + 'static
        + From<tokio::task::JoinError>
        + From<r2d2::Error>
        + From<diesel::result::Error>,
    F: FnOnce(&ConnType) -> Result<R, Error> + Send + 'static,
{
    let pool = pool.clone();
    match tokio::task::spawn_blocking(move || {
        let conn = pool.get()?;
        conn.batch_execute(CONNECTION_INIT)
            .map_err(From::from)
            .and_then(|_| f(&conn))
    })
    .await
    {
        Ok(result) => result,
        Err(join_error) => Err(join_error.into()),
    }
}

pub async fn do_with_transaction<R, Error, F>(
    pool: &PoolType,
    label: &'static str,
    f: F,
) -> Result<R, Error>
where
    R: Send + 'static,
    Error: Send
        + 'static
        + From<tokio::task::JoinError>
        + From<r2d2::Error>
        + From<diesel::result::Error>,
    F: FnOnce(&ConnType) -> Result<R, Error> + Send + 'static,
{
    log::trace!("transaction start: {}", label);
    do_with_connection(pool, move |conn| conn.transaction(|| f(conn))).await
}

pub async fn readonly_transaction<R, Error, F>(
    pool: &PoolType,
    label: &'static str,
    f: F,
) -> Result<R, Error>
where
    R: Send + 'static,
    Error: Send
        + 'static
        + From<tokio::task::JoinError>
        + From<r2d2::Error>
        + From<diesel::result::Error>,
    F: FnOnce(&ConnType) -> Result<R, Error> + Send + 'static,
{
    log::trace!("readonly transaction start: {}", label);
    do_with_connection(pool, move |conn| conn.transaction(|| f(conn))).await
}

//! Local PostgreSQL lifecycle management.
//!
//! `LocalDbManager` drives a PostgreSQL instance through `initdb`, `pg_ctl`
//! and `pg_isready`. Production deployments point `DATABASE_URL` at an
//! existing server; this module exists for local development and for the
//! integration tests, which spin up an ephemeral instance per test.

use std::net::TcpListener;
use std::path::PathBuf;
use std::time::Duration;

use sqlx::postgres::PgPool;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::sleep;
use tracing::info;

/// Default database name.
const DEFAULT_DATABASE: &str = "domainkeeper";

/// Maximum time to wait for PostgreSQL to become ready.
const PG_READY_TIMEOUT: Duration = Duration::from_secs(30);

/// Poll interval while waiting for readiness.
const PG_READY_POLL: Duration = Duration::from_millis(200);

/// Errors from local database management.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("PostgreSQL command failed: {0}")]
    Command(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data directory not available")]
    NoDataDir,

    #[error("pg_config not found on PATH")]
    PgConfigNotFound,

    #[error("PostgreSQL not ready after {0:?}")]
    ReadyTimeout(Duration),
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DbError>;

/// Where the PostgreSQL binaries and data live.
#[derive(Debug, Clone)]
pub struct PgConfig {
    /// Directory containing initdb, pg_ctl, pg_isready.
    pub bin_dir: PathBuf,
    /// PGDATA directory.
    pub data_dir: PathBuf,
    /// Listen port. 0 auto-assigns a free ephemeral port.
    pub port: u16,
    /// Database name.
    pub database_name: String,
}

impl PgConfig {
    /// Discover the PG binaries via `pg_config --bindir` on PATH.
    pub async fn discover(data_dir: PathBuf, database_name: &str) -> Result<Self> {
        let output = Command::new("pg_config")
            .arg("--bindir")
            .output()
            .await
            .map_err(|_| DbError::PgConfigNotFound)?;

        if !output.status.success() {
            return Err(DbError::PgConfigNotFound);
        }

        let bin_dir = String::from_utf8_lossy(&output.stdout).trim().to_string();

        Ok(Self {
            bin_dir: PathBuf::from(bin_dir),
            data_dir,
            port: 0,
            database_name: database_name.to_string(),
        })
    }
}

/// Manages a locally-spawned PostgreSQL instance.
pub struct LocalDbManager {
    config: PgConfig,
    started: bool,
    /// Keeps the tempdir alive for ephemeral instances; dropping it cleans up.
    _tempdir: Option<tempfile::TempDir>,
}

impl LocalDbManager {
    pub fn new(config: PgConfig) -> Self {
        Self {
            config,
            started: false,
            _tempdir: None,
        }
    }

    /// Manager over the platform data directory
    /// (`$APP_DATA/domainkeeper/pgdata/`), for local development.
    pub async fn with_default_data_dir() -> Result<Self> {
        let data_dir = default_data_dir().ok_or(DbError::NoDataDir)?;
        let config = PgConfig::discover(data_dir, DEFAULT_DATABASE).await?;
        Ok(Self::new(config))
    }

    /// Manager with throwaway storage, for tests. Data is removed when the
    /// manager drops.
    pub async fn ephemeral() -> Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let data_dir = tempdir.path().join("pgdata");
        let config = PgConfig::discover(data_dir, DEFAULT_DATABASE).await?;

        Ok(Self {
            config,
            started: false,
            _tempdir: Some(tempdir),
        })
    }

    /// Initialize the data directory. Skips when already initialized, so it
    /// is safe to call on every start.
    pub async fn setup(&mut self) -> Result<()> {
        if self.config.data_dir.join("PG_VERSION").exists() {
            info!("data directory already initialized, skipping initdb");
            return Ok(());
        }

        info!("initializing PostgreSQL data directory");
        let initdb = self.config.bin_dir.join("initdb");
        let output = Command::new(&initdb)
            .arg("-D")
            .arg(&self.config.data_dir)
            .arg("--no-locale")
            .arg("--encoding=UTF8")
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DbError::Command(format!("initdb failed: {stderr}")));
        }

        Ok(())
    }

    /// Start the server and ensure the application database exists.
    pub async fn start(&mut self) -> Result<()> {
        if self.config.port == 0 {
            self.config.port = find_free_port()?;
        }

        let pg_ctl = self.config.bin_dir.join("pg_ctl");
        let port_opt = format!(
            "-p {} -k {} -h localhost",
            self.config.port,
            self.config.data_dir.display()
        );
        let logfile = self.config.data_dir.join("postgresql.log");

        let output = Command::new(&pg_ctl)
            .arg("-D")
            .arg(&self.config.data_dir)
            .arg("-o")
            .arg(&port_opt)
            .arg("-l")
            .arg(&logfile)
            .arg("start")
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DbError::Command(format!("pg_ctl start failed: {stderr}")));
        }

        self.wait_for_ready().await?;
        self.started = true;
        info!(port = self.config.port, "PostgreSQL started");

        self.create_database_if_missing().await?;
        Ok(())
    }

    /// Stop the server gracefully.
    pub async fn stop(&mut self) -> Result<()> {
        if !self.started {
            return Ok(());
        }

        let pg_ctl = self.config.bin_dir.join("pg_ctl");
        let output = Command::new(&pg_ctl)
            .arg("-D")
            .arg(&self.config.data_dir)
            .arg("-m")
            .arg("fast")
            .arg("stop")
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DbError::Command(format!("pg_ctl stop failed: {stderr}")));
        }

        self.started = false;
        info!("PostgreSQL stopped");
        Ok(())
    }

    /// Connection URL for the application database.
    pub fn connection_url(&self) -> String {
        format!(
            "postgresql://localhost:{}/{}",
            self.config.port, self.config.database_name
        )
    }

    /// Listen port (0 until assigned by `start`).
    pub fn port(&self) -> u16 {
        self.config.port
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    async fn wait_for_ready(&self) -> Result<()> {
        let pg_isready = self.config.bin_dir.join("pg_isready");
        let deadline = tokio::time::Instant::now() + PG_READY_TIMEOUT;

        loop {
            let output = Command::new(&pg_isready)
                .arg("-p")
                .arg(self.config.port.to_string())
                .arg("-h")
                .arg("localhost")
                .output()
                .await?;

            if output.status.success() {
                return Ok(());
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(DbError::ReadyTimeout(PG_READY_TIMEOUT));
            }

            sleep(PG_READY_POLL).await;
        }
    }

    async fn create_database_if_missing(&self) -> Result<()> {
        let maintenance_url = format!("postgresql://localhost:{}/postgres", self.config.port);
        let pool = PgPool::connect(&maintenance_url).await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
                .bind(&self.config.database_name)
                .fetch_one(&pool)
                .await?;

        if !exists {
            info!(database = %self.config.database_name, "creating database");
            // CREATE DATABASE cannot use bind parameters
            let sql = format!("CREATE DATABASE \"{}\"", self.config.database_name);
            sqlx::query(&sql).execute(&pool).await?;
        }

        pool.close().await;
        Ok(())
    }
}

/// Find a free ephemeral port by binding to port 0.
fn find_free_port() -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    Ok(port)
}

/// Default data directory for a locally-managed instance.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("domainkeeper").join("pgdata"))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn pg_available() -> bool {
        Command::new("pg_config")
            .arg("--bindir")
            .output()
            .await
            .is_ok_and(|o| o.status.success())
    }

    #[test]
    fn default_data_dir_is_some() {
        let dir = default_data_dir().expect("data dir");
        assert!(
            dir.ends_with("domainkeeper/pgdata") || dir.ends_with("domainkeeper\\pgdata")
        );
    }

    #[tokio::test]
    async fn lifecycle_setup_start_stop() -> Result<()> {
        if !pg_available().await {
            eprintln!("skipping: pg_config not found on PATH");
            return Ok(());
        }

        let mut mgr = LocalDbManager::ephemeral().await?;

        mgr.setup().await?;
        assert!(!mgr.is_started());

        mgr.start().await?;
        assert!(mgr.is_started());
        assert_ne!(0, mgr.port());

        let url = mgr.connection_url();
        assert!(url.starts_with("postgresql://"));
        assert!(url.contains("domainkeeper"));

        mgr.stop().await?;
        assert!(!mgr.is_started());

        Ok(())
    }
}

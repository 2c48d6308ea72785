use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

pub const DEFAULT_POOL_SIZE: usize = 1;
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Faults raised by the store layer. Callers at the HTTP boundary classify
/// these; nothing here is meant to be shown to a client.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store is not configured")]
    Unconfigured,
    #[error("store is not connected")]
    Disconnected,
    #[error("timed out after {0:?} waiting for a store connection")]
    Timeout(Duration),
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("corrupt row: {0}")]
    Corrupt(String),
    #[error("store pool lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub pool_size: usize,
    /// Upper bound on waiting for a free pooled connection.
    pub acquire_timeout: Duration,
    /// Upper bound on waiting for a SQLite lock held by another writer.
    pub busy_timeout: Duration,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool_size: DEFAULT_POOL_SIZE,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Unconfigured,
    Disconnected,
    Connected,
}

impl StoreStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreStatus::Unconfigured => "unconfigured",
            StoreStatus::Disconnected => "disconnected",
            StoreStatus::Connected => "connected",
        }
    }
}

/// Handle to the field-data store.
///
/// Owned by the hosting process and passed into the router; the process
/// decides when to `connect` and `disconnect`.
pub struct Store {
    config: Option<StoreConfig>,
    pool: RwLock<Option<Arc<Pool>>>,
}

impl Store {
    /// A store with no backing database. Lists degrade to empty, writes are refused.
    pub fn unconfigured() -> Self {
        Self {
            config: None,
            pool: RwLock::new(None),
        }
    }

    /// Configured but not yet connected.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config: Some(config),
            pool: RwLock::new(None),
        }
    }

    /// Open the pool and apply the schema. On failure the store stays disconnected.
    pub fn connect(&self) -> Result<(), StoreError> {
        let cfg = self.config.as_ref().ok_or(StoreError::Unconfigured)?;

        let pool = Pool::open(cfg)?;
        {
            let mut guard = pool.checkout(cfg.acquire_timeout)?;
            guard.conn_mut()?.execute_batch(SCHEMA_SQL)?;
        }

        let mut slot = self.pool.write().map_err(|_| StoreError::Poisoned)?;
        *slot = Some(Arc::new(pool));

        info!(
            path = %cfg.path.display(),
            pool_size = cfg.pool_size.max(1),
            "connected to field data store"
        );
        Ok(())
    }

    /// Drop the pool. Connections already checked out close once returned.
    pub fn disconnect(&self) {
        match self.pool.write() {
            Ok(mut slot) => {
                if slot.take().is_some() {
                    info!("disconnected from field data store");
                }
            }
            Err(_) => warn!("store pool lock poisoned during disconnect"),
        }
    }

    pub fn status(&self) -> StoreStatus {
        if self.config.is_none() {
            return StoreStatus::Unconfigured;
        }
        match self.pool.read() {
            Ok(slot) if slot.is_some() => StoreStatus::Connected,
            _ => StoreStatus::Disconnected,
        }
    }

    /// Check out a pooled connection and run `f(conn)` on it.
    ///
    /// When every connection is busy the call queues, for at most the
    /// configured acquire timeout.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError>,
    {
        let cfg = self.config.as_ref().ok_or(StoreError::Unconfigured)?;

        let pool = self
            .pool
            .read()
            .map_err(|_| StoreError::Poisoned)?
            .clone()
            .ok_or(StoreError::Disconnected)?;

        let mut guard = pool.checkout(cfg.acquire_timeout)?;
        let conn = guard.conn_mut()?;
        f(conn)
    }
}

struct Pool {
    idle: Mutex<Vec<Connection>>,
    available: Condvar,
}

impl Pool {
    fn open(cfg: &StoreConfig) -> Result<Self, StoreError> {
        let size = cfg.pool_size.max(1);
        let mut conns = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = Connection::open(&cfg.path)?;
            conn.busy_timeout(cfg.busy_timeout)?;
            conns.push(conn);
        }

        Ok(Self {
            idle: Mutex::new(conns),
            available: Condvar::new(),
        })
    }

    fn checkout(&self, timeout: Duration) -> Result<PooledConnection<'_>, StoreError> {
        let idle = self.idle.lock().map_err(|_| StoreError::Poisoned)?;

        let (mut idle, wait) = self
            .available
            .wait_timeout_while(idle, timeout, |idle| idle.is_empty())
            .map_err(|_| StoreError::Poisoned)?;

        match idle.pop() {
            Some(conn) => Ok(PooledConnection {
                pool: self,
                conn: Some(conn),
            }),
            None => {
                debug!(timed_out = wait.timed_out(), "no pooled connection available");
                Err(StoreError::Timeout(timeout))
            }
        }
    }

    fn checkin(&self, conn: Connection) {
        match self.idle.lock() {
            Ok(mut idle) => {
                idle.push(conn);
                self.available.notify_one();
            }
            Err(_) => warn!("dropping store connection: pool lock poisoned"),
        }
    }
}

/// Returns its connection to the pool on drop, including on panic unwind.
struct PooledConnection<'a> {
    pool: &'a Pool,
    conn: Option<Connection>,
}

impl PooledConnection<'_> {
    fn conn_mut(&mut self) -> Result<&mut Connection, StoreError> {
        self.conn.as_mut().ok_or(StoreError::Disconnected)
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.checkin(conn);
        }
    }
}

//! # Connection Pool
//!
//! Hands out one connection per operation and keeps a few idle ones around.
//!
//! - Idle connections older than `idle_timeout` are dropped, not reused.
//! - Every idle connection is `PING`ed before reuse; failures are discarded
//!   and the next candidate (or a fresh dial) is tried.
//! - After a transport failure the connection is discarded, never returned.
//!
//! Connections are opened lazily, on the first operation that needs one.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::{debug, warn};

use super::connection::{Connector, StoreConnection};
use super::error::StoreError;

pub const DEFAULT_MAX_IDLE: usize = 3;
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(240);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Idle connections kept for reuse.
    pub max_idle: usize,
    /// Connections allowed out at once. 0 = unlimited.
    pub max_active: usize,
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle: DEFAULT_MAX_IDLE,
            max_active: 0,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

struct IdleConnection {
    conn: Box<dyn StoreConnection>,
    returned_at: Instant,
}

#[derive(Default)]
struct PoolInner {
    /// Most recently returned last.
    idle: Vec<IdleConnection>,
    active: usize,
}

pub struct ConnectionPool {
    connector: Box<dyn Connector>,
    config: PoolConfig,
    inner: Mutex<PoolInner>,
}

impl ConnectionPool {
    pub fn new(connector: Box<dyn Connector>, config: PoolConfig) -> Self {
        Self {
            connector,
            config,
            inner: Mutex::new(PoolInner::default()),
        }
    }

    pub fn config(&self) -> PoolConfig {
        self.config
    }

    pub fn endpoint_label(&self) -> String {
        self.connector.endpoint_label()
    }

    pub fn idle_count(&self) -> usize {
        self.lock().map(|inner| inner.idle.len()).unwrap_or(0)
    }

    pub fn active_count(&self) -> usize {
        self.lock().map(|inner| inner.active).unwrap_or(0)
    }

    /// Run `op` on a borrowed connection, then return the connection to the pool.
    ///
    /// If `op` fails with an error that [breaks the connection](StoreError::breaks_connection),
    /// the connection is dropped instead of being returned.
    pub fn with_connection<T>(
        &self,
        op: impl FnOnce(&mut dyn StoreConnection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = self.acquire()?;
        let result = op(conn.as_mut());
        let reusable = !matches!(&result, Err(e) if e.breaks_connection());
        self.release(conn, reusable);
        result
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, PoolInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|e| StoreError::Connection(format!("pool lock poisoned: {e}")))
    }

    fn acquire(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        {
            let mut inner = self.lock()?;
            if self.config.max_active > 0 && inner.active >= self.config.max_active {
                return Err(StoreError::Connection(format!(
                    "pool exhausted ({} connections in use)",
                    inner.active
                )));
            }
            inner.active += 1;
        }

        match self.checkout() {
            Ok(conn) => Ok(conn),
            Err(e) => {
                if let Ok(mut inner) = self.lock() {
                    inner.active = inner.active.saturating_sub(1);
                }
                Err(e)
            }
        }
    }

    /// Reuse a live idle connection or dial a new one. The active slot is already reserved.
    fn checkout(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        loop {
            let candidate = {
                let mut inner = self.lock()?;
                self.prune_expired(&mut inner);
                inner.idle.pop()
            };

            let Some(mut idle) = candidate else {
                break;
            };

            // Probe outside the lock so other callers are not blocked on I/O.
            match idle.conn.ping() {
                Ok(()) => {
                    debug!("Reusing pooled connection to {}", self.endpoint_label());
                    return Ok(idle.conn);
                }
                Err(e) => {
                    warn!(
                        "Discarding pooled connection to {}: liveness probe failed: {}",
                        self.endpoint_label(),
                        e
                    );
                }
            }
        }

        debug!("Opening new connection to {}", self.endpoint_label());
        self.connector.connect().map_err(|e| {
            StoreError::Connection(format!("cannot reach {}: {}", self.endpoint_label(), e))
        })
    }

    fn prune_expired(&self, inner: &mut PoolInner) {
        let timeout = self.config.idle_timeout;
        let before = inner.idle.len();
        inner.idle.retain(|c| c.returned_at.elapsed() < timeout);
        let dropped = before - inner.idle.len();
        if dropped > 0 {
            debug!("Dropped {} idle connection(s) past {:?}", dropped, timeout);
        }
    }

    fn release(&self, conn: Box<dyn StoreConnection>, reusable: bool) {
        let Ok(mut inner) = self.lock() else {
            return;
        };
        inner.active = inner.active.saturating_sub(1);

        if !reusable {
            warn!(
                "Discarding connection to {} after transport failure",
                self.endpoint_label()
            );
            return;
        }
        if inner.idle.len() >= self.config.max_idle {
            return;
        }
        inner.idle.push(IdleConnection {
            conn,
            returned_at: Instant::now(),
        });
    }
}

//! # Browser
//!
//! The read-only inspection core: enumerate keys, resolve types, fetch and
//! normalize values. Every call borrows one pooled connection for its
//! duration and blocks the calling thread until the server answers.
//!
//! The keyspace may change under us between any two calls. A key that
//! vanishes or changes type after a scan is a normal outcome, not corruption.

use indexmap::IndexMap;
use log::{debug, info};

use super::connection::StoreConnection;
use super::error::StoreError;
use super::pool::ConnectionPool;
use super::types::{Inspection, KeySet, NormalizedValue, ValueType};

pub struct Browser {
    pool: ConnectionPool,
    /// `COUNT` hint sent with each scan round. `None` leaves it to the server.
    scan_count: Option<usize>,
}

impl Browser {
    pub fn new(pool: ConnectionPool, scan_count: Option<usize>) -> Self {
        Self { pool, scan_count }
    }

    pub fn endpoint_label(&self) -> String {
        self.pool.endpoint_label()
    }

    /// Reachability check, used once at startup.
    pub fn ping(&self) -> Result<(), StoreError> {
        self.pool.with_connection(|conn| {
            conn.ping()
                .map_err(|e| StoreError::Connection(e.to_string()))
        })
    }

    /// All keys matching `pattern`, collected across as many scan rounds as needed.
    ///
    /// Stops strictly when the server hands back cursor 0. Keys are kept in the
    /// order received and are not deduplicated: `SCAN` may report a key twice
    /// while the keyspace is being rehashed, and that is passed through as-is.
    /// If any round fails the whole scan fails; no partial set is returned.
    pub fn list_keys(&self, pattern: &str) -> Result<KeySet, StoreError> {
        let keys = self.pool.with_connection(|conn| {
            let mut keys = KeySet::new();
            let mut cursor = 0u64;
            let mut rounds = 0usize;
            loop {
                let (next, batch) = conn
                    .scan(cursor, pattern, self.scan_count)
                    .map_err(|source| StoreError::Scan {
                        pattern: pattern.to_string(),
                        source,
                    })?;
                rounds += 1;
                debug!(
                    "SCAN {} MATCH {}: {} key(s), next cursor {}",
                    cursor,
                    pattern,
                    batch.len(),
                    next
                );
                keys.extend(batch);
                if next == 0 {
                    break;
                }
                cursor = next;
            }
            debug!("Scan of '{}' finished after {} round(s)", pattern, rounds);
            Ok(keys)
        })?;

        info!("Pattern '{}' matched {} key(s)", pattern, keys.len());
        Ok(keys)
    }

    /// Declared type of `key`. A missing key is `Unsupported`, not an error.
    pub fn type_of(&self, key: &str) -> Result<ValueType, StoreError> {
        self.pool.with_connection(|conn| resolve_type(conn, key))
    }

    /// Read `key` with the command that matches `value_type`.
    ///
    /// `Unsupported` always fails with [`StoreError::UnsupportedType`].
    pub fn fetch(&self, key: &str, value_type: ValueType) -> Result<NormalizedValue, StoreError> {
        self.pool
            .with_connection(|conn| fetch_value(conn, key, value_type))
    }

    /// Resolve the type of `key`, then fetch it.
    pub fn value_of(&self, key: &str) -> Result<NormalizedValue, StoreError> {
        self.pool.with_connection(|conn| {
            let value_type = resolve_type(conn, key)?;
            fetch_value(conn, key, value_type)
        })
    }

    /// Type and value of `key`, for display.
    ///
    /// Unsupported types and keys that vanished mid-way come back as an
    /// [`Inspection`] without a value. Real failures are returned as errors.
    pub fn inspect(&self, key: &str) -> Result<Inspection, StoreError> {
        self.pool.with_connection(|conn| {
            let value_type = resolve_type(conn, key)?;
            match fetch_value(conn, key, value_type) {
                Ok(value) => Ok(Inspection {
                    key: key.to_string(),
                    value_type,
                    value: Some(value),
                }),
                Err(e) if e.is_unsupported() => {
                    debug!("Nothing to display for '{}': {}", key, e);
                    Ok(Inspection::unsupported(key))
                }
                Err(e) => Err(e),
            }
        })
    }
}

fn resolve_type(conn: &mut dyn StoreConnection, key: &str) -> Result<ValueType, StoreError> {
    let name = conn.key_type(key).map_err(|source| StoreError::Lookup {
        key: key.to_string(),
        source,
    })?;
    debug!("TYPE {} -> {}", key, name);
    Ok(ValueType::parse(&name))
}

fn fetch_value(
    conn: &mut dyn StoreConnection,
    key: &str,
    value_type: ValueType,
) -> Result<NormalizedValue, StoreError> {
    let fetch_err = |source| StoreError::Fetch {
        key: key.to_string(),
        source,
    };

    let value = match value_type {
        ValueType::String => match conn.get(key).map_err(fetch_err)? {
            Some(text) => NormalizedValue::Scalar(text),
            None => {
                return Err(StoreError::Missing {
                    key: key.to_string(),
                });
            }
        },
        ValueType::List => NormalizedValue::Sequence(conn.lrange_all(key).map_err(fetch_err)?),
        ValueType::Hash => {
            let fields: IndexMap<String, String> =
                conn.hgetall(key).map_err(fetch_err)?.into_iter().collect();
            NormalizedValue::Mapping(fields)
        }
        ValueType::Set => NormalizedValue::Sequence(conn.smembers(key).map_err(fetch_err)?),
        ValueType::Unsupported => {
            return Err(StoreError::UnsupportedType {
                key: key.to_string(),
            });
        }
    };

    debug!("Fetched '{}' as {} ({})", key, value_type, value.shape());
    Ok(value)
}

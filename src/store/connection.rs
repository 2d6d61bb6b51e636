//! # Wire Contract
//!
//! The handful of commands the browser needs, behind a trait so the pool
//! and the browser never touch the `redis` crate directly.
//!
//! ```text
//! Connector ──connect()──▶ Box<dyn StoreConnection>
//!                               │
//!      SCAN / TYPE / GET / LRANGE / HGETALL / SMEMBERS / PING
//! ```

use std::time::Duration;

use log::debug;

use super::error::CommandError;
use super::types::Endpoint;

/// One open connection to the server. Used by a single caller at a time.
pub trait StoreConnection: Send {
    /// One incremental scan round: returns the next cursor and a batch of keys.
    ///
    /// Keys are decoded lossily. A key that is not valid UTF-8 is listed with
    /// replacement characters, and that text names a different key, so
    /// `TYPE`/`GET` on it see a missing key.
    fn scan(
        &mut self,
        cursor: u64,
        pattern: &str,
        count: Option<usize>,
    ) -> Result<(u64, Vec<String>), CommandError>;

    /// Raw type name (`string`, `list`, `hash`, `set`, `none`, ...).
    fn key_type(&mut self, key: &str) -> Result<String, CommandError>;

    /// `None` when the key does not exist.
    fn get(&mut self, key: &str) -> Result<Option<String>, CommandError>;

    fn lrange_all(&mut self, key: &str) -> Result<Vec<String>, CommandError>;

    fn hgetall(&mut self, key: &str) -> Result<Vec<(String, String)>, CommandError>;

    fn smembers(&mut self, key: &str) -> Result<Vec<String>, CommandError>;

    /// Liveness probe.
    fn ping(&mut self) -> Result<(), CommandError>;
}

/// Opens connections to one endpoint.
pub trait Connector: Send + Sync {
    fn connect(&self) -> Result<Box<dyn StoreConnection>, CommandError>;

    /// Human-readable target, for logs and error messages.
    fn endpoint_label(&self) -> String;
}

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection timeouts applied by [`RedisConnector`].
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub connect: Duration,
    pub command: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: DEFAULT_CONNECT_TIMEOUT,
            command: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

pub struct RedisConnector {
    endpoint: Endpoint,
    client: redis::Client,
    timeouts: Timeouts,
}

impl RedisConnector {
    /// Builds the client. Does not open a socket.
    pub fn new(endpoint: Endpoint, timeouts: Timeouts) -> Result<Self, CommandError> {
        let client = redis::Client::open(endpoint.redis_url().as_str())?;
        Ok(Self {
            endpoint,
            client,
            timeouts,
        })
    }
}

impl Connector for RedisConnector {
    fn connect(&self) -> Result<Box<dyn StoreConnection>, CommandError> {
        debug!("Dialing {}", self.endpoint);
        let conn = self
            .client
            .get_connection_with_timeout(self.timeouts.connect)?;
        conn.set_read_timeout(Some(self.timeouts.command))?;
        conn.set_write_timeout(Some(self.timeouts.command))?;
        Ok(Box::new(RedisConnection { conn }))
    }

    fn endpoint_label(&self) -> String {
        self.endpoint.to_string()
    }
}

struct RedisConnection {
    conn: redis::Connection,
}

/// Lossy decode: invalid UTF-8 becomes U+FFFD, so the text is for display
/// only and cannot be sent back as a key.
fn lossy(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

fn lossy_all(items: Vec<Vec<u8>>) -> Vec<String> {
    items.into_iter().map(lossy).collect()
}

impl StoreConnection for RedisConnection {
    fn scan(
        &mut self,
        cursor: u64,
        pattern: &str,
        count: Option<usize>,
    ) -> Result<(u64, Vec<String>), CommandError> {
        let mut command = redis::cmd("SCAN");
        command.arg(cursor).arg("MATCH").arg(pattern);
        if let Some(count) = count {
            command.arg("COUNT").arg(count);
        }

        let (next, keys): (u64, Vec<Vec<u8>>) = command.query(&mut self.conn)?;
        Ok((next, lossy_all(keys)))
    }

    fn key_type(&mut self, key: &str) -> Result<String, CommandError> {
        Ok(redis::cmd("TYPE").arg(key).query::<String>(&mut self.conn)?)
    }

    fn get(&mut self, key: &str) -> Result<Option<String>, CommandError> {
        let value: Option<Vec<u8>> = redis::cmd("GET").arg(key).query(&mut self.conn)?;
        Ok(value.map(lossy))
    }

    fn lrange_all(&mut self, key: &str) -> Result<Vec<String>, CommandError> {
        let items: Vec<Vec<u8>> = redis::cmd("LRANGE")
            .arg(key)
            .arg(0)
            .arg(-1)
            .query(&mut self.conn)?;
        Ok(lossy_all(items))
    }

    fn hgetall(&mut self, key: &str) -> Result<Vec<(String, String)>, CommandError> {
        let flat: Vec<Vec<u8>> = redis::cmd("HGETALL").arg(key).query(&mut self.conn)?;
        let mut pairs = Vec::with_capacity(flat.len() / 2);
        let mut iter = flat.into_iter();
        while let (Some(field), Some(value)) = (iter.next(), iter.next()) {
            pairs.push((lossy(field), lossy(value)));
        }
        Ok(pairs)
    }

    fn smembers(&mut self, key: &str) -> Result<Vec<String>, CommandError> {
        let members: Vec<Vec<u8>> = redis::cmd("SMEMBERS").arg(key).query(&mut self.conn)?;
        Ok(lossy_all(members))
    }

    fn ping(&mut self) -> Result<(), CommandError> {
        redis::cmd("PING").query::<String>(&mut self.conn)?;
        Ok(())
    }
}

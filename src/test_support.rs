//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ratatui::buffer::Buffer;

use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::store::{
    Browser, CommandError, ConnectionPool, Connector, PoolConfig, StoreConnection,
};

#[derive(Debug, Clone)]
enum Stored {
    String(String),
    List(Vec<String>),
    Hash(Vec<(String, String)>),
    Set(Vec<String>),
    SortedSet(Vec<String>),
}

impl Stored {
    fn type_name(&self) -> &'static str {
        match self {
            Stored::String(_) => "string",
            Stored::List(_) => "list",
            Stored::Hash(_) => "hash",
            Stored::Set(_) => "set",
            Stored::SortedSet(_) => "zset",
        }
    }
}

struct MemoryState {
    data: Mutex<BTreeMap<String, Stored>>,
    page_size: AtomicUsize,
    reachable: AtomicBool,
    connects: AtomicUsize,
    scan_calls: AtomicUsize,
    failing_pings: AtomicUsize,
    /// (commands still allowed to succeed, error to raise after that)
    scheduled_failure: Mutex<Option<(usize, CommandError)>>,
}

/// In-memory stand-in for a key-value server, with fault injection.
///
/// Scans walk the sorted keyspace `page_size` keys per round and apply
/// `MATCH` after picking the window, like the real server, so a round can
/// come back empty while the cursor is still non-zero.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(MemoryState {
                data: Mutex::new(BTreeMap::new()),
                page_size: AtomicUsize::new(10),
                reachable: AtomicBool::new(true),
                connects: AtomicUsize::new(0),
                scan_calls: AtomicUsize::new(0),
                failing_pings: AtomicUsize::new(0),
                scheduled_failure: Mutex::new(None),
            }),
        }
    }

    fn insert(&self, key: &str, value: Stored) {
        self.state.data.lock().unwrap().insert(key.to_string(), value);
    }

    pub fn set_string(&self, key: &str, value: &str) {
        self.insert(key, Stored::String(value.to_string()));
    }

    pub fn push_list(&self, key: &str, items: &[&str]) {
        self.insert(key, Stored::List(items.iter().map(|s| s.to_string()).collect()));
    }

    pub fn set_hash(&self, key: &str, fields: &[(&str, &str)]) {
        self.insert(
            key,
            Stored::Hash(
                fields
                    .iter()
                    .map(|(f, v)| (f.to_string(), v.to_string()))
                    .collect(),
            ),
        );
    }

    pub fn add_set(&self, key: &str, members: &[&str]) {
        self.insert(key, Stored::Set(members.iter().map(|s| s.to_string()).collect()));
    }

    pub fn add_sorted_set(&self, key: &str, members: &[&str]) {
        self.insert(
            key,
            Stored::SortedSet(members.iter().map(|s| s.to_string()).collect()),
        );
    }

    pub fn remove(&self, key: &str) {
        self.state.data.lock().unwrap().remove(key);
    }

    pub fn set_page_size(&self, size: usize) {
        self.state.page_size.store(size.max(1), Ordering::SeqCst);
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.state.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn fail_next_pings(&self, count: usize) {
        self.state.failing_pings.store(count, Ordering::SeqCst);
    }

    /// Let `succeeding` commands (pings excluded) through, then fail the next one with `error`.
    pub fn fail_command_after(&self, succeeding: usize, error: CommandError) {
        *self.state.scheduled_failure.lock().unwrap() = Some((succeeding, error));
    }

    pub fn connects(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub fn scan_calls(&self) -> usize {
        self.state.scan_calls.load(Ordering::SeqCst)
    }

    pub fn connector(&self) -> MemoryConnector {
        MemoryConnector {
            state: Arc::clone(&self.state),
        }
    }
}

pub struct MemoryConnector {
    state: Arc<MemoryState>,
}

impl Connector for MemoryConnector {
    fn connect(&self) -> Result<Box<dyn StoreConnection>, CommandError> {
        if !self.state.reachable.load(Ordering::SeqCst) {
            return Err(CommandError::transport("connection refused"));
        }
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryConnection {
            state: Arc::clone(&self.state),
        }))
    }

    fn endpoint_label(&self) -> String {
        "memory".to_string()
    }
}

struct MemoryConnection {
    state: Arc<MemoryState>,
}

impl MemoryConnection {
    fn check_scheduled_failure(&self) -> Result<(), CommandError> {
        let mut scheduled = self.state.scheduled_failure.lock().unwrap();
        let fire = match scheduled.as_mut() {
            Some((0, _)) => true,
            Some((remaining, _)) => {
                *remaining -= 1;
                false
            }
            None => false,
        };
        match scheduled.take() {
            Some((_, error)) if fire => Err(error),
            other => {
                *scheduled = other;
                Ok(())
            }
        }
    }

    fn lookup(&self, key: &str) -> Option<Stored> {
        self.state.data.lock().unwrap().get(key).cloned()
    }
}

fn wrong_type() -> CommandError {
    CommandError::response(
        "WRONGTYPE Operation against a key holding the wrong kind of value",
    )
}

impl StoreConnection for MemoryConnection {
    fn scan(
        &mut self,
        cursor: u64,
        pattern: &str,
        _count: Option<usize>,
    ) -> Result<(u64, Vec<String>), CommandError> {
        self.check_scheduled_failure()?;
        self.state.scan_calls.fetch_add(1, Ordering::SeqCst);

        let data = self.state.data.lock().unwrap();
        let page = self.state.page_size.load(Ordering::SeqCst);
        let start = cursor as usize;
        let end = (start + page).min(data.len());
        let batch = data
            .keys()
            .skip(start)
            .take(end.saturating_sub(start))
            .filter(|k| glob_match(pattern, k))
            .cloned()
            .collect();
        let next = if end >= data.len() { 0 } else { end as u64 };
        Ok((next, batch))
    }

    fn key_type(&mut self, key: &str) -> Result<String, CommandError> {
        self.check_scheduled_failure()?;
        Ok(self
            .lookup(key)
            .map(|v| v.type_name())
            .unwrap_or("none")
            .to_string())
    }

    fn get(&mut self, key: &str) -> Result<Option<String>, CommandError> {
        self.check_scheduled_failure()?;
        match self.lookup(key) {
            Some(Stored::String(s)) => Ok(Some(s)),
            Some(_) => Err(wrong_type()),
            None => Ok(None),
        }
    }

    fn lrange_all(&mut self, key: &str) -> Result<Vec<String>, CommandError> {
        self.check_scheduled_failure()?;
        match self.lookup(key) {
            Some(Stored::List(items)) => Ok(items),
            Some(_) => Err(wrong_type()),
            None => Ok(Vec::new()),
        }
    }

    fn hgetall(&mut self, key: &str) -> Result<Vec<(String, String)>, CommandError> {
        self.check_scheduled_failure()?;
        match self.lookup(key) {
            Some(Stored::Hash(fields)) => Ok(fields),
            Some(_) => Err(wrong_type()),
            None => Ok(Vec::new()),
        }
    }

    fn smembers(&mut self, key: &str) -> Result<Vec<String>, CommandError> {
        self.check_scheduled_failure()?;
        match self.lookup(key) {
            Some(Stored::Set(members)) => Ok(members),
            Some(_) => Err(wrong_type()),
            None => Ok(Vec::new()),
        }
    }

    fn ping(&mut self) -> Result<(), CommandError> {
        let failing = &self.state.failing_pings;
        if failing
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(CommandError::transport("broken pipe"));
        }
        Ok(())
    }
}

/// Glob subset used by `MATCH`: `*`, `?` and literal characters.
fn glob_match(pattern: &str, text: &str) -> bool {
    fn go(p: &[char], t: &[char]) -> bool {
        match p.split_first() {
            None => t.is_empty(),
            Some(('*', rest)) => (0..=t.len()).any(|i| go(rest, &t[i..])),
            Some(('?', rest)) => !t.is_empty() && go(rest, &t[1..]),
            Some((c, rest)) => t.first() == Some(c) && go(rest, &t[1..]),
        }
    }
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    go(&p, &t)
}

/// A browser over `store` with default pool settings.
pub fn test_browser(store: &MemoryStore) -> Browser {
    Browser::new(
        ConnectionPool::new(Box::new(store.connector()), PoolConfig::default()),
        None,
    )
}

/// Creates a test App over an empty in-memory store.
pub fn test_app() -> App {
    test_app_with(&MemoryStore::new())
}

pub fn test_app_with(store: &MemoryStore) -> App {
    App::new(Arc::new(test_browser(store)), &ResolvedConfig::default())
}

/// All cells of a rendered buffer, concatenated row after row.
pub fn buffer_text(buffer: &Buffer) -> String {
    buffer.content().iter().map(|c| c.symbol()).collect()
}

/// One string per rendered row, right-trimmed.
pub fn buffer_lines(buffer: &Buffer) -> Vec<String> {
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width.max(1))
        .map(|row| {
            row.iter()
                .map(|c| c.symbol())
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*", "anything"));
        assert!(glob_match("user:*", "user:42"));
        assert!(!glob_match("user:*", "session:1"));
        assert!(glob_match("k?", "k1"));
        assert!(!glob_match("k?", "k12"));
        assert!(glob_match("*:id", "user:id"));
    }

    #[test]
    fn test_scan_window_applies_match_after_paging() {
        let store = MemoryStore::new();
        store.set_string("a", "1");
        store.set_string("b", "2");
        store.set_string("c", "3");
        store.set_page_size(2);
        let mut conn = store.connector().connect().unwrap();

        let (next, batch) = conn.scan(0, "c", None).unwrap();
        assert_eq!(next, 2);
        assert!(batch.is_empty());

        let (next, batch) = conn.scan(next, "c", None).unwrap();
        assert_eq!(next, 0);
        assert_eq!(batch, vec!["c".to_string()]);
    }
}

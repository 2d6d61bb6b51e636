use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use redview::store::{
    Browser, CommandError, ConnectionPool, Connector, Endpoint, NormalizedValue, PoolConfig,
    RedisConnector, StoreConnection, StoreError, Timeouts, ValueType, render_edit_text,
    render_for_display, render_inline,
};

// ============================================================================
// Scripted connection
// ============================================================================

#[derive(Clone)]
enum Entry {
    String(Option<String>),
    List(Vec<String>),
    Hash(Vec<(String, String)>),
    Set(Vec<String>),
    Other(&'static str),
}

#[derive(Default)]
struct Script {
    /// cursor -> (next cursor, batch)
    pages: HashMap<u64, (u64, Vec<String>)>,
    /// cursor whose SCAN fails with a transport error
    broken_cursor: Option<u64>,
    entries: HashMap<String, Entry>,
    /// (cursor, pattern, count) for every SCAN sent
    scans: Vec<(u64, String, Option<usize>)>,
    connects: usize,
}

#[derive(Clone, Default)]
struct ScriptedServer(Arc<Mutex<Script>>);

impl ScriptedServer {
    fn page(&self, cursor: u64, next: u64, keys: &[&str]) {
        self.0.lock().unwrap().pages.insert(
            cursor,
            (next, keys.iter().map(|k| k.to_string()).collect()),
        );
    }

    fn entry(&self, key: &str, entry: Entry) {
        self.0
            .lock()
            .unwrap()
            .entries
            .insert(key.to_string(), entry);
    }

    fn browser(&self, scan_count: Option<usize>) -> Browser {
        let pool = ConnectionPool::new(Box::new(self.clone()), PoolConfig::default());
        Browser::new(pool, scan_count)
    }
}

impl Connector for ScriptedServer {
    fn connect(&self) -> Result<Box<dyn StoreConnection>, CommandError> {
        self.0.lock().unwrap().connects += 1;
        Ok(Box::new(ScriptedConnection(self.clone())))
    }

    fn endpoint_label(&self) -> String {
        "scripted".to_string()
    }
}

struct ScriptedConnection(ScriptedServer);

impl ScriptedConnection {
    fn lookup(&self, key: &str) -> Option<Entry> {
        (self.0).0.lock().unwrap().entries.get(key).cloned()
    }
}

impl StoreConnection for ScriptedConnection {
    fn scan(
        &mut self,
        cursor: u64,
        pattern: &str,
        count: Option<usize>,
    ) -> Result<(u64, Vec<String>), CommandError> {
        let mut script = (self.0).0.lock().unwrap();
        script.scans.push((cursor, pattern.to_string(), count));
        if script.broken_cursor == Some(cursor) {
            return Err(CommandError::transport("connection reset by peer"));
        }
        Ok(script.pages.get(&cursor).cloned().unwrap_or((0, Vec::new())))
    }

    fn key_type(&mut self, key: &str) -> Result<String, CommandError> {
        let name = match self.lookup(key) {
            None => "none",
            Some(Entry::String(_)) => "string",
            Some(Entry::List(_)) => "list",
            Some(Entry::Hash(_)) => "hash",
            Some(Entry::Set(_)) => "set",
            Some(Entry::Other(name)) => name,
        };
        Ok(name.to_string())
    }

    fn get(&mut self, key: &str) -> Result<Option<String>, CommandError> {
        match self.lookup(key) {
            Some(Entry::String(value)) => Ok(value),
            _ => Ok(None),
        }
    }

    fn lrange_all(&mut self, key: &str) -> Result<Vec<String>, CommandError> {
        match self.lookup(key) {
            Some(Entry::List(items)) => Ok(items),
            _ => Ok(Vec::new()),
        }
    }

    fn hgetall(&mut self, key: &str) -> Result<Vec<(String, String)>, CommandError> {
        match self.lookup(key) {
            Some(Entry::Hash(fields)) => Ok(fields),
            _ => Ok(Vec::new()),
        }
    }

    fn smembers(&mut self, key: &str) -> Result<Vec<String>, CommandError> {
        match self.lookup(key) {
            Some(Entry::Set(members)) => Ok(members),
            _ => Ok(Vec::new()),
        }
    }

    fn ping(&mut self) -> Result<(), CommandError> {
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Key enumeration
// ============================================================================

#[test]
fn test_scan_follows_cursor_until_zero() {
    let server = ScriptedServer::default();
    server.page(0, 5, &["a", "b"]);
    server.page(5, 9, &[]);
    server.page(9, 0, &["c", "a"]);
    let browser = server.browser(Some(100));

    let keys = browser.list_keys("*").unwrap();

    // Duplicates reported by the server are passed through
    assert_eq!(keys, strings(&["a", "b", "c", "a"]));
    let script = server.0.lock().unwrap();
    assert_eq!(
        script.scans,
        vec![
            (0, "*".to_string(), Some(100)),
            (5, "*".to_string(), Some(100)),
            (9, "*".to_string(), Some(100)),
        ]
    );
    assert_eq!(script.connects, 1, "one connection for the whole scan");
}

#[test]
fn test_scan_failure_returns_no_partial_keys() {
    let server = ScriptedServer::default();
    server.page(0, 7, &["a", "b"]);
    server.0.lock().unwrap().broken_cursor = Some(7);
    let browser = server.browser(None);

    let err = browser.list_keys("a*").unwrap_err();
    assert!(matches!(err, StoreError::Scan { ref pattern, .. } if pattern == "a*"));
    assert!(err.breaks_connection());

    // The broken connection was discarded, so the retry dials again
    server.0.lock().unwrap().broken_cursor = None;
    server.page(7, 0, &[]);
    assert_eq!(browser.list_keys("a*").unwrap(), strings(&["a", "b"]));
    assert_eq!(server.0.lock().unwrap().connects, 2);
}

// ============================================================================
// Values
// ============================================================================

#[test]
fn test_string_and_list_keys_end_to_end() {
    let server = ScriptedServer::default();
    server.page(0, 0, &["k1", "k2"]);
    server.entry("k1", Entry::String(Some("v1".to_string())));
    server.entry("k2", Entry::List(strings(&["x", "y"])));
    let browser = server.browser(None);

    assert_eq!(browser.list_keys("*").unwrap(), strings(&["k1", "k2"]));

    let k1 = browser.inspect("k1").unwrap();
    assert_eq!(k1.value_type, ValueType::String);
    let v1 = k1.value.unwrap();
    assert_eq!(render_for_display(&v1), "\"v1\"");
    assert_eq!(render_inline(&v1), "\"v1\"");

    let k2 = browser.inspect("k2").unwrap();
    assert_eq!(k2.value_type, ValueType::List);
    let v2 = k2.value.unwrap();
    assert_eq!(render_for_display(&v2), "[\n  \"x\",\n  \"y\"\n]");
    assert_eq!(render_inline(&v2), r#"["x","y"]"#);
}

#[test]
fn test_hash_keeps_field_order_and_edits() {
    let server = ScriptedServer::default();
    server.entry(
        "user:1",
        Entry::Hash(vec![
            ("name".to_string(), "ada".to_string()),
            ("age".to_string(), "36".to_string()),
        ]),
    );
    let browser = server.browser(None);

    let value = browser.value_of("user:1").unwrap();
    assert_eq!(
        render_for_display(&value),
        "{\n  \"name\": \"ada\",\n  \"age\": \"36\"\n}"
    );
    assert_eq!(render_edit_text(&value).unwrap(), "name: ada\nage: 36");
}

#[test]
fn test_set_members_are_a_sequence() {
    let server = ScriptedServer::default();
    server.entry("tags", Entry::Set(strings(&["red", "blue"])));
    let browser = server.browser(None);

    assert_eq!(browser.type_of("tags").unwrap(), ValueType::Set);
    let value = browser.fetch("tags", ValueType::Set).unwrap();
    assert_eq!(value, NormalizedValue::Sequence(strings(&["red", "blue"])));
    assert!(matches!(
        render_edit_text(&value),
        Err(StoreError::UnsupportedEdit { .. })
    ));
}

#[test]
fn test_unsupported_type_is_explicit() {
    let server = ScriptedServer::default();
    server.entry("ranking", Entry::Other("zset"));
    let browser = server.browser(None);

    assert_eq!(browser.type_of("ranking").unwrap(), ValueType::Unsupported);
    assert!(matches!(
        browser.fetch("ranking", ValueType::Unsupported),
        Err(StoreError::UnsupportedType { .. })
    ));

    // The display path turns it into an empty inspection instead
    let inspection = browser.inspect("ranking").unwrap();
    assert_eq!(inspection.value, None);
}

#[test]
fn test_vanished_string_is_missing() {
    let server = ScriptedServer::default();
    server.entry("gone", Entry::String(None));
    let browser = server.browser(None);

    assert!(matches!(
        browser.fetch("gone", ValueType::String),
        Err(StoreError::Missing { ref key }) if key == "gone"
    ));
    assert_eq!(browser.inspect("gone").unwrap().value, None);
}

// ============================================================================
// Live server
// ============================================================================

/// Address of a disposable server, from `REDVIEW_TEST_ADDR` (default localhost).
fn live_endpoint() -> Endpoint {
    std::env::var("REDVIEW_TEST_ADDR")
        .ok()
        .and_then(|addr| addr.parse().ok())
        .unwrap_or_default()
}

#[test]
#[ignore = "requires a running redis-server"]
fn test_live_server_round_trip() {
    let endpoint = live_endpoint();
    let client = redis::Client::open(endpoint.redis_url().as_str()).unwrap();
    let mut con = client.get_connection().unwrap();
    let prefix = format!("redview-test:{}:", std::process::id());
    let key = |name: &str| format!("{prefix}{name}");

    redis::cmd("SET").arg(key("s")).arg("v1").query::<()>(&mut con).unwrap();
    redis::cmd("RPUSH").arg(key("l")).arg("x").arg("y").query::<()>(&mut con).unwrap();
    redis::cmd("HSET").arg(key("h")).arg("f").arg("1").query::<()>(&mut con).unwrap();
    redis::cmd("ZADD").arg(key("z")).arg(1).arg("m").query::<()>(&mut con).unwrap();

    let connector = RedisConnector::new(endpoint, Timeouts::default()).unwrap();
    let browser = Browser::new(
        ConnectionPool::new(Box::new(connector), PoolConfig::default()),
        Some(10),
    );
    browser.ping().unwrap();

    let mut keys = browser.list_keys(&format!("{prefix}*")).unwrap();
    keys.sort();
    assert_eq!(keys, vec![key("h"), key("l"), key("s"), key("z")]);

    assert_eq!(
        browser.value_of(&key("s")).unwrap(),
        NormalizedValue::Scalar("v1".to_string())
    );
    assert_eq!(
        browser.value_of(&key("l")).unwrap(),
        NormalizedValue::Sequence(strings(&["x", "y"]))
    );
    assert_eq!(browser.type_of(&key("h")).unwrap(), ValueType::Hash);
    assert_eq!(browser.inspect(&key("z")).unwrap().value, None);

    for name in ["s", "l", "h", "z"] {
        redis::cmd("DEL").arg(key(name)).query::<()>(&mut con).unwrap();
    }
}

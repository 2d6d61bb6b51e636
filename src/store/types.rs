use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

/// Host used when no address is configured.
pub const DEFAULT_HOST: &str = "localhost";
/// Port used when an address names only a host.
pub const DEFAULT_PORT: u16 = 6379;

/// Address of the key-value server. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Connection URL understood by the `redis` client.
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEndpointError(String);

impl fmt::Display for ParseEndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid endpoint: {}", self.0)
    }
}

impl std::error::Error for ParseEndpointError {}

impl FromStr for Endpoint {
    type Err = ParseEndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (host, port) = match s.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| ParseEndpointError(format!("bad port in '{s}'")))?;
                (host, port)
            }
            None => (s, DEFAULT_PORT),
        };

        if host.is_empty() {
            return Err(ParseEndpointError(format!("missing host in '{s}'")));
        }

        Ok(Endpoint::new(host, port))
    }
}

/// Declared type of a key, as reported by `TYPE`.
///
/// Closed on purpose: anything the browser cannot display (sorted sets,
/// streams, module types, or `none` for a missing key) is `Unsupported`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    List,
    Hash,
    Set,
    Unsupported,
}

impl ValueType {
    pub fn parse(type_name: &str) -> ValueType {
        match type_name.trim().to_ascii_lowercase().as_str() {
            "string" => ValueType::String,
            "list" => ValueType::List,
            "hash" => ValueType::Hash,
            "set" => ValueType::Set,
            _ => ValueType::Unsupported,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::List => "list",
            ValueType::Hash => "hash",
            ValueType::Set => "set",
            ValueType::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Keys collected by one full scan, in the order the server produced them.
pub type KeySet = Vec<String>;

/// A fetched value, reduced to one of three shapes.
///
/// The shape is fixed by the key's [`ValueType`]: strings are `Scalar`,
/// lists and sets are `Sequence`, hashes are `Mapping`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedValue {
    Scalar(String),
    Sequence(Vec<String>),
    /// Field order is whatever the server returned.
    Mapping(IndexMap<String, String>),
}

impl NormalizedValue {
    pub fn shape(&self) -> &'static str {
        match self {
            NormalizedValue::Scalar(_) => "scalar",
            NormalizedValue::Sequence(_) => "sequence",
            NormalizedValue::Mapping(_) => "mapping",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            NormalizedValue::Scalar(text) => Value::String(text.clone()),
            NormalizedValue::Sequence(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            NormalizedValue::Mapping(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
        }
    }
}

/// What the UI shows for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub key: String,
    pub value_type: ValueType,
    /// `None` exactly when `value_type` is `Unsupported`.
    pub value: Option<NormalizedValue>,
}

impl Inspection {
    pub fn unsupported(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value_type: ValueType::Unsupported,
            value: None,
        }
    }
}

/// One labelled line of the editable form of a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditField {
    pub label: String,
    pub text: String,
}

impl EditField {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

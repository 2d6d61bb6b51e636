use std::fmt;

/// Failure of a single command on a single connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    pub kind: CommandErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandErrorKind {
    /// I/O failure, timeout or dropped connection. The connection is unusable afterwards.
    Transport,
    /// The server answered with an error reply (e.g. `WRONGTYPE`). The connection is fine.
    Response,
}

impl CommandError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: CommandErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn response(message: impl Into<String>) -> Self {
        Self {
            kind: CommandErrorKind::Response,
            message: message.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind == CommandErrorKind::Transport
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CommandErrorKind::Transport => write!(f, "transport error: {}", self.message),
            CommandErrorKind::Response => write!(f, "server error: {}", self.message),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<redis::RedisError> for CommandError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_io_error() || e.is_timeout() || e.is_connection_dropped() {
            CommandError::transport(e.to_string())
        } else {
            CommandError::response(e.to_string())
        }
    }
}

/// Errors surfaced to callers of the browser.
///
/// Nothing is retried internally; every variant goes back to the caller,
/// which decides whether to retry, ignore, or display it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Server unreachable or pool exhausted. Fatal to the in-flight operation only.
    Connection(String),
    /// A scan round failed. No partial key set is returned.
    Scan { pattern: String, source: CommandError },
    /// `TYPE` failed. The key should be treated as transiently unavailable.
    Lookup { key: String, source: CommandError },
    /// Reading the value failed.
    Fetch { key: String, source: CommandError },
    /// The key disappeared between the type lookup and the read.
    Missing { key: String },
    /// The key's type is outside the supported set.
    UnsupportedType { key: String },
    /// The value's shape has no editable form.
    UnsupportedEdit { shape: &'static str },
}

impl StoreError {
    /// Whether the connection that produced this error must be thrown away.
    pub fn breaks_connection(&self) -> bool {
        match self {
            StoreError::Scan { source, .. }
            | StoreError::Lookup { source, .. }
            | StoreError::Fetch { source, .. } => source.is_transport(),
            StoreError::Connection(_) => true,
            _ => false,
        }
    }

    /// Whether the UI should show a "not supported" indicator instead of an error.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            StoreError::Missing { .. } | StoreError::UnsupportedType { .. }
        )
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Connection(msg) => write!(f, "connection error: {msg}"),
            StoreError::Scan { pattern, source } => {
                write!(f, "error retrieving '{pattern}' keys: {source}")
            }
            StoreError::Lookup { key, source } => {
                write!(f, "type lookup for '{key}' failed: {source}")
            }
            StoreError::Fetch { key, source } => write!(f, "reading '{key}' failed: {source}"),
            StoreError::Missing { key } => write!(f, "key '{key}' no longer exists"),
            StoreError::UnsupportedType { key } => {
                write!(f, "key '{key}' has a type that is not supported")
            }
            StoreError::UnsupportedEdit { shape } => {
                write!(f, "no editable form for a {shape} value")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Scan { source, .. }
            | StoreError::Lookup { source, .. }
            | StoreError::Fetch { source, .. } => Some(source),
            _ => None,
        }
    }
}

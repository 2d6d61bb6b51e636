pub mod browser;
pub mod connection;
pub mod error;
pub mod pool;
pub mod render;
pub mod types;

pub use browser::Browser;
pub use connection::{Connector, RedisConnector, StoreConnection, Timeouts};
pub use error::{CommandError, CommandErrorKind, StoreError};
pub use pool::{ConnectionPool, PoolConfig};
pub use render::{render_edit_text, render_for_display, render_for_edit, render_inline};
pub use types::{EditField, Endpoint, Inspection, KeySet, NormalizedValue, ValueType};

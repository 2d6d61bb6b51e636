use clap::Parser;
use log::{error, info};
use redview::core::config;
use redview::store::{Browser, ConnectionPool, RedisConnector};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::io;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "redview", about = "Terminal browser for a Redis keyspace")]
struct Args {
    /// Server address as host:port (overrides REDVIEW_ADDR and the config file)
    #[arg(short, long)]
    addr: Option<String>,

    /// Key pattern for the first scan, e.g. "user:*"
    #[arg(short, long)]
    pattern: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to redview.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Ok(log_file) = File::create("redview.log") {
        let _ = WriteLogger::init(level, log_config, log_file);
    }

    let file_config = config::load_config().map_err(io::Error::other)?;
    let resolved = config::resolve(&file_config, args.addr.as_deref(), args.pattern.as_deref())
        .map_err(io::Error::other)?;

    info!(
        "Redview starting up against {} with pattern '{}'",
        resolved.endpoint, resolved.pattern
    );

    let connector =
        RedisConnector::new(resolved.endpoint.clone(), resolved.timeouts).map_err(io::Error::other)?;
    let pool = ConnectionPool::new(Box::new(connector), resolved.pool);
    let browser = Browser::new(pool, resolved.scan_count);

    // An unreachable server is fatal before the terminal is taken over.
    if let Err(e) = browser.ping() {
        error!("Startup ping failed: {}", e);
        return Err(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            format!("cannot reach {}: {}", resolved.endpoint, e),
        ));
    }

    redview::tui::run(Arc::new(browser), resolved)
}

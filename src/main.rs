use slog::o;
use slog::Drain;
use sqlx::postgres::PgPoolOptions;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use std::{env, fs};

/// Build a `Error::Server` from a format string
#[macro_export]
macro_rules! se {
    ($($arg:tt)*) => {{
        $crate::error::Error::Server(format!($($arg)*))
    }};
}

/// Build a json `tide::Response` using the `{"status": "success", ...}` envelope
#[macro_export]
macro_rules! resp {
    (status => $status:expr, message => $msg:expr, data => $data:expr) => {{
        tide::Response::builder($status)
            .body(serde_json::json!({
                "status": "success",
                "message": $msg,
                "data": $data,
            }))
            .build()
    }};
    (status => $status:expr, message => $msg:expr) => {{
        tide::Response::builder($status)
            .body(serde_json::json!({
                "status": "success",
                "message": $msg,
            }))
            .build()
    }};
    (status => $status:expr, data => $data:expr) => {{
        tide::Response::builder($status)
            .body(serde_json::json!({
                "status": "success",
                "data": $data,
            }))
            .build()
    }};
    (message => $msg:expr) => {
        $crate::resp!(status => 200, message => $msg)
    };
    (data => $data:expr) => {
        $crate::resp!(status => 200, data => $data)
    };
}

mod api;
mod cache;
mod crypto;
mod db;
mod error;
mod logging;
mod models;
mod producer;
mod services;
mod storage;
mod tokens;
mod utils;
mod payloads;

pub use error::{Error, Result};

fn env_or(k: &str, default: &str) -> String {
    env::var(k).unwrap_or_else(|_| default.to_string())
}

lazy_static::lazy_static! {
    pub static ref CONFIG: Config = Config::load();

    // The "base" logger that all modules should branch off of
    pub static ref BASE_LOG: slog::Logger = {
        let level: slog::Level = CONFIG.log_level
                .parse()
                .expect("invalid log_level");
        if CONFIG.log_format == "pretty" {
            let decorator = slog_term::TermDecorator::new().build();
            let drain = slog_term::CompactFormat::new(decorator).build().fuse();
            let drain = slog_async::Async::new(drain).build().fuse();
            let drain = slog::LevelFilter::new(drain, level).fuse();
            slog::Logger::root(drain, o!())
        } else {
            let drain = slog_json::Json::default(std::io::stderr()).fuse();
            let drain = slog_async::Async::new(drain).build().fuse();
            let drain = slog::LevelFilter::new(drain, level).fuse();
            slog::Logger::root(drain, o!())
        }
    };

    // Base logger
    pub static ref LOG: slog::Logger = BASE_LOG.new(slog::o!("app" => "musicat"));
}

pub struct Config {
    pub version: String,
    pub ssl: bool,
    pub host: String,
    pub port: u16,
    // externally visible base url, used when handing out
    // links to uploaded files. Defaults to `host()`.
    pub public_url: Option<String>,
    pub log_format: String,
    pub log_level: String,
    pub db_url: String,
    pub db_max_connections: u32,
    pub access_token_key: String,
    pub refresh_token_key: String,
    // seconds
    pub access_token_age: u64,
    pub cache_ttl_seconds: u64,
    pub upload_dir: String,
}
impl Config {
    pub fn load() -> Self {
        let version = fs::File::open("commit_hash.txt")
            .map(|mut f| {
                let mut s = String::new();
                f.read_to_string(&mut s).expect("Error reading commit_hash");
                s.trim().to_string()
            })
            .unwrap_or_else(|_| "unknown".to_string());
        Self {
            version,
            ssl: env_or("SSL", "false") == "true",
            host: env_or("HOST", "localhost"),
            port: env_or("PORT", "5000").parse().expect("invalid port"),
            public_url: env::var("PUBLIC_URL").ok(),
            log_format: env_or("LOG_FORMAT", "json")
                .to_lowercase()
                .trim()
                .to_string(),
            log_level: env_or("LOG_LEVEL", "INFO"),
            db_url: env_or("DATABASE_URL", "error"),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", "5")
                .parse()
                .expect("invalid db_max_connections"),
            access_token_key: env_or("ACCESS_TOKEN_KEY", "dev-access-token-key-0123456789abcdef"),
            refresh_token_key: env_or(
                "REFRESH_TOKEN_KEY",
                "dev-refresh-token-key-0123456789abcdef",
            ),
            access_token_age: env_or("ACCESS_TOKEN_AGE", "1800")
                .parse()
                .expect("invalid access_token_age"),
            cache_ttl_seconds: env_or("CACHE_TTL_SECONDS", "1800")
                .parse()
                .expect("invalid cache_ttl_seconds"),
            upload_dir: env_or("UPLOAD_DIR", "uploads/images"),
        }
    }
    pub fn initialize(&self) -> anyhow::Result<()> {
        slog::info!(
            LOG, "initialized config";
            "version" => &CONFIG.version,
            "ssl" => &CONFIG.ssl,
            "host" => &CONFIG.host,
            "port" => &CONFIG.port,
            "public_url" => CONFIG.public_url(),
            "log_format" => &CONFIG.log_format,
            "log_level" => &CONFIG.log_level,
            "db_max_connections" => CONFIG.db_max_connections,
            "cache_ttl_seconds" => CONFIG.cache_ttl_seconds,
            "upload_dir" => &CONFIG.upload_dir,
        );
        Ok(())
    }
    pub fn host(&self) -> String {
        let p = if self.ssl { "https" } else { "http" };
        format!("{}://{}:{}", p, self.host, self.port)
    }
    pub fn public_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| self.host())
            .trim_end_matches('/')
            .to_string()
    }
}

#[async_std::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    CONFIG.initialize()?;

    let pool = PgPoolOptions::new()
        .max_connections(CONFIG.db_max_connections)
        .connect(&CONFIG.db_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;
    slog::info!(LOG, "database migrations applied");

    let store = Arc::new(db::postgres::PgStore::new(pool.clone()));
    let cache = Arc::new(cache::MemoryCache::new(Duration::from_secs(
        CONFIG.cache_ttl_seconds,
    )));
    let producer = Arc::new(producer::PgProducer::new(pool));
    let files = Arc::new(storage::LocalFileStore::new(CONFIG.upload_dir.clone()).await?);
    let tokens = tokens::TokenManager::new(
        &CONFIG.access_token_key,
        &CONFIG.refresh_token_key,
        CONFIG.access_token_age,
    );

    let ctx = api::Context::new(
        store,
        cache,
        producer,
        files,
        tokens,
        Duration::from_secs(CONFIG.cache_ttl_seconds),
        CONFIG.public_url(),
    );
    api::start(ctx).await?;
    Ok(())
}

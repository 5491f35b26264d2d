//! linkshelf RPC server: JSON-RPC over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.create", "params":{"title":"...","urls":[...]}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":{"kind":"NOT_FOUND","message":"..."}}
//!
//! Logs go to stderr; stdout carries only protocol lines.

use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use std::time::Instant;

use linkshelf::app::App;
use linkshelf::rpc_handler::{handle_method, RpcError};
use linkshelf::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use linkshelf::types::errors::ErrorKind;

use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
const ENV_LOG: &str = "LINKSHELF_LOG";

/// Simple rate limiter: max requests per one-second window.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self {
            window_start: Instant::now(),
            request_count: 0,
            max_per_second,
        }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn rate_limited() -> RpcError {
    RpcError::new(ErrorKind::RateLimited, "rate limit exceeded")
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn respond(out: &mut impl Write, response: &Value) -> io::Result<()> {
    writeln!(out, "{}", response)?;
    out.flush()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut settings_engine = SettingsEngine::new(None);
    let settings = settings_engine.load()?;
    init_tracing(&settings.log_filter);

    let db_path = settings_engine.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    tracing::info!(config = settings_engine.get_config_path(), db = %db_path.display(), "starting linkshelf-rpc");

    let mut rate_limiter = RateLimiter::new(settings.rate_limit_per_second);
    let app = Mutex::new(App::new(&db_path, settings)?);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    respond(&mut out, &json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}))?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                let err = RpcError::new(ErrorKind::ValidationFailed, format!("parse error: {}", e));
                respond(&mut out, &json!({"id": null, "error": err}))?;
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            tracing::warn!("rate limit exceeded");
            respond(&mut out, &json!({"id": id, "error": rate_limited()}))?;
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or_else(|| json!({}));

        let response = match handle_method(&app, method, &params) {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        respond(&mut out, &response)?;
    }

    tracing::info!("linkshelf-rpc shutting down");
    Ok(())
}

//! navdesk RPC Server: JSON-RPC over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.create", "params":{"token":"...","name":"...","url":"...","category":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Logs go to stderr; stdout carries only protocol frames.
//!
//! `navdesk-rpc hash-password <password>` prints a PBKDF2 hash suitable for
//! the `password` field of users.json and exits.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Instant;

use navdesk::app::App;
use navdesk::config::NavdeskConfig;
use navdesk::rpc_handler::handle_method;
use navdesk::services::identity::hash_password;

use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
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

fn init_logging(config: &NavdeskConfig) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn emit(frame: &Value) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", frame)?;
    out.flush()
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("hash-password") {
        let Some(password) = args.get(2) else {
            eprintln!("usage: navdesk-rpc hash-password <password>");
            return ExitCode::FAILURE;
        };
        return match hash_password(password) {
            Ok(hash) => {
                println!("{}", hash);
                ExitCode::SUCCESS
            }
            Err(_) => {
                eprintln!("failed to hash password");
                ExitCode::FAILURE
            }
        };
    }

    let config = NavdeskConfig::from_env();
    init_logging(&config);

    let rate_limit = config.rate_limit_per_second;
    let data_root = config.data_root.display().to_string();
    let app = match App::new(config) {
        Ok(app) => Mutex::new(app),
        Err(e) => {
            error!(error = %e, "failed to initialize data directory");
            return ExitCode::FAILURE;
        }
    };
    info!(data_root = %data_root, "navdesk ready");

    let ready = json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")});
    if emit(&ready).is_err() {
        return ExitCode::FAILURE;
    }

    let mut rate_limiter = RateLimiter::new(rate_limit);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "unparseable request");
                if emit(&json!({"id": null, "error": format!("parse error: {}", e)})).is_err() {
                    break;
                }
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            if emit(&json!({"id": id, "error": "rate limit exceeded"})).is_err() {
                break;
            }
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        debug!(method, "request");
        let response = match handle_method(&app, method, &params) {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        if emit(&response).is_err() {
            break;
        }
    }

    info!("stdin closed, shutting down");
    ExitCode::SUCCESS
}

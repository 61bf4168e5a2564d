//! vidsearch RPC Server: JSON-RPC over stdin/stdout for a UI front end.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"history.record", "params":{"keyword":"...","result_count":3}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Event:    {"event":"history.changed", "history":[...]} after every history change.

use std::io::{self, Write};
use std::path::PathBuf;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};

use vidsearch::app::App;
use vidsearch::platform;
use vidsearch::rpc_handler::handle_method;
use vidsearch::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

fn emit(value: &Value) {
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{}", value);
    let _ = out.flush();
}

fn init_tracing(level: &str) {
    let level = level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = std::env::var("VIDSEARCH_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| platform::get_data_dir());

    let mut settings_engine = SettingsEngine::new(None);
    let load_result = settings_engine.load();
    settings_engine.apply_env_overrides();
    init_tracing(&settings_engine.get_settings().logging.level);
    if let Err(error) = load_result {
        tracing::warn!(%error, "failed to load settings, using defaults");
    }

    let app = App::with_settings(settings_engine, &data_dir)?;

    let mut changes = app.history.subscribe();
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let history = changes.borrow_and_update().clone();
            emit(&json!({"event": "history.changed", "history": history}));
        }
    });

    emit(&json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                emit(&json!({"id": null, "error": format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);
        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_method(&app, method, &params).await {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        emit(&response);
    }

    tracing::debug!("stdin closed, shutting down");
    Ok(())
}

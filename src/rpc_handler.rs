//! RPC method handler for the vidsearch JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so every method can be tested without
//! stdio. `handle_method` dispatches one call to the history, settings or
//! search client held by [`App`].

use serde_json::{json, Value};

use crate::app::App;
use crate::services::settings_engine::SettingsEngineTrait;

fn required_str<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

fn optional_u64(params: &Value, name: &str) -> Result<Option<u64>, String> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .map(Some)
            .ok_or_else(|| format!("invalid {}: expected a non-negative integer", name)),
    }
}

fn optional_usize(params: &Value, name: &str) -> Result<Option<usize>, String> {
    Ok(optional_u64(params, name)?.map(|v| usize::try_from(v).unwrap_or(usize::MAX)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(app: &App, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── History ───
        "history.list" => {
            let records = match optional_usize(params, "limit")? {
                Some(limit) => app.history.recent(limit),
                None => app.history.records(),
            };
            to_json(&records)
        }
        "history.record" => {
            let keyword = required_str(params, "keyword")?;
            let result_count = optional_u64(params, "result_count")?.unwrap_or(0);
            let record = app
                .history
                .record(keyword, result_count)
                .map_err(|e| e.to_string())?;
            to_json(&record)
        }
        "history.remove" => {
            let keyword = required_str(params, "keyword")?;
            Ok(json!({"removed": app.history.remove(keyword)}))
        }
        "history.clear" => {
            app.history.clear();
            Ok(json!({"ok": true}))
        }
        "history.popular" => {
            let limit = match optional_usize(params, "limit")? {
                Some(limit) => limit,
                None => app.settings().history.popular_limit,
            };
            to_json(&app.history.popular(limit))
        }
        "history.suggestions" => {
            let query = required_str(params, "query")?;
            let limit = match optional_usize(params, "limit")? {
                Some(limit) => limit,
                None => app.settings().history.suggestion_limit,
            };
            Ok(json!(app.history.suggestions(query, limit)))
        }
        "history.stats" => to_json(&app.history.stats()),

        // ─── Settings ───
        "settings.get" => to_json(&app.settings()),
        "settings.set" => {
            let key = required_str(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            app.settings_engine()
                .set_value(key, value)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Search ───
        "search.run" => {
            let keyword = required_str(params, "keyword")?;
            let limit = optional_u64(params, "limit")?
                .map(|v| u32::try_from(v).unwrap_or(u32::MAX));
            let response = app.search(keyword, limit).await.map_err(|e| e.to_string())?;
            to_json(&response)
        }
        "search.health" => {
            let health = app.search_client.health().await.map_err(|e| e.to_string())?;
            to_json(&health)
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}

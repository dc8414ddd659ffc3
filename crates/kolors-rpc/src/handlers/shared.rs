//! Parameter extraction shared across RPC domains.

use crate::server::AppState;
use kolors_core::{CombinationId, KolorsApi, KolorsError};
use serde_json::Value;

/// Extract an optional string parameter, supporting both snake_case and camelCase.
pub(crate) fn get_str_param<'a>(params: &'a Value, snake: &str, camel: &str) -> Option<&'a str> {
    params
        .get(snake)
        .or_else(|| params.get(camel))
        .and_then(|v| v.as_str())
}

/// Extract a required string parameter or return an error.
pub(crate) fn require_str_param(
    params: &Value,
    snake: &str,
    camel: &str,
) -> kolors_core::Result<String> {
    get_str_param(params, snake, camel)
        .map(String::from)
        .ok_or_else(|| missing(snake))
}

/// Extract an optional i64 parameter, supporting both snake_case and camelCase.
pub(crate) fn get_i64_param(params: &Value, snake: &str, camel: &str) -> Option<i64> {
    params
        .get(snake)
        .or_else(|| params.get(camel))
        .and_then(|v| v.as_i64())
}

/// Extract an optional array of strings. Any non-string entry is rejected.
pub(crate) fn get_str_array_param(
    params: &Value,
    snake: &str,
    camel: &str,
) -> kolors_core::Result<Option<Vec<String>>> {
    let Some(values) = params
        .get(snake)
        .or_else(|| params.get(camel))
        .and_then(|v| v.as_array())
    else {
        return Ok(None);
    };

    values
        .iter()
        .enumerate()
        .map(|(index, v)| {
            v.as_str().map(String::from).ok_or_else(|| {
                KolorsError::invalid_argument(
                    snake,
                    format!("Entry {} must be a string, got {}", index, v),
                )
            })
        })
        .collect::<kolors_core::Result<Vec<String>>>()
        .map(Some)
}

/// Run a store-bound call on the blocking pool; rusqlite calls are synchronous.
pub(crate) async fn run_blocking<T, F>(state: &AppState, call: F) -> kolors_core::Result<T>
where
    F: FnOnce(&KolorsApi) -> kolors_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let api = state.api.clone();
    tokio::task::spawn_blocking(move || call(api.as_ref()))
        .await
        .map_err(|e| KolorsError::Other(format!("Blocking task failed: {}", e)))?
}

/// The `combination_id` parameter, if present.
pub(crate) fn get_combination_id(params: &Value) -> Option<CombinationId> {
    get_i64_param(params, "combination_id", "combinationId").map(CombinationId)
}

pub(crate) fn require_combination_id(params: &Value) -> kolors_core::Result<CombinationId> {
    get_combination_id(params).ok_or_else(|| missing("combination_id"))
}

/// The `position` parameter. Negative values become 0, which no color occupies.
pub(crate) fn get_position(params: &Value) -> Option<u32> {
    get_i64_param(params, "position", "position").map(|p| p.clamp(0, i64::from(u32::MAX)) as u32)
}

pub(crate) fn require_position(params: &Value) -> kolors_core::Result<u32> {
    get_position(params).ok_or_else(|| missing("position"))
}

fn missing(name: &str) -> KolorsError {
    KolorsError::invalid_argument(name, format!("Missing required parameter: {}", name))
}

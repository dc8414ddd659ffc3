//! JSON-RPC request handlers, split by domain.

mod combinations;
mod migration;
mod positions;
mod shared;

pub(crate) use shared::{
    get_combination_id, get_position, get_str_array_param, require_combination_id,
    require_position, require_str_param, run_blocking,
};

use crate::server::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use kolors_core::KolorsError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

// ============================================================================
// JSON-RPC types
// ============================================================================

/// JSON-RPC 2.0 request structure.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 error structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
            id,
        }
    }

    /// Error response carrying the individual validation messages as `data`.
    fn from_error(id: Option<Value>, err: &KolorsError) -> Self {
        let mut response = Self::error(id, err.to_rpc_error_code(), err.to_string());
        if let (KolorsError::Validation { errors }, Some(error)) = (err, response.error.as_mut()) {
            error.data = Some(json!({ "errors": errors }));
        }
        response
    }
}

// ============================================================================
// HTTP endpoints
// ============================================================================

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Main JSON-RPC handler.
pub async fn handle_rpc(
    State(state): State<Arc<AppState>>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    let method = &request.method;
    let params = request.params.unwrap_or(Value::Object(Default::default()));
    let id = request.id.clone();

    debug!("RPC call: {}({:?})", method, params);

    // Handle built-in methods
    if method == "health_check" {
        return (
            StatusCode::OK,
            Json(JsonRpcResponse::success(id, json!({"status": "ok"}))),
        );
    }

    match dispatch_method(&state, method, &params).await {
        Ok(value) => (StatusCode::OK, Json(JsonRpcResponse::success(id, value))),
        Err(e) => {
            if e.is_client_error() {
                warn!("RPC call {} rejected: {}", method, e);
            } else {
                error!("RPC error for {}: {}", method, e);
            }
            (StatusCode::OK, Json(JsonRpcResponse::from_error(id, &e)))
        }
    }
}

// ============================================================================
// Method dispatcher
// ============================================================================

/// Dispatch a method call to the appropriate domain handler.
async fn dispatch_method(
    state: &AppState,
    method: &str,
    params: &Value,
) -> kolors_core::Result<Value> {
    match method {
        // Migration
        "get_migration_status" => migration::get_migration_status(state, params).await,
        "get_migration_statistics" => migration::get_migration_statistics(state, params).await,
        "check_legacy_data" => migration::check_legacy_data(state, params).await,
        "migrate_legacy_data" => migration::migrate_legacy_data(state, params).await,
        "reset_migration_status" => migration::reset_migration_status(state, params).await,
        "validate_migration" => migration::validate_migration(state, params).await,
        "validate_migrated_data" => migration::validate_migrated_data(state, params).await,

        // Combinations
        "list_combinations" => combinations::list_combinations(state, params).await,
        "get_combination_statistics" => {
            combinations::get_combination_statistics(state, params).await
        }
        "get_combination" => combinations::get_combination(state, params).await,
        "create_combination" => combinations::create_combination(state, params).await,
        "add_color" => combinations::add_color(state, params).await,
        "remove_color" => combinations::remove_color(state, params).await,
        "delete_combination" => combinations::delete_combination(state, params).await,

        // Positions
        "get_used_positions" => positions::get_used_positions(state, params).await,
        "get_next_position" => positions::get_next_position(state, params).await,
        "is_position_available" => positions::is_position_available(state, params).await,
        "fix_positions" => positions::fix_positions(state, params).await,

        // Unknown method
        _ => {
            warn!("Method not found: {}", method);
            Err(KolorsError::Other(format!("Method not found: {}", method)))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use kolors_core::KolorsApi;

    fn create_state() -> AppState {
        AppState::new(KolorsApi::open_in_memory().unwrap())
    }

    async fn call(state: &AppState, method: &str, params: Value) -> kolors_core::Result<Value> {
        dispatch_method(state, method, &params).await
    }

    #[test]
    fn test_json_rpc_response_success() {
        let response = JsonRpcResponse::success(Some(json!(1)), json!({"data": "test"}));
        assert!(response.error.is_none());
        assert!(response.result.is_some());
    }

    #[test]
    fn test_json_rpc_response_error() {
        let response = JsonRpcResponse::error(Some(json!(1)), -32600, "Test error".into());
        assert!(response.error.is_some());
        assert!(response.result.is_none());
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[test]
    fn test_validation_errors_travel_as_data() {
        let err = KolorsError::Validation {
            errors: vec!["bad name".into()],
        };
        let response = JsonRpcResponse::from_error(None, &err);
        let error = response.error.unwrap();
        assert_eq!(error.code, -32005);
        assert_eq!(error.data, Some(json!({"errors": ["bad name"]})));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let state = create_state();
        let err = call(&state, "paint_everything", json!({})).await.unwrap_err();
        assert!(err.to_string().contains("Method not found"));
    }

    #[tokio::test]
    async fn test_migration_flow() {
        let state = create_state();
        let store = state.api.store();
        store.insert_legacy(Some("Red"), Some("ff0000")).unwrap();
        store.insert_legacy(Some("Bad"), None).unwrap();

        let check = call(&state, "check_legacy_data", json!({})).await.unwrap();
        assert_eq!(check["has_legacy_data"], json!(true));
        assert_eq!(check["migration_needed"], json!(true));
        assert_eq!(check["status"], json!("NOT_STARTED"));

        let run = call(&state, "migrate_legacy_data", json!({})).await.unwrap();
        assert_eq!(run["success"], json!(false));
        assert_eq!(run["result"]["migrated_records"], json!(1));
        assert_eq!(run["result"]["failed_records"], json!(1));

        let status = call(&state, "get_migration_status", json!({})).await.unwrap();
        assert_eq!(status["status"], json!("COMPLETED_WITH_ERRORS"));
        assert_eq!(status["statistics"]["migration_progress"], json!(50.0));
        assert!(status["last_result"]["summary"]
            .as_str()
            .unwrap()
            .starts_with("Migration completed with errors."));

        let reset = call(&state, "reset_migration_status", json!({})).await.unwrap();
        assert_eq!(reset["status"], json!("NOT_STARTED"));
        let status = call(&state, "get_migration_status", json!({})).await.unwrap();
        assert!(status["last_result"].is_null());
    }

    #[tokio::test]
    async fn test_empty_migration_reports_no_legacy_data() {
        let state = create_state();
        let run = call(&state, "migrate_legacy_data", json!({})).await.unwrap();
        assert_eq!(run["success"], json!(true));

        let stats = call(&state, "get_migration_statistics", json!({})).await.unwrap();
        assert_eq!(stats["statistics"]["status"], json!("NO_LEGACY_DATA"));
        assert_eq!(stats["statistics"]["migration_progress"], json!(100.0));

        let validation = call(&state, "validate_migration", json!({})).await.unwrap();
        assert_eq!(validation["validation"]["valid"], json!(true));
    }

    #[tokio::test]
    async fn test_combination_editing() {
        let state = create_state();
        let created = call(
            &state,
            "create_combination",
            json!({"name": "Forest", "hexValues": ["228B22", "006400"]}),
        )
        .await
        .unwrap();
        let id = created["combination"]["id"].clone();

        let added = call(&state, "add_color", json!({"combinationId": id, "hexValue": "9acd32"}))
            .await
            .unwrap();
        assert_eq!(added["combination"]["color_count"], json!(3));

        let removed = call(&state, "remove_color", json!({"combination_id": id, "position": 1}))
            .await
            .unwrap();
        assert_eq!(removed["combination"]["colors"][0]["hex_value"], json!("006400"));

        let used = call(&state, "get_used_positions", json!({"combination_id": id}))
            .await
            .unwrap();
        assert_eq!(used["positions"], json!([1, 2]));

        let next = call(&state, "get_next_position", json!({"combination_id": id}))
            .await
            .unwrap();
        assert_eq!(next["position"], json!(3));

        let taken = call(
            &state,
            "is_position_available",
            json!({"combination_id": id, "position": 2}),
        )
        .await
        .unwrap();
        assert_eq!(taken["available"], json!(false));

        let fixed = call(&state, "fix_positions", json!({"combination_id": id}))
            .await
            .unwrap();
        assert_eq!(fixed["repaired"], json!(false));

        call(&state, "delete_combination", json!({"combination_id": id}))
            .await
            .unwrap();
        let err = call(&state, "get_combination", json!({"combination_id": id}))
            .await
            .unwrap_err();
        assert_eq!(err.to_rpc_error_code(), -32002);
    }

    #[tokio::test]
    async fn test_create_combination_rejects_non_string_hex_values() {
        let state = create_state();
        let err = call(
            &state,
            "create_combination",
            json!({"name": "Mixed", "hexValues": ["FF0000", null, 42, "00FF00"]}),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_rpc_error_code(), -32602);

        let listed = call(&state, "list_combinations", json!({})).await.unwrap();
        assert_eq!(listed["count"], json!(0));
    }

    #[tokio::test]
    async fn test_listing_statistics_and_data_validation() {
        let state = create_state();
        state
            .api
            .store()
            .insert_legacy(Some("Coral"), Some("FF7F50"))
            .unwrap();
        call(&state, "migrate_legacy_data", json!({})).await.unwrap();
        call(
            &state,
            "create_combination",
            json!({"name": "Dusk", "hex_values": ["2E1A47", "FF8C00", "FFD700"]}),
        )
        .await
        .unwrap();

        let listed = call(&state, "list_combinations", json!({})).await.unwrap();
        assert_eq!(listed["count"], json!(2));
        assert_eq!(listed["combinations"][0]["name"], json!("Dusk"));

        let stats = call(&state, "get_combination_statistics", json!({}))
            .await
            .unwrap();
        assert_eq!(stats["statistics"]["total_combinations"], json!(2));
        assert_eq!(stats["statistics"]["single_color_combinations"], json!(1));
        assert_eq!(stats["statistics"]["combinations_with_3_colors"], json!(1));

        let checked = call(&state, "validate_migrated_data", json!({}))
            .await
            .unwrap();
        assert_eq!(checked["success"], json!(true));
        assert_eq!(checked["result"]["migrated_records"], json!(2));

        let again = call(&state, "migrate_legacy_data", json!({})).await.unwrap();
        assert_eq!(again["success"], json!(true));
        assert_eq!(again["result"]["warnings"].as_array().unwrap().len(), 1);
        let listed = call(&state, "list_combinations", json!({})).await.unwrap();
        assert_eq!(listed["count"], json!(2));
    }

    #[tokio::test]
    async fn test_position_calls_require_combination_id() {
        let state = create_state();
        let err = call(&state, "get_next_position", json!({})).await.unwrap_err();
        assert_eq!(err.to_rpc_error_code(), -32602);

        let unavailable = call(&state, "is_position_available", json!({"position": 1}))
            .await
            .unwrap();
        assert_eq!(unavailable["available"], json!(false));
    }
}

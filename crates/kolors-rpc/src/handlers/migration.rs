//! Legacy migration handlers.

use crate::handlers::run_blocking;
use crate::server::AppState;
use serde_json::{json, Value};
use tracing::warn;

pub async fn get_migration_status(state: &AppState, _params: &Value) -> kolors_core::Result<Value> {
    let (status, statistics, last_result, has_legacy_data) = run_blocking(state, |api| {
        let tracker = api.migration();
        Ok((
            tracker.current_status(),
            tracker.statistics()?,
            tracker.last_result(),
            tracker.has_legacy_data()?,
        ))
    })
    .await?;
    Ok(json!({
        "success": true,
        "status": status,
        "description": status.description(),
        "statistics": statistics,
        "last_result": last_result,
        "has_legacy_data": has_legacy_data
    }))
}

pub async fn get_migration_statistics(
    state: &AppState,
    _params: &Value,
) -> kolors_core::Result<Value> {
    let statistics = run_blocking(state, |api| api.migration().statistics()).await?;
    Ok(json!({
        "success": true,
        "statistics": statistics
    }))
}

pub async fn check_legacy_data(state: &AppState, _params: &Value) -> kolors_core::Result<Value> {
    let statistics = run_blocking(state, |api| api.migration().statistics()).await?;
    Ok(json!({
        "success": true,
        "has_legacy_data": statistics.legacy_record_count > 0,
        "status": statistics.status,
        "migration_needed": statistics.migration_needed
    }))
}

/// Run the migration on the blocking pool; it walks the whole legacy table.
pub async fn migrate_legacy_data(state: &AppState, _params: &Value) -> kolors_core::Result<Value> {
    let result = run_blocking(state, |api| Ok(api.migration().run_migration())).await?;

    if result.total_legacy_records() == 0 && result.is_success() {
        warn!("Migration requested but no legacy data exists");
    }

    Ok(json!({
        "success": result.is_success(),
        "result": result
    }))
}

pub async fn reset_migration_status(
    state: &AppState,
    _params: &Value,
) -> kolors_core::Result<Value> {
    let tracker = state.api.migration();
    tracker.reset();
    Ok(json!({
        "success": true,
        "status": tracker.current_status()
    }))
}

pub async fn validate_migration(state: &AppState, _params: &Value) -> kolors_core::Result<Value> {
    let validation = run_blocking(state, |api| api.migration().validate_migration()).await?;
    Ok(json!({
        "success": true,
        "validation": validation
    }))
}

/// Check every stored combination for well-formed names, counts, hex values
/// and positions.
pub async fn validate_migrated_data(
    state: &AppState,
    _params: &Value,
) -> kolors_core::Result<Value> {
    let result = run_blocking(state, |api| Ok(api.migration().validate_migrated_data())).await?;
    Ok(json!({
        "success": result.is_success(),
        "result": result
    }))
}

//! Position query and repair handlers.

use crate::handlers::{get_combination_id, get_position, require_combination_id, run_blocking};
use crate::server::AppState;
use serde_json::{json, Value};

pub async fn get_used_positions(state: &AppState, params: &Value) -> kolors_core::Result<Value> {
    let id = get_combination_id(params);
    let positions = run_blocking(state, move |api| api.positions().used_positions(id)).await?;
    Ok(json!({
        "success": true,
        "positions": positions
    }))
}

pub async fn get_next_position(state: &AppState, params: &Value) -> kolors_core::Result<Value> {
    let id = get_combination_id(params);
    let position =
        run_blocking(state, move |api| api.positions().next_available_position(id)).await?;
    Ok(json!({
        "success": true,
        "position": position
    }))
}

pub async fn is_position_available(state: &AppState, params: &Value) -> kolors_core::Result<Value> {
    let id = get_combination_id(params);
    let position = get_position(params);
    let available = run_blocking(state, move |api| {
        api.positions().is_position_available(id, position)
    })
    .await?;
    Ok(json!({
        "success": true,
        "available": available
    }))
}

/// Repair positions and the declared color count of one combination.
pub async fn fix_positions(state: &AppState, params: &Value) -> kolors_core::Result<Value> {
    let id = require_combination_id(params)?;
    let (repaired, positions) = run_blocking(state, move |api| {
        let repaired = api.combinations().check_integrity(id)?;
        Ok((repaired, api.positions().used_positions(Some(id))?))
    })
    .await?;
    Ok(json!({
        "success": true,
        "repaired": repaired,
        "positions": positions
    }))
}

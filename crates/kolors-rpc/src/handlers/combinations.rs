//! Combination editing handlers.

use crate::handlers::{
    get_str_array_param, require_combination_id, require_position, require_str_param,
    run_blocking,
};
use crate::server::AppState;
use serde_json::{json, Value};

pub async fn list_combinations(state: &AppState, _params: &Value) -> kolors_core::Result<Value> {
    let combinations = run_blocking(state, |api| api.combinations().list_combinations()).await?;
    Ok(json!({
        "success": true,
        "count": combinations.len(),
        "combinations": combinations
    }))
}

pub async fn get_combination_statistics(
    state: &AppState,
    _params: &Value,
) -> kolors_core::Result<Value> {
    let statistics = run_blocking(state, |api| api.combinations().statistics()).await?;
    Ok(json!({
        "success": true,
        "statistics": statistics
    }))
}

pub async fn get_combination(state: &AppState, params: &Value) -> kolors_core::Result<Value> {
    let id = require_combination_id(params)?;
    let combination = run_blocking(state, move |api| api.combinations().get_combination(id)).await?;
    Ok(json!({
        "success": true,
        "combination": combination
    }))
}

pub async fn create_combination(state: &AppState, params: &Value) -> kolors_core::Result<Value> {
    let name = require_str_param(params, "name", "name")?;
    let hex_values = get_str_array_param(params, "hex_values", "hexValues")?.unwrap_or_default();
    let combination = run_blocking(state, move |api| {
        api.combinations().create_combination(&name, &hex_values)
    })
    .await?;
    Ok(json!({
        "success": true,
        "combination": combination
    }))
}

pub async fn add_color(state: &AppState, params: &Value) -> kolors_core::Result<Value> {
    let id = require_combination_id(params)?;
    let hex_value = require_str_param(params, "hex_value", "hexValue")?;
    let combination =
        run_blocking(state, move |api| api.combinations().add_color(id, &hex_value)).await?;
    Ok(json!({
        "success": true,
        "combination": combination
    }))
}

pub async fn remove_color(state: &AppState, params: &Value) -> kolors_core::Result<Value> {
    let id = require_combination_id(params)?;
    let position = require_position(params)?;
    let combination =
        run_blocking(state, move |api| api.combinations().remove_color(id, position)).await?;
    Ok(json!({
        "success": true,
        "combination": combination
    }))
}

pub async fn delete_combination(state: &AppState, params: &Value) -> kolors_core::Result<Value> {
    let id = require_combination_id(params)?;
    run_blocking(state, move |api| api.combinations().delete_combination(id)).await?;
    Ok(json!({
        "success": true,
        "deleted": id
    }))
}

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use adlens_core::{
    aggregate_view,
    table::{SortColumn, SortOrder},
    View,
};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub sort: Option<String>,
    pub order: Option<String>,
}

/// `GET /api/views/{view}`: aggregated view model for one dashboard page.
///
/// The dataset is loaded fresh for every request. `sort` / `order` re-sort
/// the view's tables; the weekly view only accepts its calendar order.
/// Without `sort` the view's default table order applies.
#[tracing::instrument(skip(state, query))]
pub async fn get_view(
    State(state): State<Arc<AppState>>,
    Path(view): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Result<impl IntoResponse, AppError> {
    let view = View::parse(&view).map_err(|e| AppError::NotFound(e.to_string()))?;

    let sort = query
        .sort
        .as_deref()
        .map(SortColumn::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let order =
        SortOrder::parse(query.order.as_deref()).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let dataset = state.load_dataset().await?;
    let mut model = aggregate_view(view, &dataset, &state.aggregation_options());

    match sort {
        Some(column) => model
            .sort(column, order)
            .map_err(|e| AppError::BadRequest(e.to_string()))?,
        None => model.apply_default_sort(),
    }

    let data = serde_json::to_value(&model).context("serialize view model")?;
    Ok(Json(json!({
        "view": view,
        "data": data,
    })))
}

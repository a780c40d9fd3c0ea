//! Daily point-of-sale endpoints.

use api_types::sale::{SaleNew, SalePatch, SaleView, SalesResponse};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{ServerError, server::ServerState};
use engine::{DailySale, DateRange, Pesos};

pub fn to_view(sale: &DailySale) -> SaleView {
    SaleView {
        id: sale.id.clone(),
        date: sale.date,
        time_of_day: sale.time_of_day.clone(),
        product_name: sale.product_name.clone(),
        product_value: sale.product_value.value(),
        created_at: sale.created_at,
        updated_at: sale.updated_at,
    }
}

fn to_draft(payload: SaleNew) -> engine::SaleDraft {
    engine::SaleDraft {
        date: payload.date,
        time_of_day: payload.time_of_day.unwrap_or_default(),
        product_name: payload.product_name.unwrap_or_default(),
        product_value: payload.product_value.map(Pesos::new),
    }
}

fn to_patch(payload: SalePatch) -> engine::SalePatch {
    engine::SalePatch {
        date: payload.date,
        time_of_day: payload.time_of_day,
        product_name: payload.product_name,
        product_value: payload.product_value.map(Pesos::new),
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<SaleNew>,
) -> Result<(StatusCode, Json<SaleView>), ServerError> {
    let sale = state.ledger.new_sale(to_draft(payload)).await?;
    Ok((StatusCode::CREATED, Json(to_view(&sale))))
}

#[derive(Debug, Default, Deserialize)]
pub struct SaleListQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<SaleListQuery>,
) -> Result<Json<SalesResponse>, ServerError> {
    let range = DateRange {
        from: query.from,
        to: query.to,
    };
    let sales = state.ledger.sales(range).await?;
    Ok(Json(SalesResponse {
        sales: sales.iter().map(to_view).collect(),
    }))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<SalePatch>,
) -> Result<Json<SaleView>, ServerError> {
    let sale = state.ledger.update_sale(&id, to_patch(payload)).await?;
    Ok(Json(to_view(&sale)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_sale(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

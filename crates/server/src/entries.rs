//! Accounting entry endpoints.

use api_types::entry::{EntriesResponse, EntryNew, EntryPatch, EntryView, SummaryView};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{ServerError, server::ServerState};
use engine::{AccountingEntry, DateRange, EntryStatus, Pesos, Summary, aggregate};

pub fn to_view(entry: &AccountingEntry) -> EntryView {
    EntryView {
        id: entry.id.clone(),
        registration_date: entry.registration_date,
        sales_value: entry.sales_value.value(),
        sales_note: entry.sales_note.clone(),
        payment_method: entry.payment_method.as_str().to_string(),
        payment_value: entry.payment_value.value(),
        operating_expenses: entry.operating_expenses.value(),
        expense_note: entry.expense_note.clone(),
        daily_stipend_paid: entry.daily_stipend_paid,
        total: entry.total.value(),
        status: entry.status.as_str().to_string(),
        created_at: entry.created_at,
        updated_at: entry.updated_at,
    }
}

fn to_summary(summary: Summary) -> SummaryView {
    SummaryView {
        count: summary.count,
        total_sales: summary.total_sales.value(),
        total_expenses: summary.total_expenses.value(),
        net_balance: summary.net_balance.value(),
    }
}

fn to_draft(payload: EntryNew) -> engine::EntryDraft {
    engine::EntryDraft {
        registration_date: payload.registration_date,
        sales_value: payload.sales_value.map(Pesos::new),
        sales_note: payload.sales_note.unwrap_or_default(),
        payment_method: payload.payment_method,
        payment_value: payload.payment_value.map(Pesos::new),
        operating_expenses: payload.operating_expenses.map(Pesos::new),
        expense_note: payload.expense_note.unwrap_or_default(),
        daily_stipend_paid: payload.daily_stipend_paid.unwrap_or(false),
    }
}

fn to_patch(payload: EntryPatch) -> engine::EntryPatch {
    engine::EntryPatch {
        registration_date: payload.registration_date,
        sales_value: payload.sales_value.map(Pesos::new),
        sales_note: payload.sales_note,
        payment_method: payload.payment_method,
        payment_value: payload.payment_value.map(Pesos::new),
        operating_expenses: payload.operating_expenses.map(Pesos::new),
        expense_note: payload.expense_note,
        daily_stipend_paid: payload.daily_stipend_paid,
        status: payload.status,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<EntryNew>,
) -> Result<(StatusCode, Json<EntryView>), ServerError> {
    let entry = state.ledger.new_entry(to_draft(payload)).await?;
    Ok((StatusCode::CREATED, Json(to_view(&entry))))
}

#[derive(Debug, Default, Deserialize)]
pub struct EntryListQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// `active` (default), `inactive` or `all`.
    pub status: Option<String>,
}

fn status_filter(raw: Option<&str>) -> Result<Option<EntryStatus>, ServerError> {
    match raw {
        None | Some("active") => Ok(Some(EntryStatus::Active)),
        Some("inactive") => Ok(Some(EntryStatus::Inactive)),
        Some("all") => Ok(None),
        Some(other) => Err(ServerError::Generic(format!("unknown status: {other}"))),
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<EntryListQuery>,
) -> Result<Json<EntriesResponse>, ServerError> {
    let wanted = status_filter(query.status.as_deref())?;
    let range = DateRange {
        from: query.from,
        to: query.to,
    };

    let mut entries = state.ledger.entries(range).await?;
    if let Some(status) = wanted {
        entries.retain(|entry| entry.status == status);
    }

    let summary = aggregate(&entries);
    Ok(Json(EntriesResponse {
        entries: entries.iter().map(to_view).collect(),
        summary: to_summary(summary),
    }))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<EntryPatch>,
) -> Result<Json<EntryView>, ServerError> {
    let entry = state.ledger.update_entry(&id, to_patch(payload)).await?;
    Ok(Json(to_view(&entry)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_entry(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

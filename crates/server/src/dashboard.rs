//! Landing-page statistics endpoint.

use api_types::dashboard::DashboardResponse;
use axum::{Json, extract::State};
use chrono::Utc;

use crate::{ServerError, entries, sales, server::ServerState};

pub async fn get_dashboard(
    State(state): State<ServerState>,
) -> Result<Json<DashboardResponse>, ServerError> {
    let dashboard = state.ledger.dashboard(Utc::now()).await?;

    Ok(Json(DashboardResponse {
        entry_count: dashboard.entry_count,
        monthly_sales_income: dashboard.monthly_sales_income.value(),
        today_transaction_count: dashboard.today_transaction_count,
        report_count: dashboard.report_count,
        recent_entries: dashboard.recent_entries.iter().map(entries::to_view).collect(),
        recent_sales: dashboard.recent_sales.iter().map(sales::to_view).collect(),
    }))
}

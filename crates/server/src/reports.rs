//! Downloadable report endpoints.

use api_types::report::ReportFormat;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, header},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::{
    ServerError,
    export::{Report, ReportColumn, export_filename, render_csv, render_pdf},
    server::ServerState,
};
use engine::{AccountingEntry, DailySale, DateRange, EntryStatus};

const ENTRIES_TITLE: &str = "Accounting Entries";
const SALES_TITLE: &str = "Daily Sales";

const ENTRY_COLUMNS: &[ReportColumn] = &[
    ReportColumn {
        header: "Date",
        data_key: "date",
        width: 2,
    },
    ReportColumn {
        header: "Sales",
        data_key: "sales",
        width: 2,
    },
    ReportColumn {
        header: "Payment method",
        data_key: "paymentMethod",
        width: 3,
    },
    ReportColumn {
        header: "Payment",
        data_key: "payment",
        width: 2,
    },
    ReportColumn {
        header: "Expenses",
        data_key: "expenses",
        width: 2,
    },
    ReportColumn {
        header: "Stipend",
        data_key: "stipend",
        width: 1,
    },
    ReportColumn {
        header: "Total",
        data_key: "total",
        width: 2,
    },
];

const SALE_COLUMNS: &[ReportColumn] = &[
    ReportColumn {
        header: "Date",
        data_key: "date",
        width: 2,
    },
    ReportColumn {
        header: "Time",
        data_key: "time",
        width: 1,
    },
    ReportColumn {
        header: "Product",
        data_key: "product",
        width: 4,
    },
    ReportColumn {
        header: "Value",
        data_key: "value",
        width: 2,
    },
];

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub format: ReportFormat,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

fn period_caption(range: &DateRange) -> Option<String> {
    match (range.from, range.to) {
        (None, None) => None,
        (from, to) => {
            let open = "...".to_string();
            let fmt = |date: DateTime<Utc>| date.format("%Y-%m-%d").to_string();
            Some(format!(
                "{} to {}",
                from.map_or_else(|| open.clone(), fmt),
                to.map_or(open, fmt),
            ))
        }
    }
}

fn entry_row(entry: &AccountingEntry) -> Map<String, Value> {
    let mut row = Map::new();
    row.insert(
        "date".to_string(),
        json!(entry.registration_date.format("%Y-%m-%d").to_string()),
    );
    row.insert("sales".to_string(), json!(entry.sales_value.to_string()));
    row.insert(
        "paymentMethod".to_string(),
        json!(entry.payment_method.label()),
    );
    row.insert("payment".to_string(), json!(entry.payment_value.to_string()));
    row.insert(
        "expenses".to_string(),
        json!(entry.operating_expenses.to_string()),
    );
    row.insert("stipend".to_string(), json!(entry.daily_stipend_paid));
    row.insert("total".to_string(), json!(entry.total.to_string()));
    row
}

fn sale_row(sale: &DailySale) -> Map<String, Value> {
    let mut row = Map::new();
    row.insert(
        "date".to_string(),
        json!(sale.date.format("%Y-%m-%d").to_string()),
    );
    row.insert("time".to_string(), json!(sale.time_of_day));
    row.insert("product".to_string(), json!(sale.product_name));
    row.insert("value".to_string(), json!(sale.product_value.to_string()));
    row
}

fn respond(
    state: &ServerState,
    report: &Report,
    format: ReportFormat,
) -> Result<(HeaderMap, Vec<u8>), ServerError> {
    let bytes = match format {
        ReportFormat::Csv => render_csv(report)?,
        ReportFormat::Pdf => render_pdf(report, &state.fonts_dir)?,
    };

    let content_type = match format {
        ReportFormat::Csv => "text/csv",
        ReportFormat::Pdf => "application/pdf",
    };
    let filename = export_filename(&report.title, report.generated_at, format.extension());

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
            .map_err(|err| ServerError::Report(err.to_string()))?,
    );
    Ok((headers, bytes))
}

pub async fn entries_report(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> Result<(HeaderMap, Vec<u8>), ServerError> {
    let range = DateRange {
        from: query.from,
        to: query.to,
    };
    let mut entries = state.ledger.entries(range).await?;
    entries.retain(|entry| entry.status == EntryStatus::Active);

    let report = Report {
        title: ENTRIES_TITLE.to_string(),
        period: period_caption(&range),
        generated_at: Utc::now(),
        columns: ENTRY_COLUMNS.to_vec(),
        rows: entries.iter().map(entry_row).collect(),
    };
    respond(&state, &report, query.format)
}

pub async fn sales_report(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> Result<(HeaderMap, Vec<u8>), ServerError> {
    let range = DateRange {
        from: query.from,
        to: query.to,
    };
    let sales = state.ledger.sales(range).await?;

    let report = Report {
        title: SALES_TITLE.to_string(),
        period: period_caption(&range),
        generated_at: Utc::now(),
        columns: SALE_COLUMNS.to_vec(),
        rows: sales.iter().map(sale_row).collect(),
    };
    respond(&state, &report, query.format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn period_caption_handles_open_ends() {
        assert_eq!(period_caption(&DateRange::all()), None);

        let from = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2026, 2, 28, 0, 0, 0).unwrap();
        assert_eq!(
            period_caption(&DateRange::between(from, to)).as_deref(),
            Some("2026-02-01 to 2026-02-28")
        );
        assert_eq!(
            period_caption(&DateRange {
                from: Some(from),
                to: None
            })
            .as_deref(),
            Some("2026-02-01 to ...")
        );
    }

    #[test]
    fn entry_row_uses_display_formats() {
        let entry = AccountingEntry {
            registration_date: Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap(),
            sales_value: engine::Pesos::new(150_000),
            payment_method: engine::PaymentMethod::BankDeposit,
            daily_stipend_paid: true,
            ..AccountingEntry::default()
        };
        let row = entry_row(&entry);
        assert_eq!(row["date"], "2026-02-10");
        assert_eq!(row["sales"], "$150.000");
        assert_eq!(row["paymentMethod"], "Bank deposit");
        assert_eq!(row["stipend"], true);
    }
}

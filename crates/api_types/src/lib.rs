//! Wire types shared by the server and its clients.
//!
//! JSON keys are camelCase; money travels as integer pesos; dates as
//! RFC 3339 strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod entry {
    use super::*;

    /// Request body for creating an entry. Everything is optional so
    /// the engine can report every missing field at once.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct EntryNew {
        pub registration_date: Option<DateTime<Utc>>,
        pub sales_value: Option<i64>,
        pub sales_note: Option<String>,
        pub payment_method: Option<String>,
        pub payment_value: Option<i64>,
        pub operating_expenses: Option<i64>,
        pub expense_note: Option<String>,
        pub daily_stipend_paid: Option<bool>,
    }

    /// Partial update. Absent fields stay untouched.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct EntryPatch {
        pub registration_date: Option<DateTime<Utc>>,
        pub sales_value: Option<i64>,
        pub sales_note: Option<String>,
        pub payment_method: Option<String>,
        pub payment_value: Option<i64>,
        pub operating_expenses: Option<i64>,
        pub expense_note: Option<String>,
        pub daily_stipend_paid: Option<bool>,
        pub status: Option<String>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EntryView {
        pub id: String,
        pub registration_date: DateTime<Utc>,
        pub sales_value: i64,
        pub sales_note: String,
        pub payment_method: String,
        pub payment_value: i64,
        pub operating_expenses: i64,
        pub expense_note: String,
        pub daily_stipend_paid: bool,
        pub total: i64,
        pub status: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Aggregate figures over the returned slice.
    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SummaryView {
        pub count: u64,
        pub total_sales: i64,
        pub total_expenses: i64,
        pub net_balance: i64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EntriesResponse {
        pub entries: Vec<EntryView>,
        pub summary: SummaryView,
    }
}

pub mod sale {
    use super::*;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct SaleNew {
        pub date: Option<DateTime<Utc>>,
        pub time_of_day: Option<String>,
        pub product_name: Option<String>,
        pub product_value: Option<i64>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct SalePatch {
        pub date: Option<DateTime<Utc>>,
        pub time_of_day: Option<String>,
        pub product_name: Option<String>,
        pub product_value: Option<i64>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SaleView {
        pub id: String,
        pub date: DateTime<Utc>,
        pub time_of_day: String,
        pub product_name: String,
        pub product_value: i64,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SalesResponse {
        pub sales: Vec<SaleView>,
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DashboardResponse {
        pub entry_count: u64,
        pub monthly_sales_income: i64,
        pub today_transaction_count: u64,
        pub report_count: u64,
        pub recent_entries: Vec<entry::EntryView>,
        pub recent_sales: Vec<sale::SaleView>,
    }
}

pub mod report {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ReportFormat {
        #[default]
        Csv,
        Pdf,
    }

    impl ReportFormat {
        pub fn extension(self) -> &'static str {
            match self {
                Self::Csv => "csv",
                Self::Pdf => "pdf",
            }
        }
    }
}

pub mod error {
    use super::*;

    /// Generic error body for 4xx/5xx responses.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ErrorResponse {
        pub error: String,
    }

    /// One violated validation rule.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FieldViolation {
        pub field: String,
        pub message: String,
    }

    /// 422 body carrying the full violation list.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ValidationErrorResponse {
        pub error: String,
        pub violations: Vec<FieldViolation>,
    }
}

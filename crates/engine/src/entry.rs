//! Accounting entries: one per business day, recording sales, expenses
//! and how the takings were settled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    error::EngineError,
    money::Pesos,
    payment::PaymentMethod,
    store::Document,
    timestamp::{amount_from, encode_date, required_date},
    totals::compute_total,
};

/// Soft-delete marker. Inactive entries stay addressable but are
/// excluded from default listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    #[default]
    Active,
    Inactive,
}

impl EntryStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl TryFrom<&str> for EntryStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(EngineError::Document(format!("unknown status: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountingEntry {
    pub id: String,
    pub registration_date: DateTime<Utc>,
    pub sales_value: Pesos,
    pub sales_note: String,
    pub payment_method: PaymentMethod,
    pub payment_value: Pesos,
    pub operating_expenses: Pesos,
    pub expense_note: String,
    pub daily_stipend_paid: bool,
    /// Derived figure, recomputed on every write. Stored so listings and
    /// exports never recompute it per row.
    pub total: Pesos,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for AccountingEntry {
    fn default() -> Self {
        Self {
            id: String::new(),
            registration_date: DateTime::<Utc>::default(),
            sales_value: Pesos::ZERO,
            sales_note: String::new(),
            payment_method: PaymentMethod::Cash,
            payment_value: Pesos::ZERO,
            operating_expenses: Pesos::ZERO,
            expense_note: String::new(),
            daily_stipend_paid: false,
            total: Pesos::ZERO,
            status: EntryStatus::Active,
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        }
    }
}

const NULL: Value = Value::Null;

fn field<'a>(body: &'a Value, key: &str) -> &'a Value {
    body.get(key).unwrap_or(&NULL)
}

impl AccountingEntry {
    /// Decodes a stored document. Timestamps are classified once here;
    /// an unparseable date is an error, never silently `None`.
    pub fn from_document(doc: &Document) -> Result<Self, EngineError> {
        let body = &doc.body;
        let method = field(body, "paymentMethod")
            .as_str()
            .ok_or_else(|| EngineError::Document("paymentMethod is missing".to_string()))?;
        let status = match field(body, "status").as_str() {
            None => EntryStatus::Active,
            Some(raw) => EntryStatus::try_from(raw)?,
        };
        Ok(Self {
            id: doc.id.clone(),
            registration_date: required_date(field(body, "registrationDate"), "registrationDate")?,
            sales_value: amount_from(field(body, "salesValue")),
            sales_note: field(body, "salesNote").as_str().unwrap_or_default().to_string(),
            payment_method: PaymentMethod::try_from(method)?,
            payment_value: amount_from(field(body, "paymentValue")),
            operating_expenses: amount_from(field(body, "operatingExpenses")),
            expense_note: field(body, "expenseNote").as_str().unwrap_or_default().to_string(),
            daily_stipend_paid: field(body, "dailyStipendPaid").as_bool().unwrap_or(false),
            total: amount_from(field(body, "total")),
            status,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }

    /// Full document body for this entry. Keys are the store's wire
    /// names, not the Rust field names.
    #[must_use]
    pub fn body(&self) -> Value {
        json!({
            "registrationDate": encode_date(self.registration_date),
            "salesValue": self.sales_value,
            "salesNote": self.sales_note,
            "paymentMethod": self.payment_method.as_str(),
            "paymentValue": self.payment_value,
            "operatingExpenses": self.operating_expenses,
            "expenseNote": self.expense_note,
            "dailyStipendPaid": self.daily_stipend_paid,
            "total": self.total,
            "status": self.status.as_str(),
        })
    }
}

/// Candidate entry as received from a client, before validation.
#[derive(Clone, Debug, Default)]
pub struct EntryDraft {
    pub registration_date: Option<DateTime<Utc>>,
    pub sales_value: Option<Pesos>,
    pub sales_note: String,
    pub payment_method: Option<String>,
    pub payment_value: Option<Pesos>,
    pub operating_expenses: Option<Pesos>,
    pub expense_note: String,
    pub daily_stipend_paid: bool,
}

/// A draft that passed creation-scope validation.
#[derive(Clone, Debug)]
pub struct NewEntry {
    pub registration_date: DateTime<Utc>,
    pub sales_value: Pesos,
    pub sales_note: String,
    pub payment_method: PaymentMethod,
    pub payment_value: Pesos,
    pub operating_expenses: Pesos,
    pub expense_note: String,
    pub daily_stipend_paid: bool,
}

impl NewEntry {
    pub(crate) fn into_entry_at(self, now: DateTime<Utc>) -> AccountingEntry {
        let total = compute_total(self.sales_value, self.operating_expenses, self.daily_stipend_paid);
        AccountingEntry {
            id: String::new(),
            registration_date: self.registration_date,
            sales_value: self.sales_value,
            sales_note: self.sales_note,
            payment_method: self.payment_method,
            payment_value: self.payment_value,
            operating_expenses: self.operating_expenses,
            expense_note: self.expense_note,
            daily_stipend_paid: self.daily_stipend_paid,
            total,
            status: EntryStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. `None` leaves the stored field untouched.
#[derive(Clone, Debug, Default)]
pub struct EntryPatch {
    pub registration_date: Option<DateTime<Utc>>,
    pub sales_value: Option<Pesos>,
    pub sales_note: Option<String>,
    pub payment_method: Option<String>,
    pub payment_value: Option<Pesos>,
    pub operating_expenses: Option<Pesos>,
    pub expense_note: Option<String>,
    pub daily_stipend_paid: Option<bool>,
    pub status: Option<String>,
}

impl EntryPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registration_date.is_none()
            && self.sales_value.is_none()
            && self.sales_note.is_none()
            && self.payment_method.is_none()
            && self.payment_value.is_none()
            && self.operating_expenses.is_none()
            && self.expense_note.is_none()
            && self.daily_stipend_paid.is_none()
            && self.status.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn doc(body: Value) -> Document {
        Document {
            id: "e-1".to_string(),
            collection: "accounting-entries".to_string(),
            occurred_at: Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap(),
            body,
            created_at: Utc.with_ymd_and_hms(2026, 2, 10, 9, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 2, 11, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn decodes_a_stored_entry() {
        let entry = AccountingEntry::from_document(&doc(json!({
            "registrationDate": 1_700_000_000_000_i64,
            "salesValue": 150_000,
            "salesNote": "weekend market stall",
            "paymentMethod": "bank_deposit",
            "paymentValue": 150_000,
            "operatingExpenses": 12_500.9,
            "expenseNote": "ice and transport",
            "dailyStipendPaid": true,
            "total": 77_500,
            "status": "inactive",
        })))
        .unwrap();
        assert_eq!(entry.sales_value, Pesos::new(150_000));
        assert_eq!(entry.operating_expenses, Pesos::new(12_500));
        assert_eq!(entry.payment_method, PaymentMethod::BankDeposit);
        assert_eq!(entry.status, EntryStatus::Inactive);
        assert!(entry.daily_stipend_paid);
    }

    #[test]
    fn missing_status_defaults_to_active() {
        let entry = AccountingEntry::from_document(&doc(json!({
            "registrationDate": "2026-02-10T00:00:00Z",
            "paymentMethod": "cash",
        })))
        .unwrap();
        assert_eq!(entry.status, EntryStatus::Active);
        assert_eq!(entry.sales_value, Pesos::ZERO);
    }

    #[test]
    fn rejects_an_unparseable_registration_date() {
        let err = AccountingEntry::from_document(&doc(json!({
            "registrationDate": "sometime in february",
            "paymentMethod": "cash",
        })))
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTimestamp(_)));
    }

    #[test]
    fn body_round_trips_through_from_document() {
        let entry = AccountingEntry {
            id: "e-1".to_string(),
            registration_date: Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap(),
            sales_value: Pesos::new(100_000),
            sales_note: "weekend market stall".to_string(),
            payment_method: PaymentMethod::HandoverToAgent,
            payment_value: Pesos::new(100_000),
            operating_expenses: Pesos::new(20_000),
            expense_note: "ice and transport".to_string(),
            daily_stipend_paid: true,
            total: Pesos::new(20_000),
            status: EntryStatus::Active,
            created_at: Utc.with_ymd_and_hms(2026, 2, 10, 9, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 2, 11, 9, 0, 0).unwrap(),
        };
        let decoded = AccountingEntry::from_document(&doc(entry.body())).unwrap();
        assert_eq!(decoded, entry);
    }
}

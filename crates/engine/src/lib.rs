use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde_json::{Map, Value};
use tokio::sync::watch;

pub use entry::{AccountingEntry, EntryDraft, EntryPatch, EntryStatus, NewEntry};
pub use error::EngineError;
pub use form::EntryForm;
pub use money::Pesos;
pub use payment::PaymentMethod;
pub use sale::{DailySale, NewSale, RECORD_TYPE_DAILY_SALE, SaleDraft, SalePatch};
pub use store::{DateRange, Document, DocumentStore};
pub use timestamp::{RawTimestamp, amount_from, canonical_date};
pub use totals::{
    DAILY_STIPEND, Dashboard, Summary, aggregate, compute_total, day_start, month_start,
    report_count,
};
pub use validate::{
    MIN_NOTE_LEN, MIN_PRODUCT_NAME_LEN, Violation, ViolationSet, validate_new_entry,
    validate_new_sale,
};

mod entry;
mod error;
mod form;
mod money;
mod payment;
mod sale;
mod store;
mod timestamp;
mod totals;
mod validate;

/// Collection holding accounting entries.
pub const ENTRIES_COLLECTION: &str = "accounting-entries";
/// Collection holding point-of-sale line items.
pub const SALES_COLLECTION: &str = "daily-sales";

/// How many recent records the dashboard carries per kind.
const DASHBOARD_RECENT: usize = 5;

type ResultEngine<T> = Result<T, EngineError>;

/// Outcome of [`Ledger::relocate_daily_sales`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelocationReport {
    pub migrated: u64,
    pub errors: u64,
}

fn is_misfiled_sale(doc: &Document) -> bool {
    doc.body.get("recordType").and_then(Value::as_str) == Some(RECORD_TYPE_DAILY_SALE)
}

/// The bookkeeping facade. Owns the document store and with it the
/// database connection and the live-query channels.
#[derive(Debug)]
pub struct Ledger {
    store: DocumentStore,
}

impl Ledger {
    #[must_use]
    pub fn new(database: DatabaseConnection) -> Self {
        Self {
            store: DocumentStore::new(database),
        }
    }

    /// Validates a draft with creation-scope rules, computes the total
    /// and persists the entry.
    pub async fn new_entry(&self, draft: EntryDraft) -> ResultEngine<AccountingEntry> {
        let accepted = validate_new_entry(&draft).map_err(EngineError::Invalid)?;
        let entry = accepted.into_entry_at(Utc::now());
        let doc = self
            .store
            .create(ENTRIES_COLLECTION, entry.registration_date, entry.body())
            .await?;
        AccountingEntry::from_document(&doc)
    }

    pub async fn entry(&self, id: &str) -> ResultEngine<AccountingEntry> {
        let doc = self.store.get(ENTRIES_COLLECTION, id).await?;
        AccountingEntry::from_document(&doc)
    }

    /// Entries in the range, newest registration date first. Sale
    /// documents still sitting in this collection are skipped, not
    /// decoded (see [`Ledger::relocate_daily_sales`]).
    pub async fn entries(&self, range: DateRange) -> ResultEngine<Vec<AccountingEntry>> {
        let docs = self.store.query(ENTRIES_COLLECTION, range).await?;
        let mut entries = Vec::with_capacity(docs.len());
        for doc in &docs {
            if is_misfiled_sale(doc) {
                continue;
            }
            entries.push(AccountingEntry::from_document(doc)?);
        }
        Ok(entries)
    }

    /// Applies a partial update. Incoming fields are threaded through
    /// [`EntryForm`] setters in a fixed order (method, sales, payment,
    /// then the rest) so the payment-propagation rule holds for API
    /// edits too. Only fields that actually changed are written, plus
    /// the recomputed total.
    pub async fn update_entry(&self, id: &str, patch: EntryPatch) -> ResultEngine<AccountingEntry> {
        if patch.is_empty() {
            return self.entry(id).await;
        }
        let before = self.entry(id).await?;
        let mut form = EntryForm::from(&before);
        let mut violations = ViolationSet::default();

        if let Some(raw) = &patch.payment_method {
            match PaymentMethod::try_from(raw.as_str()) {
                Ok(method) => form.set_payment_method(method),
                Err(_) => violations.push(Violation::UnknownPaymentMethod(raw.clone())),
            }
        }
        if let Some(value) = patch.sales_value {
            form.set_sales_value(value);
        }
        if let Some(value) = patch.payment_value {
            form.set_payment_value(value);
        }
        if let Some(date) = patch.registration_date {
            form.set_registration_date(date);
        }
        if let Some(note) = patch.sales_note {
            form.set_sales_note(note);
        }
        if let Some(value) = patch.operating_expenses {
            form.set_operating_expenses(value);
        }
        if let Some(note) = patch.expense_note {
            form.set_expense_note(note);
        }
        if let Some(paid) = patch.daily_stipend_paid {
            form.set_daily_stipend_paid(paid);
        }
        if let Some(raw) = &patch.status {
            match EntryStatus::try_from(raw.as_str()) {
                Ok(status) => form.set_status(status),
                Err(_) => violations.push(Violation::UnknownStatus(raw.clone())),
            }
        }

        violations.extend(form.violations());
        if !violations.is_empty() {
            return Err(EngineError::Invalid(violations));
        }

        let mut fields = Map::new();
        if form.registration_date() != before.registration_date {
            fields.insert(
                "registrationDate".to_string(),
                timestamp::encode_date(form.registration_date()),
            );
        }
        if form.sales_value() != before.sales_value {
            fields.insert("salesValue".to_string(), form.sales_value().value().into());
        }
        if form.sales_note() != before.sales_note {
            fields.insert("salesNote".to_string(), form.sales_note().into());
        }
        if form.payment_method() != before.payment_method {
            fields.insert(
                "paymentMethod".to_string(),
                form.payment_method().as_str().into(),
            );
        }
        if form.payment_value() != before.payment_value {
            fields.insert("paymentValue".to_string(), form.payment_value().value().into());
        }
        if form.operating_expenses() != before.operating_expenses {
            fields.insert(
                "operatingExpenses".to_string(),
                form.operating_expenses().value().into(),
            );
        }
        if form.expense_note() != before.expense_note {
            fields.insert("expenseNote".to_string(), form.expense_note().into());
        }
        if form.daily_stipend_paid() != before.daily_stipend_paid {
            fields.insert(
                "dailyStipendPaid".to_string(),
                form.daily_stipend_paid().into(),
            );
        }
        if form.status() != before.status {
            fields.insert("status".to_string(), form.status().as_str().into());
        }
        if form.total() != before.total {
            fields.insert("total".to_string(), form.total().value().into());
        }

        let occurred_at = (form.registration_date() != before.registration_date)
            .then(|| form.registration_date());
        let doc = self
            .store
            .update_fields(ENTRIES_COLLECTION, id, fields, occurred_at)
            .await?;
        AccountingEntry::from_document(&doc)
    }

    /// Soft delete / restore.
    pub async fn set_entry_status(
        &self,
        id: &str,
        status: EntryStatus,
    ) -> ResultEngine<AccountingEntry> {
        let mut fields = Map::new();
        fields.insert("status".to_string(), status.as_str().into());
        let doc = self
            .store
            .update_fields(ENTRIES_COLLECTION, id, fields, None)
            .await?;
        AccountingEntry::from_document(&doc)
    }

    pub async fn delete_entry(&self, id: &str) -> ResultEngine<()> {
        self.store.delete(ENTRIES_COLLECTION, id).await
    }

    pub async fn new_sale(&self, draft: SaleDraft) -> ResultEngine<DailySale> {
        let accepted = validate_new_sale(&draft).map_err(EngineError::Invalid)?;
        let sale = accepted.into_sale_at(Utc::now());
        let doc = self
            .store
            .create(SALES_COLLECTION, sale.date, sale.body())
            .await?;
        DailySale::from_document(&doc)
    }

    pub async fn sale(&self, id: &str) -> ResultEngine<DailySale> {
        let doc = self.store.get(SALES_COLLECTION, id).await?;
        DailySale::from_document(&doc)
    }

    pub async fn sales(&self, range: DateRange) -> ResultEngine<Vec<DailySale>> {
        let docs = self.store.query(SALES_COLLECTION, range).await?;
        docs.iter().map(DailySale::from_document).collect()
    }

    pub async fn update_sale(&self, id: &str, patch: SalePatch) -> ResultEngine<DailySale> {
        if patch.is_empty() {
            return self.sale(id).await;
        }
        let before = self.sale(id).await?;
        let mut violations = ViolationSet::default();

        if let Some(name) = &patch.product_name {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                violations.push(Violation::MissingProductName);
            } else if trimmed.chars().count() < MIN_PRODUCT_NAME_LEN {
                violations.push(Violation::ProductNameTooShort);
            }
        }
        if let Some(value) = patch.product_value
            && value.is_negative()
        {
            violations.push(Violation::NegativeProductValue);
        }
        if !violations.is_empty() {
            return Err(EngineError::Invalid(violations));
        }

        let mut fields = Map::new();
        if let Some(date) = patch.date
            && date != before.date
        {
            fields.insert("date".to_string(), timestamp::encode_date(date));
        }
        if let Some(time) = patch.time_of_day
            && time != before.time_of_day
        {
            fields.insert("timeOfDay".to_string(), time.into());
        }
        if let Some(name) = patch.product_name
            && name != before.product_name
        {
            fields.insert("productName".to_string(), name.trim().into());
        }
        if let Some(value) = patch.product_value
            && value != before.product_value
        {
            fields.insert("productValue".to_string(), value.value().into());
        }

        let occurred_at = patch.date.filter(|date| *date != before.date);
        let doc = self
            .store
            .update_fields(SALES_COLLECTION, id, fields, occurred_at)
            .await?;
        DailySale::from_document(&doc)
    }

    pub async fn delete_sale(&self, id: &str) -> ResultEngine<()> {
        self.store.delete(SALES_COLLECTION, id).await
    }

    /// Landing-page figures, relative to `now`.
    pub async fn dashboard(&self, now: DateTime<Utc>) -> ResultEngine<Dashboard> {
        let entries = self.entries(DateRange::all()).await?;
        let sales = self.sales(DateRange::all()).await?;

        let month = month_start(now);
        let today = day_start(now);

        let monthly_sales_income = sales
            .iter()
            .filter(|sale| sale.date >= month && sale.date <= now)
            .map(|sale| sale.product_value)
            .sum();
        let today_transaction_count = sales.iter().filter(|sale| sale.date >= today).count()
            + entries
                .iter()
                .filter(|entry| entry.registration_date >= today)
                .count();

        let entry_count = entries.len() as u64;
        Ok(Dashboard {
            entry_count,
            monthly_sales_income,
            today_transaction_count: today_transaction_count as u64,
            report_count: report_count(entry_count),
            recent_entries: entries.into_iter().take(DASHBOARD_RECENT).collect(),
            recent_sales: sales.into_iter().take(DASHBOARD_RECENT).collect(),
        })
    }

    /// Live snapshots of the accounting collection.
    pub async fn subscribe_entries(&self) -> ResultEngine<watch::Receiver<Vec<Document>>> {
        self.store.subscribe(ENTRIES_COLLECTION).await
    }

    /// Live snapshots of the daily-sales collection.
    pub async fn subscribe_sales(&self) -> ResultEngine<watch::Receiver<Vec<Document>>> {
        self.store.subscribe(SALES_COLLECTION).await
    }

    /// Moves sale documents that were recorded into the accounting
    /// collection over to the daily-sales collection: copy first, then
    /// delete the original. Failures are counted and skipped, never
    /// rolled back, so rerunning picks up what is left.
    pub async fn relocate_daily_sales(&self) -> ResultEngine<RelocationReport> {
        let docs = self.store.query(ENTRIES_COLLECTION, DateRange::all()).await?;
        let mut report = RelocationReport::default();

        for doc in docs {
            if !is_misfiled_sale(&doc) {
                continue;
            }
            let copied = self
                .store
                .create(SALES_COLLECTION, doc.occurred_at, doc.body.clone())
                .await;
            match copied {
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!(id = %doc.id, %error, "failed to copy sale document");
                    report.errors += 1;
                    continue;
                }
            }
            match self.store.delete(ENTRIES_COLLECTION, &doc.id).await {
                Ok(()) => report.migrated += 1,
                Err(error) => {
                    tracing::warn!(id = %doc.id, %error, "failed to delete relocated document");
                    report.errors += 1;
                }
            }
        }

        tracing::info!(
            migrated = report.migrated,
            errors = report.errors,
            "sale relocation finished"
        );
        Ok(report)
    }

    /// How many sale documents still sit in the accounting collection.
    pub async fn misfiled_sales_count(&self) -> ResultEngine<u64> {
        let docs = self.store.query(ENTRIES_COLLECTION, DateRange::all()).await?;
        Ok(docs.iter().filter(|doc| is_misfiled_sale(doc)).count() as u64)
    }
}

//! Point-of-sale line items, recorded one per product sold.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::{
    error::EngineError,
    money::Pesos,
    store::Document,
    timestamp::{amount_from, encode_date, required_date},
};

/// Discriminator stamped on every daily-sale body. Sales documents that
/// ended up in the accounting collection are recognized by it.
pub const RECORD_TYPE_DAILY_SALE: &str = "daily-sale";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DailySale {
    pub id: String,
    pub date: DateTime<Utc>,
    /// Clock time the sale was rung up, "HH:MM".
    pub time_of_day: String,
    pub product_name: String,
    pub product_value: Pesos,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const NULL: Value = Value::Null;

fn field<'a>(body: &'a Value, key: &str) -> &'a Value {
    body.get(key).unwrap_or(&NULL)
}

impl DailySale {
    pub fn from_document(doc: &Document) -> Result<Self, EngineError> {
        let body = &doc.body;
        Ok(Self {
            id: doc.id.clone(),
            date: required_date(field(body, "date"), "date")?,
            time_of_day: field(body, "timeOfDay").as_str().unwrap_or_default().to_string(),
            product_name: field(body, "productName").as_str().unwrap_or_default().to_string(),
            product_value: amount_from(field(body, "productValue")),
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }

    #[must_use]
    pub fn body(&self) -> Value {
        json!({
            "date": encode_date(self.date),
            "timeOfDay": self.time_of_day,
            "productName": self.product_name,
            "productValue": self.product_value,
            "recordType": RECORD_TYPE_DAILY_SALE,
        })
    }
}

/// Candidate sale line as received from a client.
#[derive(Clone, Debug, Default)]
pub struct SaleDraft {
    pub date: Option<DateTime<Utc>>,
    pub time_of_day: String,
    pub product_name: String,
    pub product_value: Option<Pesos>,
}

/// A draft that passed validation.
#[derive(Clone, Debug)]
pub struct NewSale {
    pub date: DateTime<Utc>,
    pub time_of_day: String,
    pub product_name: String,
    pub product_value: Pesos,
}

impl NewSale {
    pub(crate) fn into_sale_at(self, now: DateTime<Utc>) -> DailySale {
        DailySale {
            id: String::new(),
            date: self.date,
            time_of_day: self.time_of_day,
            product_name: self.product_name,
            product_value: self.product_value,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. `None` leaves the stored field untouched.
#[derive(Clone, Debug, Default)]
pub struct SalePatch {
    pub date: Option<DateTime<Utc>>,
    pub time_of_day: Option<String>,
    pub product_name: Option<String>,
    pub product_value: Option<Pesos>,
}

impl SalePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.time_of_day.is_none()
            && self.product_name.is_none()
            && self.product_value.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn body_carries_the_record_type() {
        let sale = DailySale {
            id: "s-1".to_string(),
            date: Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap(),
            time_of_day: "14:30".to_string(),
            product_name: "panela block".to_string(),
            product_value: Pesos::new(8_000),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let body = sale.body();
        assert_eq!(body["recordType"], RECORD_TYPE_DAILY_SALE);
        assert_eq!(body["productValue"], 8_000);
    }
}

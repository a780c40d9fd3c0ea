//! Validation of candidate records before they reach the store.
//!
//! These are pure functions, independent of HTTP and of any form library.
//! Every rule is evaluated and every failure collected, so callers can
//! render the full list of problems at once instead of fixing them one
//! round-trip at a time.

use std::fmt;

use crate::{
    entry::{EntryDraft, NewEntry},
    money::Pesos,
    payment::PaymentMethod,
    sale::{NewSale, SaleDraft},
};

/// Minimum length for the sales/expense notes captured on entry creation.
pub const MIN_NOTE_LEN: usize = 10;
/// Minimum length for a sold product's name.
pub const MIN_PRODUCT_NAME_LEN: usize = 3;

/// One violated validation rule, tied to the field it concerns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    MissingRegistrationDate,
    MissingSalesValue,
    NegativeSalesValue,
    MissingOperatingExpenses,
    NegativeOperatingExpenses,
    MissingSalesNote,
    SalesNoteTooShort,
    MissingExpenseNote,
    ExpenseNoteTooShort,
    MissingPaymentMethod,
    UnknownPaymentMethod(String),
    MissingPaymentValue,
    NegativePaymentValue,
    /// Cross-field rule: handover-to-agent requires payment == sales.
    PaymentMismatch {
        sales_value: Pesos,
        payment_value: Pesos,
    },
    UnknownStatus(String),
    MissingSaleDate,
    MissingTimeOfDay,
    MissingProductName,
    ProductNameTooShort,
    MissingProductValue,
    NegativeProductValue,
}

impl Violation {
    /// The wire-level field name the violation concerns.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingRegistrationDate => "registrationDate",
            Self::MissingSalesValue | Self::NegativeSalesValue => "salesValue",
            Self::MissingOperatingExpenses | Self::NegativeOperatingExpenses => {
                "operatingExpenses"
            }
            Self::MissingSalesNote | Self::SalesNoteTooShort => "salesNote",
            Self::MissingExpenseNote | Self::ExpenseNoteTooShort => "expenseNote",
            Self::MissingPaymentMethod | Self::UnknownPaymentMethod(_) => "paymentMethod",
            Self::MissingPaymentValue
            | Self::NegativePaymentValue
            | Self::PaymentMismatch { .. } => "paymentValue",
            Self::UnknownStatus(_) => "status",
            Self::MissingSaleDate => "date",
            Self::MissingTimeOfDay => "timeOfDay",
            Self::MissingProductName | Self::ProductNameTooShort => "productName",
            Self::MissingProductValue | Self::NegativeProductValue => "productValue",
        }
    }

    /// Human-readable description, suitable for direct display.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::MissingRegistrationDate => "registration date is required".to_string(),
            Self::MissingSalesValue => "sales value is required".to_string(),
            Self::NegativeSalesValue => "sales value must be at least 0".to_string(),
            Self::MissingOperatingExpenses => "operating expenses are required".to_string(),
            Self::NegativeOperatingExpenses => {
                "operating expenses must be at least 0".to_string()
            }
            Self::MissingSalesNote => "sales note is required".to_string(),
            Self::SalesNoteTooShort => {
                format!("sales note must be at least {MIN_NOTE_LEN} characters")
            }
            Self::MissingExpenseNote => "expense note is required".to_string(),
            Self::ExpenseNoteTooShort => {
                format!("expense note must be at least {MIN_NOTE_LEN} characters")
            }
            Self::MissingPaymentMethod => "payment method is required".to_string(),
            Self::UnknownPaymentMethod(raw) => format!("unknown payment method: {raw}"),
            Self::MissingPaymentValue => "payment value is required".to_string(),
            Self::NegativePaymentValue => "payment value must be at least 0".to_string(),
            Self::PaymentMismatch {
                sales_value,
                payment_value,
            } => format!(
                "handover to agent requires the payment to equal the sales value \
                 (sales {sales_value}, payment {payment_value})"
            ),
            Self::UnknownStatus(raw) => format!("unknown status: {raw}"),
            Self::MissingSaleDate => "sale date is required".to_string(),
            Self::MissingTimeOfDay => "time of day is required".to_string(),
            Self::MissingProductName => "product name is required".to_string(),
            Self::ProductNameTooShort => {
                format!("product name must be at least {MIN_PRODUCT_NAME_LEN} characters")
            }
            Self::MissingProductValue => "product value is required".to_string(),
            Self::NegativeProductValue => "product value must be at least 0".to_string(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field(), self.message())
    }
}

/// Every rule a candidate record violated, in evaluation order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViolationSet(Vec<Violation>);

impl ViolationSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    pub fn extend(&mut self, other: ViolationSet) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    #[must_use]
    pub fn contains(&self, violation: &Violation) -> bool {
        self.0.contains(violation)
    }
}

impl fmt::Display for ViolationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for violation in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
            first = false;
        }
        Ok(())
    }
}

impl IntoIterator for ViolationSet {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn check_note(note: &str, missing: Violation, too_short: Violation, out: &mut ViolationSet) {
    let trimmed = note.trim();
    if trimmed.is_empty() {
        out.push(missing);
    } else if trimmed.chars().count() < MIN_NOTE_LEN {
        out.push(too_short);
    }
}

/// Validates a candidate accounting entry from the creation flow.
///
/// Note rules apply here only; edit and listing flows do not re-validate
/// notes (see [`EntryForm::violations`](crate::EntryForm::violations)).
pub fn validate_new_entry(draft: &EntryDraft) -> Result<NewEntry, ViolationSet> {
    let mut violations = ViolationSet::default();

    if draft.registration_date.is_none() {
        violations.push(Violation::MissingRegistrationDate);
    }
    match draft.sales_value {
        None => violations.push(Violation::MissingSalesValue),
        Some(v) if v.is_negative() => violations.push(Violation::NegativeSalesValue),
        Some(_) => {}
    }
    match draft.operating_expenses {
        None => violations.push(Violation::MissingOperatingExpenses),
        Some(v) if v.is_negative() => violations.push(Violation::NegativeOperatingExpenses),
        Some(_) => {}
    }
    check_note(
        &draft.sales_note,
        Violation::MissingSalesNote,
        Violation::SalesNoteTooShort,
        &mut violations,
    );
    check_note(
        &draft.expense_note,
        Violation::MissingExpenseNote,
        Violation::ExpenseNoteTooShort,
        &mut violations,
    );

    let method = match draft.payment_method.as_deref() {
        None | Some("") => {
            violations.push(Violation::MissingPaymentMethod);
            None
        }
        Some(raw) => match PaymentMethod::try_from(raw) {
            Ok(method) => Some(method),
            Err(_) => {
                violations.push(Violation::UnknownPaymentMethod(raw.to_string()));
                None
            }
        },
    };
    match draft.payment_value {
        None => violations.push(Violation::MissingPaymentValue),
        Some(v) if v.is_negative() => violations.push(Violation::NegativePaymentValue),
        Some(_) => {}
    }

    // Cross-field rule, vacuous unless the method is handover-to-agent.
    if let (Some(PaymentMethod::HandoverToAgent), Some(sales), Some(payment)) =
        (method, draft.sales_value, draft.payment_value)
        && sales != payment
    {
        violations.push(Violation::PaymentMismatch {
            sales_value: sales,
            payment_value: payment,
        });
    }

    if !violations.is_empty() {
        return Err(violations);
    }

    // All `None` cases produced a violation above, so these are present.
    Ok(NewEntry {
        registration_date: draft.registration_date.unwrap_or_default(),
        sales_value: draft.sales_value.unwrap_or_default(),
        sales_note: draft.sales_note.trim().to_string(),
        payment_method: method.unwrap_or(PaymentMethod::Cash),
        payment_value: draft.payment_value.unwrap_or_default(),
        operating_expenses: draft.operating_expenses.unwrap_or_default(),
        expense_note: draft.expense_note.trim().to_string(),
        daily_stipend_paid: draft.daily_stipend_paid,
    })
}

/// Validates a candidate point-of-sale line item.
pub fn validate_new_sale(draft: &SaleDraft) -> Result<NewSale, ViolationSet> {
    let mut violations = ViolationSet::default();

    if draft.date.is_none() {
        violations.push(Violation::MissingSaleDate);
    }
    if draft.time_of_day.trim().is_empty() {
        violations.push(Violation::MissingTimeOfDay);
    }
    let name = draft.product_name.trim();
    if name.is_empty() {
        violations.push(Violation::MissingProductName);
    } else if name.chars().count() < MIN_PRODUCT_NAME_LEN {
        violations.push(Violation::ProductNameTooShort);
    }
    match draft.product_value {
        None => violations.push(Violation::MissingProductValue),
        Some(v) if v.is_negative() => violations.push(Violation::NegativeProductValue),
        Some(_) => {}
    }

    if !violations.is_empty() {
        return Err(violations);
    }

    Ok(NewSale {
        date: draft.date.unwrap_or_default(),
        time_of_day: draft.time_of_day.trim().to_string(),
        product_name: name.to_string(),
        product_value: draft.product_value.unwrap_or_default(),
    })
}

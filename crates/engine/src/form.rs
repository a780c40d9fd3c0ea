//! Edit-state holder for an accounting entry.
//!
//! One form instance per edit flow, owned by its caller. The setters
//! carry the one-directional propagation rule between the payment
//! method, the sales value and the payment value; routing a patch's
//! fields through them gives API edits the same behavior as an
//! interactive form.

use chrono::{DateTime, Utc};

use crate::{
    entry::{AccountingEntry, EntryStatus},
    money::Pesos,
    payment::PaymentMethod,
    totals::compute_total,
    validate::{Violation, ViolationSet},
};

#[derive(Clone, Debug)]
pub struct EntryForm {
    registration_date: DateTime<Utc>,
    sales_value: Pesos,
    sales_note: String,
    payment_method: PaymentMethod,
    payment_value: Pesos,
    operating_expenses: Pesos,
    expense_note: String,
    daily_stipend_paid: bool,
    status: EntryStatus,
}

impl EntryForm {
    #[must_use]
    pub fn registration_date(&self) -> DateTime<Utc> {
        self.registration_date
    }

    #[must_use]
    pub fn sales_value(&self) -> Pesos {
        self.sales_value
    }

    #[must_use]
    pub fn sales_note(&self) -> &str {
        &self.sales_note
    }

    #[must_use]
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    #[must_use]
    pub fn payment_value(&self) -> Pesos {
        self.payment_value
    }

    #[must_use]
    pub fn operating_expenses(&self) -> Pesos {
        self.operating_expenses
    }

    #[must_use]
    pub fn expense_note(&self) -> &str {
        &self.expense_note
    }

    #[must_use]
    pub fn daily_stipend_paid(&self) -> bool {
        self.daily_stipend_paid
    }

    #[must_use]
    pub fn status(&self) -> EntryStatus {
        self.status
    }

    /// Switching to handover-to-agent snaps the payment to the current
    /// sales value. Switching away leaves the payment as entered.
    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
        if method == PaymentMethod::HandoverToAgent {
            self.payment_value = self.sales_value;
        }
    }

    /// While the method is handover-to-agent the payment follows the
    /// sales value.
    pub fn set_sales_value(&mut self, value: Pesos) {
        self.sales_value = value;
        if self.payment_method == PaymentMethod::HandoverToAgent {
            self.payment_value = value;
        }
    }

    /// Never propagates back into the sales value.
    pub fn set_payment_value(&mut self, value: Pesos) {
        self.payment_value = value;
    }

    pub fn set_registration_date(&mut self, date: DateTime<Utc>) {
        self.registration_date = date;
    }

    pub fn set_sales_note(&mut self, note: String) {
        self.sales_note = note;
    }

    pub fn set_operating_expenses(&mut self, value: Pesos) {
        self.operating_expenses = value;
    }

    pub fn set_expense_note(&mut self, note: String) {
        self.expense_note = note;
    }

    pub fn set_daily_stipend_paid(&mut self, paid: bool) {
        self.daily_stipend_paid = paid;
    }

    pub fn set_status(&mut self, status: EntryStatus) {
        self.status = status;
    }

    /// Edit-scope validation. Note-length rules apply only to the
    /// creation flow, so here only the sign rules and the cross-field
    /// payment rule are checked.
    #[must_use]
    pub fn violations(&self) -> ViolationSet {
        let mut violations = ViolationSet::default();
        if self.sales_value.is_negative() {
            violations.push(Violation::NegativeSalesValue);
        }
        if self.operating_expenses.is_negative() {
            violations.push(Violation::NegativeOperatingExpenses);
        }
        if self.payment_value.is_negative() {
            violations.push(Violation::NegativePaymentValue);
        }
        if self.payment_method == PaymentMethod::HandoverToAgent
            && self.payment_value != self.sales_value
        {
            violations.push(Violation::PaymentMismatch {
                sales_value: self.sales_value,
                payment_value: self.payment_value,
            });
        }
        violations
    }

    #[must_use]
    pub fn total(&self) -> Pesos {
        compute_total(self.sales_value, self.operating_expenses, self.daily_stipend_paid)
    }
}

impl From<&AccountingEntry> for EntryForm {
    fn from(entry: &AccountingEntry) -> Self {
        Self {
            registration_date: entry.registration_date,
            sales_value: entry.sales_value,
            sales_note: entry.sales_note.clone(),
            payment_method: entry.payment_method,
            payment_value: entry.payment_value,
            operating_expenses: entry.operating_expenses,
            expense_note: entry.expense_note.clone(),
            daily_stipend_paid: entry.daily_stipend_paid,
            status: entry.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with(sales: i64, method: PaymentMethod, payment: i64) -> EntryForm {
        let entry = AccountingEntry {
            sales_value: Pesos::new(sales),
            payment_method: method,
            payment_value: Pesos::new(payment),
            ..AccountingEntry::default()
        };
        EntryForm::from(&entry)
    }

    #[test]
    fn switching_to_handover_copies_the_sales_value() {
        let mut form = form_with(50_000, PaymentMethod::Cash, 0);
        form.set_payment_method(PaymentMethod::HandoverToAgent);
        assert_eq!(form.payment_value(), Pesos::new(50_000));
    }

    #[test]
    fn sales_changes_drag_the_payment_under_handover() {
        let mut form = form_with(50_000, PaymentMethod::Cash, 0);
        form.set_payment_method(PaymentMethod::HandoverToAgent);
        form.set_sales_value(Pesos::new(70_000));
        assert_eq!(form.payment_value(), Pesos::new(70_000));
        assert!(form.violations().is_empty());
    }

    #[test]
    fn payment_changes_never_touch_the_sales_value() {
        let mut form = form_with(70_000, PaymentMethod::HandoverToAgent, 70_000);
        form.set_payment_value(Pesos::new(1));
        assert_eq!(form.sales_value(), Pesos::new(70_000));
        assert_eq!(form.payment_value(), Pesos::new(1));
        assert_eq!(form.violations().len(), 1);
    }

    #[test]
    fn setters_are_idempotent() {
        let mut form = form_with(50_000, PaymentMethod::HandoverToAgent, 50_000);
        let before = format!("{form:?}");
        form.set_sales_value(Pesos::new(50_000));
        form.set_payment_method(PaymentMethod::HandoverToAgent);
        form.set_payment_value(Pesos::new(50_000));
        assert_eq!(format!("{form:?}"), before);
    }

    #[test]
    fn switching_away_from_handover_keeps_the_payment() {
        let mut form = form_with(50_000, PaymentMethod::HandoverToAgent, 50_000);
        form.set_payment_method(PaymentMethod::Cash);
        assert_eq!(form.payment_value(), Pesos::new(50_000));
    }
}

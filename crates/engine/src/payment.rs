use serde::{Deserialize, Serialize};

use crate::EngineError;

/// How the day's takings were settled.
///
/// Closed enumeration; the wire and storage representation is the
/// `snake_case` string returned by [`as_str`](PaymentMethod::as_str).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Takings were deposited at the bank.
    BankDeposit,
    /// Takings were handed over to the collection agent. For this method the
    /// payment value must equal the sales value.
    HandoverToAgent,
    /// Takings stayed in the till as cash.
    Cash,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::BankDeposit,
        PaymentMethod::HandoverToAgent,
        PaymentMethod::Cash,
    ];

    /// Returns the canonical string stored in documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BankDeposit => "bank_deposit",
            Self::HandoverToAgent => "handover_to_agent",
            Self::Cash => "cash",
        }
    }

    /// Human label used in tables and reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::BankDeposit => "Bank deposit",
            Self::HandoverToAgent => "Handover to agent",
            Self::Cash => "Cash",
        }
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "bank_deposit" => Ok(Self::BankDeposit),
            "handover_to_agent" => Ok(Self::HandoverToAgent),
            "cash" => Ok(Self::Cash),
            other => Err(EngineError::Document(format!(
                "unknown payment method: {other}"
            ))),
        }
    }
}

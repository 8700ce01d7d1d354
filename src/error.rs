//! Error type shared by every stage of a payoff projection.

use rust_decimal::Decimal;
use thiserror::Error;

/// Failures raised while validating or projecting a payment plan.
///
/// All of them are local validation failures: retrying the same input
/// produces the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayoffError {
    #[error("Invalid debt {id:?}: {reason}")]
    InvalidDebt { id: String, reason: String },

    #[error("Invalid strategy: {reason}")]
    InvalidStrategy { reason: String },

    #[error("Payment plan has no debts")]
    EmptyPlan,

    #[error("Invalid payment plan: {reason}")]
    InvalidPlan { reason: String },

    #[error("Plan does not pay off within {months} months (remaining balance {remaining_balance})")]
    PayoffTimeout {
        months: u32,
        remaining_balance: Decimal,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PayoffError {
    pub(crate) fn invalid_debt(id: &str, reason: impl Into<String>) -> Self {
        PayoffError::InvalidDebt {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_strategy(reason: impl Into<String>) -> Self {
        PayoffError::InvalidStrategy {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_plan(reason: impl Into<String>) -> Self {
        PayoffError::InvalidPlan {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PayoffError>;

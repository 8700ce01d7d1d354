//! Validated debt records and the payment plan built from them.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{PayoffError, Result};
use crate::strategy::Strategy;

/// A debt exactly as it arrives from the outside world, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtRecord {
    pub id: String,
    pub name: String,
    /// Outstanding balance.
    pub principal: Decimal,
    /// Annual rate as a percentage (e.g., 19.99 for 19.99% APR).
    pub annual_interest_rate: Decimal,
    /// Required monthly payment.
    pub minimum_payment: Decimal,
}

/// A debt whose invariants have been checked.
///
/// Only obtainable through [`Debt::new`] or `TryFrom<DebtRecord>`, so the
/// engine never sees a negative balance or a missing minimum payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DebtRecord", into = "DebtRecord")]
pub struct Debt {
    id: String,
    name: String,
    principal: Decimal,
    annual_interest_rate: Decimal,
    minimum_payment: Decimal,
}

impl Debt {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        principal: Decimal,
        annual_interest_rate: Decimal,
        minimum_payment: Decimal,
    ) -> Result<Self> {
        let id = id.into();

        if id.trim().is_empty() {
            return Err(PayoffError::invalid_debt(&id, "id cannot be empty"));
        }
        if principal < Decimal::ZERO {
            return Err(PayoffError::invalid_debt(
                &id,
                format!("principal cannot be negative, got {}", principal),
            ));
        }
        if annual_interest_rate < Decimal::ZERO {
            return Err(PayoffError::invalid_debt(
                &id,
                format!("annual interest rate cannot be negative, got {}", annual_interest_rate),
            ));
        }
        if minimum_payment < Decimal::ZERO
            || (principal > Decimal::ZERO && minimum_payment <= Decimal::ZERO)
        {
            return Err(PayoffError::invalid_debt(
                &id,
                format!("minimum payment must be positive, got {}", minimum_payment),
            ));
        }

        Ok(Self {
            id,
            name: name.into(),
            principal,
            annual_interest_rate,
            minimum_payment,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn principal(&self) -> Decimal {
        self.principal
    }

    pub fn annual_interest_rate(&self) -> Decimal {
        self.annual_interest_rate
    }

    pub fn minimum_payment(&self) -> Decimal {
        self.minimum_payment
    }

    /// Nominal monthly rate as a fraction: APR / 100 / 12.
    pub fn monthly_rate(&self) -> Decimal {
        self.annual_interest_rate / dec!(100) / dec!(12)
    }

    /// Whether there is anything left to pay at plan start.
    pub fn is_open(&self) -> bool {
        self.principal > Decimal::ZERO
    }
}

impl TryFrom<DebtRecord> for Debt {
    type Error = PayoffError;

    fn try_from(record: DebtRecord) -> Result<Self> {
        Debt::new(
            record.id,
            record.name,
            record.principal,
            record.annual_interest_rate,
            record.minimum_payment,
        )
    }
}

impl From<Debt> for DebtRecord {
    fn from(debt: Debt) -> Self {
        DebtRecord {
            id: debt.id,
            name: debt.name,
            principal: debt.principal,
            annual_interest_rate: debt.annual_interest_rate,
            minimum_payment: debt.minimum_payment,
        }
    }
}

/// Everything needed to project a payoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPlan {
    pub debts: Vec<Debt>,
    /// Amount paid each month on top of the minimum payments.
    #[serde(default)]
    pub extra_monthly_payment: Decimal,
    pub strategy: Strategy,
    /// Explicit priority of debt ids, only read for [`Strategy::Custom`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_order: Option<Vec<String>>,
    /// Calendar date of the first simulated month, used for the debt-free date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl PaymentPlan {
    pub fn new(debts: Vec<Debt>, extra_monthly_payment: Decimal, strategy: Strategy) -> Self {
        Self {
            debts,
            extra_monthly_payment,
            strategy,
            custom_order: None,
            start_date: None,
        }
    }

    pub fn with_custom_order(mut self, order: Vec<String>) -> Self {
        self.custom_order = Some(order);
        self
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Checks plan-level invariants. Individual debts are already valid by
    /// construction.
    pub fn validate(&self) -> Result<()> {
        if self.debts.is_empty() {
            return Err(PayoffError::EmptyPlan);
        }
        if self.extra_monthly_payment < Decimal::ZERO {
            return Err(PayoffError::invalid_plan(format!(
                "extra monthly payment cannot be negative, got {}",
                self.extra_monthly_payment
            )));
        }

        let mut seen = HashSet::new();
        for debt in &self.debts {
            if !seen.insert(debt.id()) {
                return Err(PayoffError::invalid_plan(format!("duplicate debt id {:?}", debt.id())));
            }
        }
        Ok(())
    }

    /// Sum of the minimum payments of debts with a balance, plus the extra
    /// payment. Constant for the whole plan.
    pub fn monthly_total_payment(&self) -> Decimal {
        let minimums: Decimal = self
            .debts
            .iter()
            .filter(|debt| debt.is_open())
            .map(Debt::minimum_payment)
            .sum();
        minimums + self.extra_monthly_payment
    }
}

//! Side-by-side comparison of the avalanche and snowball strategies.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::debt::{Debt, PaymentPlan};
use crate::error::Result;
use crate::project_payoff;
use crate::projection::ProjectionResult;
use crate::strategy::Strategy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub avalanche: ProjectionResult,
    pub snowball: ProjectionResult,
    /// Snowball interest minus avalanche interest. Negative when snowball is cheaper.
    pub interest_saved: Decimal,
    /// Snowball payoff month minus avalanche payoff month.
    pub months_saved: i64,
    pub recommended: Strategy,
}

/// Projects the same debts under both built-in strategies.
///
/// The recommendation favours lower total interest, then an earlier payoff,
/// and falls back to snowball when both are equal.
pub fn compare_strategies(
    debts: &[Debt],
    extra_monthly_payment: Decimal,
    start_date: Option<NaiveDate>,
    config: &EngineConfig,
) -> Result<StrategyComparison> {
    let project = |strategy: Strategy| {
        let mut plan = PaymentPlan::new(debts.to_vec(), extra_monthly_payment, strategy);
        plan.start_date = start_date;
        project_payoff(&plan, config)
    };

    let avalanche = project(Strategy::Avalanche)?;
    let snowball = project(Strategy::Snowball)?;

    let interest_saved = snowball.total_interest_paid - avalanche.total_interest_paid;
    let months_saved = i64::from(snowball.payoff_month) - i64::from(avalanche.payoff_month);

    let recommended = if interest_saved > Decimal::ZERO
        || (interest_saved.is_zero() && months_saved > 0)
    {
        Strategy::Avalanche
    } else {
        Strategy::Snowball
    };

    tracing::debug!(
        "Compared strategies: avalanche saves {} interest and {} months, recommending {:?}",
        interest_saved,
        months_saved,
        recommended
    );

    Ok(StrategyComparison {
        avalanche,
        snowball,
        interest_saved,
        months_saved,
        recommended,
    })
}

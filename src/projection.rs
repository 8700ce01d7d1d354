//! Reduces per-debt schedules into a single projection for reporting.

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::debt::PaymentPlan;
use crate::engine::{MonthlySnapshot, Schedule};
use crate::error::{PayoffError, Result};
use crate::strategy::Strategy;

/// Aggregate figures for one month across every debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub month: u32,
    /// Sum of every debt's ending balance.
    pub total_balance: Decimal,
    pub interest_accrued: Decimal,
    pub total_paid: Decimal,
    /// Interest accrued from month 1 up to and including this month.
    pub cumulative_interest: Decimal,
}

/// The complete outcome of a payment plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub strategy: Strategy,
    /// Debt ids in the order surplus money was directed.
    pub priority: Vec<String>,
    pub per_debt_schedule: BTreeMap<String, Vec<MonthlySnapshot>>,
    /// First month in which the aggregate balance is zero; 0 if nothing was owed.
    pub payoff_month: u32,
    /// Month in which each debt closed, `None` for debts that started at zero.
    pub payoff_months: BTreeMap<String, Option<u32>>,
    pub total_interest_paid: Decimal,
    pub total_paid: Decimal,
    /// Nominal monthly outlay: open minimums plus the extra payment.
    pub monthly_total_payment: Decimal,
    pub timeline: Vec<TimelinePoint>,
    /// Date of the final payment, when the plan has a start date.
    pub debt_free_date: Option<NaiveDate>,
}

/// Builds a [`ProjectionResult`] from a simulated schedule.
///
/// # Errors
///
/// Returns [`PayoffError::EmptyPlan`] if the schedule covers no debts.
pub fn aggregate(plan: &PaymentPlan, schedule: Schedule) -> Result<ProjectionResult> {
    if schedule.per_debt.is_empty() {
        return Err(PayoffError::EmptyPlan);
    }

    let timeline = build_timeline(&schedule.per_debt);
    let payoff_month = timeline
        .iter()
        .find(|point| point.total_balance.is_zero())
        .map(|point| point.month)
        .unwrap_or(0);

    let payoff_months = schedule
        .per_debt
        .iter()
        .map(|(id, snapshots)| {
            let closed = snapshots
                .iter()
                .find(|snapshot| snapshot.ending_balance.is_zero())
                .map(|snapshot| snapshot.month);
            (id.clone(), closed)
        })
        .collect();

    let total_interest_paid: Decimal = timeline.iter().map(|point| point.interest_accrued).sum();
    let total_paid: Decimal = timeline.iter().map(|point| point.total_paid).sum();

    let debt_free_date = plan
        .start_date
        .and_then(|start| start.checked_add_months(Months::new(payoff_month.saturating_sub(1))));

    Ok(ProjectionResult {
        strategy: plan.strategy,
        priority: schedule.priority,
        per_debt_schedule: schedule.per_debt,
        payoff_month,
        payoff_months,
        total_interest_paid,
        total_paid,
        monthly_total_payment: plan.monthly_total_payment(),
        timeline,
        debt_free_date,
    })
}

fn build_timeline(per_debt: &BTreeMap<String, Vec<MonthlySnapshot>>) -> Vec<TimelinePoint> {
    let months = per_debt
        .values()
        .flat_map(|snapshots| snapshots.last())
        .map(|snapshot| snapshot.month)
        .max()
        .unwrap_or(0);

    let mut by_month: BTreeMap<u32, TimelinePoint> = (1..=months)
        .map(|month| {
            (
                month,
                TimelinePoint {
                    month,
                    total_balance: Decimal::ZERO,
                    interest_accrued: Decimal::ZERO,
                    total_paid: Decimal::ZERO,
                    cumulative_interest: Decimal::ZERO,
                },
            )
        })
        .collect();

    // A debt without a snapshot for a month was already closed, so it adds nothing.
    for snapshot in per_debt.values().flatten() {
        if let Some(point) = by_month.get_mut(&snapshot.month) {
            point.total_balance += snapshot.ending_balance;
            point.interest_accrued += snapshot.interest_accrued;
            point.total_paid += snapshot.payment_applied;
        }
    }

    let mut cumulative = Decimal::ZERO;
    by_month
        .into_values()
        .map(|mut point| {
            cumulative += point.interest_accrued;
            point.cumulative_interest = cumulative;
            point
        })
        .collect()
}

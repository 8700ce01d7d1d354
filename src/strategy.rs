//! Priority ordering of debts for surplus payments.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::debt::Debt;
use crate::error::{PayoffError, Result};

/// How surplus money is prioritized across debts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Highest interest rate first.
    Avalanche,
    /// Lowest balance first.
    Snowball,
    /// Caller-supplied order of debt ids.
    Custom,
}

/// Returns the ids of `debts` in the order they should receive surplus money.
///
/// Ties are resolved deterministically, so identical input always yields
/// identical output. `custom_order` is only consulted for
/// [`Strategy::Custom`], where it must name every debt exactly once.
///
/// # Errors
///
/// * [`PayoffError::EmptyPlan`] if `debts` is empty.
/// * [`PayoffError::InvalidStrategy`] if a custom order is missing or does
///   not match the set of debt ids.
pub fn order_debts(
    debts: &[Debt],
    strategy: Strategy,
    custom_order: Option<&[String]>,
) -> Result<Vec<String>> {
    if debts.is_empty() {
        return Err(PayoffError::EmptyPlan);
    }

    let mut ranked: Vec<&Debt> = debts.iter().collect();
    match strategy {
        Strategy::Avalanche => ranked.sort_by(|a, b| avalanche_cmp(a, b)),
        Strategy::Snowball => ranked.sort_by(|a, b| snowball_cmp(a, b)),
        Strategy::Custom => {
            let order = custom_order.ok_or_else(|| {
                PayoffError::invalid_strategy("custom strategy requires a custom order")
            })?;
            check_custom_order(debts, order)?;
            return Ok(order.to_vec());
        }
    }

    Ok(ranked.into_iter().map(|debt| debt.id().to_string()).collect())
}

fn avalanche_cmp(a: &Debt, b: &Debt) -> Ordering {
    b.annual_interest_rate()
        .cmp(&a.annual_interest_rate())
        .then_with(|| a.principal().cmp(&b.principal()))
        .then_with(|| a.id().cmp(b.id()))
}

fn snowball_cmp(a: &Debt, b: &Debt) -> Ordering {
    a.principal()
        .cmp(&b.principal())
        .then_with(|| b.annual_interest_rate().cmp(&a.annual_interest_rate()))
        .then_with(|| a.id().cmp(b.id()))
}

fn check_custom_order(debts: &[Debt], order: &[String]) -> Result<()> {
    let known: HashSet<&str> = debts.iter().map(Debt::id).collect();
    let mut seen = HashSet::new();

    for id in order {
        if !known.contains(id.as_str()) {
            return Err(PayoffError::invalid_strategy(format!(
                "unknown debt id {:?} in custom order",
                id
            )));
        }
        if !seen.insert(id.as_str()) {
            return Err(PayoffError::invalid_strategy(format!(
                "debt id {:?} appears twice in custom order",
                id
            )));
        }
    }

    if let Some(missing) = debts.iter().find(|debt| !seen.contains(debt.id())) {
        return Err(PayoffError::invalid_strategy(format!(
            "custom order is missing debt id {:?}",
            missing.id()
        )));
    }
    Ok(())
}

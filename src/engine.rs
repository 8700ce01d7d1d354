//! Month-by-month payoff simulation.
//!
//! Every month each open debt accrues interest and receives its own minimum
//! payment. Whatever is left over (the extra payment, minimums freed by debts
//! closed in earlier months, and minimums larger than a closing balance)
//! forms the surplus pool, which cascades down the priority order until it
//! is spent or every debt is closed.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::debt::{Debt, PaymentPlan};
use crate::error::{PayoffError, Result};
use crate::strategy::order_debts;

/// State of one debt during one simulated month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySnapshot {
    pub debt_id: String,
    /// 1-based month index.
    pub month: u32,
    pub starting_balance: Decimal,
    pub interest_accrued: Decimal,
    /// Total paid into this debt this month, minimum and surplus combined.
    pub payment_applied: Decimal,
    /// Portion of `payment_applied` that covered this month's interest.
    pub interest_paid: Decimal,
    /// Portion of `payment_applied` that reduced the balance.
    pub principal_paid: Decimal,
    pub ending_balance: Decimal,
}

/// Raw simulation output, before aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Debt ids in the order surplus money was directed.
    pub priority: Vec<String>,
    /// Number of months simulated until every debt closed.
    pub months_simulated: u32,
    /// Snapshots per debt id. Debts that started at zero map to an empty list.
    pub per_debt: BTreeMap<String, Vec<MonthlySnapshot>>,
}

/// A debt being paid down.
struct Account<'a> {
    debt: &'a Debt,
    balance: Decimal,
    snapshots: Vec<MonthlySnapshot>,
}

/// Working figures for one open account within the current month.
struct Accrual {
    index: usize,
    starting_balance: Decimal,
    interest: Decimal,
    paid: Decimal,
    remaining: Decimal,
    /// Balance at or below the minimum at the start of the month.
    settling: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AmortizationEngine {
    config: EngineConfig,
}

impl AmortizationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validates `plan`, orders its debts and simulates the payoff.
    ///
    /// # Errors
    ///
    /// Returns the plan's validation errors, an ordering error for a bad
    /// custom order, or [`PayoffError::PayoffTimeout`] when balances remain
    /// after `max_months`.
    pub fn simulate(&self, plan: &PaymentPlan) -> Result<Schedule> {
        self.config.validate()?;
        plan.validate()?;
        let priority = order_debts(&plan.debts, plan.strategy, plan.custom_order.as_deref())?;
        self.run(plan, priority)
    }

    fn run(&self, plan: &PaymentPlan, priority: Vec<String>) -> Result<Schedule> {
        let mut accounts: Vec<Account> = plan
            .debts
            .iter()
            .map(|debt| Account {
                debt,
                balance: debt.principal(),
                snapshots: Vec::new(),
            })
            .collect();

        let position: HashMap<&str, usize> = plan
            .debts
            .iter()
            .enumerate()
            .map(|(index, debt)| (debt.id(), index))
            .collect();
        let priority_indexes: Vec<usize> = priority
            .iter()
            .filter_map(|id| position.get(id.as_str()).copied())
            .collect();

        tracing::debug!(
            "Simulating {} debts with {:?} strategy, extra payment {}",
            accounts.len(),
            plan.strategy,
            plan.extra_monthly_payment
        );

        let mut freed_minimums = Decimal::ZERO;
        let mut month: u32 = 0;

        while accounts.iter().any(|account| account.balance > Decimal::ZERO) {
            if month >= self.config.max_months {
                let remaining_balance = accounts
                    .iter()
                    .fold(Decimal::ZERO, |total, account| total.saturating_add(account.balance));
                tracing::warn!(
                    "Payoff not reached after {} months, {} still owed",
                    month,
                    remaining_balance
                );
                return Err(PayoffError::PayoffTimeout {
                    months: self.config.max_months,
                    remaining_balance,
                });
            }
            month += 1;

            let mut pool = plan.extra_monthly_payment + freed_minimums;
            let mut accruals = self.accrue_and_pay_minimums(&accounts, &mut pool, month)?;

            for &index in &priority_indexes {
                if pool <= Decimal::ZERO {
                    break;
                }
                if let Some(accrual) = accruals.iter_mut().find(|a| a.index == index) {
                    let applied = pool.min(accrual.remaining);
                    accrual.paid += applied;
                    accrual.remaining -= applied;
                    pool -= applied;
                }
            }

            tracing::trace!("Month {}: {} of surplus left unapplied", month, pool);

            for accrual in accruals {
                let account = &mut accounts[accrual.index];
                let interest_paid = accrual.paid.min(accrual.interest);
                account.snapshots.push(MonthlySnapshot {
                    debt_id: account.debt.id().to_string(),
                    month,
                    starting_balance: accrual.starting_balance,
                    interest_accrued: accrual.interest,
                    payment_applied: accrual.paid,
                    interest_paid,
                    principal_paid: accrual.paid - interest_paid,
                    ending_balance: accrual.remaining,
                });
                account.balance = accrual.remaining;

                if account.balance.is_zero() {
                    tracing::debug!("Debt {} paid off in month {}", account.debt.id(), month);
                    freed_minimums += account.debt.minimum_payment();
                }
            }
        }

        tracing::debug!("All debts paid off after {} months", month);

        let per_debt = accounts
            .into_iter()
            .map(|account| (account.debt.id().to_string(), account.snapshots))
            .collect();

        Ok(Schedule {
            priority,
            months_simulated: month,
            per_debt,
        })
    }

    /// Accrues interest on every open account and applies its minimum
    /// payment. Minimums exceeding a closing balance flow into `pool`.
    ///
    /// A balance at or below its minimum is settled this month, interest
    /// included, with anything beyond the minimum drawn from `pool`. Only the
    /// last open debt may be settled past what the pool holds; otherwise the
    /// unfunded part carries into next month.
    fn accrue_and_pay_minimums(
        &self,
        accounts: &[Account],
        pool: &mut Decimal,
        month: u32,
    ) -> Result<Vec<Accrual>> {
        let mut accruals = Vec::new();

        for (index, account) in accounts.iter().enumerate() {
            if account.balance <= Decimal::ZERO {
                continue;
            }
            let debt = account.debt;

            let interest = account
                .balance
                .checked_mul(debt.monthly_rate())
                .map(|raw| self.config.round_money(raw))
                .ok_or_else(|| self.overflow(month, account.balance))?;
            let due = account
                .balance
                .checked_add(interest)
                .ok_or_else(|| self.overflow(month, account.balance))?;

            let paid = debt.minimum_payment().min(due);
            *pool += debt.minimum_payment() - paid;

            accruals.push(Accrual {
                index,
                starting_balance: account.balance,
                interest,
                paid,
                remaining: due - paid,
                settling: account.balance <= debt.minimum_payment(),
            });
        }

        let final_payment = accruals.len() == 1;
        for accrual in accruals
            .iter_mut()
            .filter(|accrual| accrual.settling && accrual.remaining > Decimal::ZERO)
        {
            let funded = accrual.remaining.min(*pool);
            *pool -= funded;
            let top_up = if final_payment { accrual.remaining } else { funded };
            accrual.paid += top_up;
            accrual.remaining -= top_up;
        }

        Ok(accruals)
    }

    fn overflow(&self, month: u32, balance: Decimal) -> PayoffError {
        tracing::warn!("Balance {} overflowed in month {}", balance, month);
        PayoffError::PayoffTimeout {
            months: self.config.max_months,
            remaining_balance: balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::Strategy;
    use rust_decimal_macros::dec;

    fn debt(id: &str, principal: Decimal, rate: Decimal, minimum: Decimal) -> Debt {
        Debt::new(id, id, principal, rate, minimum).unwrap()
    }

    fn simulate(plan: &PaymentPlan) -> Result<Schedule> {
        AmortizationEngine::default().simulate(plan)
    }

    #[test]
    fn test_single_debt_paid_in_one_month() {
        let plan = PaymentPlan::new(
            vec![debt("loan", dec!(1200), dec!(12), dec!(1200))],
            dec!(0),
            Strategy::Avalanche,
        );
        let schedule = simulate(&plan).unwrap();
        let snapshots = &schedule.per_debt["loan"];

        assert_eq!(schedule.months_simulated, 1);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].interest_accrued, dec!(12));
        assert_eq!(snapshots[0].payment_applied, dec!(1212));
        assert_eq!(snapshots[0].ending_balance, dec!(0));
    }

    #[test]
    fn test_zero_interest_amortization_table() {
        let plan = PaymentPlan::new(
            vec![debt("loan", dec!(1000), dec!(0), dec!(300))],
            dec!(0),
            Strategy::Snowball,
        );
        let schedule = simulate(&plan).unwrap();
        let balances: Vec<Decimal> = schedule.per_debt["loan"]
            .iter()
            .map(|s| s.ending_balance)
            .collect();

        assert_eq!(balances, vec![dec!(700), dec!(400), dec!(100), dec!(0)]);
        assert_eq!(schedule.per_debt["loan"][3].payment_applied, dec!(100));
    }

    #[test]
    fn test_interest_rounds_half_up() {
        // 1000.50 * 0.01 = 10.005 -> 10.01
        let plan = PaymentPlan::new(
            vec![debt("loan", dec!(1000.50), dec!(12), dec!(100))],
            dec!(0),
            Strategy::Avalanche,
        );
        let schedule = simulate(&plan).unwrap();
        let first = &schedule.per_debt["loan"][0];

        assert_eq!(first.interest_accrued, dec!(10.01));
        assert_eq!(first.interest_paid, dec!(10.01));
        assert_eq!(first.principal_paid, dec!(89.99));
        assert_eq!(first.ending_balance, dec!(910.51));
    }

    #[test]
    fn test_surplus_goes_to_priority_debt() {
        let plan = PaymentPlan::new(
            vec![
                debt("A", dec!(1000), dec!(0), dec!(50)),
                debt("B", dec!(500), dec!(0), dec!(50)),
            ],
            dec!(100),
            Strategy::Snowball,
        );
        let schedule = simulate(&plan).unwrap();

        assert_eq!(schedule.priority, vec!["B".to_string(), "A".to_string()]);
        assert_eq!(schedule.per_debt["B"][0].payment_applied, dec!(150));
        assert_eq!(schedule.per_debt["A"][0].payment_applied, dec!(50));
    }

    #[test]
    fn test_surplus_cascades_within_month() {
        // B closes in month 1 with its minimum; the extra flows to A.
        let plan = PaymentPlan::new(
            vec![
                debt("A", dec!(1000), dec!(0), dec!(50)),
                debt("B", dec!(30), dec!(0), dec!(50)),
            ],
            dec!(100),
            Strategy::Snowball,
        );
        let schedule = simulate(&plan).unwrap();
        let b = &schedule.per_debt["B"];
        let a = &schedule.per_debt["A"];

        assert_eq!(b.len(), 1);
        assert_eq!(b[0].payment_applied, dec!(30));
        // 50 own minimum + 20 unused from B's minimum + 100 extra
        assert_eq!(a[0].payment_applied, dec!(170));
        // From month 2 the freed 50 joins the pool.
        assert_eq!(a[1].payment_applied, dec!(200));
    }

    #[test]
    fn test_zero_principal_debt_skipped() {
        let plan = PaymentPlan::new(
            vec![
                debt("open", dec!(100), dec!(0), dec!(50)),
                debt("closed", dec!(0), dec!(10), dec!(0)),
            ],
            dec!(0),
            Strategy::Avalanche,
        );
        let schedule = simulate(&plan).unwrap();

        assert!(schedule.per_debt["closed"].is_empty());
        assert_eq!(schedule.per_debt["open"].len(), 2);
    }

    #[test]
    fn test_negative_amortization_times_out() {
        // 1% monthly interest on 10_000 is 100, minimum only 50.
        let plan = PaymentPlan::new(
            vec![debt("card", dec!(10000), dec!(12), dec!(50))],
            dec!(0),
            Strategy::Avalanche,
        );
        let result = simulate(&plan);
        assert!(matches!(
            result,
            Err(PayoffError::PayoffTimeout { months: 1200, .. })
        ));
    }

    #[test]
    fn test_respects_configured_cap() {
        let engine = AmortizationEngine::new(EngineConfig {
            max_months: 3,
            ..EngineConfig::default()
        });
        let plan = PaymentPlan::new(
            vec![debt("loan", dec!(1000), dec!(0), dec!(100))],
            dec!(0),
            Strategy::Avalanche,
        );
        let result = engine.simulate(&plan);
        assert_eq!(
            result,
            Err(PayoffError::PayoffTimeout {
                months: 3,
                remaining_balance: dec!(700),
            })
        );
    }

    #[test]
    fn test_pays_off_exactly_at_cap() {
        let engine = AmortizationEngine::new(EngineConfig {
            max_months: 10,
            ..EngineConfig::default()
        });
        assert_eq!(engine.config().max_months, 10);

        let plan = PaymentPlan::new(
            vec![debt("loan", dec!(1000), dec!(0), dec!(100))],
            dec!(0),
            Strategy::Avalanche,
        );
        let schedule = engine.simulate(&plan).unwrap();

        assert_eq!(schedule.months_simulated, 10);
        assert_eq!(schedule.per_debt["loan"][9].ending_balance, dec!(0));
    }

    #[test]
    fn test_unfunded_settlement_carries_over() {
        // B's 1.00 of interest cannot be funded while A is still open.
        let plan = PaymentPlan::new(
            vec![
                debt("A", dec!(1000), dec!(12), dec!(100)),
                debt("B", dec!(50), dec!(24), dec!(50)),
            ],
            dec!(0),
            Strategy::Avalanche,
        );
        let schedule = simulate(&plan).unwrap();
        let a = &schedule.per_debt["A"];
        let b = &schedule.per_debt["B"];

        assert_eq!(a[0].payment_applied + b[0].payment_applied, dec!(150));
        assert_eq!(b[0].ending_balance, dec!(1));
        assert_eq!(a[0].ending_balance, dec!(910));

        assert_eq!(b.len(), 2);
        assert_eq!(b[1].payment_applied, dec!(1.02));
        // B's unused minimum flows to A in the month B closes.
        assert_eq!(a[1].payment_applied, dec!(148.98));
        assert_eq!(a[1].ending_balance, dec!(770.12));
    }

    #[test]
    fn test_extreme_rate_does_not_panic() {
        let plan = PaymentPlan::new(
            vec![debt("shark", dec!(1000000), dec!(9999), dec!(1))],
            dec!(0),
            Strategy::Avalanche,
        );
        assert!(matches!(simulate(&plan), Err(PayoffError::PayoffTimeout { .. })));
    }
}

//! `debt_payoff` is a Rust library for projecting how a set of consumer debts
//! gets paid off month by month.
//!
//! Each month every open debt accrues interest and receives its minimum
//! payment. The surplus (a fixed extra payment plus the minimums of debts that
//! are already closed) is directed at one debt at a time, in an order chosen
//! by a strategy:
//! - **Avalanche**: highest interest rate first, which minimizes total interest.
//! - **Snowball**: lowest balance first, which closes accounts sooner.
//! - **Custom**: an explicit order of debt ids supplied by the caller.
//!
//! Amounts are `rust_decimal::Decimal` and monthly interest is rounded half-up
//! to the currency's minor unit, so totals reconcile to the cent.
//!
//! ## Usage
//!
//! Add `debt_payoff` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! debt_payoff = "0.1.0"
//! rust_decimal = "1.39.0"
//! rust_decimal_macros = "1.39.0"
//! ```
//!
//! Then build a [`PaymentPlan`] and call [`project_payoff`]:
//!
//! ```rust
//! use debt_payoff::{Debt, EngineConfig, PaymentPlan, Strategy, project_payoff};
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     let debts = vec![
//!         Debt::new("visa", "Visa", dec!(3_500), dec!(22.9), dec!(90)).unwrap(),
//!         Debt::new("car", "Car loan", dec!(8_000), dec!(6.5), dec!(240)).unwrap(),
//!     ];
//!     let plan = PaymentPlan::new(debts, dec!(150), Strategy::Avalanche);
//!
//!     match project_payoff(&plan, &EngineConfig::default()) {
//!         Ok(result) => {
//!             println!("Debt free in:   {} months", result.payoff_month);
//!             println!("Interest paid:  {:.2}", result.total_interest_paid);
//!             println!("Monthly outlay: {:.2}", result.monthly_total_payment);
//!         }
//!         Err(e) => {
//!             eprintln!("Error projecting payoff: {}", e);
//!         }
//!     }
//! }
//! ```

pub mod compare;
pub mod config;
pub mod debt;
pub mod engine;
pub mod error;
pub mod projection;
pub mod strategy;

pub use compare::{StrategyComparison, compare_strategies};
pub use config::EngineConfig;
pub use debt::{Debt, DebtRecord, PaymentPlan};
pub use engine::{AmortizationEngine, MonthlySnapshot, Schedule};
pub use error::{PayoffError, Result};
pub use projection::{ProjectionResult, TimelinePoint, aggregate};
pub use strategy::{Strategy, order_debts};

/// Projects the payoff of a plan end to end.
///
/// This is the main entry point of the library: it validates the plan,
/// orders the debts by strategy, simulates every month and aggregates the
/// result.
///
/// # Errors
///
/// * [`PayoffError::EmptyPlan`] if the plan has no debts.
/// * [`PayoffError::InvalidPlan`] for a negative extra payment or duplicate ids.
/// * [`PayoffError::InvalidStrategy`] for a malformed custom order.
/// * [`PayoffError::PayoffTimeout`] if the debts are not paid off within
///   `config.max_months`.
pub fn project_payoff(plan: &PaymentPlan, config: &EngineConfig) -> Result<ProjectionResult> {
    let schedule = AmortizationEngine::new(*config).simulate(plan)?;
    let result = aggregate(plan, schedule)?;

    tracing::debug!(
        "Projected {:?} plan: payoff in {} months, {} interest",
        plan.strategy,
        result.payoff_month,
        result.total_interest_paid
    );

    Ok(result)
}

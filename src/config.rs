//! Engine configuration.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{PayoffError, Result};

/// Default safety cap: 100 years of monthly payments.
pub const DEFAULT_MAX_MONTHS: u32 = 1200;

/// Default currency scale (cents).
pub const DEFAULT_CURRENCY_SCALE: u32 = 2;

const MAX_CURRENCY_SCALE: u32 = 10;

/// Tunables for [`AmortizationEngine`](crate::engine::AmortizationEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Number of simulated months after which a plan is declared infeasible.
    #[serde(default = "default_max_months")]
    pub max_months: u32,

    /// Decimal places of the currency's minor unit. Accrued interest is
    /// rounded half-up to this scale every month.
    #[serde(default = "default_currency_scale")]
    pub currency_scale: u32,
}

fn default_max_months() -> u32 {
    DEFAULT_MAX_MONTHS
}

fn default_currency_scale() -> u32 {
    DEFAULT_CURRENCY_SCALE
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_months: DEFAULT_MAX_MONTHS,
            currency_scale: DEFAULT_CURRENCY_SCALE,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON configuration. Missing fields take
    /// their defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(raw).map_err(|e| PayoffError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_months == 0 {
            return Err(PayoffError::Config("maxMonths must be at least 1".to_string()));
        }
        if self.currency_scale > MAX_CURRENCY_SCALE {
            return Err(PayoffError::Config(format!(
                "currencyScale must be at most {}, got {}",
                MAX_CURRENCY_SCALE, self.currency_scale
            )));
        }
        Ok(())
    }

    /// Rounds an amount to the currency's minor unit, half-up.
    pub fn round_money(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.currency_scale, RoundingStrategy::MidpointAwayFromZero)
    }
}

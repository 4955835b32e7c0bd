use serde::{Deserialize, Serialize};

use super::config::ThresholdPair;

/// Limit a household exceeded, kept for adverse-outcome reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shortfall {
    Assets { total: f64, limit: f64 },
    Income { total: f64, limit: f64 },
}

impl Shortfall {
    pub fn summary(&self) -> String {
        match self {
            Shortfall::Assets { total, limit } => format!(
                "countable assets {} exceed limit {}",
                format_money(*total),
                format_money(*limit)
            ),
            Shortfall::Income { total, limit } => format!(
                "countable monthly income {} exceeds limit {}",
                format_money(*total),
                format_money(*limit)
            ),
        }
    }
}

/// Totals equal to a limit pass; both limits must hold.
pub(crate) fn assess_limits(
    asset_total: f64,
    income_total: f64,
    limits: &ThresholdPair,
) -> Vec<Shortfall> {
    let mut shortfalls = Vec::new();

    if asset_total > limits.asset_limit {
        shortfalls.push(Shortfall::Assets {
            total: asset_total,
            limit: limits.asset_limit,
        });
    }

    if income_total > limits.income_limit {
        shortfalls.push(Shortfall::Income {
            total: income_total,
            limit: limits.income_limit,
        });
    }

    shortfalls
}

/// Whole dollars when the value has no cents.
pub fn format_money(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("${value:.0}")
    } else {
        format!("${value:.2}")
    }
}

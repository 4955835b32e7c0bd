use serde::{Deserialize, Serialize};

use super::super::domain::HouseholdType;

/// Asset and monthly income limits for one household type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPair {
    pub asset_limit: f64,
    pub income_limit: f64,
}

/// Program-year means-test limits, injected into the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    #[serde(default = "default_program_year")]
    pub program_year: String,
    pub single: ThresholdPair,
    pub couple: ThresholdPair,
}

fn default_program_year() -> String {
    ThresholdTable::PROGRAM_YEAR.to_string()
}

impl ThresholdTable {
    pub const PROGRAM_YEAR: &'static str = "2025/26";

    /// Published limits for the 2025/26 program year.
    pub fn program_year_2025() -> Self {
        Self {
            program_year: Self::PROGRAM_YEAR.to_string(),
            single: ThresholdPair {
                asset_limit: 406_000.0,
                income_limit: 10_770.0,
            },
            couple: ThresholdPair {
                asset_limit: 616_000.0,
                income_limit: 16_440.0,
            },
        }
    }

    pub fn for_household(&self, household: HouseholdType) -> ThresholdPair {
        match household {
            HouseholdType::Single => self.single,
            HouseholdType::Couple => self.couple,
        }
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::program_year_2025()
    }
}

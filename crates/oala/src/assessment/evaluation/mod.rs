mod aggregate;
mod config;
mod policy;
mod rules;

pub use aggregate::{aggregate_person, LineItem, PersonAssessment};
pub use config::{ThresholdPair, ThresholdTable};
pub use policy::{format_money, Shortfall};
pub use rules::{
    evaluate_item, subtype, Exemption, ExemptionPolicy, RuleKey,
    MANDATORY_CONTRIBUTION_EXEMPT_BELOW_AGE,
};

use super::domain::{HouseholdDeclaration, HouseholdType, Member};
use policy::assess_limits;
use serde::{Deserialize, Serialize};

/// Stateless means-test engine bound to one program year's thresholds.
#[derive(Debug, Clone, Default)]
pub struct EligibilityEngine {
    thresholds: ThresholdTable,
}

impl EligibilityEngine {
    pub fn new(thresholds: ThresholdTable) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    pub fn evaluate(&self, household: &HouseholdDeclaration) -> EvaluationResult {
        let household_type = household.household_type();
        let primary = aggregate_person(&household.primary, Member::Primary);
        let spouse = household
            .assessed_spouse()
            .map(|spouse| aggregate_person(spouse, Member::Spouse))
            .unwrap_or_default();

        let countable_asset_total = primary.countable_asset_total + spouse.countable_asset_total;
        let countable_income_total =
            primary.countable_income_total + spouse.countable_income_total;

        let limits = self.thresholds.for_household(household_type);
        let shortfalls = assess_limits(countable_asset_total, countable_income_total, &limits);

        let mut line_items = primary.line_items;
        line_items.extend(spouse.line_items);

        EvaluationResult {
            household_type,
            line_items,
            countable_asset_total,
            countable_income_total,
            asset_limit: limits.asset_limit,
            income_limit: limits.income_limit,
            is_eligible: shortfalls.is_empty(),
            shortfalls,
        }
    }
}

/// Engine output: per-item decisions, totals, the limits applied and the verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub household_type: HouseholdType,
    pub line_items: Vec<LineItem>,
    pub countable_asset_total: f64,
    pub countable_income_total: f64,
    pub asset_limit: f64,
    pub income_limit: f64,
    pub is_eligible: bool,
    #[serde(default)]
    pub shortfalls: Vec<Shortfall>,
}

impl EvaluationResult {
    pub fn summary(&self) -> String {
        if self.is_eligible {
            return "eligible".to_string();
        }

        let reasons: Vec<String> = self.shortfalls.iter().map(Shortfall::summary).collect();
        format!("not eligible: {}", reasons.join("; "))
    }

    pub fn items_for(&self, holder: Member) -> impl Iterator<Item = &LineItem> {
        self.line_items
            .iter()
            .filter(move |item| item.holder == holder)
    }

    /// Items counted by default that a caseworker should confirm.
    pub fn review_items(&self) -> impl Iterator<Item = &LineItem> {
        self.line_items.iter().filter(|item| item.requires_review)
    }
}

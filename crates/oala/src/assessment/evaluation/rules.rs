use serde::{Deserialize, Serialize};

use super::super::domain::{DeclaredItem, FundStatus, ItemCategory};

/// Canonical subtype spellings understood by the rule table.
pub mod subtype {
    pub const SELF_OCCUPIED: &str = "self-occupied";
    pub const NON_SELF_OCCUPIED: &str = "non-self-occupied";
    pub const MANDATORY_CONTRIBUTION: &str = "mandatory contribution";
    pub const VOLUNTARY_CONTRIBUTION: &str = "voluntary contribution";
    pub const TAX_DEDUCTIBLE_VOLUNTARY_CONTRIBUTION: &str =
        "tax-deductible voluntary contribution";
    pub const PROVIDENT_FUND: &str = "provident fund";
    pub const SAVINGS: &str = "savings";
}

/// Mandatory contributions stop being exempt on this birthday.
pub const MANDATORY_CONTRIBUTION_EXEMPT_BELOW_AGE: u32 = 65;

/// Row of the exemption rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKey {
    SelfOccupiedProperty,
    OtherProperty,
    TaxDeductibleVoluntaryContribution,
    MandatoryContribution,
    VoluntaryContribution,
    ProvidentFund,
    UnrecognisedRetirementScheme,
    NonSavingsPolicy,
    SavingsPolicy,
    ReverseMortgageIncome,
    CountedIncome,
    CountedAsset,
}

/// How a rule row treats an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExemptionPolicy {
    Exempt,
    Counted,
    ExemptBelowAge(u32),
    ExemptWhileRetained,
    CountedPendingReview,
}

impl ExemptionPolicy {
    fn resolve(self, person_age: u32, status: Option<FundStatus>) -> bool {
        match self {
            ExemptionPolicy::Exempt => true,
            ExemptionPolicy::Counted | ExemptionPolicy::CountedPendingReview => false,
            ExemptionPolicy::ExemptBelowAge(age) => person_age < age,
            ExemptionPolicy::ExemptWhileRetained => status == Some(FundStatus::Retained),
        }
    }
}

impl RuleKey {
    pub const ALL: [RuleKey; 12] = [
        RuleKey::SelfOccupiedProperty,
        RuleKey::OtherProperty,
        RuleKey::TaxDeductibleVoluntaryContribution,
        RuleKey::MandatoryContribution,
        RuleKey::VoluntaryContribution,
        RuleKey::ProvidentFund,
        RuleKey::UnrecognisedRetirementScheme,
        RuleKey::NonSavingsPolicy,
        RuleKey::SavingsPolicy,
        RuleKey::ReverseMortgageIncome,
        RuleKey::CountedIncome,
        RuleKey::CountedAsset,
    ];

    /// The rule table.
    pub const fn policy(self) -> ExemptionPolicy {
        match self {
            RuleKey::SelfOccupiedProperty => ExemptionPolicy::Exempt,
            RuleKey::OtherProperty => ExemptionPolicy::Counted,
            RuleKey::TaxDeductibleVoluntaryContribution => ExemptionPolicy::Exempt,
            RuleKey::MandatoryContribution => {
                ExemptionPolicy::ExemptBelowAge(MANDATORY_CONTRIBUTION_EXEMPT_BELOW_AGE)
            }
            RuleKey::VoluntaryContribution => ExemptionPolicy::Counted,
            RuleKey::ProvidentFund => ExemptionPolicy::ExemptWhileRetained,
            RuleKey::UnrecognisedRetirementScheme => ExemptionPolicy::CountedPendingReview,
            RuleKey::NonSavingsPolicy => ExemptionPolicy::Exempt,
            RuleKey::SavingsPolicy => ExemptionPolicy::Counted,
            RuleKey::ReverseMortgageIncome => ExemptionPolicy::Exempt,
            RuleKey::CountedIncome => ExemptionPolicy::Counted,
            RuleKey::CountedAsset => ExemptionPolicy::Counted,
        }
    }

    pub fn classify(item: &DeclaredItem) -> Self {
        let declared = item.subtype.trim();
        let is = |expected: &str| declared.eq_ignore_ascii_case(expected);

        match item.category {
            ItemCategory::Property if is(subtype::SELF_OCCUPIED) => RuleKey::SelfOccupiedProperty,
            ItemCategory::Property => RuleKey::OtherProperty,
            ItemCategory::RetirementFund if is(subtype::TAX_DEDUCTIBLE_VOLUNTARY_CONTRIBUTION) => {
                RuleKey::TaxDeductibleVoluntaryContribution
            }
            ItemCategory::RetirementFund if is(subtype::MANDATORY_CONTRIBUTION) => {
                RuleKey::MandatoryContribution
            }
            ItemCategory::RetirementFund if is(subtype::VOLUNTARY_CONTRIBUTION) => {
                RuleKey::VoluntaryContribution
            }
            ItemCategory::RetirementFund if is(subtype::PROVIDENT_FUND) => RuleKey::ProvidentFund,
            ItemCategory::RetirementFund => RuleKey::UnrecognisedRetirementScheme,
            ItemCategory::InsurancePolicy if is(subtype::SAVINGS) => RuleKey::SavingsPolicy,
            ItemCategory::InsurancePolicy => RuleKey::NonSavingsPolicy,
            ItemCategory::PolicyReverseMortgageIncome
            | ItemCategory::PropertyReverseMortgageIncome => RuleKey::ReverseMortgageIncome,
            ItemCategory::WorkIncome
            | ItemCategory::PensionIncome
            | ItemCategory::AnnuityIncome
            | ItemCategory::RentalIncome
            | ItemCategory::DividendIncome => RuleKey::CountedIncome,
            ItemCategory::BankDeposit
            | ItemCategory::Stock
            | ItemCategory::Gold
            | ItemCategory::Land
            | ItemCategory::Business
            | ItemCategory::Vehicle => RuleKey::CountedAsset,
        }
    }

    fn note(self, exempt: bool, item: &DeclaredItem) -> String {
        match self {
            RuleKey::SelfOccupiedProperty => "owner-occupied property exemption".to_string(),
            RuleKey::OtherProperty => "counted: property not occupied by the owner".to_string(),
            RuleKey::TaxDeductibleVoluntaryContribution => {
                "statutory exemption for tax-deductible voluntary contributions".to_string()
            }
            RuleKey::MandatoryContribution if exempt => format!(
                "mandatory contributions exempt below age {MANDATORY_CONTRIBUTION_EXEMPT_BELOW_AGE}"
            ),
            RuleKey::MandatoryContribution => format!(
                "counted: mandatory contributions count from age {MANDATORY_CONTRIBUTION_EXEMPT_BELOW_AGE}"
            ),
            RuleKey::VoluntaryContribution => {
                "counted: voluntary contributions are always assessed".to_string()
            }
            RuleKey::ProvidentFund if exempt => "provident fund retained in scheme".to_string(),
            RuleKey::ProvidentFund => "counted: provident fund withdrawn".to_string(),
            RuleKey::UnrecognisedRetirementScheme => format!(
                "counted: unrecognised retirement scheme '{}', manual review required",
                item.subtype.trim()
            ),
            RuleKey::NonSavingsPolicy => "non-savings insurance policy exemption".to_string(),
            RuleKey::SavingsPolicy => "counted: savings insurance policy".to_string(),
            RuleKey::ReverseMortgageIncome => {
                "statutory exemption for reverse mortgage loan proceeds".to_string()
            }
            RuleKey::CountedIncome => "counted income".to_string(),
            RuleKey::CountedAsset => "counted asset".to_string(),
        }
    }
}

/// Exemption decision for a single declared item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exemption {
    pub is_exempt: bool,
    pub note: String,
    #[serde(default)]
    pub requires_review: bool,
}

/// Applies the rule table to one item held by a person of `person_age`.
pub fn evaluate_item(item: &DeclaredItem, person_age: u32) -> Exemption {
    let key = RuleKey::classify(item);
    let policy = key.policy();
    let is_exempt = policy.resolve(person_age, item.status);

    Exemption {
        is_exempt,
        note: key.note(is_exempt, item),
        requires_review: policy == ExemptionPolicy::CountedPendingReview,
    }
}

//! Converts stored blobs from the earlier wizard (`{ p1, p2, isMarried }`)
//! into [`HouseholdDeclaration`]s so old submissions can be re-evaluated.
//!
//! The wizard kept fixed maps of general assets and income streams, lists of
//! properties, MPF items and insurance policies behind per-section toggles,
//! and localized subtype labels. Values were typed strings as often as
//! numbers.

use serde_json::{Map, Value};

use super::domain::{
    coerce_age, coerce_amount, DeclaredItem, FundStatus, HouseholdDeclaration, ItemCategory,
    PersonDeclaration,
};
use super::evaluation::subtype;

/// Failure to read a legacy blob.
#[derive(Debug, thiserror::Error)]
pub enum LegacyImportError {
    #[error("legacy submission must be a JSON object")]
    NotAnObject,
    #[error("invalid legacy submission JSON: {0}")]
    Json(#[from] serde_json::Error),
}

const ASSET_KEYS: [(&str, ItemCategory); 6] = [
    ("bank", ItemCategory::BankDeposit),
    ("stock", ItemCategory::Stock),
    ("gold", ItemCategory::Gold),
    ("land", ItemCategory::Land),
    ("business", ItemCategory::Business),
    ("vehicle", ItemCategory::Vehicle),
];

const INCOME_KEYS: [(&str, ItemCategory); 7] = [
    ("work", ItemCategory::WorkIncome),
    ("pension", ItemCategory::PensionIncome),
    ("annuity", ItemCategory::AnnuityIncome),
    ("rental", ItemCategory::RentalIncome),
    ("dividend", ItemCategory::DividendIncome),
    ("policyReverse", ItemCategory::PolicyReverseMortgageIncome),
    ("propertyReverse", ItemCategory::PropertyReverseMortgageIncome),
];

pub fn household_from_legacy_str(raw: &str) -> Result<HouseholdDeclaration, LegacyImportError> {
    let value: Value = serde_json::from_str(raw)?;
    household_from_legacy(&value)
}

pub fn household_from_legacy(value: &Value) -> Result<HouseholdDeclaration, LegacyImportError> {
    let root = value.as_object().ok_or(LegacyImportError::NotAnObject)?;

    let is_couple = root
        .get("isMarried")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let primary = root.get("p1").map(person_from_legacy).unwrap_or_default();
    let spouse = if is_couple {
        Some(root.get("p2").map(person_from_legacy).unwrap_or_default())
    } else {
        None
    };

    Ok(HouseholdDeclaration {
        is_couple,
        primary,
        spouse,
    })
}

fn person_from_legacy(value: &Value) -> PersonDeclaration {
    let empty = Map::new();
    let person = value.as_object().unwrap_or(&empty);

    let mut declaration = PersonDeclaration {
        name: text_field(person, "name").unwrap_or_default(),
        phone: text_field(person, "phone").filter(|phone| !phone.is_empty()),
        age: person.get("age").map(coerce_age).unwrap_or(0),
        items: Vec::new(),
    };

    push_toggled_map(&mut declaration.items, person.get("assets"), &ASSET_KEYS);

    if flag(person, "propertyEnabled") {
        for property in list(person, "properties") {
            let label = text_field(property, "type").unwrap_or_default();
            declaration.items.push(
                DeclaredItem::new(ItemCategory::Property, amount(property))
                    .with_subtype(property_subtype(&label)),
            );
        }
    }

    if flag(person, "mpfEnabled") {
        for scheme in list(person, "mpfItems") {
            let label = text_field(scheme, "type").unwrap_or_default();
            let mut item = DeclaredItem::new(ItemCategory::RetirementFund, amount(scheme))
                .with_subtype(retirement_subtype(&label));
            if let Some(status) = text_field(scheme, "status").and_then(|raw| fund_status(&raw)) {
                item = item.with_status(status);
            }
            declaration.items.push(item);
        }
    }

    if flag(person, "insuranceEnabled") {
        for policy in list(person, "insurancePolicies") {
            let label = text_field(policy, "type").unwrap_or_default();
            let mut item = DeclaredItem::new(ItemCategory::InsurancePolicy, amount(policy))
                .with_subtype(policy_subtype(&label));
            item.enabled = policy
                .get("enabled")
                .and_then(Value::as_bool)
                .unwrap_or(true);
            declaration.items.push(item);
        }
    }

    push_toggled_map(&mut declaration.items, person.get("income"), &INCOME_KEYS);

    declaration
}

fn push_toggled_map(
    items: &mut Vec<DeclaredItem>,
    section: Option<&Value>,
    keys: &[(&str, ItemCategory)],
) {
    let Some(section) = section.and_then(Value::as_object) else {
        return;
    };

    for (key, category) in keys {
        let Some(entry) = section.get(*key).and_then(Value::as_object) else {
            continue;
        };
        let mut item = DeclaredItem::new(*category, amount(entry));
        item.enabled = flag(entry, "enabled");
        items.push(item);
    }
}

fn property_subtype(label: &str) -> String {
    match label.trim() {
        "自住物業" => subtype::SELF_OCCUPIED.to_string(),
        "非自住物業" => subtype::NON_SELF_OCCUPIED.to_string(),
        other => other.to_string(),
    }
}

// The wizard's tax-deductible button wrote "可扣稅自願性" while only the full
// label was ever exempted, so the short form stays unrecognised.
fn retirement_subtype(label: &str) -> String {
    match label.trim() {
        "可扣稅自願性供款" => subtype::TAX_DEDUCTIBLE_VOLUNTARY_CONTRIBUTION.to_string(),
        "強制性供款" => subtype::MANDATORY_CONTRIBUTION.to_string(),
        "自願性供款" => subtype::VOLUNTARY_CONTRIBUTION.to_string(),
        "公積金" => subtype::PROVIDENT_FUND.to_string(),
        other => other.to_string(),
    }
}

fn policy_subtype(label: &str) -> String {
    match label.trim() {
        "儲蓄" => subtype::SAVINGS.to_string(),
        other => other.to_string(),
    }
}

fn fund_status(raw: &str) -> Option<FundStatus> {
    match raw.trim() {
        "保留中" | "retained" => Some(FundStatus::Retained),
        "已提取" | "withdrawn" => Some(FundStatus::Withdrawn),
        _ => None,
    }
}

fn amount(entry: &Map<String, Value>) -> f64 {
    entry.get("value").map(coerce_amount).unwrap_or(0.0)
}

fn flag(entry: &Map<String, Value>, key: &str) -> bool {
    entry.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn text_field(entry: &Map<String, Value>, key: &str) -> Option<String> {
    match entry.get(key)? {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn list<'a>(
    entry: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a Map<String, Value>> {
    entry
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

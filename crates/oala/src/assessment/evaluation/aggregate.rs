use serde::{Deserialize, Serialize};

use super::super::domain::{ItemCategory, ItemKind, Member, PersonDeclaration};
use super::rules::evaluate_item;

/// Declared item after the exemption rules ran, ready for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub holder: Member,
    pub category: ItemCategory,
    pub subtype: String,
    pub amount: f64,
    pub kind: ItemKind,
    pub is_exempt: bool,
    pub note: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub requires_review: bool,
}

impl LineItem {
    /// Human-readable item name, e.g. `Property - self-occupied`.
    pub fn label(&self) -> String {
        let subtype = self.subtype.trim();
        if subtype.is_empty() {
            self.category.label().to_string()
        } else {
            format!("{} - {}", self.category.label(), subtype)
        }
    }

    pub fn countable_amount(&self) -> f64 {
        if self.is_exempt {
            0.0
        } else {
            self.amount
        }
    }
}

/// Line items and countable sums for one household member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonAssessment {
    pub line_items: Vec<LineItem>,
    pub countable_asset_total: f64,
    pub countable_income_total: f64,
}

/// Runs every declared item of `person` through the rule table.
///
/// Items are reported by declaration group (general assets, property,
/// retirement fund, insurance, income); declaration order is kept within a
/// group.
pub fn aggregate_person(person: &PersonDeclaration, holder: Member) -> PersonAssessment {
    let mut line_items: Vec<LineItem> = person
        .items
        .iter()
        .filter(|item| item.is_declared())
        .map(|item| {
            let exemption = evaluate_item(item, person.age);
            LineItem {
                holder,
                category: item.category,
                subtype: item.subtype.trim().to_string(),
                amount: item.declared_amount(),
                kind: item.kind(),
                is_exempt: exemption.is_exempt,
                note: exemption.note,
                requires_review: exemption.requires_review,
            }
        })
        .collect();

    line_items.sort_by_key(|item| item.category.group());

    let countable_asset_total = countable_total(&line_items, ItemKind::Asset);
    let countable_income_total = countable_total(&line_items, ItemKind::Income);

    PersonAssessment {
        line_items,
        countable_asset_total,
        countable_income_total,
    }
}

fn countable_total(line_items: &[LineItem], kind: ItemKind) -> f64 {
    line_items
        .iter()
        .filter(|item| item.kind == kind)
        .map(LineItem::countable_amount)
        .sum()
}

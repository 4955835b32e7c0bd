use std::fmt::Write as _;
use std::io::Write;

use serde::Serialize;

use super::domain::{HouseholdDeclaration, ItemKind, Member};
use super::evaluation::{format_money, EvaluationResult, LineItem, Shortfall};

/// Failures while rendering a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write CSV report: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush report: {0}")]
    Io(#[from] std::io::Error),
    #[error("report is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Display names for the line-item holders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderNames {
    pub primary: String,
    pub spouse: String,
}

impl HolderNames {
    pub fn from_declaration(declaration: &HouseholdDeclaration) -> Self {
        let name_or = |name: &str, fallback: &str| {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                fallback.to_string()
            } else {
                trimmed.to_string()
            }
        };

        Self {
            primary: name_or(&declaration.primary.name, "Applicant"),
            spouse: name_or(
                declaration
                    .spouse
                    .as_ref()
                    .map(|spouse| spouse.name.as_str())
                    .unwrap_or_default(),
                "Spouse",
            ),
        }
    }

    pub fn name_of(&self, holder: Member) -> &str {
        match holder {
            Member::Primary => &self.primary,
            Member::Spouse => &self.spouse,
        }
    }
}

/// Spreadsheet tools need the byte order mark to read Chinese names as UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    kind: &'static str,
    item: String,
    holder: &'a str,
    amount: String,
    exempt: &'static str,
    note: String,
}

impl<'a> ReportRow<'a> {
    fn new(item: &'a LineItem, holders: &'a HolderNames) -> Self {
        Self {
            kind: item.kind.label(),
            item: item.label(),
            holder: holders.name_of(item.holder),
            amount: plain_amount(item.amount),
            exempt: if item.is_exempt { "yes" } else { "no" },
            note: item.note.clone(),
        }
    }

    fn total(kind: ItemKind, total: f64, limit: f64) -> Self {
        Self {
            kind: "total",
            item: kind_heading(kind).to_string(),
            holder: "",
            amount: plain_amount(total),
            exempt: "",
            note: format!("limit {}", plain_amount(limit)),
        }
    }

    fn verdict(result: &EvaluationResult) -> Self {
        let reasons: Vec<String> = result.shortfalls.iter().map(Shortfall::summary).collect();
        Self {
            kind: "result",
            item: if result.is_eligible {
                "eligible".to_string()
            } else {
                "not eligible".to_string()
            },
            holder: "",
            amount: String::new(),
            exempt: "",
            note: reasons.join("; "),
        }
    }
}

fn plain_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Writes a byte order mark, one CSV row per line item, then the countable
/// totals against their limits and the verdict.
pub fn write_csv<W: Write>(
    result: &EvaluationResult,
    holders: &HolderNames,
    mut writer: W,
) -> Result<(), ReportError> {
    writer.write_all(UTF8_BOM)?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    for item in &result.line_items {
        csv_writer.serialize(ReportRow::new(item, holders))?;
    }
    csv_writer.serialize(ReportRow::total(
        ItemKind::Asset,
        result.countable_asset_total,
        result.asset_limit,
    ))?;
    csv_writer.serialize(ReportRow::total(
        ItemKind::Income,
        result.countable_income_total,
        result.income_limit,
    ))?;
    csv_writer.serialize(ReportRow::verdict(result))?;
    csv_writer.flush()?;
    Ok(())
}

pub fn render_csv(
    result: &EvaluationResult,
    declaration: &HouseholdDeclaration,
) -> Result<String, ReportError> {
    let holders = HolderNames::from_declaration(declaration);
    let mut buffer = Vec::new();
    write_csv(result, &holders, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Plain-text report used by the command line.
pub fn render_summary(result: &EvaluationResult, holders: &HolderNames) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Household: {} ({})",
        result.household_type.label(),
        holders.primary
    );

    for holder in [Member::Primary, Member::Spouse] {
        let items: Vec<&LineItem> = result.items_for(holder).collect();
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\nDeclared by {}", holders.name_of(holder));
        for item in items {
            let marker = if item.is_exempt { "exempt" } else { "counted" };
            let _ = writeln!(
                out,
                "- [{}] {}: {} ({marker}; {})",
                item.kind.label(),
                item.label(),
                format_money(item.amount),
                item.note
            );
        }
    }

    let _ = writeln!(out, "\nTotals");
    let _ = writeln!(
        out,
        "- {}: {} of {}",
        kind_heading(ItemKind::Asset),
        format_money(result.countable_asset_total),
        format_money(result.asset_limit)
    );
    let _ = writeln!(
        out,
        "- {}: {} of {}",
        kind_heading(ItemKind::Income),
        format_money(result.countable_income_total),
        format_money(result.income_limit)
    );

    let review: Vec<&LineItem> = result.review_items().collect();
    if !review.is_empty() {
        let _ = writeln!(out, "\nManual review");
        for item in review {
            let _ = writeln!(out, "- {} ({})", item.label(), holders.name_of(item.holder));
        }
    }

    let _ = writeln!(out, "\nResult: {}", result.summary());
    out
}

fn kind_heading(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Asset => "Countable assets",
        ItemKind::Income => "Countable monthly income",
    }
}

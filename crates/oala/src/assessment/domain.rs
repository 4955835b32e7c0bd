use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Reportable categories on the means-test declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    BankDeposit,
    Stock,
    Gold,
    Land,
    Business,
    Vehicle,
    Property,
    RetirementFund,
    InsurancePolicy,
    WorkIncome,
    PensionIncome,
    AnnuityIncome,
    RentalIncome,
    DividendIncome,
    PolicyReverseMortgageIncome,
    PropertyReverseMortgageIncome,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 16] = [
        ItemCategory::BankDeposit,
        ItemCategory::Stock,
        ItemCategory::Gold,
        ItemCategory::Land,
        ItemCategory::Business,
        ItemCategory::Vehicle,
        ItemCategory::Property,
        ItemCategory::RetirementFund,
        ItemCategory::InsurancePolicy,
        ItemCategory::WorkIncome,
        ItemCategory::PensionIncome,
        ItemCategory::AnnuityIncome,
        ItemCategory::RentalIncome,
        ItemCategory::DividendIncome,
        ItemCategory::PolicyReverseMortgageIncome,
        ItemCategory::PropertyReverseMortgageIncome,
    ];

    pub const fn kind(self) -> ItemKind {
        match self.group() {
            DeclarationGroup::Income => ItemKind::Income,
            _ => ItemKind::Asset,
        }
    }

    pub const fn group(self) -> DeclarationGroup {
        match self {
            ItemCategory::BankDeposit
            | ItemCategory::Stock
            | ItemCategory::Gold
            | ItemCategory::Land
            | ItemCategory::Business
            | ItemCategory::Vehicle => DeclarationGroup::GeneralAssets,
            ItemCategory::Property => DeclarationGroup::Property,
            ItemCategory::RetirementFund => DeclarationGroup::RetirementFund,
            ItemCategory::InsurancePolicy => DeclarationGroup::Insurance,
            ItemCategory::WorkIncome
            | ItemCategory::PensionIncome
            | ItemCategory::AnnuityIncome
            | ItemCategory::RentalIncome
            | ItemCategory::DividendIncome
            | ItemCategory::PolicyReverseMortgageIncome
            | ItemCategory::PropertyReverseMortgageIncome => DeclarationGroup::Income,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ItemCategory::BankDeposit => "Cash and bank deposits",
            ItemCategory::Stock => "Stocks, funds and bonds",
            ItemCategory::Gold => "Gold and antiques",
            ItemCategory::Land => "Land and parking spaces",
            ItemCategory::Business => "Business assets",
            ItemCategory::Vehicle => "Operating vehicles",
            ItemCategory::Property => "Property",
            ItemCategory::RetirementFund => "MPF",
            ItemCategory::InsurancePolicy => "Insurance policy",
            ItemCategory::WorkIncome => "Monthly earnings",
            ItemCategory::PensionIncome => "Monthly pension",
            ItemCategory::AnnuityIncome => "Monthly annuity",
            ItemCategory::RentalIncome => "Monthly rental income",
            ItemCategory::DividendIncome => "Monthly dividends and interest",
            ItemCategory::PolicyReverseMortgageIncome => "Policy reverse mortgage annuity",
            ItemCategory::PropertyReverseMortgageIncome => "Property reverse mortgage annuity",
        }
    }
}

/// Sections of the declaration; line items are reported in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationGroup {
    GeneralAssets,
    Property,
    RetirementFund,
    Insurance,
    Income,
}

/// Which countable total an item feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Asset,
    Income,
}

impl ItemKind {
    pub const fn label(self) -> &'static str {
        match self {
            ItemKind::Asset => "asset",
            ItemKind::Income => "income",
        }
    }
}

/// Whether a provident fund balance is still held in the scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundStatus {
    Retained,
    Withdrawn,
}

/// One reportable financial fact. Income amounts are monthly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredItem {
    pub category: ItemCategory,
    #[serde(default)]
    pub subtype: String,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FundStatus>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl DeclaredItem {
    pub fn new(category: ItemCategory, amount: f64) -> Self {
        Self {
            category,
            subtype: String::new(),
            amount,
            status: None,
            enabled: true,
        }
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = subtype.into();
        self
    }

    pub fn with_status(mut self, status: FundStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn kind(&self) -> ItemKind {
        self.category.kind()
    }

    /// Amount clamped to the non-negative range used by the means test.
    pub fn declared_amount(&self) -> f64 {
        sanitize_amount(self.amount)
    }

    /// Disabled and zero-amount items never reach the totals.
    pub fn is_declared(&self) -> bool {
        self.enabled && self.declared_amount() > 0.0
    }
}

/// Declaration for one household member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonDeclaration {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "deserialize_age")]
    pub age: u32,
    #[serde(default)]
    pub items: Vec<DeclaredItem>,
}

impl PersonDeclaration {
    pub fn new(age: u32) -> Self {
        Self {
            age,
            ..Self::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_item(mut self, item: DeclaredItem) -> Self {
        self.items.push(item);
        self
    }
}

/// Single or couple; selects the threshold pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseholdType {
    Single,
    Couple,
}

impl HouseholdType {
    pub const fn label(self) -> &'static str {
        match self {
            HouseholdType::Single => "single",
            HouseholdType::Couple => "couple",
        }
    }
}

/// Household member owning a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Member {
    Primary,
    Spouse,
}

impl Member {
    pub const fn label(self) -> &'static str {
        match self {
            Member::Primary => "primary",
            Member::Spouse => "spouse",
        }
    }
}

/// One assessment submission. `spouse` is only read when `is_couple` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HouseholdDeclaration {
    #[serde(default)]
    pub is_couple: bool,
    #[serde(default)]
    pub primary: PersonDeclaration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spouse: Option<PersonDeclaration>,
}

impl HouseholdDeclaration {
    pub fn single(primary: PersonDeclaration) -> Self {
        Self {
            is_couple: false,
            primary,
            spouse: None,
        }
    }

    pub fn couple(primary: PersonDeclaration, spouse: PersonDeclaration) -> Self {
        Self {
            is_couple: true,
            primary,
            spouse: Some(spouse),
        }
    }

    pub fn household_type(&self) -> HouseholdType {
        if self.is_couple {
            HouseholdType::Couple
        } else {
            HouseholdType::Single
        }
    }

    /// Spouse declaration that participates in the means test, if any.
    pub fn assessed_spouse(&self) -> Option<&PersonDeclaration> {
        if self.is_couple {
            self.spouse.as_ref()
        } else {
            None
        }
    }
}

pub fn sanitize_amount(raw: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        0.0
    }
}

/// Reads a monetary value typed as a number or a string. Anything unparseable
/// is zero.
pub fn coerce_amount(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    sanitize_amount(raw)
}

/// Reads an age from a number or from the leading digits of a string.
pub fn coerce_age(value: &Value) -> u32 {
    match value {
        Value::Number(number) => match number.as_f64() {
            Some(age) if age.is_finite() && age > 0.0 => age.trunc().min(u32::MAX as f64) as u32,
            _ => 0,
        },
        Value::String(text) => {
            let digits: String = text
                .trim()
                .chars()
                .take_while(|ch| ch.is_ascii_digit())
                .collect();
            digits.parse::<u32>().unwrap_or(0)
        }
        _ => 0,
    }
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_amount(&value))
}

fn deserialize_age<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_age(&value))
}

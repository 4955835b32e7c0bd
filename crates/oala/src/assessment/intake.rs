use super::domain::{HouseholdDeclaration, Member, PersonDeclaration};
use super::repository::AssessmentSubmission;

/// Validation errors raised before a submission is stored.
#[derive(Debug, thiserror::Error)]
pub enum IntakeViolation {
    #[error("primary applicant name is required")]
    MissingPrimaryName,
    #[error("spouse details are required for a couple household")]
    MissingSpouse,
    #[error("{} age is required", .member.label())]
    MissingAge { member: Member },
    #[error("{} phone number is required", .member.label())]
    MissingPhone { member: Member },
    #[error("{} phone number must be {digits} digits (found '{found}')", .member.label())]
    InvalidPhone {
        member: Member,
        digits: usize,
        found: String,
    },
}

const DEFAULT_PHONE_DIGITS: usize = 8;

/// Guard applied to submissions on their way to storage. The engine itself
/// accepts any declaration.
///
/// Every assessed member needs a name, an age and a phone number. An age of
/// zero is what a blank or unparseable age coerces to, so it counts as
/// missing.
#[derive(Debug, Clone)]
pub struct IntakeGuard {
    phone_digits: usize,
}

impl Default for IntakeGuard {
    fn default() -> Self {
        Self::new(DEFAULT_PHONE_DIGITS)
    }
}

impl IntakeGuard {
    pub fn new(phone_digits: usize) -> Self {
        let phone_digits = if phone_digits == 0 {
            DEFAULT_PHONE_DIGITS
        } else {
            phone_digits
        };
        Self { phone_digits }
    }

    pub fn validate(&self, submission: &AssessmentSubmission) -> Result<(), IntakeViolation> {
        self.validate_household(&submission.declaration)
    }

    pub fn validate_household(
        &self,
        declaration: &HouseholdDeclaration,
    ) -> Result<(), IntakeViolation> {
        if declaration.primary.name.trim().is_empty() {
            return Err(IntakeViolation::MissingPrimaryName);
        }
        self.validate_member(&declaration.primary, Member::Primary)?;

        if declaration.is_couple {
            let spouse = declaration
                .spouse
                .as_ref()
                .filter(|spouse| !spouse.name.trim().is_empty())
                .ok_or(IntakeViolation::MissingSpouse)?;
            self.validate_member(spouse, Member::Spouse)?;
        }

        Ok(())
    }

    fn validate_member(
        &self,
        person: &PersonDeclaration,
        member: Member,
    ) -> Result<(), IntakeViolation> {
        if person.age == 0 {
            return Err(IntakeViolation::MissingAge { member });
        }
        self.validate_phone(person, member)
    }

    fn validate_phone(
        &self,
        person: &PersonDeclaration,
        member: Member,
    ) -> Result<(), IntakeViolation> {
        let phone = person
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
            .ok_or(IntakeViolation::MissingPhone { member })?;

        let valid =
            phone.len() == self.phone_digits && phone.chars().all(|ch| ch.is_ascii_digit());
        if valid {
            Ok(())
        } else {
            Err(IntakeViolation::InvalidPhone {
                member,
                digits: self.phone_digits,
                found: phone.to_string(),
            })
        }
    }
}

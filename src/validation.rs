//! Input checks applied before any store is touched
//!
//! Each function stops at the first problem, in form order, so the caller
//! can show a single message.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::error::ValidationError;
use crate::profile::{ColorTheme, UserProfile};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Date formats accepted for a date of birth
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Fail with `err` when the trimmed text is empty
pub fn require_text(value: &str, err: ValidationError) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(err)
    } else {
        Ok(())
    }
}

/// Fail with `err` unless the value is a finite number above zero
pub fn require_positive(value: f64, err: ValidationError) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(err)
    }
}

/// Both height and weight must be positive before a profile save
pub fn validate_body_metrics(height: f64, weight: f64) -> Result<(), ValidationError> {
    require_positive(height, ValidationError::Invalid { field: "height" })?;
    require_positive(weight, ValidationError::Invalid { field: "weight" })?;
    Ok(())
}

/// Parse a date of birth in any of the accepted formats
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw.trim(), fmt).ok())
}

/// Whole years between `dob` and `today`; negative for future dates
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

/// Sign-up form as entered
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub date_of_birth: String,
    pub address: String,
    /// Inches
    pub height: f64,
    /// Lbs
    pub weight: f64,
}

impl RegistrationForm {
    /// Validate the form and build the profile it describes.
    ///
    /// The password is checked and then dropped; nothing stores it.
    pub fn validate(&self, today: NaiveDate) -> Result<UserProfile, ValidationError> {
        require_text(&self.name, ValidationError::Required { field: "name" })?;
        require_text(&self.email, ValidationError::Required { field: "email" })?;
        if !self.email.contains('@') {
            return Err(ValidationError::Invalid {
                field: "email address",
            });
        }
        if self.password.is_empty() {
            return Err(ValidationError::Missing { what: "a password" });
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        require_text(
            &self.date_of_birth,
            ValidationError::Required {
                field: "date of birth",
            },
        )?;
        let dob = parse_date(&self.date_of_birth)
            .filter(|dob| age_on(*dob, today) >= 0)
            .ok_or(ValidationError::Invalid {
                field: "date of birth",
            })?;
        require_text(&self.address, ValidationError::Required { field: "address" })?;
        require_positive(self.height, ValidationError::Required { field: "height" })?;
        require_positive(self.weight, ValidationError::Required { field: "weight" })?;

        Ok(UserProfile {
            name: self.name.trim().to_string(),
            height: self.height,
            weight: self.weight,
            date_of_birth: Some(dob),
            address: Some(self.address.trim().to_string()),
            email: Some(self.email.trim().to_string()),
            profile_photo: None,
            theme: ColorTheme::Blue,
        })
    }
}

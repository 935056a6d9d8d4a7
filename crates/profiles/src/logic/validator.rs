use regex::Regex;
use shared::validation::{ValidationError, Validator};

use super::Profile;

pub const DEFAULT_EMAIL_REGEX: &str = r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$";
pub const DEFAULT_PHONE_REGEX: &str = r"^[0-9]{10}$";

const NAME_LEN: std::ops::RangeInclusive<usize> = 3..=50;
const ADDRESS_LEN: std::ops::RangeInclusive<usize> = 3..=50;

/// Patterns used by [`ProfileValidator`]. `None` keeps the default pattern.
#[derive(Debug, Clone, Default)]
pub struct ProfileValidatorConfig {
    pub email_regex: Option<String>,
    pub phone_regex: Option<String>,
}

/// Profile invariants: `id` and `user_id` are required, `user_id` must not
/// be empty, and the optional fields must be well formed when present.
#[derive(Debug, Clone)]
pub struct ProfileValidator {
    email: Regex,
    phone: Regex,
}

impl ProfileValidator {
    pub fn new(config: ProfileValidatorConfig) -> Result<Self, ValidationError> {
        let email = compile(
            config
                .email_regex
                .as_deref()
                .filter(|p| !p.is_empty())
                .unwrap_or(DEFAULT_EMAIL_REGEX),
        )?;
        let phone = compile(
            config
                .phone_regex
                .as_deref()
                .filter(|p| !p.is_empty())
                .unwrap_or(DEFAULT_PHONE_REGEX),
        )?;
        Ok(Self { email, phone })
    }
}

fn compile(pattern: &str) -> Result<Regex, ValidationError> {
    Regex::new(pattern).map_err(|e| ValidationError::Internal {
        msg: format!("invalid pattern {pattern}: {e}"),
    })
}

fn invalid(reason: &str) -> ValidationError {
    ValidationError::InvalidProfile {
        reason: reason.to_string(),
    }
}

impl Validator<Profile> for ProfileValidator {
    fn validate(&self, profile: &Profile) -> Result<(), ValidationError> {
        if profile.id.is_none() {
            return Err(ValidationError::FieldRequired { field: "id" });
        }
        let Some(user_id) = &profile.user_id else {
            return Err(ValidationError::FieldRequired { field: "user_id" });
        };

        if user_id.is_empty() {
            return Err(ValidationError::FieldEmpty { field: "user_id" });
        }

        if let Some(name) = &profile.name {
            if !NAME_LEN.contains(&name.len()) {
                return Err(invalid("name field must be between 3 and 50 characters"));
            }
        }
        if let Some(email) = &profile.email {
            if !self.email.is_match(email) {
                return Err(invalid("email field is invalid"));
            }
        }
        if let Some(phone) = &profile.phone {
            if !self.phone.is_match(phone) {
                return Err(invalid("phone field is invalid"));
            }
        }
        if let Some(address) = &profile.address {
            if !ADDRESS_LEN.contains(&address.len()) {
                return Err(invalid("address field must be between 3 and 50 characters"));
            }
        }

        Ok(())
    }
}

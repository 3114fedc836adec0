use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::form::models::{FormField, FormInput};

/// Rejection raised before any network or layout work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Por favor completa el campo: {}", .0.label())]
    MissingField(FormField),

    #[error("Por favor ingresa un correo electrónico válido")]
    InvalidEmail,
}

impl ValidationError {
    /// The field the user has to fix.
    pub fn field(&self) -> FormField {
        match self {
            ValidationError::MissingField(field) => *field,
            ValidationError::InvalidEmail => FormField::Email,
        }
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// Checks a submitted form. Fields are checked in form order, so the first blank
/// required field is the one reported.
pub fn validate(input: &FormInput) -> Result<(), ValidationError> {
    for field in FormField::REQUIRED {
        if input.value(field).trim().is_empty() {
            return Err(ValidationError::MissingField(field));
        }
    }

    if !is_valid_email(input.email.trim()) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_input() -> FormInput {
        FormInput {
            company_name: "Acme".to_string(),
            mission_vision: String::new(),
            company_description: "Fabrica cohetes".to_string(),
            job_position: "Engineer".to_string(),
            job_functions: "Diseñar sistemas".to_string(),
            technical_skills: "Rust".to_string(),
            soft_skills: "Comunicación".to_string(),
            email: "a@acme.com".to_string(),
        }
    }

    #[test]
    fn test_complete_input_passes() {
        assert_eq!(validate(&complete_input()), Ok(()));
    }

    #[test]
    fn test_mission_vision_is_optional() {
        let input = complete_input();
        assert!(input.mission_vision.is_empty());
        assert!(validate(&input).is_ok());
    }

    #[test]
    fn test_each_blank_required_field_is_rejected() {
        for field in FormField::REQUIRED {
            let mut input = complete_input();
            match field {
                FormField::CompanyName => input.company_name = "  ".to_string(),
                FormField::CompanyDescription => input.company_description.clear(),
                FormField::JobPosition => input.job_position.clear(),
                FormField::JobFunctions => input.job_functions = "\n".to_string(),
                FormField::TechnicalSkills => input.technical_skills.clear(),
                FormField::SoftSkills => input.soft_skills.clear(),
                FormField::Email => input.email.clear(),
                FormField::MissionVision => unreachable!("mission/vision is optional"),
            }
            assert_eq!(
                validate(&input),
                Err(ValidationError::MissingField(field)),
                "blank {:?} should be rejected",
                field
            );
        }
    }

    #[test]
    fn test_first_blank_field_is_reported() {
        let mut input = complete_input();
        input.job_position.clear();
        input.soft_skills.clear();
        assert_eq!(
            validate(&input),
            Err(ValidationError::MissingField(FormField::JobPosition))
        );
    }

    #[test]
    fn test_truncated_email_is_rejected() {
        let mut input = complete_input();
        input.email = "bad@".to_string();
        assert_eq!(validate(&input), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_short_email_is_accepted() {
        let mut input = complete_input();
        input.email = "a@b.co".to_string();
        assert!(validate(&input).is_ok());
    }

    #[test]
    fn test_email_patterns() {
        assert!(is_valid_email("ana.perez@empresa.com"));
        assert!(!is_valid_email("ana perez@empresa.com"));
        assert!(!is_valid_email("ana@empresa"));
        assert!(!is_valid_email("@empresa.com"));
    }

    #[test]
    fn test_error_message_names_the_field() {
        let err = ValidationError::MissingField(FormField::SoftSkills);
        assert_eq!(
            err.to_string(),
            "Por favor completa el campo: Habilidades blandas"
        );
        assert_eq!(err.field(), FormField::SoftSkills);
    }
}

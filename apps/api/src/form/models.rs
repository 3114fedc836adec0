use serde::{Deserialize, Serialize};

/// Hiring metadata collected by the form.
///
/// The same struct serves as the autosaved draft (any field may be blank) and as the
/// submitted input (checked by [`crate::form::validation::validate`] before generation).
/// JSON keys match the form's field ids so persisted drafts stay compatible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormInput {
    pub company_name: String,
    pub mission_vision: String,
    pub company_description: String,
    pub job_position: String,
    pub job_functions: String,
    pub technical_skills: String,
    pub soft_skills: String,
    pub email: String,
}

/// Identifies one form field, with its JSON key and its user-facing label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    CompanyName,
    MissionVision,
    CompanyDescription,
    JobPosition,
    JobFunctions,
    TechnicalSkills,
    SoftSkills,
    Email,
}

impl FormField {
    /// Required fields, in the order the form presents them.
    pub const REQUIRED: [FormField; 7] = [
        FormField::CompanyName,
        FormField::CompanyDescription,
        FormField::JobPosition,
        FormField::JobFunctions,
        FormField::TechnicalSkills,
        FormField::SoftSkills,
        FormField::Email,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FormField::CompanyName => "companyName",
            FormField::MissionVision => "missionVision",
            FormField::CompanyDescription => "companyDescription",
            FormField::JobPosition => "jobPosition",
            FormField::JobFunctions => "jobFunctions",
            FormField::TechnicalSkills => "technicalSkills",
            FormField::SoftSkills => "softSkills",
            FormField::Email => "email",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::CompanyName => "Nombre de la empresa",
            FormField::MissionVision => "Misión/Visión",
            FormField::CompanyDescription => "Descripción de la empresa",
            FormField::JobPosition => "Puesto",
            FormField::JobFunctions => "Funciones principales",
            FormField::TechnicalSkills => "Habilidades técnicas",
            FormField::SoftSkills => "Habilidades blandas",
            FormField::Email => "Correo de contacto",
        }
    }
}

impl FormInput {
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::CompanyName => &self.company_name,
            FormField::MissionVision => &self.mission_vision,
            FormField::CompanyDescription => &self.company_description,
            FormField::JobPosition => &self.job_position,
            FormField::JobFunctions => &self.job_functions,
            FormField::TechnicalSkills => &self.technical_skills,
            FormField::SoftSkills => &self.soft_skills,
            FormField::Email => &self.email,
        }
    }

    /// Returns a copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> FormInput {
        FormInput {
            company_name: self.company_name.trim().to_string(),
            mission_vision: self.mission_vision.trim().to_string(),
            company_description: self.company_description.trim().to_string(),
            job_position: self.job_position.trim().to_string(),
            job_functions: self.job_functions.trim().to_string(),
            technical_skills: self.technical_skills.trim().to_string(),
            soft_skills: self.soft_skills.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }

    pub fn mission_vision(&self) -> Option<&str> {
        Some(self.mission_vision.trim()).filter(|v| !v.is_empty())
    }
}

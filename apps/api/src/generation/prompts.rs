// Prompt text for script generation.
// Field values are inserted verbatim inside quotes; the model sees exactly what the user typed.

use crate::form::FormInput;

/// Opening request. Replace: {job_position}, {company_name}
pub const SCRIPT_REQUEST_TEMPLATE: &str = "Genera un script detallado de entrevista conductual \
    usando el método STAR para contratar el puesto de {job_position} en {company_name}.";

/// Only sent when mission/vision was provided. Replace: {mission_vision}
pub const MISSION_VISION_TEMPLATE: &str =
    " Tomando en cuenta la misión/visión: \"{mission_vision}\"";

/// Company and role context. Replace: {company_description}, {job_functions},
/// {technical_skills}, {soft_skills}
pub const ROLE_CONTEXT_TEMPLATE: &str = r#" La empresa se describe como: "{company_description}". Las principales funciones del puesto son: "{job_functions}". Las habilidades técnicas requeridas son: "{technical_skills}". Las habilidades blandas/aptitudes deseadas son: "{soft_skills}"."#;

/// Required structure of the returned script.
pub const SCRIPT_STRUCTURE: &str = r#"

El script debe incluir:
1. Introducción y presentación de la empresa
2. Preguntas conductuales específicas usando el método STAR (Situación, Tarea, Acción, Resultado)
3. Preguntas técnicas relevantes al puesto
4. Preguntas sobre habilidades blandas
5. Preguntas sobre motivación y fit cultural
6. Cierre y próximos pasos

Cada pregunta debe incluir:
- La pregunta específica
- Qué buscar en la respuesta
- Posibles preguntas de seguimiento
- Criterios de evaluación

Formato el resultado de manera profesional y estructurada."#;

/// Assembles the full generation prompt for a validated form.
pub fn build_prompt(form: &FormInput) -> String {
    let mut prompt = SCRIPT_REQUEST_TEMPLATE
        .replace("{job_position}", &form.job_position)
        .replace("{company_name}", &form.company_name);

    if let Some(mission_vision) = form.mission_vision() {
        prompt.push_str(&MISSION_VISION_TEMPLATE.replace("{mission_vision}", mission_vision));
    }

    prompt.push_str(
        &ROLE_CONTEXT_TEMPLATE
            .replace("{company_description}", &form.company_description)
            .replace("{job_functions}", &form.job_functions)
            .replace("{technical_skills}", &form.technical_skills)
            .replace("{soft_skills}", &form.soft_skills),
    );
    prompt.push_str(SCRIPT_STRUCTURE);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FormInput {
        FormInput {
            company_name: "Acme".to_string(),
            mission_vision: String::new(),
            company_description: "Fabrica cohetes".to_string(),
            job_position: "Engineer".to_string(),
            job_functions: "Diseñar motores".to_string(),
            technical_skills: "Rust, CAD".to_string(),
            soft_skills: "Liderazgo".to_string(),
            email: "a@acme.com".to_string(),
        }
    }

    #[test]
    fn test_prompt_names_position_and_company() {
        let prompt = build_prompt(&form());
        assert!(prompt.starts_with(
            "Genera un script detallado de entrevista conductual usando el método STAR \
             para contratar el puesto de Engineer en Acme."
        ));
    }

    #[test]
    fn test_prompt_quotes_every_field() {
        let prompt = build_prompt(&form());
        assert!(prompt.contains("La empresa se describe como: \"Fabrica cohetes\"."));
        assert!(prompt.contains("Las principales funciones del puesto son: \"Diseñar motores\"."));
        assert!(prompt.contains("Las habilidades técnicas requeridas son: \"Rust, CAD\"."));
        assert!(prompt.contains("Las habilidades blandas/aptitudes deseadas son: \"Liderazgo\"."));
        assert!(prompt.contains("6. Cierre y próximos pasos"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_mission_vision_only_when_present() {
        assert!(!build_prompt(&form()).contains("misión/visión"));

        let mut with_mission = form();
        with_mission.mission_vision = "Llegar a Marte".to_string();
        let prompt = build_prompt(&with_mission);
        assert!(prompt.contains(" Tomando en cuenta la misión/visión: \"Llegar a Marte\""));
    }
}

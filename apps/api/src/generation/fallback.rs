//! Fallback Script: a complete sample interview script built from the form alone.
//!
//! Substituted whenever the model call fails, so the user always gets a document.
//! User values are escaped; the rest of the markup is fixed.

use chrono::NaiveDate;
use quick_xml::escape::escape;

use crate::form::FormInput;

/// Heading of the first section; the extractor and tests key off it.
pub const FIRST_SECTION_HEADING: &str = "1. Introducción y Presentación (5 minutos)";

/// `d/m/yyyy`, without zero padding.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-d/%-m/%Y").to_string()
}

pub fn sample_script(form: &FormInput, date: NaiveDate) -> String {
    let company = escape(form.company_name.as_str());
    let position = escape(form.job_position.as_str());
    let description = form.company_description.to_lowercase();
    let description = escape(description.as_str());
    let mission = match form.mission_vision() {
        Some(mission) => format!(
            "\n<p>\"Nuestra misión y visión se centra en: {}\"</p>",
            escape(mission)
        ),
        None => String::new(),
    };
    let date = format_date(date);

    format!(
        r#"<div class="script-header">
<h3>Script de Entrevista Conductual</h3>
<p><strong>Empresa:</strong> {company}</p>
<p><strong>Puesto:</strong> {position}</p>
<p><strong>Fecha de generación:</strong> {date}</p>
</div>

<h3>{FIRST_SECTION_HEADING}</h3>
<h4>Saludo y presentación del entrevistador</h4>
<p>"Buenos días/tardes, mi nombre es [NOMBRE] y soy [CARGO] en {company}. Gracias por su interés en unirse a nuestro equipo."</p>

<h4>Presentación de la empresa</h4>
<p>"{company} es una empresa que {description}"</p>{mission}

<h4>Estructura de la entrevista</h4>
<p>"Esta entrevista durará aproximadamente 60 minutos y estará dividida en varias secciones para conocer mejor su experiencia y habilidades."</p>

<h3>2. Preguntas Conductuales - Método STAR (25 minutos)</h3>

<h4>Pregunta 1: Liderazgo y Toma de Decisiones</h4>
<p><strong>Pregunta:</strong> "Cuénteme sobre una situación en la que tuvo que tomar una decisión difícil bajo presión. ¿Cómo manejó la situación?"</p>
<p><strong>Qué buscar:</strong></p>
<ul>
<li><strong>Situación:</strong> Contexto claro y específico</li>
<li><strong>Tarea:</strong> Responsabilidad asumida</li>
<li><strong>Acción:</strong> Pasos concretos tomados</li>
<li><strong>Resultado:</strong> Impacto medible y aprendizajes</li>
</ul>
<p><strong>Preguntas de seguimiento:</strong> "¿Qué haría diferente?" "¿Cómo afectó esto al equipo?"</p>

<h4>Pregunta 2: Trabajo en Equipo</h4>
<p><strong>Pregunta:</strong> "Describa una ocasión en la que tuvo que trabajar con un equipo diverso para alcanzar un objetivo común."</p>
<p><strong>Qué buscar:</strong> Colaboración, comunicación, resolución de conflictos, adaptabilidad</p>

<h4>Pregunta 3: Resolución de Problemas</h4>
<p><strong>Pregunta:</strong> "Hábleme de un problema complejo que haya resuelto en su trabajo anterior. ¿Cuál fue su enfoque?"</p>
<p><strong>Qué buscar:</strong> Pensamiento analítico, creatividad, persistencia, metodología</p>

<h3>3. Preguntas Técnicas (15 minutos)</h3>
<p>Basadas en las habilidades técnicas requeridas para {position}:</p>
<ul>
<li>Experiencia específica con las tecnologías mencionadas</li>
<li>Proyectos relevantes realizados</li>
<li>Desafíos técnicos superados</li>
<li>Conocimiento de mejores prácticas</li>
</ul>

<h3>4. Evaluación de Habilidades Blandas (10 minutos)</h3>
<h4>Comunicación</h4>
<p>"¿Cómo explica conceptos técnicos complejos a personas no técnicas?"</p>

<h4>Adaptabilidad</h4>
<p>"Cuénteme sobre una vez que tuvo que adaptarse rápidamente a un cambio significativo en su trabajo."</p>

<h3>5. Motivación y Fit Cultural (5 minutos)</h3>
<p>"¿Qué lo motiva a trabajar en {company}?"</p>
<p>"¿Cómo se ve contribuyendo a nuestros objetivos empresariales?"</p>

<h3>6. Cierre y Próximos Pasos</h3>
<p>"¿Tiene alguna pregunta sobre el puesto o la empresa?"</p>
<p>"Los próximos pasos en nuestro proceso son..."</p>
<p>"Estaremos en contacto en los próximos [X] días."</p>

<h3>Criterios de Evaluación</h3>
<ul>
<li><strong>Excelente (4):</strong> Respuestas completas con ejemplos específicos y resultados medibles</li>
<li><strong>Bueno (3):</strong> Respuestas claras con ejemplos relevantes</li>
<li><strong>Satisfactorio (2):</strong> Respuestas básicas pero adecuadas</li>
<li><strong>Insuficiente (1):</strong> Respuestas vagas o irrelevantes</li>
</ul>

<h3>Notas del Entrevistador</h3>
<p>Espacio para observaciones adicionales:</p>
<div class="notes-box"></div>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FormInput {
        FormInput {
            company_name: "Acme & Co".to_string(),
            mission_vision: String::new(),
            company_description: "Fabrica COHETES".to_string(),
            job_position: "Engineer".to_string(),
            job_functions: "x".to_string(),
            technical_skills: "x".to_string(),
            soft_skills: "x".to_string(),
            email: "a@acme.com".to_string(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn test_format_date_is_unpadded_day_month_year() {
        assert_eq!(format_date(date()), "5/3/2024");
    }

    #[test]
    fn test_sample_escapes_user_values() {
        let script = sample_script(&form(), date());
        assert!(script.contains("Acme &amp; Co"));
        assert!(!script.contains("Acme & Co"));
    }

    #[test]
    fn test_sample_lowercases_description() {
        let script = sample_script(&form(), date());
        assert!(script.contains("es una empresa que fabrica cohetes"));
    }

    #[test]
    fn test_sample_includes_first_section_and_date() {
        let script = sample_script(&form(), date());
        assert!(script.contains(&format!("<h3>{FIRST_SECTION_HEADING}</h3>")));
        assert!(script.contains("<strong>Fecha de generación:</strong> 5/3/2024"));
    }

    #[test]
    fn test_mission_paragraph_only_when_present() {
        assert!(!sample_script(&form(), date()).contains("Nuestra misión"));
        let mut with_mission = form();
        with_mission.mission_vision = "Llegar a Marte".to_string();
        assert!(sample_script(&with_mission, date())
            .contains("\"Nuestra misión y visión se centra en: Llegar a Marte\""));
    }
}

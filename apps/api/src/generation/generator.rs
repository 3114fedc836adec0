//! Script generation: prompt, model call and formatter, or the sample fallback.
//!
//! Generation never fails from the caller's point of view: any model error is logged
//! and the sample script is substituted.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::form::FormInput;
use crate::generation::fallback::sample_script;
use crate::generation::formatter::format_response;
use crate::generation::prompts::build_prompt;
use crate::llm_client::TextGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptSource {
    Model,
    Fallback,
}

/// One generated script plus the form snapshot it was generated from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedScript {
    pub id: Uuid,
    pub form: FormInput,
    pub markup: String,
    pub source: ScriptSource,
    pub generated_on: NaiveDate,
}

/// Generates the script for an already validated form.
pub async fn generate_script(
    form: FormInput,
    llm: &dyn TextGenerator,
    generated_on: NaiveDate,
) -> GeneratedScript {
    let prompt = build_prompt(&form);
    info!(
        company = %form.company_name,
        position = %form.job_position,
        "Requesting interview script"
    );

    let (markup, source) = match llm.generate(&prompt).await {
        Ok(text) => {
            let markup = format_response(&text);
            if markup.trim().is_empty() {
                warn!("Model response formatted to empty markup, using sample script");
                (sample_script(&form, generated_on), ScriptSource::Fallback)
            } else {
                (markup, ScriptSource::Model)
            }
        }
        Err(e) => {
            warn!("Script generation failed, using sample script: {e}");
            (sample_script(&form, generated_on), ScriptSource::Fallback)
        }
    };

    GeneratedScript {
        id: Uuid::new_v4(),
        form,
        markup,
        source,
        generated_on,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;

    use crate::llm_client::{LlmError, TextGenerator};

    /// Always fails as if the network were down.
    pub struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 503,
                message: "network unavailable".to_string(),
            })
        }
    }

    /// Returns fixed text for every prompt.
    pub struct CannedGenerator(pub String);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.clone())
        }
    }
}

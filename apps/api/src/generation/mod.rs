// Script generation: prompt construction, the model call, response formatting,
// the sample-script fallback and the single-flight guard.
// All model calls go through llm_client::TextGenerator.

pub mod fallback;
pub mod formatter;
pub mod generator;
pub mod guard;
pub mod handlers;
pub mod prompts;

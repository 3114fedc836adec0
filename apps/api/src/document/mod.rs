//! Document output: page model, header/cover, appendix, assembly and the PDF writer.

pub mod appendix;
pub mod assembler;
pub mod header;
pub mod model;
pub mod pdf;

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::raster::RasterError;

pub use assembler::DocumentAssembler;
pub use pdf::{fold_to_ascii, render_pdf};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Rasterization failed: {0}")]
    Raster(#[from] RasterError),

    #[error("PDF writer failed: {0}")]
    Pdf(String),

    #[error("Document has no pages")]
    EmptyDocument,

    #[error("Render task failed: {0}")]
    Task(String),
}

fn whitespace_runs() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is a valid regex"))
}

fn filename_part(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '"' | '\'' | ':' | '*' | '?' | '<' | '>' | '|'))
        .filter(|c| c.is_whitespace() || !c.is_control())
        .collect();
    whitespace_runs().replace_all(cleaned.trim(), "_").into_owned()
}

/// `Script_Entrevista_<company>_<position>.pdf`
pub fn document_filename(company: &str, position: &str) -> String {
    format!(
        "Script_Entrevista_{}_{}.pdf",
        filename_part(company),
        filename_part(position)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_form_values() {
        assert_eq!(
            document_filename("Acme", "Engineer"),
            "Script_Entrevista_Acme_Engineer.pdf"
        );
    }

    #[test]
    fn test_filename_collapses_whitespace_runs() {
        assert_eq!(
            document_filename("Acme  Corp", "Senior\tRust Engineer"),
            "Script_Entrevista_Acme_Corp_Senior_Rust_Engineer.pdf"
        );
    }

    #[test]
    fn test_filename_drops_path_and_quote_characters() {
        assert_eq!(
            document_filename("R/D \"Labs\"", "..\\Dev"),
            "Script_Entrevista_RD_Labs_..Dev.pdf"
        );
    }
}

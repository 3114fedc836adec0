//! Table-of-Contents Builder: numbered section entries and dotted-leader rows.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::content::blocks::ContentBlock;
use crate::layout::font_metrics::text_width_mm;
use crate::layout::style::TextStyle;

/// Headings containing this are the document title, not a section.
pub const TITLE_HEADING: &str = "Script de Entrevista Conductual";
/// Frame row pointing at the appendix.
pub const APPENDIX_ROW: &str = "Datos del Formulario";

/// Sections listed when the script has no usable headings.
pub const DEFAULT_SECTIONS: [&str; 7] = [
    "Introducción y Presentación",
    "Preguntas Conductuales - Método STAR",
    "Preguntas Técnicas",
    "Evaluación de Habilidades Blandas",
    "Motivación y Fit Cultural",
    "Cierre y Próximos Pasos",
    "Criterios de Evaluación",
];

/// Space between the start of the row text and the right edge of the page label.
const LEADER_SPAN_MM: f32 = 150.0;
/// Approximate advance of one leader dot.
const DOT_PITCH_MM: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// 1-based and contiguous.
    pub number: usize,
    pub title: String,
    /// Position of the source heading among all headings; `None` for default entries.
    #[serde(skip)]
    pub heading_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableOfContents {
    pub entries: Vec<TocEntry>,
    /// True when the fixed default sections were used.
    pub is_default: bool,
}

fn numbering_pattern() -> &'static Regex {
    static NUMBERING: OnceLock<Regex> = OnceLock::new();
    NUMBERING.get_or_init(|| Regex::new(r"^\d+\.\s*").expect("numbering pattern is a valid regex"))
}

impl TableOfContents {
    /// Builds entries from heading texts in document order.
    pub fn from_headings<I, S>(headings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries: Vec<TocEntry> = headings
            .into_iter()
            .enumerate()
            .filter_map(|(index, heading)| {
                let text = heading.as_ref().trim();
                if text.is_empty() || text.contains(TITLE_HEADING) {
                    return None;
                }
                let title = numbering_pattern().replace(text, "").trim().to_string();
                (!title.is_empty()).then_some((index, title))
            })
            .enumerate()
            .map(|(i, (heading_index, title))| TocEntry {
                number: i + 1,
                title,
                heading_index: Some(heading_index),
            })
            .collect();

        if entries.is_empty() {
            return Self::default_sections();
        }
        Self {
            entries,
            is_default: false,
        }
    }

    pub fn from_blocks(blocks: &[ContentBlock]) -> Self {
        Self::from_headings(blocks.iter().filter_map(ContentBlock::heading_text))
    }

    pub fn default_sections() -> Self {
        Self {
            entries: DEFAULT_SECTIONS
                .iter()
                .enumerate()
                .map(|(i, title)| TocEntry {
                    number: i + 1,
                    title: title.to_string(),
                    heading_index: None,
                })
                .collect(),
            is_default: true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All printed rows: title frame row, one row per entry, appendix frame row.
    ///
    /// `entry_pages[i]` labels entry `i`; missing labels fall back to `body_page`.
    pub fn rows(
        &self,
        body_page: usize,
        entry_pages: &[Option<usize>],
        appendix_page: usize,
    ) -> Vec<(String, String)> {
        let mut rows = Vec::with_capacity(self.entries.len() + 2);
        rows.push((TITLE_HEADING.to_string(), body_page.to_string()));
        for (i, entry) in self.entries.iter().enumerate() {
            let page = entry_pages.get(i).copied().flatten().unwrap_or(body_page);
            rows.push((format!("  {}. {}", entry.number, entry.title), page.to_string()));
        }
        rows.push((APPENDIX_ROW.to_string(), format!("{appendix_page}+")));
        rows
    }
}

/// Number of leader dots between a row's text and its page label.
pub fn leader_dots(text: &str, page: &str, style: &TextStyle) -> usize {
    let gap = LEADER_SPAN_MM - text_width_mm(text, style) - text_width_mm(page, style);
    if gap <= 0.0 {
        0
    } else {
        (gap / DOT_PITCH_MM).floor() as usize
    }
}

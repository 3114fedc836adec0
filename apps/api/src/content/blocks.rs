use serde::Serialize;

/// One structural unit of a generated script, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Heading { text: String },
    Subheading { text: String },
    Paragraph { text: String },
    List { items: Vec<String> },
}

impl ContentBlock {
    pub fn heading_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Heading { text } => Some(text),
            _ => None,
        }
    }
}

/// Role of a paragraph inside a question block, decided by its marker label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphKind {
    Question,
    WhatToLookFor,
    FollowUp,
    Plain,
}

/// Marker labels per kind. Checked in this order; the first kind with a match wins.
const MARKERS: [(ParagraphKind, &[&str]); 3] = [
    (ParagraphKind::Question, &["Pregunta:", "Question:"]),
    (ParagraphKind::WhatToLookFor, &["Qué buscar:", "What to look for:"]),
    (
        ParagraphKind::FollowUp,
        &["Preguntas de seguimiento:", "Follow-up questions:"],
    ),
];

impl ParagraphKind {
    /// Classifies a paragraph and returns the text after its marker.
    /// `Plain` paragraphs come back whole.
    pub fn classify(text: &str) -> (ParagraphKind, &str) {
        for (kind, markers) in MARKERS {
            for marker in markers {
                if let Some(idx) = text.find(marker) {
                    let rest = &text[idx + marker.len()..];
                    // Body ends where another occurrence of the same marker begins.
                    let body = match rest.find(marker) {
                        Some(end) => &rest[..end],
                        None => rest,
                    };
                    return (kind, body.trim());
                }
            }
        }
        (ParagraphKind::Plain, text)
    }

    /// Label drawn above the body of a marked paragraph.
    pub fn label(self) -> Option<&'static str> {
        match self {
            ParagraphKind::Question => Some("Pregunta:"),
            ParagraphKind::WhatToLookFor => Some("Qué buscar en la respuesta:"),
            ParagraphKind::FollowUp => Some("Posibles preguntas de seguimiento:"),
            ParagraphKind::Plain => None,
        }
    }
}

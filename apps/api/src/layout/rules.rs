//! Block layout rules: how each content block becomes positioned lines on a page.
//!
//! A block becomes a flat list of `LayoutItem`s interpreted against a vertical cursor.
//! X positions are page millimetres (the body column starts at [`BODY_LEFT_MM`]).
//! `BreakBefore` items carry the block's keep-together threshold; engines that paginate
//! start a new page when the cursor is already past it, engines that don't ignore it.

use std::sync::OnceLock;

use regex::Regex;

use crate::content::blocks::{ContentBlock, ParagraphKind};
use crate::layout::font_metrics::{wrap_text, TextMeasure};
use crate::layout::style::TextRole;

/// Left edge of the body column on the page.
pub const BODY_LEFT_MM: f32 = 20.0;
/// Width of the body column.
pub const BODY_WIDTH_MM: f32 = 170.0;

/// Any block starting below this line moves to the next page.
pub const ANY_BLOCK_BREAK_MM: f32 = 255.0;
const HEADING_BREAK_MM: f32 = 245.0;
const SUBHEADING_BREAK_MM: f32 = 248.0;
const QUESTION_BREAK_MM: f32 = 240.0;
const FOLLOW_UP_BREAK_MM: f32 = 245.0;
const LIST_ITEM_BREAK_MM: f32 = 255.0;

const STAR_MARKERS: [&str; 4] = ["Situación:", "Tarea:", "Acción:", "Resultado:"];
const CRITERIA_MARKERS: [&str; 4] = ["Excelente", "Bueno", "Satisfactorio", "Insuficiente"];

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutItem {
    /// Start a new page if the cursor is below this line.
    BreakBefore(f32),
    /// Move the cursor down.
    Advance(f32),
    /// Draw lines downward from the cursor baseline without moving the cursor.
    Lines {
        x_mm: f32,
        lines: Vec<String>,
        role: TextRole,
    },
    /// Horizontal rule `offset_mm` below the cursor.
    Rule { x1_mm: f32, x2_mm: f32, offset_mm: f32 },
    /// List bullet at the cursor baseline.
    Bullet { x_mm: f32 },
}

/// Line pitch used when advancing past wrapped lines of a role.
pub fn line_height(role: TextRole) -> f32 {
    role.style().line_height_mm()
}

fn lines_height(count: usize, pitch: f32) -> f32 {
    count as f32 * pitch
}

struct Builder<'a> {
    measure: &'a dyn TextMeasure,
    items: Vec<LayoutItem>,
}

impl<'a> Builder<'a> {
    fn new(measure: &'a dyn TextMeasure) -> Self {
        Self {
            measure,
            items: vec![LayoutItem::BreakBefore(ANY_BLOCK_BREAK_MM)],
        }
    }

    fn push(&mut self, item: LayoutItem) {
        self.items.push(item);
    }

    fn advance(&mut self, mm: f32) {
        if mm > 0.0 {
            self.items.push(LayoutItem::Advance(mm));
        }
    }

    /// Wraps and places text; returns the number of lines drawn.
    fn text(&mut self, text: &str, role: TextRole, x_mm: f32, width_mm: f32) -> usize {
        let lines = wrap_text(text, role, width_mm, self.measure);
        let count = lines.len();
        if count > 0 {
            self.items.push(LayoutItem::Lines { x_mm, lines, role });
        }
        count
    }

    /// A bulleted item: bullet at `bullet_x`, text wrapped at `width` from `text_x`.
    fn bullet(&mut self, text: &str, bullet_x: f32, text_x: f32, width: f32) -> usize {
        self.items.push(LayoutItem::Bullet { x_mm: bullet_x });
        self.text(text, TextRole::Body, text_x, width)
    }
}

/// Lays out one block.
pub fn layout_block(block: &ContentBlock, measure: &dyn TextMeasure) -> Vec<LayoutItem> {
    let mut b = Builder::new(measure);
    match block {
        ContentBlock::Heading { text } => {
            b.push(LayoutItem::BreakBefore(HEADING_BREAK_MM));
            b.advance(10.0);
            let n = b.text(text, TextRole::Heading, BODY_LEFT_MM, 165.0);
            b.advance(lines_height(n.saturating_sub(1), line_height(TextRole::Heading)));
            b.push(LayoutItem::Rule {
                x1_mm: BODY_LEFT_MM,
                x2_mm: 185.0,
                offset_mm: 2.0,
            });
            b.advance(10.0);
        }
        ContentBlock::Subheading { text } => {
            b.push(LayoutItem::BreakBefore(SUBHEADING_BREAK_MM));
            b.advance(8.0);
            let n = b.text(text, TextRole::Subheading, 30.0, 155.0);
            b.advance(lines_height(n.saturating_sub(1), line_height(TextRole::Subheading)));
            b.advance(8.0);
        }
        ContentBlock::Paragraph { text } => layout_paragraph(&mut b, text),
        ContentBlock::List { items } => {
            for item in items {
                b.push(LayoutItem::BreakBefore(LIST_ITEM_BREAK_MM));
                if CRITERIA_MARKERS.iter().any(|m| item.contains(m)) {
                    let n = b.bullet(item, 50.0, 55.0, 120.0);
                    b.advance(lines_height(n, 4.0) + 5.0);
                } else {
                    let n = b.bullet(item, 35.0, 40.0, 140.0);
                    b.advance(lines_height(n, 4.5) + 3.0);
                }
            }
            b.advance(6.0);
        }
    }
    b.items
}

fn layout_paragraph(b: &mut Builder<'_>, text: &str) {
    let (kind, body) = ParagraphKind::classify(text);
    match kind {
        ParagraphKind::Question => {
            b.push(LayoutItem::BreakBefore(QUESTION_BREAK_MM));
            label(b, kind, 30.0, 5.0);
            let n = b.text(body, TextRole::Body, 30.0, 150.0);
            b.advance(lines_height(n, 4.5) + 6.0);
        }
        ParagraphKind::WhatToLookFor => {
            b.push(LayoutItem::BreakBefore(QUESTION_BREAK_MM));
            label(b, kind, 30.0, 5.0);
            let star = star_items(body);
            if !star.is_empty() {
                for item in star {
                    let n = b.bullet(item, 50.0, 55.0, 120.0);
                    b.advance(lines_height(n, 4.0) + 4.0);
                }
            } else {
                let n = b.text(body, TextRole::Body, 35.0, 150.0);
                if n > 0 {
                    b.advance(lines_height(n, 4.0) + 6.0);
                }
            }
            b.advance(4.0);
        }
        ParagraphKind::FollowUp => {
            b.push(LayoutItem::BreakBefore(FOLLOW_UP_BREAK_MM));
            label(b, kind, 35.0, 6.0);
            let questions = quoted_questions(body);
            if !questions.is_empty() {
                for question in questions {
                    let n = b.bullet(&question, 50.0, 55.0, 120.0);
                    b.advance(lines_height(n, 4.0) + 4.0);
                }
            } else {
                let n = b.text(body, TextRole::Body, 35.0, 150.0);
                if n > 0 {
                    b.advance(lines_height(n, 4.0) + 6.0);
                }
            }
            b.advance(4.0);
        }
        ParagraphKind::Plain if text.contains('*') => {
            let parts = text.split('*').map(str::trim).filter(|p| !p.is_empty());
            for (index, part) in parts.enumerate() {
                if index == 0 && !part.contains(':') {
                    let n = b.text(part, TextRole::Body, 25.0, 160.0);
                    b.advance(lines_height(n, 4.0) + 6.0);
                } else {
                    let n = b.bullet(part, 45.0, 50.0, 125.0);
                    b.advance(lines_height(n, 4.0) + 4.0);
                }
            }
        }
        ParagraphKind::Plain => {
            let n = b.text(text, TextRole::Body, 25.0, 160.0);
            b.advance(lines_height(n, 4.5) + 4.0);
        }
    }
}

fn label(b: &mut Builder<'_>, kind: ParagraphKind, x_mm: f32, after_mm: f32) {
    if let Some(text) = kind.label() {
        let role = match kind {
            ParagraphKind::FollowUp => TextRole::MinorLabel,
            _ => TextRole::Label,
        };
        b.push(LayoutItem::Lines {
            x_mm,
            lines: vec![text.to_string()],
            role,
        });
        b.advance(after_mm);
    }
}

/// Splits a "what to look for" body into its STAR items, in marker order.
/// Returns nothing unless the body uses the Situación/Tarea markers.
pub fn star_items(body: &str) -> Vec<&str> {
    if !(body.contains(STAR_MARKERS[0]) || body.contains(STAR_MARKERS[1])) {
        return Vec::new();
    }
    let mut items = Vec::new();
    for marker in STAR_MARKERS {
        let Some(start) = body.find(marker) else {
            continue;
        };
        let after = start + marker.len();
        let end = STAR_MARKERS
            .iter()
            .filter_map(|next| body[after..].find(next).map(|i| after + i))
            .min()
            .unwrap_or(body.len());
        let item = body[start..end].trim();
        if !item.is_empty() {
            items.push(item);
        }
    }
    items
}

fn quoted_pattern() -> &'static Regex {
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    QUOTED.get_or_init(|| Regex::new(r#""[^"]+""#).expect("quoted pattern is a valid regex"))
}

/// Quoted follow-up questions with their quotes removed.
pub fn quoted_questions(body: &str) -> Vec<String> {
    quoted_pattern()
        .find_iter(body)
        .map(|m| m.as_str().replace('"', ""))
        .filter(|q| !q.trim().is_empty())
        .collect()
}

/// Total vertical extent of a block's items, ignoring page breaks.
pub fn block_height(items: &[LayoutItem]) -> f32 {
    items
        .iter()
        .map(|item| match item {
            LayoutItem::Advance(mm) => *mm,
            _ => 0.0,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::HelveticaMeasure;

    fn layout(block: ContentBlock) -> Vec<LayoutItem> {
        layout_block(&block, &HelveticaMeasure)
    }

    fn breaks(items: &[LayoutItem]) -> Vec<f32> {
        items
            .iter()
            .filter_map(|i| match i {
                LayoutItem::BreakBefore(t) => Some(*t),
                _ => None,
            })
            .collect()
    }

    fn bullets(items: &[LayoutItem]) -> Vec<f32> {
        items
            .iter()
            .filter_map(|i| match i {
                LayoutItem::Bullet { x_mm } => Some(*x_mm),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_heading_layout() {
        let items = layout(ContentBlock::Heading {
            text: "1. Introducción".to_string(),
        });
        assert_eq!(breaks(&items), vec![255.0, 245.0]);
        assert!(items.contains(&LayoutItem::Lines {
            x_mm: 20.0,
            lines: vec!["1. Introducción".to_string()],
            role: TextRole::Heading
        }));
        assert!(items.contains(&LayoutItem::Rule {
            x1_mm: 20.0,
            x2_mm: 185.0,
            offset_mm: 2.0
        }));
        assert!((block_height(&items) - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_subheading_layout() {
        let items = layout(ContentBlock::Subheading {
            text: "Comunicación".to_string(),
        });
        assert_eq!(breaks(&items), vec![255.0, 248.0]);
        assert!((block_height(&items) - 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_question_paragraph() {
        let items = layout(ContentBlock::Paragraph {
            text: "Pregunta: \"¿Por qué?\"".to_string(),
        });
        assert_eq!(breaks(&items), vec![255.0, 240.0]);
        assert!(items.contains(&LayoutItem::Lines {
            x_mm: 30.0,
            lines: vec!["Pregunta:".to_string()],
            role: TextRole::Label
        }));
        // label 5 + one line 4.5 + 6
        assert!((block_height(&items) - 15.5).abs() < 1e-4);
    }

    #[test]
    fn test_what_to_look_for_splits_star_items() {
        let items = layout(ContentBlock::Paragraph {
            text: "Qué buscar: Situación: contexto Tarea: rol Acción: pasos Resultado: impacto"
                .to_string(),
        });
        assert_eq!(bullets(&items), vec![50.0; 4]);
        assert!(items.contains(&LayoutItem::Lines {
            x_mm: 30.0,
            lines: vec!["Qué buscar en la respuesta:".to_string()],
            role: TextRole::Label
        }));
    }

    #[test]
    fn test_what_to_look_for_without_star_is_plain_text() {
        let items = layout(ContentBlock::Paragraph {
            text: "Qué buscar: Colaboración, comunicación".to_string(),
        });
        assert!(bullets(&items).is_empty());
        assert!(items.iter().any(|i| matches!(i, LayoutItem::Lines { x_mm, .. } if *x_mm == 35.0)));
    }

    #[test]
    fn test_follow_up_quoted_questions_become_bullets() {
        let items = layout(ContentBlock::Paragraph {
            text: "Preguntas de seguimiento: \"¿Qué haría diferente?\" \"¿Cómo afectó?\"".to_string(),
        });
        assert_eq!(breaks(&items), vec![255.0, 245.0]);
        assert_eq!(bullets(&items), vec![50.0, 50.0]);
        assert!(items.contains(&LayoutItem::Lines {
            x_mm: 55.0,
            lines: vec!["¿Qué haría diferente?".to_string()],
            role: TextRole::Body
        }));
    }

    #[test]
    fn test_plain_paragraph_with_asterisks() {
        let items = layout(ContentBlock::Paragraph {
            text: "Evalúe lo siguiente * Claridad: alta * Ejemplos: concretos".to_string(),
        });
        assert_eq!(bullets(&items), vec![45.0, 45.0]);
        assert!(items.iter().any(|i| matches!(i, LayoutItem::Lines { x_mm, .. } if *x_mm == 25.0)));
    }

    #[test]
    fn test_plain_paragraph() {
        let items = layout(ContentBlock::Paragraph {
            text: "Texto corto".to_string(),
        });
        assert_eq!(breaks(&items), vec![255.0]);
        assert!((block_height(&items) - 8.5).abs() < 1e-4);
    }

    #[test]
    fn test_list_criteria_items_are_indented_further() {
        let items = layout(ContentBlock::List {
            items: vec![
                "Excelente (4): completas".to_string(),
                "Proyectos relevantes".to_string(),
            ],
        });
        assert_eq!(bullets(&items), vec![50.0, 35.0]);
        assert_eq!(breaks(&items), vec![255.0, 255.0, 255.0]);
        // (4 + 5) + (4.5 + 3) + 6
        assert!((block_height(&items) - 22.5).abs() < 1e-4);
    }

    #[test]
    fn test_star_items_follow_marker_order() {
        assert_eq!(
            star_items("Tarea: b Situación: a"),
            vec!["Situación: a", "Tarea: b"]
        );
        assert!(star_items("Acción: sin contexto").is_empty());
    }

    #[test]
    fn test_quoted_questions() {
        assert_eq!(
            quoted_questions("\"¿Uno?\" y \"¿Dos?\""),
            vec!["¿Uno?".to_string(), "¿Dos?".to_string()]
        );
        assert!(quoted_questions("sin comillas").is_empty());
    }
}

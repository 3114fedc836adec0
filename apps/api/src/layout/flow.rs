//! Text flow engine: lays content blocks onto body pages as vector text.
//!
//! Uses the same block rules as the rasterizer, but honors each block's
//! `BreakBefore` thresholds and never lets a line baseline pass
//! `CONTENT_BOTTOM_MM`; a block that runs past the bottom continues on a new page.

use tracing::debug;

use crate::content::blocks::ContentBlock;
use crate::document::model::{
    Document, DrawOp, PageCursor, PageKind, CONTENT_BOTTOM_MM, CONTENT_TOP_MM,
};
use crate::layout::font_metrics::HelveticaMeasure;
use crate::layout::rules::{layout_block, line_height, LayoutItem, BODY_LEFT_MM, BODY_WIDTH_MM};
use crate::layout::style::{Align, FontFace, Rgb, TextRole, TextStyle};

const SECTION_TITLE: &str = "SCRIPT DE ENTREVISTA CONDUCTUAL";
const BULLET_RADIUS_MM: f32 = 0.6;

/// Flows blocks onto new body pages appended to `doc`.
///
/// Returns the cursor after the last block; its `heading_pages` holds the page of
/// every heading in order.
pub fn flow_blocks(doc: &mut Document, blocks: &[ContentBlock]) -> PageCursor {
    let first = doc.add_page(PageKind::Body);
    let mut cursor = PageCursor::new(first, CONTENT_TOP_MM);

    section_title(doc, &mut cursor);

    for block in blocks {
        let items = layout_block(block, &HelveticaMeasure);
        let is_heading = matches!(block, ContentBlock::Heading { .. });
        let mut anchored = false;

        for item in items {
            match item {
                LayoutItem::BreakBefore(threshold) => {
                    if cursor.y_mm > threshold {
                        cursor.break_page(doc, PageKind::Body);
                    }
                }
                LayoutItem::Advance(mm) => cursor.y_mm += mm,
                LayoutItem::Lines { x_mm, lines, role } => {
                    if is_heading && !anchored {
                        cursor.heading_pages.push(cursor.page_index);
                        anchored = true;
                    }
                    place_lines(doc, &mut cursor, x_mm, lines, role);
                }
                LayoutItem::Rule {
                    x1_mm,
                    x2_mm,
                    offset_mm,
                } => {
                    let y = cursor.y_mm + offset_mm;
                    push(
                        doc,
                        &cursor,
                        DrawOp::Line {
                            x1_mm,
                            y1_mm: y,
                            x2_mm,
                            y2_mm: y,
                            width_mm: 0.2,
                            color: Rgb::NAVY,
                        },
                    );
                }
                LayoutItem::Bullet { x_mm } => {
                    if cursor.y_mm > CONTENT_BOTTOM_MM {
                        cursor.break_page(doc, PageKind::Body);
                    }
                    push(doc, &cursor, bullet_dot(x_mm, cursor.y_mm));
                }
            }
        }

        if is_heading && !anchored {
            cursor.heading_pages.push(cursor.page_index);
        }
    }

    debug!(
        pages = doc.pages.iter().filter(|p| p.kind == PageKind::Body).count(),
        "Flowed script body as text"
    );
    cursor
}

/// Filled title band at the top of the first body page.
fn section_title(doc: &mut Document, cursor: &mut PageCursor) {
    let y = cursor.y_mm;
    push(
        doc,
        cursor,
        DrawOp::FillRect {
            x_mm: BODY_LEFT_MM,
            y_mm: y - 5.0,
            w_mm: BODY_WIDTH_MM,
            h_mm: 12.0,
            color: Rgb::NAVY,
        },
    );
    push(
        doc,
        cursor,
        DrawOp::Text {
            x_mm: BODY_LEFT_MM + BODY_WIDTH_MM / 2.0,
            y_mm: y + 2.0,
            text: SECTION_TITLE.to_string(),
            style: TextStyle::new(FontFace::Bold, 14.0, Rgb::WHITE).aligned(Align::Center),
        },
    );
    cursor.y_mm += 20.0;
}

/// Places wrapped lines downward from the cursor. A line that would pass the
/// content bottom moves to a new page; the cursor is shifted so that following
/// advances stay relative to the lines already placed.
fn place_lines(
    doc: &mut Document,
    cursor: &mut PageCursor,
    x_mm: f32,
    lines: Vec<String>,
    role: TextRole,
) {
    let pitch = line_height(role);
    for (i, line) in lines.into_iter().enumerate() {
        let offset = i as f32 * pitch;
        if cursor.y_mm + offset > CONTENT_BOTTOM_MM {
            cursor.break_page(doc, PageKind::Body);
            cursor.y_mm = CONTENT_TOP_MM - offset;
        }
        push(
            doc,
            cursor,
            DrawOp::Text {
                x_mm,
                y_mm: cursor.y_mm + offset,
                text: line,
                style: role.style(),
            },
        );
    }
}

pub fn bullet_dot(x_mm: f32, baseline_mm: f32) -> DrawOp {
    DrawOp::Circle {
        cx_mm: x_mm + BULLET_RADIUS_MM,
        cy_mm: baseline_mm - 1.2,
        r_mm: BULLET_RADIUS_MM,
        color: Rgb::BLACK,
    }
}

fn push(doc: &mut Document, cursor: &PageCursor, op: DrawOp) {
    if let Some(page) = doc.page_mut(cursor.page_index) {
        page.push(op);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> ContentBlock {
        ContentBlock::Paragraph {
            text: text.to_string(),
        }
    }

    fn heading(text: &str) -> ContentBlock {
        ContentBlock::Heading {
            text: text.to_string(),
        }
    }

    #[test]
    fn test_short_body_fits_one_page() {
        let mut doc = Document::new("t");
        let cursor = flow_blocks(&mut doc, &[heading("Uno"), paragraph("Texto")]);
        assert_eq!(doc.len(), 1);
        assert_eq!(cursor.heading_pages, vec![0]);
        let texts: Vec<_> = doc.pages[0].texts().collect();
        assert_eq!(texts, vec![SECTION_TITLE, "Uno", "Texto"]);
    }

    #[test]
    fn test_no_baseline_passes_the_bottom() {
        let long = "palabra ".repeat(2000);
        let mut doc = Document::new("t");
        flow_blocks(&mut doc, &[paragraph(&long), heading("Fin")]);
        assert!(doc.len() > 2);
        for page in &doc.pages {
            for op in &page.ops {
                if let DrawOp::Text { y_mm, .. } = op {
                    assert!(*y_mm <= CONTENT_BOTTOM_MM + 1e-3, "baseline at {y_mm}");
                    assert!(*y_mm >= CONTENT_TOP_MM - 5.0, "baseline at {y_mm}");
                }
            }
        }
    }

    #[test]
    fn test_heading_past_threshold_starts_new_page() {
        // 60 mm + 22 paragraphs of 8.5 mm leaves the cursor at 247 mm.
        let mut blocks: Vec<ContentBlock> = (0..22).map(|i| paragraph(&format!("p{i}"))).collect();
        blocks.push(heading("Sección"));
        let mut doc = Document::new("t");
        let cursor = flow_blocks(&mut doc, &blocks);
        assert_eq!(doc.len(), 2);
        assert_eq!(cursor.heading_pages, vec![1]);
        assert!(doc.pages[1].texts().any(|t| t == "Sección"));
    }

    #[test]
    fn test_bullets_are_drawn_as_dots() {
        let mut doc = Document::new("t");
        flow_blocks(
            &mut doc,
            &[ContentBlock::List {
                items: vec!["a".to_string(), "b".to_string()],
            }],
        );
        let dots = doc.pages[0]
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Circle { .. }))
            .count();
        assert_eq!(dots, 2);
    }
}

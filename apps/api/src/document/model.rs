//! Page model: pages hold absolute-positioned draw operations in millimetres,
//! origin top-left, y growing downward. The PDF writer flips to PDF coordinates.

use std::sync::Arc;

use image::RgbImage;

use crate::layout::style::{Rgb, TextStyle};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
/// Bottom of the header band drawn on every non-cover page.
pub const HEADER_HEIGHT_MM: f32 = 25.0;
/// First content line below the header.
pub const CONTENT_TOP_MM: f32 = 40.0;
/// No content baseline may go below this.
pub const CONTENT_BOTTOM_MM: f32 = 287.0;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// `y_mm` is the text baseline.
    Text {
        x_mm: f32,
        y_mm: f32,
        text: String,
        style: TextStyle,
    },
    FillRect {
        x_mm: f32,
        y_mm: f32,
        w_mm: f32,
        h_mm: f32,
        color: Rgb,
    },
    Line {
        x1_mm: f32,
        y1_mm: f32,
        x2_mm: f32,
        y2_mm: f32,
        width_mm: f32,
        color: Rgb,
    },
    /// Filled circle.
    Circle {
        cx_mm: f32,
        cy_mm: f32,
        r_mm: f32,
        color: Rgb,
    },
    /// `y_mm` is the top edge.
    Image {
        x_mm: f32,
        y_mm: f32,
        w_mm: f32,
        h_mm: f32,
        image: Arc<RgbImage>,
    },
}

impl DrawOp {
    /// Lowest point the operation reaches on the page.
    pub fn bottom_mm(&self) -> f32 {
        match self {
            DrawOp::Text { y_mm, .. } => *y_mm,
            DrawOp::FillRect { y_mm, h_mm, .. } | DrawOp::Image { y_mm, h_mm, .. } => y_mm + h_mm,
            DrawOp::Line { y1_mm, y2_mm, .. } => y1_mm.max(*y2_mm),
            DrawOp::Circle { cy_mm, r_mm, .. } => cy_mm + r_mm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Cover,
    Contents,
    Body,
    Appendix,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub kind: PageKind,
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn new(kind: PageKind) -> Self {
        Self {
            kind,
            ops: Vec::new(),
        }
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn has_header(&self) -> bool {
        self.kind != PageKind::Cover
    }
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    pub title: String,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pages: Vec::new(),
        }
    }

    /// Appends a page and returns its index.
    pub fn add_page(&mut self, kind: PageKind) -> usize {
        self.pages.push(Page::new(kind));
        self.pages.len() - 1
    }

    pub fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Number of pages that carry the header (every page but the cover).
    pub fn numbered_count(&self) -> usize {
        self.pages.iter().filter(|p| p.has_header()).count()
    }

    /// 1-based header number of a page; `None` for the cover.
    pub fn page_number(&self, index: usize) -> Option<usize> {
        let page = self.pages.get(index)?;
        if !page.has_header() {
            return None;
        }
        Some(self.pages[..=index].iter().filter(|p| p.has_header()).count())
    }

    pub fn first_page_of(&self, kind: PageKind) -> Option<usize> {
        self.pages.iter().position(|p| p.kind == kind)
    }
}

/// Write position while pages are being filled.
#[derive(Debug, Clone)]
pub struct PageCursor {
    pub page_index: usize,
    pub y_mm: f32,
    /// Page index of each heading placed so far, in heading order.
    pub heading_pages: Vec<usize>,
}

impl PageCursor {
    pub fn new(page_index: usize, y_mm: f32) -> Self {
        Self {
            page_index,
            y_mm,
            heading_pages: Vec::new(),
        }
    }

    /// Starts a fresh page of `kind` and moves the cursor to its content top.
    pub fn break_page(&mut self, doc: &mut Document, kind: PageKind) {
        self.page_index = doc.add_page(kind);
        self.y_mm = CONTENT_TOP_MM;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_numbers_skip_cover() {
        let mut doc = Document::new("t");
        doc.add_page(PageKind::Cover);
        doc.add_page(PageKind::Contents);
        doc.add_page(PageKind::Body);
        doc.add_page(PageKind::Appendix);
        assert_eq!(doc.page_number(0), None);
        assert_eq!(doc.page_number(1), Some(1));
        assert_eq!(doc.page_number(3), Some(3));
        assert_eq!(doc.page_number(9), None);
        assert_eq!(doc.numbered_count(), 3);
        assert_eq!(doc.first_page_of(PageKind::Body), Some(2));
    }

    #[test]
    fn test_cursor_break_moves_to_content_top() {
        let mut doc = Document::new("t");
        let first = doc.add_page(PageKind::Body);
        let mut cursor = PageCursor::new(first, 200.0);
        cursor.break_page(&mut doc, PageKind::Body);
        assert_eq!(cursor.page_index, 1);
        assert_eq!(cursor.y_mm, CONTENT_TOP_MM);
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_bottom_of_ops() {
        let rect = DrawOp::FillRect {
            x_mm: 0.0,
            y_mm: 10.0,
            w_mm: 5.0,
            h_mm: 15.0,
            color: Rgb::NAVY,
        };
        assert_eq!(rect.bottom_mm(), 25.0);
    }
}

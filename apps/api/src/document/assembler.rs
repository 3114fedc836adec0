//! Document Assembler: cover → table of contents → body → form-data appendix.
//!
//! Headers are drawn last, once the page count is known, so every non-cover page
//! carries the same band with its `N/M` number. The TOC pages are reserved up front
//! from the row count and filled last, with page labels resolved from where each
//! heading actually landed.

use std::sync::Arc;

use chrono::NaiveDate;
use image::RgbImage;
use tracing::{info, warn};

use crate::config::BodyMode;
use crate::content::{ContentBlock, ContentExtractor};
use crate::document::appendix::append_form_data;
use crate::document::header::{cover_ops, header_ops, Branding};
use crate::document::model::{Document, DrawOp, PageKind, CONTENT_BOTTOM_MM, CONTENT_TOP_MM};
use crate::document::RenderError;
use crate::form::FormInput;
use crate::generation::fallback::format_date;
use crate::layout::flow::flow_blocks;
use crate::layout::font_metrics::text_width_mm;
use crate::layout::rules::BODY_LEFT_MM;
use crate::layout::style::{Align, FontFace, Rgb, TextStyle};
use crate::layout::surface::paginate_surface;
use crate::layout::toc::{leader_dots, TableOfContents};
use crate::raster::Rasterizer;

/// Tallest body surface placed on a single page.
pub const RASTER_PAGE_CAPACITY_MM: f32 = 250.0;
/// Naive slice height once the body spans several pages.
pub const RASTER_SEGMENT_MM: f32 = 240.0;

const TOC_TITLE: &str = "ÍNDICE";
const TOC_ROW_X_MM: f32 = 30.0;
const TOC_PAGE_X_MM: f32 = 180.0;
const TOC_FIRST_ROW_MM: f32 = 75.0;
const TOC_ROW_PITCH_MM: f32 = 6.0;
/// First row on an index page after the first, which has no title.
const TOC_CONTINUED_FIRST_ROW_MM: f32 = CONTENT_TOP_MM + 5.0;

/// Everything the assembler reads besides the script itself.
pub struct DocumentAssembler<'a> {
    pub branding: &'a Branding,
    pub logo: Option<Arc<RgbImage>>,
    pub mode: BodyMode,
    pub rasterizer: &'a dyn Rasterizer,
}

/// An assembled document plus the TOC it was built with.
#[derive(Debug)]
pub struct AssembledDocument {
    pub document: Document,
    pub toc: TableOfContents,
}

impl DocumentAssembler<'_> {
    pub fn assemble(
        &self,
        form: &FormInput,
        markup: &str,
        generated_on: NaiveDate,
    ) -> Result<AssembledDocument, RenderError> {
        let blocks: Vec<ContentBlock> = ContentExtractor::new(markup).blocks().collect();
        let toc = TableOfContents::from_blocks(&blocks);
        let date = format_date(generated_on);

        let mut doc = Document::new(format!(
            "Script de Entrevista - {} - {}",
            form.company_name, form.job_position
        ));

        let cover = doc.add_page(PageKind::Cover);
        if let Some(page) = doc.page_mut(cover) {
            page.ops = cover_ops(self.branding, self.logo.as_ref(), form, &date);
        }
        // Title row, one row per entry, appendix row.
        let contents: Vec<usize> = (0..contents_page_count(toc.len() + 2))
            .map(|_| doc.add_page(PageKind::Contents))
            .collect();

        let heading_pages = match self.mode {
            BodyMode::Raster => self.raster_body(&mut doc, &blocks)?,
            BodyMode::Text => flow_blocks(&mut doc, &blocks).heading_pages,
        };

        let appendix = append_form_data(&mut doc, form);

        let body_label = doc
            .first_page_of(PageKind::Body)
            .and_then(|i| doc.page_number(i))
            .unwrap_or(1);
        let appendix_label = doc.page_number(appendix).unwrap_or(body_label);
        let entry_pages: Vec<Option<usize>> = toc
            .entries
            .iter()
            .map(|entry| {
                entry
                    .heading_index
                    .and_then(|i| heading_pages.get(i).copied())
                    .and_then(|page| doc.page_number(page))
            })
            .collect();
        let rows = toc.rows(body_label, &entry_pages, appendix_label);
        for (index, ops) in contents.iter().zip(contents_ops(&rows)) {
            if let Some(page) = doc.page_mut(*index) {
                page.ops = ops;
            }
        }

        self.finalize_headers(&mut doc, &date);

        info!(
            pages = doc.len(),
            sections = toc.len(),
            default_sections = toc.is_default,
            mode = ?self.mode,
            "Assembled interview document"
        );
        Ok(AssembledDocument {
            document: doc,
            toc,
        })
    }

    /// Rasterizes the body and places one slice per page. Returns the page index of
    /// every heading, in heading order.
    fn raster_body(
        &self,
        doc: &mut Document,
        blocks: &[ContentBlock],
    ) -> Result<Vec<usize>, RenderError> {
        let surface = self.rasterizer.rasterize(blocks)?;
        let slices = paginate_surface(&surface, RASTER_PAGE_CAPACITY_MM, RASTER_SEGMENT_MM);
        if slices.is_empty() {
            warn!("Body surface produced no slices, leaving an empty body page");
            doc.add_page(PageKind::Body);
            return Ok(Vec::new());
        }

        let mut slice_pages = Vec::with_capacity(slices.len());
        for slice in &slices {
            let index = doc.add_page(PageKind::Body);
            if let Some(page) = doc.page_mut(index) {
                page.push(DrawOp::Image {
                    x_mm: BODY_LEFT_MM,
                    y_mm: CONTENT_TOP_MM,
                    w_mm: surface.width_mm,
                    h_mm: slice.height_mm,
                    image: Arc::new(surface.crop(slice)),
                });
            }
            slice_pages.push(index);
        }

        Ok(surface
            .anchors
            .iter()
            .map(|anchor| {
                slices
                    .iter()
                    .position(|s| s.contains_row(anchor.row))
                    .map(|i| slice_pages[i])
                    .unwrap_or(slice_pages[0])
            })
            .collect())
    }

    fn finalize_headers(&self, doc: &mut Document, date: &str) {
        let total = doc.numbered_count();
        for index in 0..doc.len() {
            let Some(number) = doc.page_number(index) else {
                continue;
            };
            let header = header_ops(self.branding, self.logo.as_ref(), date, number, total);
            if let Some(page) = doc.page_mut(index) {
                page.ops.splice(0..0, header);
            }
        }
    }
}

fn rows_fitting(first_row_mm: f32) -> usize {
    ((CONTENT_BOTTOM_MM - first_row_mm) / TOC_ROW_PITCH_MM).floor() as usize + 1
}

/// Index pages needed for `rows` rows.
fn contents_page_count(rows: usize) -> usize {
    let first = rows_fitting(TOC_FIRST_ROW_MM);
    if rows <= first {
        1
    } else {
        1 + (rows - first).div_ceil(rows_fitting(TOC_CONTINUED_FIRST_ROW_MM))
    }
}

/// Title, rule and dotted rows of the table of contents, one op list per page.
/// Rows past the content bottom continue on the next page.
fn contents_ops(rows: &[(String, String)]) -> Vec<Vec<DrawOp>> {
    let mut pages = Vec::new();
    let mut ops = vec![
        DrawOp::Text {
            x_mm: 105.0,
            y_mm: 50.0,
            text: TOC_TITLE.to_string(),
            style: TextStyle::new(FontFace::Bold, 18.0, Rgb::NAVY).aligned(Align::Center),
        },
        DrawOp::Line {
            x1_mm: 70.0,
            y1_mm: 55.0,
            x2_mm: 140.0,
            y2_mm: 55.0,
            width_mm: 1.0,
            color: Rgb::BLUE,
        },
    ];

    let style = TextStyle::new(FontFace::Regular, 11.0, Rgb::BLACK);
    let mut y = TOC_FIRST_ROW_MM;
    for (text, page) in rows {
        if y > CONTENT_BOTTOM_MM {
            pages.push(std::mem::take(&mut ops));
            y = TOC_CONTINUED_FIRST_ROW_MM;
        }
        ops.push(DrawOp::Text {
            x_mm: TOC_ROW_X_MM,
            y_mm: y,
            text: text.clone(),
            style,
        });
        let dots = leader_dots(text, page, &style);
        if dots > 0 {
            ops.push(DrawOp::Text {
                x_mm: TOC_ROW_X_MM + text_width_mm(text, &style) + 2.0,
                y_mm: y,
                text: ".".repeat(dots),
                style,
            });
        }
        ops.push(DrawOp::Text {
            x_mm: TOC_PAGE_X_MM,
            y_mm: y,
            text: page.clone(),
            style: style.aligned(Align::Right),
        });
        y += TOC_ROW_PITCH_MM;
    }
    pages.push(ops);
    pages
}

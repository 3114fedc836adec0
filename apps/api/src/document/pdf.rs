//! PDF writer: turns the page model into an A4 PDF with the builtin Helvetica faces.
//!
//! Builtin fonts carry no Unicode mapping, so all text is folded to ASCII first.
//! The page model measures y downward from the top; PDF measures upward from the bottom.

use std::io::BufWriter;

use image::{DynamicImage, RgbImage};
use printpdf::{
    utils::calculate_points_for_circle, BuiltinFont, Color, Image, IndirectFontRef, Line, Mm,
    PdfDocument, PdfLayerReference, Point,
};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::document::model::{Document, DrawOp, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use crate::document::RenderError;
use crate::layout::font_metrics::text_width_mm;
use crate::layout::style::{Align, FontFace, Rgb, MM_PER_PT};

const MM_PER_INCH: f64 = 25.4;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, face: FontFace) -> &IndirectFontRef {
        match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => &self.bold,
        }
    }
}

/// Folds text to the ASCII range the builtin fonts can show.
pub fn fold_to_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            c if c.is_ascii() => out.push(c),
            '¿' | '¡' => {}
            '‘' | '’' => out.push('\''),
            '“' | '”' | '«' | '»' => out.push('"'),
            '–' | '—' => out.push('-'),
            '•' | '·' => out.push('-'),
            '…' => out.push_str("..."),
            other => match other.nfd().find(char::is_ascii) {
                Some(base) => out.push(base),
                None => out.push('?'),
            },
        }
    }
    out
}

fn pdf_color(color: Rgb) -> Color {
    Color::Rgb(printpdf::Rgb::new(
        f64::from(color.0) / 255.0,
        f64::from(color.1) / 255.0,
        f64::from(color.2) / 255.0,
        None,
    ))
}

fn mm(value: f32) -> Mm {
    Mm(f64::from(value))
}

/// PDF y coordinate of a top-down page offset.
fn flip(y_mm: f32) -> Mm {
    mm(PAGE_HEIGHT_MM - y_mm)
}

fn pdf_error(e: impl std::fmt::Debug) -> RenderError {
    RenderError::Pdf(format!("{e:?}"))
}

/// Renders every page and returns the PDF bytes.
pub fn render_pdf(doc: &Document) -> Result<Vec<u8>, RenderError> {
    if doc.is_empty() {
        return Err(RenderError::EmptyDocument);
    }

    let (pdf, first_page, first_layer) = PdfDocument::new(
        fold_to_ascii(&doc.title),
        mm(PAGE_WIDTH_MM),
        mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let fonts = Fonts {
        regular: pdf
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?,
        bold: pdf
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?,
    };

    for (index, page) in doc.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            pdf.add_page(mm(PAGE_WIDTH_MM), mm(PAGE_HEIGHT_MM), "Layer 1")
        };
        let layer = pdf.get_page(page_index).get_layer(layer_index);
        for op in &page.ops {
            draw(&layer, &fonts, op);
        }
    }

    let mut writer = BufWriter::new(Vec::new());
    pdf.save(&mut writer).map_err(pdf_error)?;
    let bytes = writer.into_inner().map_err(pdf_error)?;
    debug!(pages = doc.len(), bytes = bytes.len(), "Wrote PDF");
    Ok(bytes)
}

fn draw(layer: &PdfLayerReference, fonts: &Fonts, op: &DrawOp) {
    match op {
        DrawOp::Text {
            x_mm,
            y_mm,
            text,
            style,
        } => {
            let folded = fold_to_ascii(text);
            let x = match style.align {
                Align::Left => *x_mm,
                Align::Center => x_mm - text_width_mm(&folded, style) / 2.0,
                Align::Right => x_mm - text_width_mm(&folded, style),
            };
            layer.set_fill_color(pdf_color(style.color));
            layer.use_text(
                folded,
                f64::from(style.size_pt),
                mm(x),
                flip(*y_mm),
                fonts.get(style.face),
            );
        }
        DrawOp::FillRect {
            x_mm,
            y_mm,
            w_mm,
            h_mm,
            color,
        } => {
            let (left, right) = (mm(*x_mm), mm(x_mm + w_mm));
            let (top, bottom) = (flip(*y_mm), flip(y_mm + h_mm));
            layer.set_fill_color(pdf_color(*color));
            layer.add_shape(Line {
                points: vec![
                    (Point::new(left, bottom), false),
                    (Point::new(right, bottom), false),
                    (Point::new(right, top), false),
                    (Point::new(left, top), false),
                ],
                is_closed: true,
                has_fill: true,
                has_stroke: false,
                is_clipping_path: false,
            });
        }
        DrawOp::Line {
            x1_mm,
            y1_mm,
            x2_mm,
            y2_mm,
            width_mm,
            color,
        } => {
            layer.set_outline_color(pdf_color(*color));
            layer.set_outline_thickness(f64::from(width_mm / MM_PER_PT));
            layer.add_shape(Line {
                points: vec![
                    (Point::new(mm(*x1_mm), flip(*y1_mm)), false),
                    (Point::new(mm(*x2_mm), flip(*y2_mm)), false),
                ],
                is_closed: false,
                has_fill: false,
                has_stroke: true,
                is_clipping_path: false,
            });
        }
        DrawOp::Circle {
            cx_mm,
            cy_mm,
            r_mm,
            color,
        } => {
            layer.set_fill_color(pdf_color(*color));
            layer.add_shape(Line {
                points: calculate_points_for_circle(mm(*r_mm), mm(*cx_mm), flip(*cy_mm)),
                is_closed: true,
                has_fill: true,
                has_stroke: false,
                is_clipping_path: false,
            });
        }
        DrawOp::Image {
            x_mm,
            y_mm,
            w_mm,
            h_mm,
            image,
        } => place_image(layer, image, *x_mm, *y_mm, *w_mm, *h_mm),
    }
}

/// Places an image so it fills exactly `w_mm` × `h_mm` with its top-left at (x, y).
fn place_image(layer: &PdfLayerReference, image: &RgbImage, x: f32, y: f32, w: f32, h: f32) {
    let (px_w, px_h) = image.dimensions();
    if px_w == 0 || px_h == 0 || w <= 0.0 || h <= 0.0 {
        return;
    }
    // At this dpi the natural width is exactly `w`; the height is scaled to fit.
    let dpi = f64::from(px_w) * MM_PER_INCH / f64::from(w);
    let natural_h = f64::from(px_h) * MM_PER_INCH / dpi;
    let scale_y = f64::from(h) / natural_h;

    let pdf_image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(image.clone()));
    pdf_image.add_to_layer(
        layer.clone(),
        Some(mm(x)),
        Some(flip(y + h)),
        None,
        Some(1.0),
        Some(scale_y),
        Some(dpi),
    );
}

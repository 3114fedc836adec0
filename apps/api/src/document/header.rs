//! Page header and cover drawing.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use image::RgbImage;

use crate::document::model::{DrawOp, HEADER_HEIGHT_MM, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use crate::form::FormInput;
use crate::layout::style::{Align, FontFace, Rgb, TextStyle};

const FALLBACK_GLYPH: &str = "AA+";
const CONFIDENTIAL_NOTICE: &str = "Documento confidencial - Solo para uso interno";

/// Identity printed in every header and on the cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    pub title: String,
    pub contact_name: String,
    /// "email | phone"
    pub contact_line: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            title: "Transformación Digital AA+".to_string(),
            contact_name: "Ing. Alejandro Aguilar MBA".to_string(),
            contact_line: "alejandroaguilar1000@gmail.com | (+506) 8784-323".to_string(),
        }
    }
}

impl Branding {
    /// First segment of the contact line.
    pub fn contact_email(&self) -> &str {
        self.contact_line
            .split('|')
            .next()
            .map(str::trim)
            .unwrap_or_default()
    }
}

/// Reads a logo image from disk.
pub fn load_logo(path: &Path) -> Result<RgbImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to read logo image {}", path.display()))?;
    Ok(image.to_rgb8())
}

fn text(x_mm: f32, y_mm: f32, text: impl Into<String>, style: TextStyle) -> DrawOp {
    DrawOp::Text {
        x_mm,
        y_mm,
        text: text.into(),
        style,
    }
}

fn band(y_mm: f32, h_mm: f32, color: Rgb) -> DrawOp {
    DrawOp::FillRect {
        x_mm: 0.0,
        y_mm,
        w_mm: PAGE_WIDTH_MM,
        h_mm,
        color,
    }
}

/// White disc with "AA+" centred on it, used when no logo image is configured.
pub fn logo_fallback(cx_mm: f32, cy_mm: f32, radius_mm: f32, size_pt: f32) -> Vec<DrawOp> {
    vec![
        DrawOp::Circle {
            cx_mm,
            cy_mm,
            r_mm: radius_mm,
            color: Rgb::WHITE,
        },
        text(
            cx_mm,
            cy_mm + radius_mm * 0.15,
            FALLBACK_GLYPH,
            TextStyle::new(FontFace::Bold, size_pt, Rgb::NAVY).aligned(Align::Center),
        ),
    ]
}

/// Where a logo goes, and the disc drawn in its place when there is none.
struct LogoSlot {
    x_mm: f32,
    y_mm: f32,
    size_mm: f32,
    disc_cx_mm: f32,
    disc_cy_mm: f32,
    disc_r_mm: f32,
    glyph_pt: f32,
}

const HEADER_LOGO: LogoSlot = LogoSlot {
    x_mm: 11.0,
    y_mm: 9.0,
    size_mm: 13.0,
    disc_cx_mm: 17.5,
    disc_cy_mm: 15.5,
    disc_r_mm: 7.0,
    glyph_pt: 8.0,
};

const COVER_LOGO: LogoSlot = LogoSlot {
    x_mm: 85.0,
    y_mm: 40.0,
    size_mm: 40.0,
    disc_cx_mm: 105.0,
    disc_cy_mm: 65.0,
    disc_r_mm: 20.0,
    glyph_pt: 16.0,
};

fn logo_or_fallback(logo: Option<&Arc<RgbImage>>, slot: &LogoSlot) -> Vec<DrawOp> {
    match logo {
        Some(image) => vec![DrawOp::Image {
            x_mm: slot.x_mm,
            y_mm: slot.y_mm,
            w_mm: slot.size_mm,
            h_mm: slot.size_mm,
            image: Arc::clone(image),
        }],
        None => logo_fallback(slot.disc_cx_mm, slot.disc_cy_mm, slot.disc_r_mm, slot.glyph_pt),
    }
}

/// Header band for a numbered page: `page` is 1-based among header pages, out of `total`.
pub fn header_ops(
    branding: &Branding,
    logo: Option<&Arc<RgbImage>>,
    date: &str,
    page: usize,
    total: usize,
) -> Vec<DrawOp> {
    let mut ops = vec![band(0.0, HEADER_HEIGHT_MM, Rgb::NAVY)];
    ops.extend(logo_or_fallback(logo, &HEADER_LOGO));

    let small = TextStyle::new(FontFace::Regular, 7.0, Rgb::WHITE);
    ops.push(text(
        30.0,
        12.0,
        branding.title.clone(),
        TextStyle::new(FontFace::Bold, 11.0, Rgb::WHITE),
    ));
    ops.push(text(30.0, 17.0, branding.contact_name.clone(), small));
    ops.push(text(30.0, 21.0, branding.contact_line.clone(), small));
    ops.push(text(
        200.0,
        17.0,
        format!("Generado: {date} | {page}/{total}"),
        small.aligned(Align::Right),
    ));
    ops.push(DrawOp::Line {
        x1_mm: 10.0,
        y1_mm: 23.0,
        x2_mm: 200.0,
        y2_mm: 23.0,
        width_mm: 0.5,
        color: Rgb::WHITE,
    });
    ops
}

/// Full cover page: colour bands, logo, title, company and recipient details.
pub fn cover_ops(
    branding: &Branding,
    logo: Option<&Arc<RgbImage>>,
    form: &FormInput,
    date: &str,
) -> Vec<DrawOp> {
    let centre = PAGE_WIDTH_MM / 2.0;
    let mut ops = vec![
        band(0.0, 100.0, Rgb::NAVY),
        band(100.0, 100.0, Rgb::BLUE),
        band(200.0, PAGE_HEIGHT_MM - 200.0, Rgb::WHITE),
    ];
    ops.extend(logo_or_fallback(logo, &COVER_LOGO));

    let title = TextStyle::new(FontFace::Bold, 28.0, Rgb::WHITE).aligned(Align::Center);
    ops.push(text(centre, 120.0, "SCRIPT DE ENTREVISTA", title));
    ops.push(text(centre, 140.0, "CONDUCTUAL", title));

    ops.push(text(
        centre,
        170.0,
        form.company_name.clone(),
        TextStyle::new(FontFace::Bold, 20.0, Rgb::WHITE).aligned(Align::Center),
    ));
    ops.push(text(
        centre,
        185.0,
        format!("Puesto: {}", form.job_position),
        TextStyle::new(FontFace::Bold, 14.0, Rgb::WHITE).aligned(Align::Center),
    ));

    let details = TextStyle::new(FontFace::Bold, 12.0, Rgb::NAVY).aligned(Align::Center);
    ops.push(text(
        centre,
        220.0,
        format!("Generado para: {}", form.email),
        details,
    ));
    ops.push(text(centre, 235.0, format!("Fecha: {date}"), details));

    let footer = TextStyle::new(FontFace::Bold, 8.0, Rgb::GRAY).aligned(Align::Center);
    ops.push(text(centre, 280.0, CONFIDENTIAL_NOTICE, footer));
    ops.push(text(
        centre,
        290.0,
        format!("{} | {}", branding.title, branding.contact_email()),
        footer,
    ));
    ops
}

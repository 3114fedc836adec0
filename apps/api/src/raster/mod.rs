//! Body rasterizer: draws the script body into one tall image that the page
//! layout engine later slices across pages.
//!
//! The same block rules as the text flow engine are used, measured against
//! mono fonts, with page-break thresholds ignored (the surface is one continuous
//! column). Heading rows are recorded as anchors for the table of contents.

pub mod canvas;

use embedded_graphics::{
    mono_font::{
        iso_8859_1::{FONT_7X13, FONT_8X13_BOLD, FONT_9X15_BOLD, FONT_9X18_BOLD},
        MonoFont, MonoTextStyle,
    },
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use thiserror::Error;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::content::blocks::ContentBlock;
use crate::layout::font_metrics::TextMeasure;
use crate::layout::rules::{layout_block, line_height, LayoutItem, BODY_LEFT_MM, BODY_WIDTH_MM};
use crate::layout::style::{Rgb, TextRole};
use crate::layout::surface::{RasterSurface, SurfaceAnchor};

use canvas::{to_rgb888, Canvas};

pub const SURFACE_WIDTH_PX: u32 = 680;
/// White margin above the title band and below the last block.
const PADDING_MM: f32 = 5.0;
const TITLE_BAND_MM: f32 = 12.0;
const SECTION_TITLE: &str = "SCRIPT DE ENTREVISTA CONDUCTUAL";
/// Roughly 100 A4 pages at the default scale.
pub const MAX_SURFACE_ROWS: u32 = 100_000;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("body surface needs {rows} rows, limit is {max}")]
    SurfaceTooLarge { rows: u32, max: u32 },
}

/// Turns content blocks into a raster surface.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, blocks: &[ContentBlock]) -> Result<RasterSurface, RasterError>;
}

fn font_for(role: TextRole) -> &'static MonoFont<'static> {
    match role {
        TextRole::Heading => &FONT_9X18_BOLD,
        TextRole::Subheading | TextRole::Label => &FONT_9X15_BOLD,
        TextRole::MinorLabel => &FONT_8X13_BOLD,
        TextRole::Body => &FONT_7X13,
    }
}

/// Maps text onto the Latin-1 repertoire of the mono fonts.
pub fn latin1_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            c if (c as u32) < 0x100 => c.to_string(),
            '‘' | '’' => "'".to_string(),
            '“' | '”' => "\"".to_string(),
            '–' | '—' => "-".to_string(),
            '…' => "...".to_string(),
            '•' => "·".to_string(),
            other => other
                .to_string()
                .nfd()
                .find(|b| b.is_ascii())
                .map(String::from)
                .unwrap_or_else(|| "?".to_string()),
        })
        .collect()
}

/// Widths of mono glyph runs at the rasterizer's scale.
pub struct MonoMeasure {
    px_per_mm: f32,
}

impl TextMeasure for MonoMeasure {
    fn width_mm(&self, text: &str, role: TextRole) -> f32 {
        let font = font_for(role);
        let advance = font.character_size.width + font.character_spacing;
        let chars = text.chars().count() as u32;
        (chars * advance) as f32 / self.px_per_mm
    }
}

/// Something to draw, in surface millimetres (x relative to the body column).
enum Mark {
    Band { top_mm: f32 },
    Text {
        x_mm: f32,
        baseline_mm: f32,
        text: String,
        role: TextRole,
        center: bool,
    },
    Rule { x1_mm: f32, x2_mm: f32, y_mm: f32 },
    Dot { x_mm: f32, baseline_mm: f32 },
}

/// Rasterizer drawing with embedded-graphics mono fonts.
#[derive(Debug, Clone)]
pub struct MonoRasterizer {
    width_px: u32,
    width_mm: f32,
    max_rows: u32,
}

impl Default for MonoRasterizer {
    fn default() -> Self {
        Self {
            width_px: SURFACE_WIDTH_PX,
            width_mm: BODY_WIDTH_MM,
            max_rows: MAX_SURFACE_ROWS,
        }
    }
}

impl MonoRasterizer {
    pub fn with_max_rows(mut self, max_rows: u32) -> Self {
        self.max_rows = max_rows;
        self
    }

    fn px_per_mm(&self) -> f32 {
        self.width_px as f32 / self.width_mm
    }

    fn to_px(&self, mm: f32) -> i32 {
        (mm * self.px_per_mm()).round() as i32
    }

    /// Walks the blocks once, collecting marks, heading anchors (in mm) and the
    /// total height.
    fn plan(&self, blocks: &[ContentBlock]) -> (Vec<Mark>, Vec<(String, f32)>, f32) {
        let measure = MonoMeasure {
            px_per_mm: self.px_per_mm(),
        };
        let mut marks = Vec::new();
        let mut anchors = Vec::new();

        let band_top = PADDING_MM;
        marks.push(Mark::Band { top_mm: band_top });
        marks.push(Mark::Text {
            x_mm: self.width_mm / 2.0,
            baseline_mm: band_top + 7.0,
            text: SECTION_TITLE.to_string(),
            role: TextRole::Heading,
            center: true,
        });
        let mut y = band_top + TITLE_BAND_MM + 13.0;

        for block in blocks {
            let heading = block.heading_text();
            let mut anchored = false;
            for item in layout_block(block, &measure) {
                match item {
                    LayoutItem::BreakBefore(_) => {}
                    LayoutItem::Advance(mm) => y += mm,
                    LayoutItem::Lines { x_mm, lines, role } => {
                        let pitch = line_height(role);
                        if let (Some(title), false) = (heading, anchored) {
                            anchors.push((title.to_string(), (y - pitch).max(0.0)));
                            anchored = true;
                        }
                        for (i, line) in lines.into_iter().enumerate() {
                            marks.push(Mark::Text {
                                x_mm: x_mm - BODY_LEFT_MM,
                                baseline_mm: y + i as f32 * pitch,
                                text: line,
                                role,
                                center: false,
                            });
                        }
                    }
                    LayoutItem::Rule {
                        x1_mm,
                        x2_mm,
                        offset_mm,
                    } => marks.push(Mark::Rule {
                        x1_mm: x1_mm - BODY_LEFT_MM,
                        x2_mm: x2_mm - BODY_LEFT_MM,
                        y_mm: y + offset_mm,
                    }),
                    LayoutItem::Bullet { x_mm } => marks.push(Mark::Dot {
                        x_mm: x_mm - BODY_LEFT_MM,
                        baseline_mm: y,
                    }),
                }
            }
        }

        (marks, anchors, y + PADDING_MM)
    }

    fn draw(&self, canvas: &mut Canvas, mark: &Mark) {
        match mark {
            Mark::Band { top_mm } => {
                let top = self.to_px(*top_mm);
                let height = self.to_px(TITLE_BAND_MM).max(1) as u32;
                let _ = Rectangle::new(Point::new(0, top), Size::new(self.width_px, height))
                    .into_styled(PrimitiveStyle::with_fill(to_rgb888(Rgb::NAVY)))
                    .draw(canvas);
            }
            Mark::Text {
                x_mm,
                baseline_mm,
                text,
                role,
                center,
            } => {
                let font = font_for(*role);
                let color = if *center {
                    Rgb::WHITE
                } else {
                    role.style().color
                };
                let text = latin1_text(text);
                let mut x = self.to_px(*x_mm);
                if *center {
                    let advance = (font.character_size.width + font.character_spacing) as i32;
                    x -= text.chars().count() as i32 * advance / 2;
                }
                let style = MonoTextStyle::new(font, to_rgb888(color));
                let _ = Text::with_baseline(
                    &text,
                    Point::new(x, self.to_px(*baseline_mm)),
                    style,
                    Baseline::Alphabetic,
                )
                .draw(canvas);
            }
            Mark::Rule { x1_mm, x2_mm, y_mm } => {
                let y = self.to_px(*y_mm);
                let _ = Line::new(
                    Point::new(self.to_px(*x1_mm), y),
                    Point::new(self.to_px(*x2_mm), y),
                )
                .into_styled(PrimitiveStyle::with_stroke(to_rgb888(Rgb::NAVY), 1))
                .draw(canvas);
            }
            Mark::Dot { x_mm, baseline_mm } => {
                let diameter = self.to_px(1.2).max(2) as u32;
                let top = self.to_px(baseline_mm - 1.8);
                let _ = Circle::new(Point::new(self.to_px(*x_mm), top), diameter)
                    .into_styled(PrimitiveStyle::with_fill(to_rgb888(Rgb::BLACK)))
                    .draw(canvas);
            }
        }
    }
}

impl Rasterizer for MonoRasterizer {
    fn rasterize(&self, blocks: &[ContentBlock]) -> Result<RasterSurface, RasterError> {
        let (marks, anchors, height_mm) = self.plan(blocks);
        let rows = (height_mm * self.px_per_mm()).ceil() as u32;
        if rows > self.max_rows {
            return Err(RasterError::SurfaceTooLarge {
                rows,
                max: self.max_rows,
            });
        }

        let mut canvas = Canvas::new(self.width_px, rows);
        for mark in &marks {
            self.draw(&mut canvas, mark);
        }

        let mut surface = RasterSurface::new(canvas.into_image(), self.width_mm);
        surface.anchors = anchors
            .into_iter()
            .map(|(title, top_mm)| SurfaceAnchor {
                title,
                row: self.to_px(top_mm).max(0) as u32,
            })
            .collect();

        debug!(
            blocks = blocks.len(),
            rows,
            anchors = surface.anchors.len(),
            "Rasterized script body"
        );
        Ok(surface)
    }
}

//! Colors, faces and text roles shared by the layout engines and the PDF writer.

use serde::Serialize;

/// Millimetres per typographic point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const NAVY: Rgb = Rgb(44, 62, 80);
    pub const BLUE: Rgb = Rgb(52, 152, 219);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const GRAY: Rgb = Rgb(128, 128, 128);
    pub const SEPARATOR: Rgb = Rgb(220, 220, 220);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FontFace {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStyle {
    pub face: FontFace,
    pub size_pt: f32,
    pub color: Rgb,
    pub align: Align,
}

impl TextStyle {
    pub const fn new(face: FontFace, size_pt: f32, color: Rgb) -> Self {
        Self {
            face,
            size_pt,
            color,
            align: Align::Left,
        }
    }

    pub const fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn line_height_mm(&self) -> f32 {
        self.size_pt * LINE_HEIGHT_FACTOR * MM_PER_PT
    }
}

/// What a run of body text is, independent of how a backend draws it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TextRole {
    Heading,
    Subheading,
    /// "Pregunta:", "Qué buscar en la respuesta:"
    Label,
    /// "Posibles preguntas de seguimiento:"
    MinorLabel,
    Body,
}

impl TextRole {
    pub fn style(self) -> TextStyle {
        match self {
            TextRole::Heading => TextStyle::new(FontFace::Bold, 12.0, Rgb::NAVY),
            TextRole::Subheading => TextStyle::new(FontFace::Bold, 11.0, Rgb::NAVY),
            TextRole::Label => TextStyle::new(FontFace::Bold, 11.0, Rgb::NAVY),
            TextRole::MinorLabel => TextStyle::new(FontFace::Bold, 10.0, Rgb::NAVY),
            TextRole::Body => TextStyle::new(FontFace::Regular, 10.0, Rgb::BLACK),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_line_height_is_about_four_mm() {
        let lh = TextRole::Body.style().line_height_mm();
        assert!((lh - 4.057).abs() < 0.01, "got {lh}");
    }

    #[test]
    fn test_aligned_keeps_other_fields() {
        let style = TextRole::Heading.style().aligned(Align::Center);
        assert_eq!(style.align, Align::Center);
        assert_eq!(style.face, FontFace::Bold);
        assert_eq!(style.color, Rgb::NAVY);
    }
}

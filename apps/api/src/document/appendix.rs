//! Form-data appendix: the submitted answers as label/value rows.

use crate::document::model::{
    Document, DrawOp, PageCursor, PageKind, CONTENT_BOTTOM_MM, CONTENT_TOP_MM,
};
use crate::form::FormInput;
use crate::layout::font_metrics::{wrap_text, HelveticaMeasure};
use crate::layout::style::{Align, FontFace, Rgb, TextRole, TextStyle};

const SECTION_TITLE: &str = "DATOS DE ENTRADA DEL FORMULARIO";
/// A unit ending below this line moves the next one to a new page.
const OVERFLOW_MM: f32 = 240.0;
const VALUE_WIDTH_MM: f32 = 160.0;
/// Drop from the slot under a value's last line to the separator rule.
const SEPARATOR_GAP_MM: f32 = 6.0;

/// Rows in print order; mission/vision is inserted as the fourth row when present.
pub fn appendix_rows(form: &FormInput) -> Vec<(&'static str, &str)> {
    let mut rows = vec![
        ("Empresa:", form.company_name.as_str()),
        ("Puesto:", form.job_position.as_str()),
        ("Correo de contacto:", form.email.as_str()),
        ("Descripción de la empresa:", form.company_description.as_str()),
        ("Funciones principales:", form.job_functions.as_str()),
        ("Habilidades técnicas:", form.technical_skills.as_str()),
        ("Habilidades blandas:", form.soft_skills.as_str()),
    ];
    if let Some(mission) = form.mission_vision() {
        rows.insert(3, ("Misión/Visión:", mission));
    }
    rows
}

/// Appends the appendix pages and returns the index of the first one.
pub fn append_form_data(doc: &mut Document, form: &FormInput) -> usize {
    let first = doc.add_page(PageKind::Appendix);
    let mut cursor = PageCursor::new(first, CONTENT_TOP_MM);
    let mut ops = Vec::new();

    let y = cursor.y_mm;
    ops.push(DrawOp::FillRect {
        x_mm: 10.0,
        y_mm: y,
        w_mm: 190.0,
        h_mm: 10.0,
        color: Rgb::BLUE,
    });
    ops.push(DrawOp::Text {
        x_mm: 105.0,
        y_mm: y + 6.0,
        text: SECTION_TITLE.to_string(),
        style: TextStyle::new(FontFace::Bold, 12.0, Rgb::WHITE).aligned(Align::Center),
    });
    cursor.y_mm += 15.0;

    let rows = appendix_rows(form);
    let count = rows.len();
    for (i, (label, value)) in rows.into_iter().enumerate() {
        ops.push(DrawOp::Text {
            x_mm: 25.0,
            y_mm: cursor.y_mm,
            text: label.to_string(),
            style: TextStyle::new(FontFace::Bold, 10.0, Rgb::NAVY),
        });
        cursor.y_mm += 6.0;

        let lines = wrap_text(value, TextRole::Body, VALUE_WIDTH_MM, &HelveticaMeasure);
        let pitch = TextRole::Body.style().line_height_mm();
        // Keeps room for the separator under the value's last line.
        let last_baseline = CONTENT_BOTTOM_MM - pitch - SEPARATOR_GAP_MM;
        for line in &lines {
            if cursor.y_mm > last_baseline {
                flush(doc, &cursor, &mut ops);
                cursor.break_page(doc, PageKind::Appendix);
            }
            ops.push(DrawOp::Text {
                x_mm: 30.0,
                y_mm: cursor.y_mm,
                text: line.clone(),
                style: TextRole::Body.style(),
            });
            cursor.y_mm += pitch;
        }
        if lines.is_empty() {
            cursor.y_mm += pitch;
        }
        cursor.y_mm += SEPARATOR_GAP_MM + 2.0;

        ops.push(DrawOp::Line {
            x1_mm: 25.0,
            y1_mm: cursor.y_mm - 2.0,
            x2_mm: 185.0,
            y2_mm: cursor.y_mm - 2.0,
            width_mm: 0.2,
            color: Rgb::SEPARATOR,
        });
        cursor.y_mm += 6.0;

        if cursor.y_mm > OVERFLOW_MM && i + 1 < count {
            flush(doc, &cursor, &mut ops);
            cursor.break_page(doc, PageKind::Appendix);
        }
    }
    flush(doc, &cursor, &mut ops);
    first
}

fn flush(doc: &mut Document, cursor: &PageCursor, ops: &mut Vec<DrawOp>) {
    if let Some(page) = doc.page_mut(cursor.page_index) {
        page.ops.append(ops);
    }
}

//! Response Formatter: turns raw model text (light markdown) into the markup the
//! content extractor reads.
//!
//! Output is always well-formed: model text is escaped before any tag is added, and
//! every element opened here is closed here.
//!
//! - `#`/`##` lines → `<h3>`, `###` and deeper → `<h4>`
//! - `-`, `*`, `+` lines → `<ul><li>`, `1.`/`1)` lines → `<ol><li>`
//! - other consecutive lines → one `<p>`, joined with `<br/>`
//! - `**x**` → `<strong>`, `*x*` → `<em>`
//! - blank lines and `---` rules end the current block

use std::sync::OnceLock;

use quick_xml::escape::escape;
use regex::Regex;

struct Patterns {
    heading: Regex,
    bullet: Regex,
    numbered: Regex,
    rule: Regex,
    strong: Regex,
    em: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        heading: Regex::new(r"^(#{1,6})\s+(.*)$").expect("formatter pattern is a valid regex"),
        bullet: Regex::new(r"^\s*[-*+]\s+(.*)$").expect("formatter pattern is a valid regex"),
        numbered: Regex::new(r"^\s*\d+[.)]\s+(.*)$").expect("formatter pattern is a valid regex"),
        rule: Regex::new(r"^\s*([-*_]\s*){3,}$").expect("formatter pattern is a valid regex"),
        strong: Regex::new(r"\*\*(.+?)\*\*").expect("formatter pattern is a valid regex"),
        em: Regex::new(r"\*([^*\s][^*]*?)\*").expect("formatter pattern is a valid regex"),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

#[derive(Default)]
struct Builder {
    out: String,
    paragraph: Vec<String>,
    list: Option<(ListKind, Vec<String>)>,
}

impl Builder {
    fn flush(&mut self) {
        if !self.paragraph.is_empty() {
            self.out.push_str("<p>");
            self.out.push_str(&self.paragraph.join("<br/>"));
            self.out.push_str("</p>\n");
            self.paragraph.clear();
        }
        if let Some((kind, items)) = self.list.take() {
            self.out.push_str(&format!("<{}>", kind.tag()));
            for item in items {
                self.out.push_str(&format!("<li>{item}</li>"));
            }
            self.out.push_str(&format!("</{}>\n", kind.tag()));
        }
    }

    fn push_item(&mut self, kind: ListKind, item: String) {
        if !self.paragraph.is_empty() {
            self.flush();
        }
        match &mut self.list {
            Some((current, items)) if *current == kind => items.push(item),
            _ => {
                self.flush();
                self.list = Some((kind, vec![item]));
            }
        }
    }

    fn push_line(&mut self, line: String) {
        if self.list.is_some() {
            self.flush();
        }
        self.paragraph.push(line);
    }
}

/// Applies inline emphasis to already-escaped text.
///
/// `**x**` spans are found first; `*x*` is then matched separately inside and
/// outside each span so tags always nest. A `*` left without a partner in its
/// segment stays literal.
fn inline(text: &str) -> String {
    let p = patterns();
    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;
    for caps in p.strong.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&emphasize(&text[last..whole.start()]));
        out.push_str("<strong>");
        out.push_str(&emphasize(inner.as_str()));
        out.push_str("</strong>");
        last = whole.end();
    }
    out.push_str(&emphasize(&text[last..]));
    out
}

fn emphasize(segment: &str) -> String {
    patterns()
        .em
        .replace_all(segment, "<em>$1</em>")
        .into_owned()
}

/// Formats raw model output into extractor-ready markup.
pub fn format_response(raw: &str) -> String {
    let p = patterns();
    let mut builder = Builder::default();

    for line in raw.lines() {
        let trimmed = line.trim_end();
        if trimmed.trim().is_empty() || p.rule.is_match(trimmed) {
            builder.flush();
            continue;
        }

        let escaped = escape(trimmed.trim_start()).into_owned();

        if let Some(caps) = p.heading.captures(&escaped) {
            builder.flush();
            let tag = if caps[1].len() <= 2 { "h3" } else { "h4" };
            let text = inline(caps[2].trim_end_matches('#').trim());
            if !text.is_empty() {
                builder.out.push_str(&format!("<{tag}>{text}</{tag}>\n"));
            }
        } else if let Some(caps) = p.bullet.captures(&escaped) {
            builder.push_item(ListKind::Unordered, inline(caps[1].trim()));
        } else if let Some(caps) = p.numbered.captures(&escaped) {
            builder.push_item(ListKind::Ordered, inline(caps[1].trim()));
        } else {
            builder.push_line(inline(&escaped));
        }
    }
    builder.flush();

    builder.out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentExtractor;

    #[test]
    fn test_headings_map_to_h3_and_h4() {
        let out = format_response("## 1. Introducción\n### Saludo");
        assert_eq!(out, "<h3>1. Introducción</h3>\n<h4>Saludo</h4>\n");
    }

    #[test]
    fn test_paragraph_lines_join_with_break() {
        let out = format_response("Primera línea\nSegunda línea\n\nOtro párrafo");
        assert_eq!(
            out,
            "<p>Primera línea<br/>Segunda línea</p>\n<p>Otro párrafo</p>\n"
        );
    }

    #[test]
    fn test_bullets_become_list_items() {
        let out = format_response("Intro\n* **Situación:** Contexto\n- Tarea");
        assert_eq!(
            out,
            "<p>Intro</p>\n<ul><li><strong>Situación:</strong> Contexto</li><li>Tarea</li></ul>\n"
        );
    }

    #[test]
    fn test_numbered_lines_become_ordered_list() {
        let out = format_response("1. Uno\n2) Dos");
        assert_eq!(out, "<ol><li>Uno</li><li>Dos</li></ol>\n");
    }

    #[test]
    fn test_strong_and_em() {
        assert_eq!(
            format_response("**Pregunta:** *cuénteme*"),
            "<p><strong>Pregunta:</strong> <em>cuénteme</em></p>\n"
        );
    }

    #[test]
    fn test_crossing_emphasis_stays_nested() {
        assert_eq!(
            format_response("Usa **negrita *mixta** aqui*"),
            "<p>Usa <strong>negrita *mixta</strong> aqui*</p>\n"
        );
        assert_eq!(
            format_response("**fuerte *suave* fuerte**"),
            "<p><strong>fuerte <em>suave</em> fuerte</strong></p>\n"
        );
    }

    #[test]
    fn test_mixed_emphasis_keeps_later_sections() {
        let markup = format_response(
            "## 1. Intro\nUsa **negrita *mixta** aqui* por favor\n## 2. Preguntas\nTexto\n## 3. Cierre",
        );
        let headings = ContentExtractor::new(&markup).headings();
        assert_eq!(headings, vec!["1. Intro", "2. Preguntas", "3. Cierre"]);
    }

    #[test]
    fn test_model_markup_is_escaped() {
        let out = format_response("<script>alert('x')</script> & más");
        assert!(!out.contains("<script>"));
        assert!(out.contains("&lt;script&gt;"));
        assert!(out.contains("&amp; más"));
    }

    #[test]
    fn test_horizontal_rule_separates_blocks() {
        let out = format_response("Uno\n---\nDos");
        assert_eq!(out, "<p>Uno</p>\n<p>Dos</p>\n");
    }

    #[test]
    fn test_empty_input_yields_empty_markup() {
        assert_eq!(format_response("\n \n"), "");
    }
}

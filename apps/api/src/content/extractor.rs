//! Content Extractor: walks formatted markup and yields `ContentBlock`s in document order.
//!
//! The sequence is lazy (one XML event at a time) and restartable: every call to
//! [`ContentExtractor::blocks`] starts a fresh pass over the same markup.
//!
//! Only top-level elements are considered. `h1`-`h3` become headings, `h4`-`h6`
//! subheadings, `p` paragraphs and `ul`/`ol` lists of their `li` items. Anything else
//! at top level (including the `script-header` block used on the cover) is skipped
//! with its whole subtree. Inline markup is flattened to text and whitespace collapses
//! to single spaces; `<br/>` counts as a space. Markup that fails to parse ends the
//! sequence with a warning.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::{debug, warn};

use crate::content::blocks::ContentBlock;

const WRAPPER_OPEN: &str = "<root>";
const WRAPPER_CLOSE: &str = "</root>";

/// Depth of top-level script elements: the wrapper sits at 1.
const TOP_LEVEL: usize = 2;

#[derive(Debug, Clone)]
pub struct ContentExtractor {
    source: String,
}

impl ContentExtractor {
    pub fn new(markup: &str) -> Self {
        Self {
            source: format!("{WRAPPER_OPEN}{markup}{WRAPPER_CLOSE}"),
        }
    }

    pub fn blocks(&self) -> Blocks<'_> {
        let mut reader = Reader::from_str(&self.source);
        reader.config_mut().trim_text(false);
        Blocks {
            reader,
            depth: 0,
            skip_until: None,
            pending: None,
            done: false,
        }
    }

    /// Heading texts in order.
    pub fn headings(&self) -> Vec<String> {
        self.blocks()
            .filter_map(|b| b.heading_text().map(str::to_string))
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum TextKind {
    Heading,
    Subheading,
    Paragraph,
}

#[derive(Debug)]
enum Pending {
    Text {
        kind: TextKind,
        text: String,
    },
    List {
        items: Vec<String>,
        /// Open `li` text and the depth it was opened at.
        item: Option<(usize, String)>,
    },
}

impl Pending {
    fn for_tag(tag: &[u8]) -> Option<Pending> {
        let text_kind = match tag {
            b"h1" | b"h2" | b"h3" => TextKind::Heading,
            b"h4" | b"h5" | b"h6" => TextKind::Subheading,
            b"p" => TextKind::Paragraph,
            b"ul" | b"ol" => {
                return Some(Pending::List {
                    items: Vec::new(),
                    item: None,
                })
            }
            _ => return None,
        };
        Some(Pending::Text {
            kind: text_kind,
            text: String::new(),
        })
    }

    fn push_text(&mut self, fragment: &str) {
        match self {
            Pending::Text { text, .. } => text.push_str(fragment),
            Pending::List {
                item: Some((_, text)),
                ..
            } => text.push_str(fragment),
            Pending::List { item: None, .. } => {}
        }
    }

    fn finish(self) -> Option<ContentBlock> {
        match self {
            Pending::Text { kind, text } => {
                let text = collapse_whitespace(&text);
                if text.is_empty() {
                    return None;
                }
                Some(match kind {
                    TextKind::Heading => ContentBlock::Heading { text },
                    TextKind::Subheading => ContentBlock::Subheading { text },
                    TextKind::Paragraph => ContentBlock::Paragraph { text },
                })
            }
            Pending::List { items, .. } => {
                if items.is_empty() {
                    None
                } else {
                    Some(ContentBlock::List { items })
                }
            }
        }
    }
}

/// Lazy block sequence over one pass of the markup.
pub struct Blocks<'a> {
    reader: Reader<&'a [u8]>,
    depth: usize,
    /// Depth of a top-level element whose subtree is being skipped.
    skip_until: Option<usize>,
    pending: Option<Pending>,
    done: bool,
}

impl Blocks<'_> {
    fn on_start(&mut self, start: &BytesStart<'_>) {
        self.depth += 1;
        if self.skip_until.is_some() {
            return;
        }

        let name = start.name();
        let tag = name.as_ref();
        match &mut self.pending {
            None if self.depth == TOP_LEVEL => match Pending::for_tag(tag) {
                Some(pending) => self.pending = Some(pending),
                None => {
                    debug!(
                        tag = %String::from_utf8_lossy(tag),
                        "Skipping unsupported top-level element"
                    );
                    self.skip_until = Some(self.depth);
                }
            },
            Some(Pending::List { item, .. }) if item.is_none() && tag == b"li" => {
                *item = Some((self.depth, String::new()));
            }
            // Inline and nested elements only contribute their text.
            Some(pending) => pending.push_text(" "),
            None => {}
        }
    }

    /// Returns a finished block when the closing tag completes one.
    fn on_end(&mut self) -> Option<ContentBlock> {
        let closing = self.depth;
        self.depth = self.depth.saturating_sub(1);

        if let Some(skip) = self.skip_until {
            if closing == skip {
                self.skip_until = None;
            }
            return None;
        }

        if let Some(Pending::List { items, item }) = &mut self.pending {
            if matches!(item, Some((item_depth, _)) if *item_depth == closing) {
                if let Some((_, text)) = item.take() {
                    let text = collapse_whitespace(&text);
                    if !text.is_empty() {
                        items.push(text);
                    }
                }
                return None;
            }
        }

        if closing == TOP_LEVEL {
            return self.pending.take().and_then(Pending::finish);
        }
        if let Some(pending) = &mut self.pending {
            pending.push_text(" ");
        }
        None
    }

    fn on_text(&mut self, text: &str) {
        if self.skip_until.is_some() {
            return;
        }
        if let Some(pending) = &mut self.pending {
            pending.push_text(text);
        }
    }

    fn stop(&mut self, reason: &str) -> Option<ContentBlock> {
        warn!("Stopping content extraction: {reason}");
        self.done = true;
        None
    }
}

impl Iterator for Blocks<'_> {
    type Item = ContentBlock;

    fn next(&mut self) -> Option<ContentBlock> {
        while !self.done {
            match self.reader.read_event() {
                Ok(Event::Start(e)) => self.on_start(&e),
                Ok(Event::Empty(e)) => {
                    if self.skip_until.is_none() && e.name().as_ref() == b"br" {
                        self.on_text(" ");
                    }
                }
                Ok(Event::End(_)) => {
                    if let Some(block) = self.on_end() {
                        return Some(block);
                    }
                }
                Ok(Event::Text(e)) => match e.decode() {
                    Ok(text) => self.on_text(&text),
                    Err(err) => return self.stop(&format!("text decode error: {err:?}")),
                },
                Ok(Event::CData(e)) => match e.decode() {
                    Ok(text) => self.on_text(&text),
                    Err(err) => return self.stop(&format!("cdata decode error: {err:?}")),
                },
                Ok(Event::GeneralRef(e)) => {
                    let name = match e.decode() {
                        Ok(name) => name,
                        Err(err) => return self.stop(&format!("entity decode error: {err:?}")),
                    };
                    let entity = format!("&{name};");
                    match quick_xml::escape::unescape(&entity) {
                        Ok(resolved) => self.on_text(&resolved),
                        // Unknown named entities are kept literally.
                        Err(_) => self.on_text(&entity),
                    }
                }
                Ok(Event::Eof) => {
                    self.done = true;
                    if self.depth != 0 {
                        warn!("Markup ended inside an open element");
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    let position = self.reader.buffer_position();
                    return self.stop(&format!("malformed markup at byte {position}: {err}"));
                }
            }
        }
        None
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::fallback::{sample_script, FIRST_SECTION_HEADING};

    fn collect(markup: &str) -> Vec<ContentBlock> {
        ContentExtractor::new(markup).blocks().collect()
    }

    #[test]
    fn test_maps_tags_to_blocks_in_order() {
        let blocks = collect(
            "<h2>Uno</h2><h5>Sub</h5><p>Texto</p><ol><li>a</li><li>b</li></ol><h1>Dos</h1>",
        );
        assert_eq!(
            blocks,
            vec![
                ContentBlock::Heading {
                    text: "Uno".to_string()
                },
                ContentBlock::Subheading {
                    text: "Sub".to_string()
                },
                ContentBlock::Paragraph {
                    text: "Texto".to_string()
                },
                ContentBlock::List {
                    items: vec!["a".to_string(), "b".to_string()]
                },
                ContentBlock::Heading {
                    text: "Dos".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_skips_script_header_and_unknown_elements() {
        let blocks = collect(
            r#"<div class="script-header"><h3>Script de Entrevista Conductual</h3><p>x</p></div>
               <table><tr><td>t</td></tr></table>
               <h3>Sección</h3>"#,
        );
        assert_eq!(
            blocks,
            vec![ContentBlock::Heading {
                text: "Sección".to_string()
            }]
        );
    }

    #[test]
    fn test_flattens_inline_markup_and_collapses_whitespace() {
        let blocks = collect("<p><strong>Pregunta:</strong>\n   \"Hola\"<br/>mundo</p>");
        assert_eq!(
            blocks,
            vec![ContentBlock::Paragraph {
                text: "Pregunta: \"Hola\" mundo".to_string()
            }]
        );
    }

    #[test]
    fn test_drops_empty_blocks_and_items() {
        let blocks = collect("<p>  </p><h3></h3><ul><li> </li><li>ok</li></ul><ul><li/></ul>");
        assert_eq!(
            blocks,
            vec![ContentBlock::List {
                items: vec!["ok".to_string()]
            }]
        );
    }

    #[test]
    fn test_resolves_entities() {
        let blocks = collect("<p>Acme &amp; Co &#233;xito</p>");
        assert_eq!(
            blocks,
            vec![ContentBlock::Paragraph {
                text: "Acme & Co éxito".to_string()
            }]
        );
    }

    #[test]
    fn test_malformed_markup_ends_sequence_early() {
        let blocks = collect("<h3>Uno</h3><p>abierto</span><h3>Dos</h3>");
        assert_eq!(
            blocks,
            vec![ContentBlock::Heading {
                text: "Uno".to_string()
            }]
        );
    }

    #[test]
    fn test_sequence_is_restartable() {
        let extractor = ContentExtractor::new("<h3>A</h3><p>b</p>");
        let first: Vec<_> = extractor.blocks().collect();
        let second: Vec<_> = extractor.blocks().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_sequence_is_lazy() {
        let extractor = ContentExtractor::new("<h3>A</h3><p>b</p></oops>");
        let mut blocks = extractor.blocks();
        assert_eq!(
            blocks.next(),
            Some(ContentBlock::Heading {
                text: "A".to_string()
            })
        );
    }

    #[test]
    fn test_sample_script_extracts_sections() {
        let form = crate::form::FormInput {
            company_name: "Acme".to_string(),
            company_description: "Hace cosas".to_string(),
            job_position: "Engineer".to_string(),
            ..Default::default()
        };
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let extractor = ContentExtractor::new(&sample_script(&form, date));
        let headings = extractor.headings();
        assert_eq!(headings.first().map(String::as_str), Some(FIRST_SECTION_HEADING));
        assert_eq!(headings.len(), 8);
        assert!(!headings.iter().any(|h| h.contains("Script de Entrevista")));
    }
}

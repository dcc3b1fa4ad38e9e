//! Plain-text extraction from lyrics pages.
//!
//! Only text inside lyrics containers is kept. Links are unwrapped: the anchor
//! markup goes away, its text stays in place.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};

/// Container selectors, in the order their matches are emitted.
static CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [r#"[class^="Lyrics__Container"]"#, ".lyrics"]
        .iter()
        .map(|s| Selector::parse(s).expect("valid lyrics container selector"))
        .collect()
});

const BLOCK_ELEMENTS: [&str; 17] = [
    "article", "blockquote", "dd", "div", "dl", "dt", "footer", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "li", "section", "tr",
];

/// Extract lyrics text from a page. `None` when no container holds any text.
pub fn extract_lyrics(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    let mut picked: Vec<ElementRef> = Vec::new();
    for selector in CONTAINERS.iter() {
        for el in doc.select(selector) {
            let nested = el
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|a| picked.contains(&a));
            if !nested && !picked.contains(&el) {
                picked.push(el);
            }
        }
    }

    let mut builder = TextBuilder::default();
    for el in picked {
        builder.block_break(false);
        walk(el, &mut builder);
    }

    let text = builder.finish();
    if text.is_empty() { None } else { Some(text) }
}

fn walk(el: ElementRef, b: &mut TextBuilder) {
    for child in el.children() {
        match child.value() {
            Node::Text(t) => b.text(t),
            Node::Element(e) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                match e.name() {
                    "br" => b.line_break(),
                    "script" | "style" | "noscript" | "template" => {}
                    "p" => {
                        b.block_break(true);
                        walk(child_el, b);
                        b.block_break(true);
                    }
                    name if BLOCK_ELEMENTS.contains(&name) => {
                        b.block_break(false);
                        walk(child_el, b);
                        b.block_break(false);
                    }
                    // Inline markup, <a> included: keep the children only.
                    _ => walk(child_el, b),
                }
            }
            _ => {}
        }
    }
}

/// Whitespace-collapsing text accumulator.
#[derive(Debug, Default)]
struct TextBuilder {
    out: String,
    pending_space: bool,
}

impl TextBuilder {
    fn text(&mut self, raw: &str) {
        let mut words = raw.split_whitespace().peekable();
        if words.peek().is_none() {
            if !raw.is_empty() {
                self.pending_space = true;
            }
            return;
        }
        if raw.starts_with(char::is_whitespace) {
            self.pending_space = true;
        }
        for word in words {
            if self.pending_space && !self.at_line_start() {
                self.out.push(' ');
            }
            self.out.push_str(word);
            self.pending_space = true;
        }
        self.pending_space = raw.ends_with(char::is_whitespace);
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    fn line_break(&mut self) {
        self.out.push('\n');
        self.pending_space = false;
    }

    fn block_break(&mut self, blank_line: bool) {
        self.pending_space = false;
        if self.out.is_empty() {
            return;
        }
        if !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        if blank_line && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn finish(self) -> String {
        let mut out = String::with_capacity(self.out.len());
        let mut blank_run = 0;
        for line in self.out.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                blank_run += 1;
                if blank_run > 1 {
                    continue;
                }
            } else {
                blank_run = 0;
            }
            out.push_str(line);
            out.push('\n');
        }
        out.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_lyrics_block() {
        let html = r#"<html><body><h1>Title</h1><div class="lyrics">La la</div></body></html>"#;
        assert_eq!(extract_lyrics(html).as_deref(), Some("La la"));
    }

    #[test]
    fn test_links_are_unwrapped() {
        let html = r#"<div class="Lyrics__Container-sc-1ynbvzw-6 kUgSbL">First <a href="/annotation/1"><span>linked</span> line</a><br/>Second line</div>"#;
        assert_eq!(
            extract_lyrics(html).as_deref(),
            Some("First linked line\nSecond line")
        );
    }

    #[test]
    fn test_multiple_containers_are_joined() {
        let html = r#"
            <div class="Lyrics__Container-a">Verse one<br>still one</div>
            <aside>ads</aside>
            <div class="Lyrics__Container-b">Verse two</div>"#;
        assert_eq!(
            extract_lyrics(html).as_deref(),
            Some("Verse one\nstill one\nVerse two")
        );
    }

    #[test]
    fn test_nested_containers_not_repeated() {
        let html = r#"<div class="Lyrics__Container-x"><div class="lyrics">Only once</div></div>"#;
        assert_eq!(extract_lyrics(html).as_deref(), Some("Only once"));
    }

    #[test]
    fn test_paragraphs_and_scripts() {
        let html = r#"<div class="lyrics"><p>Oh oh</p><script>var x = 1;</script><p>  Second
            stanza  </p></div>"#;
        assert_eq!(extract_lyrics(html).as_deref(), Some("Oh oh\n\nSecond stanza"));
    }

    #[test]
    fn test_no_container_is_none() {
        assert_eq!(extract_lyrics("<div class=\"content\">nothing here</div>"), None);
        assert_eq!(extract_lyrics("<div class=\"lyrics\">   </div>"), None);
    }
}

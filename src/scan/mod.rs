use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

use crate::core::ScanResult;

pub const DEFAULT_MAX_TEXT_CHARS: usize = 3000;

const LEGAL_MARKERS: [&str; 2] = ["impressum", "datenschutz"];

/// Feeds `html` through the HTML tokenizer and collects the page signals.
///
/// Tags are seen as written: no tree construction, so misnested or
/// unclosed markup is not rearranged and `<noscript>` content is scanned
/// like any other markup.
pub fn scan_html(html: &str, max_text_chars: usize) -> ScanResult {
    let mut tokenizer = Tokenizer::new(Scanner::default(), TokenizerOpts::default());
    let mut input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(html));
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();
    tokenizer.sink.finish(max_text_chars)
}

/// Collapses whitespace runs and cuts the text to `max_chars` characters,
/// appending `…` when something was cut.
pub fn collapse_and_truncate(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let mut out: String = collapsed.chars().take(max_chars).collect();
    out.push('…');
    out
}

pub fn contains_legal_marker(haystack: &str) -> bool {
    let lowered = haystack.to_lowercase();
    LEGAL_MARKERS.iter().any(|m| lowered.contains(m))
}

#[derive(Debug, Default)]
struct OpenAnchor {
    href: String,
    text: String,
}

// One buffer per tracked element; `Some` while the element is open.
#[derive(Debug, Default)]
struct Scanner {
    result: ScanResult,
    skip_depth: usize,
    title: Option<String>,
    h1: Option<String>,
    paragraph: Option<String>,
    anchor: Option<OpenAnchor>,
    button: Option<String>,
    page_text: String,
}

impl TokenSink for Scanner {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => return self.tag(&tag),
            Token::CharacterTokens(text) => self.text(&text),
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

impl Scanner {
    fn tag(&mut self, tag: &Tag) -> TokenSinkResult<()> {
        let name: &str = &tag.name;
        match tag.kind {
            TagKind::StartTag => {
                self.open(name, tag);
                // The tokenizer only switches to raw text when told to.
                match name {
                    "script" => return TokenSinkResult::RawData(RawKind::ScriptData),
                    "style" => return TokenSinkResult::RawData(RawKind::Rawtext),
                    _ => {}
                }
                if tag.self_closing {
                    self.close(name);
                }
            }
            TagKind::EndTag => self.close(name),
        }
        TokenSinkResult::Continue
    }

    fn open(&mut self, name: &str, tag: &Tag) {
        match name {
            "script" | "style" => self.skip_depth += 1,
            "title" => self.title = Some(String::new()),
            "meta" => self.meta(tag),
            "link" => {
                let rel = attr(tag, "rel").unwrap_or("").to_lowercase();
                if rel.contains("canonical") && is_unset(&self.result.canonical) {
                    self.result.canonical = Some(attr(tag, "href").unwrap_or("").trim().to_string());
                }
            }
            "h1" => self.h1 = Some(String::new()),
            "p" => self.paragraph = Some(String::new()),
            "a" => {
                let href = attr(tag, "href").unwrap_or("").to_string();
                if !self.result.legal_link_found && contains_legal_marker(&href) {
                    self.result.legal_link_found = true;
                }
                self.anchor = Some(OpenAnchor {
                    href,
                    text: String::new(),
                });
            }
            "button" => self.button = Some(String::new()),
            "img" => {
                if attr(tag, "alt").is_some_and(|alt| !alt.trim().is_empty()) {
                    self.result.has_image_with_alt = true;
                }
            }
            _ => {}
        }
    }

    fn meta(&mut self, tag: &Tag) {
        let name = attr(tag, "name").unwrap_or("").to_lowercase();
        let property = attr(tag, "property").unwrap_or("").to_lowercase();
        let content = attr(tag, "content").unwrap_or("").trim();

        if name == "description" && is_unset(&self.result.meta_description) {
            self.result.meta_description = Some(content.to_string());
        }
        if property.starts_with("og:image") && is_unset(&self.result.og_image) {
            self.result.og_image = Some(content.to_string());
        }
    }

    fn text(&mut self, text: &str) {
        if self.skip_depth > 0 || text.is_empty() {
            return;
        }

        self.page_text.push_str(text);
        for buf in [
            self.title.as_mut(),
            self.h1.as_mut(),
            self.paragraph.as_mut(),
            self.button.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            buf.push_str(text);
        }
        if let Some(anchor) = self.anchor.as_mut() {
            anchor.text.push_str(text);
        }
    }

    fn close(&mut self, name: &str) {
        match name {
            "script" | "style" => self.skip_depth = self.skip_depth.saturating_sub(1),
            "title" => {
                if let Some(buf) = self.title.take() {
                    self.result.title = buf.trim().to_string();
                }
            }
            "h1" => push_trimmed(&mut self.result.h1_texts, self.h1.take()),
            "p" => push_trimmed(&mut self.result.paragraph_texts, self.paragraph.take()),
            "a" => {
                let Some(anchor) = self.anchor.take() else {
                    return;
                };
                let text = anchor.text.trim();
                if text.is_empty() {
                    return;
                }
                if !self.result.legal_link_found
                    && contains_legal_marker(&format!("{} {text}", anchor.href))
                {
                    self.result.legal_link_found = true;
                }
                self.result.cta_texts.push(text.to_string());
            }
            "button" => push_trimmed(&mut self.result.cta_texts, self.button.take()),
            _ => {}
        }
    }

    fn finish(mut self, max_text_chars: usize) -> ScanResult {
        self.result.page_text = collapse_and_truncate(&self.page_text, max_text_chars);
        self.result
    }
}

fn attr<'a>(tag: &'a Tag, name: &str) -> Option<&'a str> {
    tag.attrs
        .iter()
        .find(|a| &*a.name.local == name)
        .map(|a| &*a.value)
}

fn is_unset(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

fn push_trimmed(out: &mut Vec<String>, buf: Option<String>) {
    let Some(buf) = buf else { return };
    let text = buf.trim();
    if !text.is_empty() {
        out.push(text.to_string());
    }
}
